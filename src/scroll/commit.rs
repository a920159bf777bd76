//! Commit-mode classification.
//!
//! Once the tracker is clearly locked on (deep into the song, a block
//! advance, or repeated high-confidence hits) the current line is anchored
//! nearer the top so more upcoming lines are visible. This only affects
//! anchoring, never matching.

use crate::config::CommitConfig;

/// Fraction of the song reached when `line_index` is current.
pub fn progress_fraction(line_index: usize, line_count: usize) -> f64 {
    if line_count == 0 {
        return 0.0;
    }
    (line_index + 1) as f64 / line_count as f64
}

pub fn is_commit(
    line_index: usize,
    advance_lines: usize,
    progress_fraction: f64,
    recent_high_confidence: usize,
    config: &CommitConfig,
) -> bool {
    let far_into_song =
        line_index >= config.line_threshold || progress_fraction > config.progress_fraction;
    let block_advance = advance_lines >= config.lines_per_block;
    let locked_on = recent_high_confidence >= config.high_confidence_min_count;

    far_into_song || block_advance || locked_on
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::early_and_quiet(2, 1, 0.05, 0, false)]
    #[case::deep_line(10, 0, 0.05, 0, true)]
    #[case::past_quarter(3, 0, 0.26, 0, true)]
    #[case::exactly_quarter(3, 0, 0.25, 0, false)]
    #[case::block_advance(2, 4, 0.05, 0, true)]
    #[case::short_advance(2, 3, 0.05, 0, false)]
    #[case::two_confident_hits(2, 1, 0.05, 2, true)]
    #[case::one_confident_hit(2, 1, 0.05, 1, false)]
    fn test_is_commit(
        #[case] line_index: usize,
        #[case] advance_lines: usize,
        #[case] progress: f64,
        #[case] high_confidence: usize,
        #[case] expected: bool,
    ) {
        let config = CommitConfig::default();
        assert_eq!(
            is_commit(line_index, advance_lines, progress, high_confidence, &config),
            expected
        );
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(0, 4), 0.25);
        assert_eq!(progress_fraction(3, 4), 1.0);
        assert_eq!(progress_fraction(0, 0), 0.0);
    }
}
