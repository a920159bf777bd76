//! Evidence gate for large forward jumps.
//!
//! A single high-confidence detection far ahead is usually a repeated chorus
//! matched out of place. A jump is approved only when recent observations
//! already cluster in the half of the jump closest to its target.

use tracing::debug;

use crate::config::EvidenceConfig;
use crate::models::{Millis, ObservationHistory};

/// Approve or refuse a jump from `current_line_index` to `jump_line_index`.
///
/// The supporting range is `[jump - distance / 2, jump]`. For large jumps its
/// lower end can sit below `current_line_index`; that is kept as is.
pub fn approve(
    jump_line_index: usize,
    current_line_index: usize,
    history: &ObservationHistory,
    now: Millis,
    config: &EvidenceConfig,
) -> bool {
    let mut recent: Vec<usize> = history
        .within(now, config.window_ms)
        .map(|o| o.line_index)
        .collect();

    if recent.is_empty() {
        debug!(jump_line_index, "evidence gate: no recent observations");
        return false;
    }

    recent.sort_unstable();

    let jump_distance = jump_line_index as f64 - current_line_index as f64;
    let range_start = jump_line_index as f64 - jump_distance / 2.0;
    let range_end = jump_line_index as f64;

    let supporting: Vec<usize> = recent
        .into_iter()
        .filter(|&idx| (range_start..=range_end).contains(&(idx as f64)))
        .collect();

    if supporting.len() < config.min_supporting {
        debug!(
            jump_line_index,
            supporting = supporting.len(),
            required = config.min_supporting,
            "evidence gate: not enough support"
        );
        return false;
    }

    let forward_pairs = supporting.windows(2).filter(|w| w[1] >= w[0]).count();
    let approved = forward_pairs + 1 >= config.min_supporting;
    debug!(
        jump_line_index,
        supporting = supporting.len(),
        forward_pairs,
        approved,
        "evidence gate verdict"
    );
    approved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;

    fn history(entries: &[(usize, Millis)]) -> ObservationHistory {
        entries
            .iter()
            .map(|&(line_index, timestamp)| Observation {
                line_index,
                confidence: 0.8,
                timestamp,
            })
            .collect()
    }

    #[test]
    fn test_rejects_without_history() {
        let config = EvidenceConfig::default();
        assert!(!approve(11, 0, &ObservationHistory::new(), 1_000, &config));
    }

    #[test]
    fn test_rejects_single_isolated_observation() {
        let config = EvidenceConfig::default();
        let h = history(&[(2, 900)]);
        assert!(!approve(20, 0, &h, 1_000, &config));
    }

    #[test]
    fn test_approves_trend_toward_target() {
        let config = EvidenceConfig::default();
        // Range for 0 -> 11 is [5.5, 11]
        let h = history(&[(8, 500), (10, 1_000)]);
        assert!(approve(11, 0, &h, 1_200, &config));
    }

    #[test]
    fn test_ignores_stale_observations() {
        let config = EvidenceConfig::default();
        let h = history(&[(8, 500), (10, 1_000)]);
        // 4.5 s later both are outside the 3 s window
        assert!(!approve(11, 0, &h, 5_500, &config));
    }

    #[test]
    fn test_observations_outside_range_do_not_count() {
        let config = EvidenceConfig::default();
        // Range for 0 -> 20 is [10, 20]; 3 and 4 are too early
        let h = history(&[(3, 500), (4, 600), (12, 700)]);
        assert!(!approve(20, 0, &h, 1_000, &config));
    }

    #[test]
    fn test_window_edge_is_inclusive() {
        let config = EvidenceConfig::default();
        let h = history(&[(16, 1_000), (18, 2_000)]);
        assert!(approve(20, 4, &h, 4_000, &config));
    }
}
