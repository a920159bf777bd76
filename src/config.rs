//! Tunable constants for matching, evidence gating, anchoring and animation.
//!
//! Every section deserializes with `#[serde(default)]`, so a JSON file only
//! needs to name the values it overrides:
//!
//! ```json
//! { "matching": { "window_forward": 16 }, "animation": { "max_speed": 18.0 } }
//! ```
//!
//! The interim/final confidence thresholds are empirical. Treat them as knobs,
//! not as load-bearing values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ScrollError, ScrollResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub evidence: EvidenceConfig,
    pub commit: CommitConfig,
    pub scroll: ScrollConfig,
    pub animation: AnimationConfig,
    pub fallback: FallbackConfig,
}

// ============================================================================
// Sections
// ============================================================================

/// Candidate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Lines beyond the current one that count as "local".
    pub window_forward: usize,
    /// Forward distance above which a jump needs corroborating evidence.
    pub jump_threshold: usize,
    /// Score subtracted per line of forward distance.
    pub distance_penalty: f64,
    pub min_confidence_final: f64,
    pub min_confidence_interim: f64,
    /// An accepted line only moves the scroll target above these.
    pub scroll_confidence_final: f64,
    pub scroll_confidence_interim: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            window_forward: 12,
            jump_threshold: 10,
            distance_penalty: 0.05,
            min_confidence_final: 0.30,
            min_confidence_interim: 0.25,
            scroll_confidence_final: 0.50,
            scroll_confidence_interim: 0.45,
        }
    }
}

impl MatchingConfig {
    pub fn min_confidence(&self, is_interim: bool) -> f64 {
        if is_interim {
            self.min_confidence_interim
        } else {
            self.min_confidence_final
        }
    }

    pub fn scroll_confidence(&self, is_interim: bool) -> f64 {
        if is_interim {
            self.scroll_confidence_interim
        } else {
            self.scroll_confidence_final
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Observations older than this are forgotten.
    pub window_ms: u64,
    /// Supporting observations a large jump needs.
    pub min_supporting: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            window_ms: 3_000,
            min_supporting: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub line_threshold: usize,
    pub progress_fraction: f64,
    /// An advance of at least this many lines is a "block advance".
    pub lines_per_block: usize,
    pub high_confidence: f64,
    pub high_confidence_window_ms: u64,
    pub high_confidence_min_count: usize,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            line_threshold: 10,
            progress_fraction: 0.25,
            lines_per_block: 4,
            high_confidence: 0.9,
            high_confidence_window_ms: 5_000,
            high_confidence_min_count: 2,
        }
    }
}

/// Scroll target anchoring. Ratios are fractions of the viewport height kept
/// above the current line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub anchor_ratio: f64,
    pub commit_anchor_ratio: f64,
    pub block_anchor_ratio: f64,
    pub commit_block_anchor_ratio: f64,
    pub max_past_lines: usize,
    pub commit_max_past_lines: usize,
    /// Line height as a multiple of font size when the host reports none.
    pub line_height_factor: f64,
    pub default_top_padding_px: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            anchor_ratio: 0.35,
            commit_anchor_ratio: 0.20,
            block_anchor_ratio: 0.25,
            commit_block_anchor_ratio: 0.15,
            max_past_lines: 3,
            commit_max_past_lines: 2,
            line_height_factor: 1.8,
            default_top_padding_px: 40.0,
        }
    }
}

/// Speeds are in px per reference frame (~60 fps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub baseline_speed: f64,
    pub max_speed: f64,
    pub close_distance_px: f64,
    pub ramp_distance_px: f64,
    pub max_frame_ms: f64,
    pub reference_frame_ms: f64,
    pub stop_tolerance_px: f64,
    /// Tick period of the fixed-interval scheduler.
    pub frame_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            baseline_speed: 1.5,
            max_speed: 12.0,
            close_distance_px: 150.0,
            ramp_distance_px: 300.0,
            max_frame_ms: 33.33,
            reference_frame_ms: 16.67,
            stop_tolerance_px: 1.0,
            frame_interval_ms: 16,
        }
    }
}

/// Degraded-input mode: advance on sustained audio activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub level_threshold: u8,
    pub advance_interval_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            level_threshold: 20,
            advance_interval_ms: 3_000,
        }
    }
}

// ============================================================================
// Loading & validation
// ============================================================================

impl Config {
    /// Read a JSON config file and validate it.
    pub fn load(path: &Path) -> ScrollResult<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| ScrollError::io("read config file", e))?;
        let config: Config =
            serde_json::from_str(&data).map_err(|e| ScrollError::json("parse config file", e))?;
        if let Err(err) = config.validate() {
            warn!(path = ?path, error = %err, "rejecting configuration file");
            return Err(err);
        }
        Ok(config)
    }

    pub fn validate(&self) -> ScrollResult<()> {
        let m = &self.matching;
        check_unit("matching.distance_penalty", m.distance_penalty)?;
        check_unit("matching.min_confidence_final", m.min_confidence_final)?;
        check_unit("matching.min_confidence_interim", m.min_confidence_interim)?;
        check_unit("matching.scroll_confidence_final", m.scroll_confidence_final)?;
        check_unit("matching.scroll_confidence_interim", m.scroll_confidence_interim)?;
        if m.window_forward == 0 {
            return Err(ScrollError::invalid_config(
                "matching.window_forward must be at least 1",
            ));
        }

        if self.evidence.window_ms == 0 {
            return Err(ScrollError::invalid_config("evidence.window_ms must be positive"));
        }
        if self.evidence.min_supporting == 0 {
            return Err(ScrollError::invalid_config(
                "evidence.min_supporting must be at least 1",
            ));
        }

        let c = &self.commit;
        check_unit("commit.progress_fraction", c.progress_fraction)?;
        check_unit("commit.high_confidence", c.high_confidence)?;
        if c.lines_per_block == 0 {
            return Err(ScrollError::invalid_config(
                "commit.lines_per_block must be at least 1",
            ));
        }

        let s = &self.scroll;
        check_unit("scroll.anchor_ratio", s.anchor_ratio)?;
        check_unit("scroll.commit_anchor_ratio", s.commit_anchor_ratio)?;
        check_unit("scroll.block_anchor_ratio", s.block_anchor_ratio)?;
        check_unit("scroll.commit_block_anchor_ratio", s.commit_block_anchor_ratio)?;
        check_positive("scroll.line_height_factor", s.line_height_factor)?;
        check_non_negative("scroll.default_top_padding_px", s.default_top_padding_px)?;

        let a = &self.animation;
        check_positive("animation.baseline_speed", a.baseline_speed)?;
        check_positive("animation.max_speed", a.max_speed)?;
        check_non_negative("animation.close_distance_px", a.close_distance_px)?;
        check_positive("animation.ramp_distance_px", a.ramp_distance_px)?;
        check_positive("animation.max_frame_ms", a.max_frame_ms)?;
        check_positive("animation.reference_frame_ms", a.reference_frame_ms)?;
        check_positive("animation.stop_tolerance_px", a.stop_tolerance_px)?;
        if a.max_speed < a.baseline_speed {
            return Err(ScrollError::invalid_config(format!(
                "animation.max_speed ({}) is below animation.baseline_speed ({})",
                a.max_speed, a.baseline_speed
            )));
        }
        if a.frame_interval_ms == 0 {
            return Err(ScrollError::invalid_config(
                "animation.frame_interval_ms must be positive",
            ));
        }

        if self.fallback.advance_interval_ms == 0 {
            return Err(ScrollError::invalid_config(
                "fallback.advance_interval_ms must be positive",
            ));
        }

        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> ScrollResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ScrollError::invalid_config(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

fn check_positive(name: &str, value: f64) -> ScrollResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ScrollError::invalid_config(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn check_non_negative(name: &str, value: f64) -> ScrollResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ScrollError::invalid_config(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}
