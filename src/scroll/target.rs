//! Scroll Target Calculator.
//!
//! Two stages: anchor the line at a fraction of the viewport height, then cap
//! how many past lines stay visible above it. Block advances anchor higher to
//! push stale lines out of view.

use tracing::trace;

use crate::config::{Config, ScrollConfig};
use crate::models::{ScrollGeometry, TextMetrics, ViewportGeometry};

impl ScrollGeometry {
    /// Build geometry from host measurements, filling unreported metrics
    /// (non-positive or non-finite) from config.
    pub fn from_host(viewport: ViewportGeometry, metrics: TextMetrics, config: &ScrollConfig) -> Self {
        let line_height_px = if reported(metrics.line_height_px) {
            metrics.line_height_px
        } else {
            metrics.font_size_px.max(0.0) * config.line_height_factor
        };
        let container_top_padding_px = if reported(metrics.container_top_padding_px) {
            metrics.container_top_padding_px
        } else {
            config.default_top_padding_px
        };
        Self {
            viewport_height: viewport.client_height,
            max_scrollable: viewport.scroll_height - viewport.client_height,
            line_height_px,
            container_top_padding_px,
        }
    }
}

fn reported(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Pixel offset that puts `line_index` in view.
///
/// `None` when `line_index` is outside `[0, line_count)`. When nothing can
/// scroll (`max_scrollable <= 0`) the offset is always `0`.
pub fn target_offset(
    line_index: usize,
    previous_line_index: usize,
    line_count: usize,
    geometry: &ScrollGeometry,
    is_commit: bool,
    config: &Config,
) -> Option<f64> {
    if line_index >= line_count {
        return None;
    }
    if geometry.max_scrollable <= 0.0 {
        return Some(0.0);
    }

    let scroll = &config.scroll;
    let advance_lines = line_index.saturating_sub(previous_line_index);
    let line_top = geometry.container_top_padding_px + line_index as f64 * geometry.line_height_px;

    let anchor_ratio = match (advance_lines >= config.commit.lines_per_block, is_commit) {
        (false, false) => scroll.anchor_ratio,
        (false, true) => scroll.commit_anchor_ratio,
        (true, false) => scroll.block_anchor_ratio,
        (true, true) => scroll.commit_block_anchor_ratio,
    };
    let mut target = line_top - geometry.viewport_height * anchor_ratio;

    let max_past_lines = past_line_limit(scroll, is_commit);
    let max_past_px = max_past_lines as f64 * geometry.line_height_px;
    if line_top - target > max_past_px {
        target = line_top - max_past_px;
    }

    let target = target.clamp(0.0, geometry.max_scrollable);
    trace!(
        line_index,
        advance_lines,
        is_commit,
        anchor_ratio,
        target,
        "scroll target computed"
    );
    Some(target)
}

fn past_line_limit(scroll: &ScrollConfig, is_commit: bool) -> usize {
    if is_commit {
        scroll.commit_max_past_lines
    } else {
        scroll.max_past_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> ScrollGeometry {
        ScrollGeometry {
            viewport_height: 600.0,
            max_scrollable: 2_000.0,
            line_height_px: 30.0,
            container_top_padding_px: 40.0,
        }
    }

    #[test]
    fn test_out_of_range_line_is_rejected() {
        let config = Config::default();
        assert_eq!(target_offset(4, 0, 4, &geometry(), false, &config), None);
    }

    #[test]
    fn test_no_scroll_room_targets_zero() {
        let config = Config::default();
        let g = ScrollGeometry {
            max_scrollable: 0.0,
            ..geometry()
        };
        assert_eq!(target_offset(3, 0, 10, &g, true, &config), Some(0.0));
    }

    #[test]
    fn test_past_line_clamp_applies() {
        let config = Config::default();
        // top = 40 + 20 * 30 = 640; anchor 0.35 * 600 = 210 > 3 lines (90)
        let target = target_offset(20, 19, 40, &geometry(), false, &config).unwrap();
        assert_eq!(target, 640.0 - 90.0);
    }

    #[test]
    fn test_commit_mode_shows_fewer_past_lines() {
        let config = Config::default();
        let target = target_offset(20, 19, 40, &geometry(), true, &config).unwrap();
        assert_eq!(target, 640.0 - 60.0);
    }

    #[test]
    fn test_anchor_ratio_when_lines_are_tall() {
        let config = Config::default();
        // Tall lines: 3 past lines = 600px, anchor 0.35 * 600 = 210 stays
        let g = ScrollGeometry {
            line_height_px: 200.0,
            max_scrollable: 10_000.0,
            ..geometry()
        };
        let target = target_offset(5, 4, 40, &g, false, &config).unwrap();
        assert_eq!(target, 40.0 + 1_000.0 - 210.0);
    }

    #[test]
    fn test_block_advance_anchors_higher() {
        let config = Config::default();
        let g = ScrollGeometry {
            line_height_px: 200.0,
            max_scrollable: 10_000.0,
            ..geometry()
        };
        let step = target_offset(8, 7, 40, &g, false, &config).unwrap();
        let block = target_offset(8, 4, 40, &g, false, &config).unwrap();
        assert!(block > step);
        assert_eq!(block, 40.0 + 1_600.0 - 150.0);
        let commit_block = target_offset(8, 4, 40, &g, true, &config).unwrap();
        assert_eq!(commit_block, 40.0 + 1_600.0 - 90.0);
    }

    #[test]
    fn test_clamped_to_range() {
        let config = Config::default();
        assert_eq!(target_offset(0, 0, 40, &geometry(), false, &config), Some(0.0));
        let g = ScrollGeometry {
            max_scrollable: 100.0,
            ..geometry()
        };
        assert_eq!(target_offset(30, 29, 40, &g, false, &config), Some(100.0));
    }

    #[test]
    fn test_geometry_from_host_fills_missing_metrics() {
        let config = ScrollConfig::default();
        let viewport = ViewportGeometry {
            scroll_top: 0.0,
            client_height: 500.0,
            scroll_height: 1_500.0,
        };
        let metrics = TextMetrics {
            font_size_px: 20.0,
            line_height_px: 0.0,
            container_top_padding_px: f64::NAN,
        };
        let g = ScrollGeometry::from_host(viewport, metrics, &config);
        assert_eq!(g.max_scrollable, 1_000.0);
        assert_eq!(g.viewport_height, 500.0);
        assert!((g.line_height_px - 36.0).abs() < 1e-9);
        assert_eq!(g.container_top_padding_px, 40.0);
    }
}
