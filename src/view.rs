//! In-memory host: a fixed-size viewport over evenly spaced lines.
//!
//! Used by the CLI replay and by the scenario tests. It writes every
//! committed scroll position straight back into `scroll_top`, the way a real
//! UI layer would.

use serde::Serialize;

use crate::models::{TextMetrics, ViewportGeometry};
use crate::session::LyricsView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedView {
    line_count: usize,
    viewport_height: f64,
    line_height_px: f64,
    top_padding_px: f64,
    scroll_top: f64,
    pub positions: Vec<usize>,
    pub scrolls: Vec<f64>,
    pub no_matches: usize,
}

impl SimulatedView {
    pub fn new(line_count: usize, viewport_height: f64, line_height_px: f64, top_padding_px: f64) -> Self {
        Self {
            line_count,
            viewport_height,
            line_height_px,
            top_padding_px,
            scroll_top: 0.0,
            positions: Vec::new(),
            scrolls: Vec::new(),
            no_matches: 0,
        }
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Simulate a manual scroll by the user.
    pub fn set_scroll_top(&mut self, px: f64) {
        self.scroll_top = px.clamp(0.0, self.max_scrollable());
    }

    /// Simulate a zoom or font-size change.
    pub fn set_line_height(&mut self, line_height_px: f64) {
        self.line_height_px = line_height_px;
    }

    pub fn content_height(&self) -> f64 {
        self.top_padding_px * 2.0 + self.line_count as f64 * self.line_height_px
    }

    pub fn max_scrollable(&self) -> f64 {
        (self.content_height() - self.viewport_height).max(0.0)
    }
}

impl LyricsView for SimulatedView {
    fn viewport_geometry(&self) -> ViewportGeometry {
        ViewportGeometry {
            scroll_top: self.scroll_top,
            client_height: self.viewport_height,
            scroll_height: self.content_height().max(self.viewport_height),
        }
    }

    fn text_metrics(&self) -> TextMetrics {
        TextMetrics {
            font_size_px: self.line_height_px / 1.8,
            line_height_px: self.line_height_px,
            container_top_padding_px: self.top_padding_px,
        }
    }

    fn on_position_changed(&mut self, line_index: usize) {
        self.positions.push(line_index);
    }

    fn on_scroll_position_changed(&mut self, px: f64) {
        self.scroll_top = px;
        self.scrolls.push(px);
    }

    fn on_no_match(&mut self) {
        self.no_matches += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_reflects_content() {
        let view = SimulatedView::new(40, 600.0, 30.0, 40.0);
        let geometry = view.viewport_geometry();
        assert_eq!(geometry.scroll_height, 1_280.0);
        assert_eq!(view.max_scrollable(), 680.0);
    }

    #[test]
    fn test_short_song_cannot_scroll() {
        let view = SimulatedView::new(3, 600.0, 30.0, 40.0);
        let geometry = view.viewport_geometry();
        assert_eq!(geometry.scroll_height - geometry.client_height, 0.0);
    }

    #[test]
    fn test_manual_scroll_is_clamped() {
        let mut view = SimulatedView::new(40, 600.0, 30.0, 40.0);
        view.set_scroll_top(5_000.0);
        assert_eq!(view.scroll_top(), 680.0);
    }
}
