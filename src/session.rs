//! Session controller: wires the matching path and the scroll path together
//! behind one serialized API.
//!
//! Two paths touch the session, never concurrently:
//! - per fragment: normalize, resolve, gate, track, then maybe retarget scroll
//! - per tick: move the animator one frame toward the current target
//!
//! The host is reached only through [`LyricsView`]; time is always passed in.

use std::mem;

use tracing::{debug, info};

use crate::config::Config;
use crate::fallback::FallbackAdvancer;
use crate::lyrics::LineIndex;
use crate::models::{Millis, ScrollGeometry, ScrollState, TextMetrics, TrackerState, ViewportGeometry};
use crate::normalize::normalize;
use crate::resolver;
use crate::scroll::{self, ScrollAnimator, Scheduler, TickHandle};
use crate::tracker;
use crate::transcript::{self, RecognitionResult};

/// The hosting UI layer.
pub trait LyricsView {
    fn viewport_geometry(&self) -> ViewportGeometry;

    /// Must reflect live zoom / font-size changes.
    fn text_metrics(&self) -> TextMetrics;

    /// The tracked line moved forward.
    fn on_position_changed(&mut self, _line_index: usize) {}

    /// The animator committed a new offset; the host should apply it.
    fn on_scroll_position_changed(&mut self, px: f64);

    /// A fragment matched nothing.
    fn on_no_match(&mut self) {}
}

/// Which signal drives the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Transcript fragments from a recognizer.
    #[default]
    Transcript,
    /// Audio levels only; see [`crate::fallback`].
    AudioLevel,
}

/// Where the scroll is heading, kept so the pixel target can be recomputed
/// from live geometry on every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScrollIntent {
    line_index: usize,
    previous_line_index: usize,
    is_commit: bool,
}

pub struct Session<S: Scheduler, V: LyricsView> {
    lines: LineIndex,
    config: Config,
    tracker: TrackerState,
    animator: ScrollAnimator,
    scheduler: S,
    view: V,
    tick: Option<TickHandle>,
    listening: bool,
    mode: InputMode,
    fallback: FallbackAdvancer,
    intent: Option<ScrollIntent>,
}

impl<S: Scheduler, V: LyricsView> Session<S, V> {
    pub fn new(lines: LineIndex, config: Config, scheduler: S, view: V) -> Self {
        let animator = ScrollAnimator::new(config.animation.clone());
        Self {
            lines,
            config,
            tracker: TrackerState::default(),
            animator,
            scheduler,
            view,
            tick: None,
            listening: false,
            mode: InputMode::Transcript,
            fallback: FallbackAdvancer::default(),
            intent: None,
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Begin tracking. The scroll floor starts at the host's current offset.
    pub fn start(&mut self, now: Millis) {
        if self.listening {
            return;
        }
        self.tracker = TrackerState::default();
        self.animator.reset(self.view.viewport_geometry().scroll_top);
        self.fallback = FallbackAdvancer::new(now);
        self.intent = None;
        self.listening = true;
        info!(lines = self.lines.len(), mode = ?self.mode, "session started");
    }

    /// Stop tracking: cancel the pending tick and reset all session state.
    pub fn stop(&mut self) {
        self.cancel_tick();
        self.tracker = TrackerState::default();
        self.animator.reset(0.0);
        self.intent = None;
        if self.listening {
            info!("session stopped");
        }
        self.listening = false;
    }

    pub fn set_input_mode(&mut self, mode: InputMode, now: Millis) {
        if mode == self.mode {
            return;
        }
        if mode == InputMode::AudioLevel {
            self.fallback = FallbackAdvancer::new(now);
        }
        info!(?mode, "input mode changed");
        self.mode = mode;
    }

    // ------------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------------

    /// Handle one transcript fragment. Returns the accepted line, if any.
    pub fn on_fragment(&mut self, text: &str, is_final: bool, now: Millis) -> Option<usize> {
        if !self.listening || self.mode != InputMode::Transcript {
            return None;
        }

        let normalized = normalize(text);
        let is_interim = !is_final;
        let previous = self.tracker.current_line_index;

        let (state, resolution) = resolver::resolve(
            mem::take(&mut self.tracker),
            &normalized,
            is_interim,
            &self.lines,
            now,
            &self.config,
        );
        self.tracker = state;

        let Some(resolution) = resolution else {
            self.view.on_no_match();
            return None;
        };

        if resolution.line_index > previous {
            self.view.on_position_changed(resolution.line_index);
        }

        let scroll_threshold = self.config.matching.scroll_confidence(is_interim);
        if resolution.confidence > scroll_threshold {
            self.scroll_to(resolution.line_index, previous, now);
        } else {
            debug!(
                line_index = resolution.line_index,
                confidence = resolution.confidence,
                scroll_threshold,
                "session: match below scroll threshold"
            );
        }
        Some(resolution.line_index)
    }

    /// Handle one recognizer callback.
    pub fn on_results(&mut self, results: &[RecognitionResult], now: Millis) -> Option<usize> {
        let fragment = transcript::assemble(results)?;
        self.on_fragment(&fragment.text, fragment.is_final, now)
    }

    /// Handle one audio-level sample (0-100). Only used in audio-level mode.
    pub fn on_audio_level(&mut self, level: u8, now: Millis) -> Option<usize> {
        if !self.listening || self.mode != InputMode::AudioLevel {
            return None;
        }
        let previous = self.tracker.current_line_index;
        let next = self.fallback.next_line(
            level,
            now,
            previous,
            self.lines.len(),
            &self.config.fallback,
        )?;

        let (state, accepted) = tracker::accept(
            mem::take(&mut self.tracker),
            next,
            0.0,
            now,
            &self.config.evidence,
        );
        self.tracker = state;
        let line_index = accepted?;

        debug!(line_index, level, "session: fallback advance");
        self.view.on_position_changed(line_index);
        self.scroll_to(line_index, previous, now);
        Some(line_index)
    }

    /// Run one animation frame at `frame_ms`.
    pub fn on_tick(&mut self, frame_ms: f64) {
        if !self.listening {
            return;
        }

        let viewport = self.view.viewport_geometry();
        let geometry = self.geometry(viewport);

        // Geometry may have changed since the target was set (zoom).
        if self.animator.is_animating() {
            if let Some(target) = self.intent.and_then(|intent| self.target_for(intent, &geometry)) {
                self.animator
                    .set_target(target, geometry.max_scrollable, frame_ms);
            }
        }

        let outcome = self
            .animator
            .tick(frame_ms, viewport.scroll_top, geometry.max_scrollable);
        if let Some(position) = outcome.position() {
            self.view.on_scroll_position_changed(position);
        }

        if self.animator.is_animating() {
            self.tick = Some(self.scheduler.schedule());
        } else {
            self.cancel_tick();
        }
    }

    // ------------------------------------------------------------------------
    // Scroll path
    // ------------------------------------------------------------------------

    fn scroll_to(&mut self, line_index: usize, previous_line_index: usize, now: Millis) {
        if line_index == previous_line_index && self.tracker.target_line_index == Some(line_index) {
            return;
        }

        let commit = &self.config.commit;
        let advance_lines = line_index.saturating_sub(previous_line_index);
        let high_confidence = tracker::recent_high_confidence(
            &self.tracker,
            commit.high_confidence,
            now,
            commit.high_confidence_window_ms,
        );
        let is_commit = scroll::is_commit(
            line_index,
            advance_lines,
            self.progress_fraction(),
            high_confidence,
            commit,
        );
        debug!(line_index, advance_lines, is_commit, "session: scroll intent");

        let intent = ScrollIntent {
            line_index,
            previous_line_index,
            is_commit,
        };
        let geometry = self.geometry(self.view.viewport_geometry());
        let Some(target) = self.target_for(intent, &geometry) else {
            return;
        };

        self.tracker = tracker::retarget(mem::take(&mut self.tracker), line_index);
        self.intent = Some(intent);
        if self
            .animator
            .set_target(target, geometry.max_scrollable, now as f64)
        {
            self.tick = Some(self.scheduler.schedule());
        } else if !self.animator.is_animating() {
            self.cancel_tick();
        }
    }

    fn target_for(&self, intent: ScrollIntent, geometry: &ScrollGeometry) -> Option<f64> {
        scroll::target_offset(
            intent.line_index,
            intent.previous_line_index,
            self.lines.len(),
            geometry,
            intent.is_commit,
            &self.config,
        )
    }

    fn geometry(&self, viewport: ViewportGeometry) -> ScrollGeometry {
        ScrollGeometry::from_host(viewport, self.view.text_metrics(), &self.config.scroll)
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn tracker_state(&self) -> &TrackerState {
        &self.tracker
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.animator.state()
    }

    pub fn current_line_index(&self) -> usize {
        self.tracker.current_line_index
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// `(current + 1) / line_count`, or 0 for empty lyrics.
    pub fn progress_fraction(&self) -> f64 {
        scroll::progress_fraction(self.tracker.current_line_index, self.lines.len())
    }

    pub fn into_view(self) -> V {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::VirtualScheduler;
    use crate::view::SimulatedView;

    fn song(count: usize) -> LineIndex {
        let text: Vec<String> = (0..count)
            .map(|i| format!("linea{i:02}x cancion{i:02}y"))
            .collect();
        LineIndex::from_text(&text.join("\n"))
    }

    fn session(count: usize) -> Session<VirtualScheduler, SimulatedView> {
        let view = SimulatedView::new(count, 600.0, 30.0, 40.0);
        let mut session = Session::new(
            song(count),
            Config::default(),
            VirtualScheduler::new(0.0, 16.0),
            view,
        );
        session.start(0);
        session
    }

    fn phrase(i: usize) -> String {
        format!("linea{i:02}x cancion{i:02}y")
    }

    fn run_frames(session: &mut Session<VirtualScheduler, SimulatedView>, max_frames: usize) {
        for _ in 0..max_frames {
            let Some(frame) = session.scheduler_mut().next_frame() else {
                break;
            };
            session.on_tick(frame);
        }
    }

    #[test]
    fn test_ignores_events_before_start() {
        let mut session = Session::new(
            song(5),
            Config::default(),
            VirtualScheduler::new(0.0, 16.0),
            SimulatedView::new(5, 600.0, 30.0, 40.0),
        );
        assert_eq!(session.on_fragment(&phrase(1), true, 100), None);
        assert_eq!(session.view().no_matches, 0);
    }

    #[test]
    fn test_match_notifies_and_schedules_scroll() {
        let mut session = session(40);
        assert_eq!(session.on_fragment(&phrase(5), true, 1_000), Some(5));
        assert_eq!(session.view().positions, vec![5]);
        assert_eq!(session.tracker_state().target_line_index, Some(5));
        assert!(session.scheduler().is_pending());
        assert!(session.scroll_state().is_animating);
    }

    #[test]
    fn test_no_match_fires_callback() {
        let mut session = session(10);
        assert_eq!(session.on_fragment("nada que ver", true, 1_000), None);
        assert_eq!(session.view().no_matches, 1);
        assert_eq!(session.current_line_index(), 0);
    }

    #[test]
    fn test_low_confidence_match_tracks_without_scrolling() {
        // 1 of 3 words plus the keyword bonus: 0.43 passes the 0.30
        // resolver threshold but not the 0.50 scroll threshold
        let mut session = session(40);
        assert_eq!(session.on_fragment("linea05x zzzz wwww", true, 1_000), Some(5));
        assert_eq!(session.current_line_index(), 5);
        assert_eq!(session.tracker_state().target_line_index, None);
        assert!(!session.scheduler().is_pending());
    }

    #[test]
    fn test_ticks_drive_scroll_forward_until_arrival() {
        let mut session = session(40);
        session.on_fragment(&phrase(10), true, 0);
        session.on_fragment(&phrase(20), true, 100);
        assert_eq!(session.current_line_index(), 20);
        run_frames(&mut session, 2_000);
        let view = session.view();
        assert!(!view.scrolls.is_empty());
        assert!(view.scrolls.windows(2).all(|w| w[1] >= w[0]));
        assert!(!session.scroll_state().is_animating);
        assert!(!session.scheduler().is_pending());
        // 40 + 20 * 30 - 2 past lines (commit: line 20 >= 10)
        let expected = 40.0 + 600.0 - 60.0;
        assert!((view.scroll_top() - expected).abs() < 1.0);
    }

    #[test]
    fn test_stop_resets_and_cancels() {
        let mut session = session(40);
        session.on_fragment(&phrase(8), true, 1_000);
        assert!(session.scheduler().is_pending());
        session.stop();
        assert!(!session.scheduler().is_pending());
        assert_eq!(session.tracker_state(), &TrackerState::default());
        assert_eq!(session.scroll_state(), ScrollState::default());
        assert_eq!(session.on_fragment(&phrase(9), true, 2_000), None);
    }

    #[test]
    fn test_audio_level_mode_advances_one_line() {
        let mut session = session(10);
        session.set_input_mode(InputMode::AudioLevel, 0);
        assert_eq!(session.on_fragment(&phrase(3), true, 500), None);
        assert_eq!(session.on_audio_level(50, 1_000), None);
        assert_eq!(session.on_audio_level(50, 3_500), Some(1));
        assert_eq!(session.on_audio_level(10, 7_000), None);
        assert_eq!(session.on_audio_level(60, 7_100), Some(2));
        assert_eq!(session.view().positions, vec![1, 2]);
    }

    #[test]
    fn test_results_prefer_final_text() {
        let mut session = session(10);
        let results = vec![
            RecognitionResult::interim(phrase(1)),
            RecognitionResult::final_text(phrase(2)),
        ];
        assert_eq!(session.on_results(&results, 1_000), Some(2));
    }

    #[test]
    fn test_out_of_range_scroll_leaves_state_untouched() {
        let mut session = session(4);
        session.scroll_to(9, 0, 1_000);
        assert_eq!(session.tracker_state().target_line_index, None);
        assert_eq!(session.intent, None);
        assert!(!session.scheduler().is_pending());
    }

    #[test]
    fn test_progress_fraction() {
        let mut session = session(4);
        assert_eq!(session.progress_fraction(), 0.25);
        session.on_fragment(&phrase(3), true, 1_000);
        assert_eq!(session.progress_fraction(), 1.0);
    }
}
