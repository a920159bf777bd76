//! Core data models shared by the matching pipeline and the scroll controller.

use std::collections::VecDeque;

use serde::Serialize;

/// Monotonic clock reading in milliseconds.
pub type Millis = u64;

// ============================================================================
// Lyrics
// ============================================================================

/// One lyric line. Built once when lyrics load; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// 0-based, contiguous.
    pub index: usize,
    pub text: String,
    pub normalized: String,
}

// ============================================================================
// Observations
// ============================================================================

/// A candidate the Position Tracker accepted (or was asked to accept).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Observation {
    pub line_index: usize,
    pub confidence: f64,
    pub timestamp: Millis,
}

/// Upper bound on retained observations, whatever their age. Recency is the
/// real bound; this only guards against a flood of interim fragments and is
/// never reached at normal recognizer rates.
pub const MAX_OBSERVATIONS: usize = 256;

/// Recent observations, oldest first, bounded by recency and by
/// [`MAX_OBSERVATIONS`].
///
/// Timestamps come from a monotonic clock, so pruning only ever pops from the
/// front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationHistory {
    entries: VecDeque<Observation>,
}

impl ObservationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation. A repeat of the newest entry (same line, same
    /// instant) is folded into it, keeping the higher confidence.
    pub fn push(&mut self, observation: Observation) {
        if let Some(last) = self.entries.back_mut() {
            if last.line_index == observation.line_index && last.timestamp == observation.timestamp
            {
                last.confidence = last.confidence.max(observation.confidence);
                return;
            }
        }
        if self.entries.len() == MAX_OBSERVATIONS {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    /// Drop everything at or before `now - window_ms`.
    pub fn prune(&mut self, now: Millis, window_ms: Millis) {
        let Some(cutoff) = now.checked_sub(window_ms) else {
            return;
        };
        while self.entries.front().is_some_and(|o| o.timestamp <= cutoff) {
            self.entries.pop_front();
        }
    }

    /// Observations no more than `window_ms` old at `now`.
    pub fn within(&self, now: Millis, window_ms: Millis) -> impl Iterator<Item = &Observation> {
        self.entries
            .iter()
            .filter(move |o| now.saturating_sub(o.timestamp) <= window_ms)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Observation> for ObservationHistory {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        let mut history = Self::new();
        for observation in iter {
            history.push(observation);
        }
        history
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Logical position in the lyrics. Only the Position Tracker writes it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackerState {
    /// Non-decreasing for the lifetime of a session.
    pub current_line_index: usize,
    pub history: ObservationHistory,
    pub last_advance: Option<Millis>,
    /// Scroll destination; may be set without `current_line_index` moving.
    pub target_line_index: Option<usize>,
}

/// Visible scroll position. Only the Scroll Animator writes it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    /// Monotonic floor for every later target, in px.
    pub last_scroll_position: f64,
    pub is_animating: bool,
}

// ============================================================================
// Matching
// ============================================================================

/// A line scored against one fragment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Candidate {
    pub line_index: usize,
    pub confidence: f64,
    /// Confidence minus the forward-distance penalty.
    pub adjusted_score: f64,
    /// Signed distance from the current line.
    pub distance: i64,
}

/// Which branch of the resolver produced a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Best candidate inside the forward window.
    Local,
    /// Large jump approved by the evidence gate.
    EvidenceJump,
    /// Forward step within the jump threshold.
    ForwardStep,
    /// Local candidate used after the global one was refused.
    Fallback,
}

/// The resolver's accepted line for one fragment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Resolution {
    pub line_index: usize,
    pub confidence: f64,
    pub route: Route,
}

// ============================================================================
// Geometry
// ============================================================================

/// Scroll container measurements reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ViewportGeometry {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

/// Live text measurements reported by the host (reflect zoom).
/// Non-positive values mean "not reported".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TextMetrics {
    pub font_size_px: f64,
    pub line_height_px: f64,
    pub container_top_padding_px: f64,
}

/// Everything the Scroll Target Calculator needs, in px.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScrollGeometry {
    pub viewport_height: f64,
    pub max_scrollable: f64,
    pub line_height_px: f64,
    pub container_top_padding_px: f64,
}
