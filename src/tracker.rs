//! Position Tracker: the single writer of `TrackerState`.
//!
//! Functions take the state by value and hand it back, so every transition is
//! an explicit `(state, event) -> state'` step.

use tracing::{debug, info};

use crate::config::EvidenceConfig;
use crate::models::{Millis, Observation, TrackerState};

/// Offer a candidate line. Backward candidates are refused and leave the
/// state untouched; anything else is recorded and may advance the position.
pub fn accept(
    mut state: TrackerState,
    candidate_index: usize,
    confidence: f64,
    now: Millis,
    config: &EvidenceConfig,
) -> (TrackerState, Option<usize>) {
    if candidate_index < state.current_line_index {
        debug!(
            candidate_index,
            current = state.current_line_index,
            "tracker: refusing backward candidate"
        );
        return (state, None);
    }

    state.history.push(Observation {
        line_index: candidate_index,
        confidence,
        timestamp: now,
    });
    state.history.prune(now, config.window_ms);

    if candidate_index > state.current_line_index {
        info!(
            from = state.current_line_index,
            to = candidate_index,
            confidence,
            "tracker: advanced"
        );
        state.last_advance = Some(now);
        state.current_line_index = candidate_index;
    }

    (state, Some(candidate_index))
}

/// Record the scroll destination without touching the logical position.
pub fn retarget(mut state: TrackerState, line_index: usize) -> TrackerState {
    state.target_line_index = Some(line_index);
    state
}

/// Observations above `threshold` confidence no older than `window_ms`.
pub fn recent_high_confidence(
    state: &TrackerState,
    threshold: f64,
    now: Millis,
    window_ms: Millis,
) -> usize {
    state
        .history
        .iter()
        .filter(|o| o.confidence > threshold && now.saturating_sub(o.timestamp) < window_ms)
        .count()
}
