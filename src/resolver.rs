//! Candidate resolution: from one normalized fragment to at most one line.
//!
//! Policy, in order:
//! 1. The best candidate inside the forward window wins (continuity first).
//! 2. A best candidate beyond the jump threshold must pass the evidence gate.
//! 3. A forward candidate within the threshold is taken directly.
//! 4. Anything at or behind the current line falls back to the local candidate.
//!
//! Every accepted line goes through the Position Tracker, which owns the
//! monotonic position.

use tracing::debug;

use crate::config::{Config, MatchingConfig};
use crate::evidence;
use crate::lyrics::LineIndex;
use crate::models::{Candidate, Millis, Resolution, Route, TrackerState};
use crate::scoring::score;
use crate::tracker;

/// Score every line, drop those at or below the minimum confidence, and sort
/// by distance-adjusted score (best first; ties keep line order).
pub fn rank_candidates(
    fragment: &str,
    is_interim: bool,
    current_line_index: usize,
    lines: &LineIndex,
    config: &MatchingConfig,
) -> Vec<Candidate> {
    let min_confidence = config.min_confidence(is_interim);

    let mut candidates: Vec<Candidate> = lines
        .iter()
        .filter_map(|line| {
            let confidence = score(fragment, &line.normalized);
            if confidence <= min_confidence {
                return None;
            }
            let distance = line.index as i64 - current_line_index as i64;
            let penalty = distance.max(0) as f64 * config.distance_penalty;
            Some(Candidate {
                line_index: line.index,
                confidence,
                adjusted_score: confidence - penalty,
                distance,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.adjusted_score.total_cmp(&a.adjusted_score));
    candidates
}

/// Resolve a normalized fragment against `lines`, feeding the winner to the
/// tracker. Returns the updated state and the accepted line, if any.
pub fn resolve(
    state: TrackerState,
    fragment: &str,
    is_interim: bool,
    lines: &LineIndex,
    now: Millis,
    config: &Config,
) -> (TrackerState, Option<Resolution>) {
    let matching = &config.matching;
    let current = state.current_line_index;

    let candidates = rank_candidates(fragment, is_interim, current, lines, matching);
    let Some(best_global) = candidates.first().copied() else {
        debug!(fragment, "resolver: no candidate above threshold");
        return (state, None);
    };

    let window_end = lines
        .last_index()
        .map_or(current, |last| (current + matching.window_forward).min(last));
    let best_local = candidates
        .iter()
        .find(|c| (current..=window_end).contains(&c.line_index))
        .copied();

    debug!(
        fragment,
        current,
        global = best_global.line_index,
        global_score = best_global.adjusted_score,
        local = ?best_local.map(|c| c.line_index),
        "resolver: ranked candidates"
    );

    if let Some(local) = best_local {
        return submit(state, local, Route::Local, now, config);
    }

    if best_global.line_index > current + matching.jump_threshold {
        if evidence::approve(
            best_global.line_index,
            current,
            &state.history,
            now,
            &config.evidence,
        ) {
            return submit(state, best_global, Route::EvidenceJump, now, config);
        }
        debug!(
            target_line = best_global.line_index,
            current, "resolver: large jump refused"
        );
        return fallback(state, best_local, now, config);
    }

    if best_global.line_index > current {
        return submit(state, best_global, Route::ForwardStep, now, config);
    }

    fallback(state, best_local, now, config)
}

fn fallback(
    state: TrackerState,
    best_local: Option<Candidate>,
    now: Millis,
    config: &Config,
) -> (TrackerState, Option<Resolution>) {
    match best_local {
        Some(local) => submit(state, local, Route::Fallback, now, config),
        None => (state, None),
    }
}

fn submit(
    state: TrackerState,
    candidate: Candidate,
    route: Route,
    now: Millis,
    config: &Config,
) -> (TrackerState, Option<Resolution>) {
    let (state, accepted) = tracker::accept(
        state,
        candidate.line_index,
        candidate.confidence,
        now,
        &config.evidence,
    );
    let resolution = accepted.map(|line_index| Resolution {
        line_index,
        confidence: candidate.confidence,
        route,
    });
    (state, resolution)
}
