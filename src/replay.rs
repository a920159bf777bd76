//! Scripted sessions: replay recorded recognizer events against a
//! [`SimulatedView`] under a virtual clock.
//!
//! A script is a JSON array of events:
//!
//! ```json
//! [
//!   { "at_ms": 1200, "kind": "interim", "text": "cuando calienta" },
//!   { "at_ms": 1900, "kind": "final", "text": "cuando calienta el sol" },
//!   { "at_ms": 2500, "kind": "level", "level": 42 }
//! ]
//! ```
//!
//! A script made only of `level` events runs in audio-level mode.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ScrollError, ScrollResult};
use crate::lyrics::LineIndex;
use crate::models::Millis;
use crate::scroll::{Scheduler, VirtualScheduler};
use crate::session::{InputMode, Session};
use crate::view::SimulatedView;

/// Frames allowed after the last event for the scroll to settle (~60 s).
const SETTLE_FRAMES: usize = 3_750;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Final,
    Interim,
    Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at_ms: Millis,
    pub kind: EventKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
}

/// Outcome of one replayed script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub script: String,
    pub events: usize,
    pub matched: usize,
    pub no_matches: usize,
    pub skipped: usize,
    pub final_line: usize,
    pub positions: Vec<usize>,
    pub final_scroll_px: f64,
    pub max_scrollable_px: f64,
    pub duration_ms: Millis,
}

pub fn parse_script(json: &str) -> ScrollResult<Vec<ScriptEvent>> {
    let mut events: Vec<ScriptEvent> =
        serde_json::from_str(json).map_err(|e| ScrollError::json("parsing replay script", e))?;
    // Stable: events at the same instant keep their recorded order
    events.sort_by_key(|e| e.at_ms);
    Ok(events)
}

pub fn load_script(path: &Path) -> ScrollResult<Vec<ScriptEvent>> {
    let json =
        std::fs::read_to_string(path).map_err(|e| ScrollError::io("reading replay script", e))?;
    parse_script(&json)
}

/// Replay `events` (sorted by time) from a fresh session.
pub fn replay(
    name: &str,
    lines: &LineIndex,
    config: &Config,
    view: SimulatedView,
    events: &[ScriptEvent],
) -> ReplaySummary {
    let scheduler = VirtualScheduler::new(0.0, config.animation.frame_interval_ms as f64);
    let mut session = Session::new(lines.clone(), config.clone(), scheduler, view);

    let audio_only = !events.is_empty() && events.iter().all(|e| e.kind == EventKind::Level);
    if audio_only {
        session.set_input_mode(InputMode::AudioLevel, 0);
    }
    session.start(0);

    let mut matched = 0;
    let mut skipped = 0;
    for event in events {
        run_frames_until(&mut session, event.at_ms as f64);

        let accepted = match (event.kind, &event.text, event.level) {
            (EventKind::Final, Some(text), _) => session.on_fragment(text, true, event.at_ms),
            (EventKind::Interim, Some(text), _) => session.on_fragment(text, false, event.at_ms),
            (EventKind::Level, _, Some(level)) => session.on_audio_level(level, event.at_ms),
            _ => {
                warn!(script = name, at_ms = event.at_ms, kind = ?event.kind, "replay: event missing its payload");
                skipped += 1;
                None
            }
        };
        if accepted.is_some() {
            matched += 1;
        }
    }

    settle(&mut session);

    let duration_ms = events.last().map_or(0, |e| e.at_ms);
    let final_line = session.current_line_index();
    let view = session.into_view();
    debug!(script = name, final_line, matched, "replay finished");

    ReplaySummary {
        script: name.to_string(),
        events: events.len(),
        matched,
        no_matches: view.no_matches,
        skipped,
        final_line,
        positions: view.positions.clone(),
        final_scroll_px: view.scroll_top(),
        max_scrollable_px: view.max_scrollable(),
        duration_ms,
    }
}

/// Fire every frame due before `until_ms`, then move the clock there.
fn run_frames_until(session: &mut Session<VirtualScheduler, SimulatedView>, until_ms: f64) {
    loop {
        let scheduler = session.scheduler_mut();
        if !scheduler.is_pending() || scheduler.now_ms() + scheduler.frame_ms() > until_ms {
            break;
        }
        let Some(frame) = scheduler.next_frame() else {
            break;
        };
        session.on_tick(frame);
    }
    session.scheduler_mut().advance_to(until_ms);
}

fn settle(session: &mut Session<VirtualScheduler, SimulatedView>) {
    for _ in 0..SETTLE_FRAMES {
        let Some(frame) = session.scheduler_mut().next_frame() else {
            return;
        };
        session.on_tick(frame);
    }
}
