//! Degraded-input mode: advance on sustained audio activity when no
//! transcript is available.

use tracing::debug;

use crate::config::FallbackConfig;
use crate::models::Millis;

/// Paces one-line advances from audio-level samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackAdvancer {
    last_advance_ms: Millis,
}

impl FallbackAdvancer {
    /// Start pacing from `now`; the first advance comes one full interval later.
    pub fn new(now: Millis) -> Self {
        Self {
            last_advance_ms: now,
        }
    }

    /// Line to advance to for this sample, if any. Records the advance.
    pub fn next_line(
        &mut self,
        level: u8,
        now: Millis,
        current_line_index: usize,
        line_count: usize,
        config: &FallbackConfig,
    ) -> Option<usize> {
        if level <= config.level_threshold {
            return None;
        }
        if now.saturating_sub(self.last_advance_ms) <= config.advance_interval_ms {
            return None;
        }
        if current_line_index + 1 >= line_count {
            debug!(current_line_index, "fallback: already on the last line");
            return None;
        }
        self.last_advance_ms = now;
        Some(current_line_index + 1)
    }
}
