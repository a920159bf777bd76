//! Scroll Animator: moves the visible position toward a target, one tick at
//! a time, never backward.
//!
//! State machine: `Idle -> Animating` when a target ahead of the floor is set
//! with room to scroll; `Animating -> Idle` on arrival (within the stop
//! tolerance), when the target falls behind the floor, when there is nothing
//! to scroll, or on `stop`.

use tracing::{debug, trace};

use crate::config::AnimationConfig;
use crate::models::ScrollState;

/// Result of one animation tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Not animating; nothing was done.
    Idle,
    /// A new position was committed and the animation continues.
    Moved(f64),
    /// A new position was committed and the target has been reached.
    Arrived(f64),
    /// Still animating, but no time elapsed since the previous frame.
    Waiting,
    /// Animation ended without moving (target behind the floor, or no room).
    Halted,
}

impl TickOutcome {
    /// Position committed by this tick, if any.
    pub fn position(self) -> Option<f64> {
        match self {
            TickOutcome::Moved(p) | TickOutcome::Arrived(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    state: ScrollState,
    target: Option<f64>,
    last_frame_ms: Option<f64>,
    config: AnimationConfig,
}

impl ScrollAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            state: ScrollState::default(),
            target: None,
            last_frame_ms: None,
            config,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn target(&self) -> Option<f64> {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    /// Monotonic floor: the last committed scroll position.
    pub fn floor(&self) -> f64 {
        self.state.last_scroll_position
    }

    /// Set (or replace) the target. Returns `true` when this call moved the
    /// animator from idle to animating, i.e. the caller must schedule a tick.
    ///
    /// Targets at or behind the floor are refused; if one arrives while
    /// animating, the animation ends.
    pub fn set_target(&mut self, target: f64, max_scrollable: f64, now_ms: f64) -> bool {
        if max_scrollable <= 0.0 {
            debug!(max_scrollable, "animator: nothing to scroll");
            self.halt();
            return false;
        }

        let target = target.clamp(0.0, max_scrollable);
        if target <= self.state.last_scroll_position {
            debug!(
                target,
                floor = self.state.last_scroll_position,
                "animator: target behind floor, refusing"
            );
            self.halt();
            return false;
        }

        self.target = Some(target);
        if self.state.is_animating {
            return false;
        }
        self.state.is_animating = true;
        self.last_frame_ms = Some(now_ms);
        true
    }

    /// Advance one frame at `now_ms`.
    ///
    /// `actual_scroll_top` is the host's current offset; if the host is
    /// already ahead of the floor (manual scroll), the animation continues
    /// from there.
    pub fn tick(&mut self, now_ms: f64, actual_scroll_top: f64, max_scrollable: f64) -> TickOutcome {
        if !self.state.is_animating {
            return TickOutcome::Idle;
        }
        let Some(target) = self.target else {
            self.halt();
            return TickOutcome::Halted;
        };
        if max_scrollable <= 0.0 {
            self.halt();
            return TickOutcome::Halted;
        }

        let elapsed = self.last_frame_ms.map_or(0.0, |last| now_ms - last);
        let delta_ms = elapsed.clamp(0.0, self.config.max_frame_ms);
        self.last_frame_ms = Some(now_ms);

        let floor = self.state.last_scroll_position;
        let current = actual_scroll_top.max(floor);
        let distance = target - current;
        if distance <= 0.0 {
            self.halt();
            return TickOutcome::Halted;
        }
        if delta_ms <= 0.0 {
            return TickOutcome::Waiting;
        }

        let step = self.speed(distance) * (delta_ms / self.config.reference_frame_ms);
        let position = (current + step).min(target).min(max_scrollable).max(floor);
        self.state.last_scroll_position = position;

        trace!(position, target, distance, delta_ms, "animator: tick");

        if (target - position).abs() < self.config.stop_tolerance_px {
            self.halt();
            return TickOutcome::Arrived(position);
        }
        TickOutcome::Moved(position)
    }

    /// Pixels per reference frame at `distance` from the target.
    fn speed(&self, distance: f64) -> f64 {
        let c = &self.config;
        if distance <= c.close_distance_px {
            return c.baseline_speed;
        }
        let factor = ((distance - c.close_distance_px) / c.ramp_distance_px).min(1.0);
        c.baseline_speed + (c.max_speed - c.baseline_speed) * factor
    }

    fn halt(&mut self) {
        self.state.is_animating = false;
        self.target = None;
        self.last_frame_ms = None;
    }

    /// Cancel any animation and start over from `position`.
    pub fn reset(&mut self, position: f64) {
        self.halt();
        self.state.last_scroll_position = position.max(0.0);
    }
}
