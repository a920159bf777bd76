//! Tick sources for the Scroll Animator.
//!
//! The animator asks for one tick at a time; after each tick the session asks
//! again while the animation is still running. A `Scheduler` only tracks the
//! pending request. Who fires it (a frame clock, a test loop, a timer thread)
//! is up to the owner.

use std::time::{Duration, Instant};

/// Identifies a pending tick request so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

pub trait Scheduler {
    /// Request a tick. While one is already pending, its handle is returned.
    fn schedule(&mut self) -> TickHandle;

    /// Drop the request identified by `handle`. Unknown or already fired
    /// handles are ignored.
    fn cancel(&mut self, handle: TickHandle);

    fn is_pending(&self) -> bool;
}

// ============================================================================
// Virtual clock
// ============================================================================

/// Deterministic frame clock. Time only moves when the owner says so.
#[derive(Debug, Clone)]
pub struct VirtualScheduler {
    now_ms: f64,
    frame_ms: f64,
    pending: Option<TickHandle>,
    next_id: u64,
}

impl VirtualScheduler {
    pub fn new(start_ms: f64, frame_ms: f64) -> Self {
        Self {
            now_ms: start_ms,
            frame_ms,
            pending: None,
            next_id: 0,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn frame_ms(&self) -> f64 {
        self.frame_ms
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Advance one frame and consume the pending request. Returns the frame
    /// time when a tick is due, `None` when nothing was scheduled.
    pub fn next_frame(&mut self) -> Option<f64> {
        self.now_ms += self.frame_ms;
        self.pending.take().map(|_| self.now_ms)
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self) -> TickHandle {
        if let Some(handle) = self.pending {
            return handle;
        }
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

// ============================================================================
// Fixed-interval timer
// ============================================================================

/// Wall-clock scheduler for non-UI hosts: a pending request becomes due one
/// interval after it was made.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    pending: Option<(TickHandle, Instant)>,
    next_id: u64,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            next_id: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the pending tick is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, due)| due)
    }

    /// Consume the pending request if it is due at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some((_, due)) if due <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule(&mut self) -> TickHandle {
        if let Some((handle, _)) = self.pending {
            return handle;
        }
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some((handle, Instant::now() + self.interval));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if matches!(self.pending, Some((pending, _)) if pending == handle) {
            self.pending = None;
        }
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_schedule_is_idempotent_while_pending() {
        let mut scheduler = VirtualScheduler::new(0.0, 16.0);
        let a = scheduler.schedule();
        let b = scheduler.schedule();
        assert_eq!(a, b);
        assert_eq!(scheduler.next_frame(), Some(16.0));
        assert_eq!(scheduler.next_frame(), None);
        assert_eq!(scheduler.now_ms(), 32.0);
        assert_ne!(scheduler.schedule(), a);
    }

    #[test]
    fn test_virtual_cancel() {
        let mut scheduler = VirtualScheduler::new(0.0, 16.0);
        let handle = scheduler.schedule();
        scheduler.cancel(handle);
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.next_frame(), None);
    }

    #[test]
    fn test_stale_cancel_is_ignored() {
        let mut scheduler = VirtualScheduler::new(0.0, 16.0);
        let first = scheduler.schedule();
        scheduler.next_frame();
        let second = scheduler.schedule();
        scheduler.cancel(first);
        assert!(scheduler.is_pending());
        scheduler.cancel(second);
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn test_advance_to_never_goes_back() {
        let mut scheduler = VirtualScheduler::new(100.0, 16.0);
        scheduler.advance_to(50.0);
        assert_eq!(scheduler.now_ms(), 100.0);
        scheduler.advance_to(400.0);
        assert_eq!(scheduler.now_ms(), 400.0);
    }

    #[test]
    fn test_interval_fires_only_when_due() {
        let mut scheduler = IntervalScheduler::new(Duration::from_millis(16));
        let handle = scheduler.schedule();
        let due = scheduler.deadline().unwrap();
        assert!(!scheduler.fire(due - Duration::from_millis(1)));
        assert!(scheduler.fire(due));
        assert!(!scheduler.is_pending());
        scheduler.cancel(handle);
        assert_eq!(scheduler.deadline(), None);
    }
}
