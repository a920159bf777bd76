//! Scroll control: where the viewport should go and how it gets there.
//!
//! - `commit`: conservative vs. aggressive anchoring
//! - `target`: line index + geometry to a pixel offset
//! - `animator`: per-tick, never-backward movement toward the offset
//! - `scheduler`: the tick source (frame clock, virtual clock, timer)

pub mod animator;
pub mod commit;
pub mod scheduler;
pub mod target;

pub use animator::{ScrollAnimator, TickOutcome};
pub use commit::{is_commit, progress_fraction};
pub use scheduler::{IntervalScheduler, Scheduler, TickHandle, VirtualScheduler};
pub use target::target_offset;
