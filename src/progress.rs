//! Progress reporting for batch replays.
//!
//! Interactive runs get an indicatif bar; `--log-only` hides it and reports
//! every few scripts through the log instead, which reads better under `tail`.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Seconds under a minute, minutes above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Shared across rayon workers; each finished script calls `script_done`.
pub struct ReplayProgress {
    bar: ProgressBar,
    done: AtomicU64,
    total: u64,
    log_every: u64,
}

impl ReplayProgress {
    pub fn new(total: u64, log_every: u64) -> Self {
        let bar = ProgressBar::new(total);
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message("Replaying scripts");
        Self {
            bar,
            done: AtomicU64::new(0),
            total,
            log_every: log_every.max(1),
        }
    }

    pub fn script_done(&self, script: &str, final_line: usize) {
        self.bar.inc(1);
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if is_log_only() && (done % self.log_every == 0 || done == self.total) {
            let pct = 100.0 * done as f64 / self.total.max(1) as f64;
            info!(script, final_line, done, total = self.total, "replay {:.1}%", pct);
        }
    }

    pub fn finish(&self) {
        let done = self.done.load(Ordering::Relaxed);
        self.bar
            .finish_with_message(format!("Replayed {} of {} scripts", done, self.total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1_500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_counts_finished_scripts() {
        let progress = ReplayProgress::new(3, 0);
        progress.script_done("a.json", 4);
        progress.script_done("b.json", 7);
        assert_eq!(progress.done.load(Ordering::Relaxed), 2);
        assert_eq!(progress.log_every, 1);
        progress.finish();
    }
}
