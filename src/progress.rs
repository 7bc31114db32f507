//! Terminal progress for long pipeline stages.
//!
//! Interactive runs draw an indicatif bar. With `--log-only` the bar is
//! hidden and stages report through `log` at a fixed row interval instead.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

const BAR_TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})";

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Seconds below a minute, minutes above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Bar over `rows` items for one stage; hidden in log-only mode.
pub fn stage_bar(rows: u64, stage: &str) -> ProgressBar {
    let pb = ProgressBar::new(rows);
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(stage.to_string());
    pb
}

/// Whether row `done` of `rows` should be reported in log-only mode.
fn should_report(done: u64, rows: u64, every: u64) -> bool {
    rows > 0 && every > 0 && (done % every == 0 || done == rows)
}

/// Log-only replacement for the bar: one line every `every` rows and at the end.
pub fn report_rows(stage: &str, done: u64, rows: u64, every: u64) {
    if is_log_only() && should_report(done, rows, every) {
        info!(
            "[{}] {}/{} rows ({:.1}%)",
            stage,
            done,
            rows,
            100.0 * done as f64 / rows as f64
        );
    }
}
