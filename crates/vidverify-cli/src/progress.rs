//! Terminal progress indicators.
//!
//! Upload bars track real bytes sent. The analysis bar is simulated: the
//! remote call reports nothing until it returns, so the bar advances on a
//! fixed schedule and holds below 100% until the answer arrives.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::task::JoinHandle;

/// `(steps, delay per step)` for the simulated analysis bar.
pub const ANALYSIS_STAGES: [(u64, Duration); 3] = [
    (30, Duration::from_secs(2)),
    (40, Duration::from_secs(5)),
    (30, Duration::from_secs(3)),
];

/// Highest position the simulated bar reaches on its own.
pub const ANALYSIS_HOLD_AT: u64 = 99;

/// Byte-accurate upload bar.
pub fn upload_bar(total_bytes: u64) -> ProgressBar {
    let bar = ProgressBar::new(total_bytes);
    bar.set_style(
        ProgressStyle::with_template(
            "   {spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    bar
}

/// Spinner shown while the remote service processes a file.
pub fn processing_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("   {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Next position of the simulated bar.
pub fn next_position(current: u64) -> u64 {
    (current + 1).min(ANALYSIS_HOLD_AT)
}

/// Staged analysis bar driven by a background task.
pub struct SimulatedProgress {
    bar: ProgressBar,
    driver: JoinHandle<()>,
}

impl SimulatedProgress {
    /// Start advancing a 100-step bar. Must be called inside a Tokio runtime.
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("   {msg} [{bar:40.cyan/blue}] {percent}% | {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
        bar.set_message(message.to_string());

        let ticker = bar.clone();
        let driver = tokio::spawn(async move {
            for (steps, delay) in ANALYSIS_STAGES {
                for _ in 0..steps {
                    tokio::time::sleep(delay).await;
                    ticker.set_position(next_position(ticker.position()));
                }
            }
        });

        Self { bar, driver }
    }

    /// Stop the schedule and jump to 100%.
    pub fn finish(self) {
        self.driver.abort();
        self.bar.set_position(100);
        self.bar.finish();
    }
}

impl Drop for SimulatedProgress {
    fn drop(&mut self) {
        self.driver.abort();
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
