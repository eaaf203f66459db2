//! Tracing setup and structured run logging.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vidverify_models::RunId;

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber.
///
/// Logs go to stderr so stdout carries only the human summary.
/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the
/// default `warn` filter.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger that tags every event of one analysis run.
///
/// Each event carries the run ID and the pipeline step (`upload`,
/// `analysis`, `evidence`, `cleanup`), so a JSON log of a run can be
/// filtered by either field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogger {
    run_id: String,
    step: String,
}

impl RunLogger {
    /// Create a logger for `step` of the run `run_id`.
    pub fn new(run_id: &RunId, step: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            step: step.to_string(),
        }
    }

    /// Same run, different step.
    pub fn for_step(&self, step: &str) -> Self {
        Self {
            run_id: self.run_id.clone(),
            step: step.to_string(),
        }
    }

    /// Log the start of the step.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            step = %self.step,
            "Step started: {}", message
        );
    }

    /// Log an intermediate event, such as an upload beginning.
    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            step = %self.step,
            "Step progress: {}", message
        );
    }

    /// Log a problem the run recovers from, such as a missing evidence
    /// still or a failed remote delete.
    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            step = %self.step,
            "Step warning: {}", message
        );
    }

    /// Log the error that ends the run.
    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            step = %self.step,
            "Step error: {}", message
        );
    }

    /// Log the successful end of the step.
    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            step = %self.step,
            "Step completed: {}", message
        );
    }

    /// Span carrying the run ID and step for everything logged inside it.
    ///
    /// The pipeline instruments the whole run with this span, so events
    /// from the media and Gemini crates are tagged as well.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, step = %self.step)
    }
}
