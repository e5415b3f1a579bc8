// src/report/mod.rs
//! Observability side channel.
//!
//! Every operation reports its terminal outcome exactly once, after the result
//! is computed. Reporters are fire-and-forget: they never fail and never
//! change what the caller receives.

pub mod webhook;

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::Level;

use crate::error::PipelineError;

pub use webhook::WebhookReporter;

pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str, context: Value);
}

/// Writes reports to `tracing` under the `report` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, message: &str, context: Value) {
        match level {
            Level::ERROR => tracing::error!(target: "report", %context, "{message}"),
            Level::WARN => tracing::warn!(target: "report", %context, "{message}"),
            Level::INFO => tracing::info!(target: "report", %context, "{message}"),
            _ => tracing::debug!(target: "report", %context, "{message}"),
        }
    }
}

/// Fan a report out to several reporters.
#[derive(Clone, Default)]
pub struct ReporterMux {
    sinks: Vec<Arc<dyn Reporter>>,
}

impl ReporterMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Reporter>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Reporter for ReporterMux {
    fn report(&self, level: Level, message: &str, context: Value) {
        for sink in &self.sinks {
            sink.report(level, message, context.clone());
        }
    }
}

/// Report the outcome of `operation` and hand the result back untouched.
pub fn report_outcome<T>(
    reporter: &dyn Reporter,
    operation: &'static str,
    subject: Option<&str>,
    result: Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    match &result {
        Ok(_) => reporter.report(
            Level::INFO,
            &format!("Request handled by {operation}"),
            json!({ "operation": operation, "url": subject, "status": "success" }),
        ),
        Err(e) => report_failure(reporter, operation, subject, e),
    }
    result
}

/// Report a failed `operation`. Also used for requests rejected before they
/// reach a pipeline component.
pub fn report_failure(
    reporter: &dyn Reporter,
    operation: &'static str,
    subject: Option<&str>,
    error: &PipelineError,
) {
    metrics::counter!("pipeline_errors_total", "operation" => operation, "kind" => error.kind())
        .increment(1);
    reporter.report(
        Level::ERROR,
        &format!("Request handled by {operation}"),
        json!({
            "operation": operation,
            "url": subject,
            "status": "error",
            "kind": error.kind(),
            "error": error.to_string(),
        }),
    );
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Captures reports for assertions.
    #[derive(Default)]
    pub struct CaptureReporter {
        pub entries: Mutex<Vec<(Level, String, Value)>>,
    }

    impl Reporter for CaptureReporter {
        fn report(&self, level: Level, message: &str, context: Value) {
            self.entries
                .lock()
                .unwrap()
                .push((level, message.to_string(), context));
        }
    }
}
