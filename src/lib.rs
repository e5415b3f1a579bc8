// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod analysis;
pub mod api;
pub mod bus;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod store;
pub mod timeout;
pub mod workers;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::error::{PipelineError, PipelineResult};
pub use crate::model::{Article, NewsSource};
pub use crate::pipeline::Pipeline;

use axum::Router;

/// Build the full HTTP app (pipeline + workers + routes) from `AppConfig::load_default()`.
///
/// Workers are spawned onto the current tokio runtime. `/metrics` is not
/// mounted here; the binary adds it after installing the recorder.
pub fn app() -> anyhow::Result<(Router, Pipeline)> {
    let cfg = AppConfig::load_default()?;
    let pipeline = Pipeline::from_config(cfg)?;
    let _workers = pipeline.spawn_workers();
    let router = api::router(api::AppState::new(pipeline.clone()));
    Ok((router, pipeline))
}
