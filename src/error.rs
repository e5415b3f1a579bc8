// src/error.rs
//! Pipeline error taxonomy.
//!
//! Adapter errors keep their own enums (`StoreError`, `PublishError`,
//! `AnalysisError`) and convert into `PipelineError` with `?`.

use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::bus::PublishError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl PipelineError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store",
            Self::Publish(_) => "publish",
            Self::Analysis(_) => "analysis",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
