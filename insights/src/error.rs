//! Failures surfaced by the profile and report pipelines.
//!
//! Every variant aborts the current request. Nothing here is retried.

use store::{ProjectId, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    /// Missing, or owned by somebody else.
    #[error("{0} not found")]
    NotFound(String),

    /// No experiment under the project has a single metric sample.
    #[error("nothing to report for project {project}")]
    NoData { project: ProjectId },

    #[error("render failure: {0}")]
    RenderFailure(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InsightsError {
    pub fn render<E: std::fmt::Display>(err: E) -> Self {
        Self::RenderFailure(err.to_string())
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

impl From<StoreError> for InsightsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id}")),
            other => Self::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;
