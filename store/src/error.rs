//! Error type shared by every store implementation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Record is missing or belongs to another owner.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("conflict: {0}")]
    Conflict(String),

    /// A writer panicked while holding the table lock.
    #[error("store lock poisoned")]
    Poisoned,

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
