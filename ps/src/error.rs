//! Store error types

use thiserror::Error;

/// Errors surfaced by a [`crate::VersionStore`] adapter
#[derive(Debug, Error)]
pub enum StoreError {
    /// The version written would duplicate or precede an existing version.
    /// This indicates a persistence-layer bug and is a hard failure.
    #[error("version conflict for {owner}/{trip}: version {version} already exists")]
    VersionConflict {
        owner: String,
        trip: String,
        version: u32,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("stored plan is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error is a version conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}
