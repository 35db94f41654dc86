//! VersionStore trait definition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Metadata for one stored plan version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Strictly increasing, 1-based version number
    pub version: u32,
    /// Identifier of the user who authored this version
    pub modified_by: String,
    /// When the version was appended
    pub created_at: DateTime<Utc>,
}

/// Append-only versioned storage for trip plans, keyed by (owner, trip)
///
/// Plans are stored as opaque JSON values; the engine owns the schema.
/// Implementations must assign version numbers atomically: two concurrent
/// `append` calls on the same key must observe consecutive versions, never
/// a duplicate or a gap. Versions are immutable once written.
pub trait VersionStore: Send + Sync {
    /// Fetch a plan. `version: None` returns the latest version; a specific
    /// version returns that snapshot. `Ok(None)` when the key or version
    /// does not exist.
    fn get(&self, owner: &str, trip: &str, version: Option<u32>) -> StoreResult<Option<Value>>;

    /// Append a new version and return its assigned version number.
    /// The first append for a key is version 1.
    fn append(&self, owner: &str, trip: &str, plan: &Value, modified_by: &str) -> StoreResult<u32>;

    /// List all versions for a key in ascending version order.
    /// An unknown key yields an empty list.
    fn list_versions(&self, owner: &str, trip: &str) -> StoreResult<Vec<VersionInfo>>;
}
