//! In-memory VersionStore adapter

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::store::{StoreResult, VersionInfo, VersionStore};

struct StoredVersion {
    info: VersionInfo,
    plan: Value,
}

/// In-process version store for tests and ephemeral runs
///
/// Versions are assigned under the map lock, so the atomicity contract
/// holds trivially.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<(String, String), Vec<StoredVersion>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionStore for MemoryStore {
    fn get(&self, owner: &str, trip: &str, version: Option<u32>) -> StoreResult<Option<Value>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let Some(versions) = inner.get(&(owner.to_string(), trip.to_string())) else {
            return Ok(None);
        };

        let found = match version {
            None => versions.last(),
            Some(v) => versions.iter().find(|s| s.info.version == v),
        };
        Ok(found.map(|s| s.plan.clone()))
    }

    fn append(&self, owner: &str, trip: &str, plan: &Value, modified_by: &str) -> StoreResult<u32> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let versions = inner
            .entry((owner.to_string(), trip.to_string()))
            .or_default();

        let next = versions.last().map(|s| s.info.version).unwrap_or(0) + 1;
        versions.push(StoredVersion {
            info: VersionInfo {
                version: next,
                modified_by: modified_by.to_string(),
                created_at: Utc::now(),
            },
            plan: plan.clone(),
        });
        debug!(%owner, %trip, version = next, "MemoryStore::append: stored");
        Ok(next)
    }

    fn list_versions(&self, owner: &str, trip: &str) -> StoreResult<Vec<VersionInfo>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .get(&(owner.to_string(), trip.to_string()))
            .map(|versions| versions.iter().map(|s| s.info.clone()).collect())
            .unwrap_or_default())
    }
}
