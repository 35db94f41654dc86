//! Traveler profiles
//!
//! A read-through cache over a profile store, keyed by owner id, with
//! explicit invalidation on write. Profiles contribute dietary and
//! accessibility context to prompts; terms stated in the trip prompt
//! itself always override the stored profile for that run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stored traveler preferences
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TravelerProfile {
    pub owner: String,
    pub home_city: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub accessibility_needs: Vec<String>,
    pub default_budget: Option<f64>,
}

/// Backing storage for traveler profiles
pub trait ProfileStore: Send + Sync {
    fn load(&self, owner: &str) -> Result<Option<TravelerProfile>>;
    fn save(&self, profile: &TravelerProfile) -> Result<()>;
}

/// In-process profile store
#[derive(Default)]
pub struct MemoryProfileStore {
    inner: Mutex<HashMap<String, TravelerProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, owner: &str) -> Result<Option<TravelerProfile>> {
        Ok(self.inner.lock().expect("profile mutex poisoned").get(owner).cloned())
    }

    fn save(&self, profile: &TravelerProfile) -> Result<()> {
        self.inner
            .lock()
            .expect("profile mutex poisoned")
            .insert(profile.owner.clone(), profile.clone());
        Ok(())
    }
}

/// Read-through cache in front of a [`ProfileStore`]
///
/// Reads hit the cache first and fall through to the store; writes go to
/// the store and then refresh the cached entry, so a stale profile is
/// never served after its own update.
pub struct ProfileCache {
    store: Arc<dyn ProfileStore>,
    cache: RwLock<HashMap<String, TravelerProfile>>,
}

impl ProfileCache {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, owner: &str) -> Result<Option<TravelerProfile>> {
        if let Some(hit) = self.cache.read().expect("cache lock poisoned").get(owner) {
            debug!(%owner, "ProfileCache::get: hit");
            return Ok(Some(hit.clone()));
        }

        let loaded = self.store.load(owner)?;
        if let Some(profile) = &loaded {
            self.cache
                .write()
                .expect("cache lock poisoned")
                .insert(owner.to_string(), profile.clone());
        }
        Ok(loaded)
    }

    pub fn put(&self, profile: TravelerProfile) -> Result<()> {
        self.store.save(&profile)?;
        self.cache
            .write()
            .expect("cache lock poisoned")
            .insert(profile.owner.clone(), profile);
        Ok(())
    }

    pub fn invalidate(&self, owner: &str) {
        self.cache.write().expect("cache lock poisoned").remove(owner);
    }
}

/// Dietary context for prompts: prompt-stated terms override the profile
pub fn dietary_preference(prompt: &str, profile: Option<&TravelerProfile>) -> Option<String> {
    let lower = prompt.to_lowercase();
    if lower.contains("vegan") {
        return Some("vegan".to_string());
    }
    if lower.contains("vegetarian") {
        return Some("vegetarian".to_string());
    }
    if lower.contains("gluten") {
        return Some("gluten-free".to_string());
    }

    profile
        .filter(|p| !p.dietary_preferences.is_empty())
        .map(|p| p.dietary_preferences.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(owner: &str, dietary: &[&str]) -> TravelerProfile {
        TravelerProfile {
            owner: owner.to_string(),
            dietary_preferences: dietary.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_read_through_and_refresh_on_write() {
        let store = Arc::new(MemoryProfileStore::new());
        store.save(&profile("ada", &["vegetarian"])).unwrap();

        let cache = ProfileCache::new(store.clone());
        assert_eq!(cache.get("ada").unwrap().unwrap().dietary_preferences, vec!["vegetarian"]);

        // Write through the cache; subsequent reads see the new value
        cache.put(profile("ada", &["vegan"])).unwrap();
        assert_eq!(cache.get("ada").unwrap().unwrap().dietary_preferences, vec!["vegan"]);
        assert_eq!(store.load("ada").unwrap().unwrap().dietary_preferences, vec!["vegan"]);
    }

    #[test]
    fn test_invalidate_forces_store_read() {
        let store = Arc::new(MemoryProfileStore::new());
        store.save(&profile("ada", &["vegetarian"])).unwrap();

        let cache = ProfileCache::new(store.clone());
        cache.get("ada").unwrap();

        // Mutate behind the cache's back, then invalidate
        store.save(&profile("ada", &["halal"])).unwrap();
        cache.invalidate("ada");
        assert_eq!(cache.get("ada").unwrap().unwrap().dietary_preferences, vec!["halal"]);
    }

    #[test]
    fn test_unknown_owner_is_none() {
        let cache = ProfileCache::new(Arc::new(MemoryProfileStore::new()));
        assert!(cache.get("nobody").unwrap().is_none());
    }

    #[test]
    fn test_prompt_overrides_profile_dietary() {
        let stored = profile("ada", &["vegetarian"]);
        assert_eq!(
            dietary_preference("a vegan food tour please", Some(&stored)),
            Some("vegan".to_string())
        );
        assert_eq!(
            dietary_preference("a quiet week away", Some(&stored)),
            Some("vegetarian".to_string())
        );
        assert_eq!(dietary_preference("a quiet week away", None), None);
    }
}
