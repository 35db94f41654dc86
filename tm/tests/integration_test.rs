//! Integration tests for TripMind
//!
//! These tests drive the pipeline and follow-up engine end-to-end against
//! a scripted generation service and real version stores.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use planstore::{MemoryStore, SqliteStore, VersionStore};
use tripmind::domain::{TransportPriority, TripRequest};
use tripmind::followup::{FollowUpEngine, FollowUpKind};
use tripmind::llm::{GenerationClient, GenerationError, RetryPolicy};
use tripmind::pipeline::Pipeline;
use tripmind::prompts::PromptLoader;

// =============================================================================
// Scripted generation service
// =============================================================================

/// Routes replies by prompt content so concurrent fan-out branches stay
/// deterministic. A marker mapped to None fails permanently.
struct ScriptedService {
    routes: Vec<(&'static str, Option<&'static str>)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn new(routes: Vec<(&'static str, Option<&'static str>)>) -> Self {
        Self {
            routes,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GenerationClient for ScriptedService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        for (marker, reply) in &self.routes {
            if prompt.contains(marker) {
                return match reply {
                    Some(text) => Ok(text.to_string()),
                    None => Err(GenerationError::InvalidResponse("scripted failure".to_string())),
                };
            }
        }
        Err(GenerationError::InvalidResponse(format!(
            "no scripted reply for prompt: {}",
            &prompt[..prompt.len().min(60)]
        )))
    }
}

const LODGING_REPLY: &str = r#"```json
{"accommodations": [
  {"title": "Harbor Inn", "address": "5 Dock Rd, Portland", "price_per_night": 140,
   "total_price": 420, "amenities": ["Wi-Fi"], "rating": 4.4},
  {"title": "Pine Lodge", "address": "9 Forest Way, Portland", "price_per_night": 90, "total_price": 270}
]}
```"#;

const DINING_REPLY: &str = r#"{"restaurants": [
  {"name": "Fog Kitchen", "cuisine": "Seafood", "price_range": "$$", "address": "1 Pier St"},
  {"name": "Green Fork", "cuisine": "Vegetarian", "price_range": "$", "address": "2 Elm St"}
]}"#;

const ACTIVITIES_REPLY: &str = r#"{"experiences": [
  {"name": "Coastal hike", "category": "hiking"},
  {"name": "Lighthouse tour", "category": "culture", "price": 25}
]}"#;

const TRAIN_REPLY: &str = r#"{"trains": [
  {"operator": "Amtrak", "price": 120, "price_per_person": 60, "duration": "3h 30m"},
  {"operator": "Coastal Rail", "price": 90, "price_per_person": 45, "duration": "4h 10m", "transfers": 1}
]}"#;

const ITINERARY_REPLY: &str = r#"```json
{"itinerary": [
  {"day": 1, "activities": [{"time": "10:00 AM", "title": "Coastal hike"}],
   "meals": [{"time": "7:00 PM", "type": "dinner", "restaurant": "Fog Kitchen"}]},
  {"day": 2, "activities": [{"time": "9:00 AM", "title": "Lighthouse tour"}], "meals": []},
  {"day": 3, "activities": [], "meals": [], "notes": "Departure day"}
]}
```"#;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base: Duration::from_millis(1),
        multiplier: 2,
        cap: Duration::from_millis(2),
        jitter: Duration::from_millis(1),
    }
}

fn pipeline_with(routes: Vec<(&'static str, Option<&'static str>)>) -> Pipeline {
    Pipeline::new(
        Arc::new(ScriptedService::new(routes)),
        fast_retry(),
        PromptLoader::embedded_only(),
    )
}

fn request() -> TripRequest {
    let mut req = TripRequest::from_prompt("A 3-day trip from Boston to Portland for 2 people by train", "ada");
    req.duration_days = 3;
    req.priority = TransportPriority::Cheapest;
    req
}

fn all_routes() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("accommodations", Some(LODGING_REPLY)),
        ("restaurants", Some(DINING_REPLY)),
        ("experiences", Some(ACTIVITIES_REPLY)),
        ("trains", Some(TRAIN_REPLY)),
        ("itinerary", Some(ITINERARY_REPLY)),
    ]
}

// =============================================================================
// Pipeline end-to-end
// =============================================================================

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let plan = pipeline_with(all_routes()).run(&request()).await.unwrap();

    assert_eq!(plan.lodging.len(), 2);
    assert_eq!(plan.dining.len(), 2);
    assert_eq!(plan.activities.len(), 2);
    assert_eq!(plan.itinerary.len(), 3);

    // Cheapest priority: the $45/person option wins
    let recommended: Vec<_> = plan.transportation.iter().filter(|c| c.recommended).collect();
    assert_eq!(recommended.len(), 1);
    assert_eq!(recommended[0].provider, "Coastal Rail");

    // Budget invariant: components plus buffer equal the total
    let b = &plan.budget;
    let subtotal = b.lodging + b.transportation + b.activities + b.meals;
    assert!((b.total - (subtotal + b.miscellaneous)).abs() < 0.01);
    assert!(b.total > 0.0);
}

#[tokio::test]
async fn test_transport_failure_still_yields_full_plan() {
    let mut routes = all_routes();
    routes[3] = ("trains", None);

    let plan = pipeline_with(routes).run(&request()).await.unwrap();

    assert!(plan.transportation.is_empty());
    assert!(!plan.lodging.is_empty());
    assert!(!plan.dining.is_empty());
    assert!(!plan.activities.is_empty());
    assert_eq!(plan.itinerary.len(), 3);
}

// =============================================================================
// Follow-up versioning
// =============================================================================

async fn seeded(store: Arc<dyn VersionStore>, routes: Vec<(&'static str, Option<&'static str>)>) -> FollowUpEngine {
    let pipeline = Arc::new(pipeline_with(all_routes()));
    let plan = pipeline.run(&request()).await.unwrap();
    store
        .append("ada", "trip-1", &serde_json::to_value(&plan).unwrap(), "ada")
        .unwrap();

    FollowUpEngine::new(Arc::new(pipeline_with(routes)), store)
}

#[tokio::test]
async fn test_modify_follow_ups_version_consecutively() {
    let store: Arc<dyn VersionStore> = Arc::new(MemoryStore::new());
    let engine = seeded(store.clone(), all_routes()).await;

    let outcome = engine
        .handle("ada", "trip-1", "add more restaurants", None)
        .await
        .unwrap();
    assert_eq!(outcome.kind, FollowUpKind::Modification);
    assert_eq!(outcome.version, Some(2));

    let outcome = engine
        .handle("ada", "trip-1", "change my hotel", Some("grace"))
        .await
        .unwrap();
    assert_eq!(outcome.version, Some(3));

    let versions = store.list_versions("ada", "trip-1").unwrap();
    assert_eq!(
        versions.iter().map(|v| v.version).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(versions[2].modified_by, "grace");
}

#[tokio::test]
async fn test_query_and_chat_never_version() {
    let store: Arc<dyn VersionStore> = Arc::new(MemoryStore::new());
    let engine = seeded(store.clone(), all_routes()).await;

    let outcome = engine
        .handle("ada", "trip-1", "What restaurants are nearby?", None)
        .await
        .unwrap();
    assert_eq!(outcome.kind, FollowUpKind::Query);
    assert!(outcome.answer.unwrap().contains("Fog Kitchen"));

    let outcome = engine.handle("ada", "trip-1", "thanks!", None).await.unwrap();
    assert_eq!(outcome.kind, FollowUpKind::Chat);

    assert_eq!(store.list_versions("ada", "trip-1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_follow_up_against_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn VersionStore> = Arc::new(SqliteStore::open(dir.path().join("plans.db")).unwrap());
    let engine = seeded(store.clone(), all_routes()).await;

    let outcome = engine
        .handle("ada", "trip-1", "add more hiking activities", None)
        .await
        .unwrap();
    assert_eq!(outcome.version, Some(2));

    // The stored latest version reflects the modification
    let latest = store.get("ada", "trip-1", None).unwrap().unwrap();
    let activities = latest["activities"].as_array().unwrap();
    assert!(!activities.is_empty());

    // Version 1 is still intact
    assert!(store.get("ada", "trip-1", Some(1)).unwrap().is_some());
}

#[tokio::test]
async fn test_unproductive_modify_leaves_store_untouched() {
    let store: Arc<dyn VersionStore> = Arc::new(MemoryStore::new());
    let routes = vec![("restaurants", Some("nothing useful in this reply"))];
    let engine = seeded(store.clone(), routes).await;

    let outcome = engine
        .handle("ada", "trip-1", "add more restaurants", None)
        .await
        .unwrap();

    assert!(outcome.version.is_none());
    assert!(outcome.message.contains("more specific"));
    assert_eq!(store.list_versions("ada", "trip-1").unwrap().len(), 1);
}
