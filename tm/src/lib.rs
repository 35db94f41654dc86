//! TripMind - multi-stage trip planning orchestration engine
//!
//! TripMind plans multi-day trips by sequencing specialized generation
//! stages over one external text-generation service and assembling their
//! outputs into a versioned plan. The engine is the interesting part:
//!
//! - **Fixed-topology pipeline**: lodging, then a concurrent fan-out of
//!   dining/transportation/activities, then budgeting and itinerary
//!   assembly. Branch failures degrade, never abort.
//! - **Structured extraction**: an ordered fallback chain that turns
//!   free-form generation text into typed records and never raises.
//! - **Retry control**: rate-limit-class provider failures retried with
//!   exponential backoff; everything else propagates immediately.
//! - **Route selection**: mode choice by analysis or geography heuristics,
//!   candidate scoring under user priorities, exactly one recommendation.
//! - **Follow-ups**: a lexical intent classifier routes edits to exactly
//!   one stage re-run; queries and chat never mutate anything.
//! - **Versioning**: every successful run or modification appends an
//!   immutable plan version per (owner, trip) through the planstore crate.
//!
//! # Modules
//!
//! - [`domain`] - core data types
//! - [`llm`] - generation client, errors, retry controller
//! - [`extract`] - structured extraction engine
//! - [`routing`] - route analysis, scoring, airport transfers
//! - [`pipeline`] - stage coordinator and stages
//! - [`followup`] - intent classification and follow-up handling
//! - [`profile`] - traveler profile cache
//! - [`prompts`] - handlebars prompt templates

pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod followup;
pub mod llm;
pub mod pipeline;
pub mod profile;
pub mod prompts;
pub mod routing;

// Re-export commonly used types
pub use config::{Config, GenerationConfig, RetryConfig};
pub use domain::{
    ActivityOption, BudgetBreakdown, DayItinerary, DiningOption, GeoPoint, LodgingOption, StageKind, StageOutput,
    TransportCandidate, TransportMode, TransportPriority, TripPlan, TripRequest,
};
pub use followup::{Category, Classification, FollowUpAction, FollowUpEngine, FollowUpKind, FollowUpOutcome, Intent,
    classify};
pub use llm::{GenerationClient, GenerationError, RetryPolicy, create_client};
pub use pipeline::{Pipeline, StageContext, TransportOutput};
pub use profile::{MemoryProfileStore, ProfileCache, ProfileStore, TravelerProfile};
pub use prompts::PromptLoader;

// Re-export planstore types for convenience
pub use planstore::{MemoryStore, SqliteStore, StoreError, VersionInfo, VersionStore};
