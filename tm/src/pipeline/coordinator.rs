//! Pipeline coordinator
//!
//! Drives the fixed stage graph for one trip request. One inbound request
//! is one logical unit of work: the fan-out runs its three branches as
//! concurrent tasks and joins on all of them, converting any branch
//! failure to an empty stage result at the boundary. Budgeting and
//! assembly run strictly after the join. There is no cancellation
//! propagation - an abandoned caller leaves in-flight stage work running
//! to completion.

use std::sync::Arc;

use chrono::Utc;
use eyre::Result;
use tracing::{info, warn};

use crate::domain::{StageKind, StageOutput, TripPlan, TripRequest};
use crate::llm::{GenerationClient, GenerationError, RetryPolicy};
use crate::profile::{TravelerProfile, dietary_preference};
use crate::prompts::PromptLoader;

use super::context::StageContext;
use super::transport::TransportOutput;
use super::{activities, assembly, budget, dining, lodging, transport};

/// The stage pipeline for one generation service
pub struct Pipeline {
    llm: Arc<dyn GenerationClient>,
    retry: RetryPolicy,
    prompts: PromptLoader,
}

impl Pipeline {
    pub fn new(llm: Arc<dyn GenerationClient>, retry: RetryPolicy, prompts: PromptLoader) -> Self {
        Self { llm, retry, prompts }
    }

    pub(crate) fn prompts(&self) -> &PromptLoader {
        &self.prompts
    }

    /// One generation-service call under the retry policy
    pub(crate) async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.retry.run(|| self.llm.generate(prompt)).await
    }

    /// Run the full pipeline for a resolved request
    pub async fn run(&self, request: &TripRequest) -> Result<TripPlan> {
        self.run_with_profile(request, None).await
    }

    /// Run the full pipeline with an optional traveler profile
    ///
    /// The profile contributes dietary preferences to the dining and
    /// assembly prompts; terms stated in the trip prompt itself override
    /// the stored profile.
    pub async fn run_with_profile(
        &self,
        request: &TripRequest,
        profile: Option<&TravelerProfile>,
    ) -> Result<TripPlan> {
        info!(owner = %request.owner, duration_days = request.duration_days, "pipeline run started");

        let lodging = lodging::run(self, request).await?;
        let ctx = StageContext::new().with_lodging(lodging);

        let selected = ctx.selected_lodging(request).cloned();
        let dietary = dietary_preference(&request.prompt, profile);

        // Fan-out: three independent branches, joined on all three. A
        // failing branch degrades to an empty result; siblings keep going.
        let (dining_out, transport_out, activities_out) = tokio::join!(
            async {
                match dining::run(self, request, selected.as_ref(), dietary.as_deref()).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(stage = "dining", error = %e, "fan-out branch failed, continuing with empty result");
                        StageOutput::empty(StageKind::Dining)
                    }
                }
            },
            async {
                match transport::run(self, request, selected.as_ref()).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(stage = "transportation", error = %e, "fan-out branch failed, continuing with empty result");
                        TransportOutput::empty()
                    }
                }
            },
            async {
                match activities::run(self, request, selected.as_ref()).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(stage = "activities", error = %e, "fan-out branch failed, continuing with empty result");
                        StageOutput::empty(StageKind::Activities)
                    }
                }
            },
        );

        let ctx = ctx
            .with_dining(dining_out)
            .with_transport(transport_out)
            .with_activities(activities_out);

        let budget = budget::run(request, &ctx);
        let ctx = ctx.with_budget(budget);

        let itinerary = assembly::run(self, request, &ctx, dietary.as_deref()).await;

        let plan = self.assemble_plan(request, ctx, itinerary);
        info!(owner = %request.owner, "pipeline run finished");
        Ok(plan)
    }

    /// Re-run itinerary assembly and budgeting over an updated context,
    /// for follow-up modifications that replaced one stage's output
    pub async fn reassemble(&self, request: &TripRequest, ctx: StageContext) -> TripPlan {
        let budget = budget::run(request, &ctx);
        let ctx = ctx.with_budget(budget);
        let itinerary = assembly::run(self, request, &ctx, None).await;
        self.assemble_plan(request, ctx, itinerary)
    }

    fn assemble_plan(
        &self,
        request: &TripRequest,
        ctx: StageContext,
        itinerary: Vec<crate::domain::DayItinerary>,
    ) -> TripPlan {
        let selected_lodging = ctx.selected_lodging(request).cloned();
        let (transportation, airport_transfers) = ctx
            .transport
            .as_ref()
            .map(|t| (t.output.records.clone(), t.airport_transfers.clone()))
            .unwrap_or_default();

        TripPlan {
            request: request.clone(),
            lodging: ctx.lodging.map(|o| o.records).unwrap_or_default(),
            selected_lodging,
            dining: ctx.dining.map(|o| o.records).unwrap_or_default(),
            transportation,
            airport_transfers,
            activities: ctx.activities.map(|o| o.records).unwrap_or_default(),
            itinerary,
            budget: ctx.budget.unwrap_or_default(),
            created_at: Utc::now(),
            status: "draft".to_string(),
        }
    }
}
