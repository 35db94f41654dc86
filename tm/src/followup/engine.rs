//! Follow-up modification engine
//!
//! Routes a classified utterance against an existing plan. Queries and
//! chat never touch the store. A modification re-runs exactly one pipeline
//! stage with the current request and the existing lodging context; only
//! when the stage yields something new does assembly re-run over the
//! merged stage set and a new version get appended. A stage that comes
//! back empty leaves the plan untouched rather than discarding good prior
//! results.

use std::sync::Arc;

use eyre::{Result, WrapErr, eyre};
use planstore::VersionStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::TripPlan;
use crate::pipeline::{Pipeline, StageContext, activities, dining, lodging, transport};
use crate::profile::dietary_preference;

use super::classifier::{Category, Classification, FollowUpAction, Intent, classify};
use super::qa;

/// What kind of outcome a follow-up produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpKind {
    Modification,
    Query,
    Chat,
}

/// Result of handling one follow-up utterance
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpOutcome {
    #[serde(rename = "type")]
    pub kind: FollowUpKind,
    /// The updated plan, present only for applied modifications
    pub plan: Option<TripPlan>,
    /// Prose answer, present for queries and chat
    pub answer: Option<String>,
    pub message: String,
    /// Version appended to the store, when a modification was persisted
    pub version: Option<u32>,
}

const AMBIGUOUS_MESSAGE: &str = "I couldn't determine a specific change to make. Could you be more specific? \
     (e.g. 'add more restaurants' or 'change my hotel')";

/// Canned conversational replies for chat-intent utterances
pub fn chat_reply(utterance: &str) -> String {
    let lower = utterance.to_lowercase();
    if lower.contains("thank") {
        "You're welcome! Happy to help with your trip. Anything else you'd like to know or change?".to_string()
    } else if lower.contains("hello") || lower.contains("hi ") || lower.starts_with("hi") || lower.contains("hey") {
        "Hello! You can ask me questions about your itinerary or request changes to it.".to_string()
    } else if lower.contains("yes") || lower.contains("ok") || lower.contains("sure") {
        "Great! What would you like to do next - a question about the plan, or a change to it?".to_string()
    } else {
        "I'm here to help with your trip. Ask me about the itinerary, or tell me what to change.".to_string()
    }
}

/// Handles follow-up utterances against stored plans
pub struct FollowUpEngine {
    pipeline: Arc<Pipeline>,
    store: Arc<dyn VersionStore>,
}

impl FollowUpEngine {
    pub fn new(pipeline: Arc<Pipeline>, store: Arc<dyn VersionStore>) -> Self {
        Self { pipeline, store }
    }

    /// Handle one follow-up on the latest stored plan for (owner, trip)
    ///
    /// `modified_by` attributes a resulting version to a collaborator;
    /// it defaults to the owner.
    pub async fn handle(
        &self,
        owner: &str,
        trip: &str,
        utterance: &str,
        modified_by: Option<&str>,
    ) -> Result<FollowUpOutcome> {
        let value = self
            .store
            .get(owner, trip, None)
            .wrap_err("failed to load plan")?
            .ok_or_else(|| eyre!("no plan found for owner={owner} trip={trip}"))?;
        let plan: TripPlan = serde_json::from_value(value).wrap_err("stored plan is malformed")?;

        let classification = classify(utterance);
        info!(
            intent = ?classification.intent,
            category = ?classification.category,
            action = ?classification.action,
            "follow-up classified"
        );

        match classification.intent {
            Intent::Query => Ok(FollowUpOutcome {
                kind: FollowUpKind::Query,
                plan: None,
                answer: Some(qa::answer(utterance, &plan)),
                message: "Here's the information you requested.".to_string(),
                version: None,
            }),
            Intent::Chat => Ok(FollowUpOutcome {
                kind: FollowUpKind::Chat,
                plan: None,
                answer: Some(chat_reply(utterance)),
                message: String::new(),
                version: None,
            }),
            Intent::Modify => {
                self.modify(owner, trip, utterance, &classification, plan, modified_by)
                    .await
            }
        }
    }

    /// Apply a modification: re-run the one stage the category maps to
    async fn modify(
        &self,
        owner: &str,
        trip: &str,
        utterance: &str,
        classification: &Classification,
        plan: TripPlan,
        modified_by: Option<&str>,
    ) -> Result<FollowUpOutcome> {
        // Only concrete search-type actions can drive a stage re-run
        let actionable = matches!(
            classification.action,
            FollowUpAction::Add | FollowUpAction::Change | FollowUpAction::Find
        );
        if !actionable && classification.category != Category::Budget {
            debug!(action = ?classification.action, "modify: action not actionable");
            return Ok(unchanged(plan));
        }

        let request = plan.request.clone();
        let ctx = StageContext::from_plan(&plan);
        let selected = ctx.selected_lodging(&request).cloned();
        let dietary = dietary_preference(&request.prompt, None);

        // Closed dispatch: category -> exactly one stage. Unknown or
        // unmappable categories are rejected, never guessed.
        let refreshed = match classification.category {
            Category::Accommodation => match lodging::run(&self.pipeline, &request).await {
                Ok(output) if !output.is_empty() => Some(ctx.with_lodging(output)),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "lodging re-run failed");
                    None
                }
            },
            Category::Restaurant => {
                match dining::run(&self.pipeline, &request, selected.as_ref(), dietary.as_deref()).await {
                    Ok(output) if !output.is_empty() => Some(ctx.with_dining(output)),
                    Ok(_) => None,
                    Err(e) => {
                        warn!(error = %e, "dining re-run failed");
                        None
                    }
                }
            }
            Category::Transportation => match transport::run(&self.pipeline, &request, selected.as_ref()).await {
                Ok(output) if !output.output.is_empty() => Some(ctx.with_transport(output)),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "transportation re-run failed");
                    None
                }
            },
            Category::Experience => match activities::run(&self.pipeline, &request, selected.as_ref()).await {
                Ok(output) if !output.is_empty() => Some(ctx.with_activities(output)),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "activities re-run failed");
                    None
                }
            },
            // Budgeting is pure recomputation over the existing stage set;
            // it always yields a breakdown
            Category::Budget => Some(ctx),
            Category::General => {
                debug!("modify: general category rejected");
                None
            }
        };

        let Some(ctx) = refreshed else {
            return Ok(unchanged(plan));
        };

        let updated = self.pipeline.reassemble(&request, ctx).await;
        let value = serde_json::to_value(&updated).wrap_err("failed to serialize updated plan")?;
        let author = modified_by.unwrap_or(owner);
        let version = self
            .store
            .append(owner, trip, &value, author)
            .wrap_err("failed to persist updated plan")?;
        info!(%owner, %trip, version, "modification persisted");

        Ok(FollowUpOutcome {
            kind: FollowUpKind::Modification,
            plan: Some(updated),
            answer: None,
            message: format!("I've updated your itinerary based on your request: {utterance}"),
            version: Some(version),
        })
    }
}

fn unchanged(plan: TripPlan) -> FollowUpOutcome {
    FollowUpOutcome {
        kind: FollowUpKind::Modification,
        plan: Some(plan),
        answer: None,
        message: AMBIGUOUS_MESSAGE.to_string(),
        version: None,
    }
}
