//! Activities stage
//!
//! Fan-out branch: experience search keyed to the trip theme.

use eyre::{Result, WrapErr};
use tracing::{debug, info};

use crate::domain::{ActivityOption, LodgingOption, StageKind, StageOutput, TripRequest};
use crate::extract::{self, ExtractProfile};
use crate::prompts::SearchContext;

use super::coordinator::Pipeline;

pub const PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["experiences", "activities", "attractions", "results", "options"],
    keywords: &["activity", "experience", "tour", "hike", "museum", "attraction", "trail"],
    providers: &["Viator", "GetYourGuide", "Airbnb Experiences"],
    limit: 8,
    min_records: 1,
};

pub async fn run(
    pipeline: &Pipeline,
    request: &TripRequest,
    lodging: Option<&LodgingOption>,
) -> Result<StageOutput<ActivityOption>> {
    debug!(owner = %request.owner, "activities::run: called");

    let context = SearchContext {
        prompt: request.prompt.clone(),
        destination: request.destination.clone(),
        duration_days: request.duration_days,
        travelers: request.travelers,
        lodging_address: lodging.map(|l| l.address.clone()).filter(|a| !a.is_empty()),
        limit: PROFILE.limit,
        ..Default::default()
    };
    let prompt = pipeline.prompts().render("activities", &context)?;

    let text = pipeline
        .generate(&prompt)
        .await
        .wrap_err("activities search failed")?;

    let records: Vec<ActivityOption> = extract::extract(&text, &PROFILE)
        .iter()
        .filter_map(ActivityOption::from_raw)
        .collect();

    info!(count = records.len(), "activities stage finished");
    Ok(StageOutput::new(StageKind::Activities, records, text, PROFILE.min_records))
}
