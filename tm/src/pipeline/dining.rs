//! Dining stage
//!
//! Fan-out branch: restaurant search near the selected lodging, honoring
//! dietary preferences when known.

use eyre::{Result, WrapErr};
use tracing::{debug, info};

use crate::domain::{DiningOption, LodgingOption, StageKind, StageOutput, TripRequest};
use crate::extract::{self, ExtractProfile};
use crate::prompts::SearchContext;

use super::coordinator::Pipeline;

pub const PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["restaurants", "dining", "cafes", "results", "options"],
    keywords: &["restaurant", "cafe", "food", "meal", "dining", "cuisine", "menu"],
    providers: &[],
    limit: 6,
    min_records: 1,
};

pub async fn run(
    pipeline: &Pipeline,
    request: &TripRequest,
    lodging: Option<&LodgingOption>,
    dietary: Option<&str>,
) -> Result<StageOutput<DiningOption>> {
    debug!(owner = %request.owner, ?dietary, "dining::run: called");

    let context = SearchContext {
        prompt: request.prompt.clone(),
        destination: request.destination.clone(),
        travelers: request.travelers,
        lodging_address: lodging.map(|l| l.address.clone()).filter(|a| !a.is_empty()),
        dietary: dietary.map(str::to_string),
        limit: PROFILE.limit,
        ..Default::default()
    };
    let prompt = pipeline.prompts().render("dining", &context)?;

    let text = pipeline
        .generate(&prompt)
        .await
        .wrap_err("dining search failed")?;

    let records: Vec<DiningOption> = extract::extract(&text, &PROFILE)
        .iter()
        .filter_map(DiningOption::from_raw)
        .collect();

    info!(count = records.len(), "dining stage finished");
    Ok(StageOutput::new(StageKind::Dining, records, text, PROFILE.min_records))
}
