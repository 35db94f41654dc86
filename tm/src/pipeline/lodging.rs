//! Lodging stage
//!
//! Entry stage of the pipeline: searches for accommodations matching the
//! trip description. Unlike the fan-out branches, a provider failure here
//! propagates - there is nothing useful downstream without at least an
//! attempt at lodging.

use eyre::{Result, WrapErr};
use tracing::{debug, info};

use crate::domain::{LodgingOption, StageKind, StageOutput, TripRequest};
use crate::extract::{self, ExtractProfile};
use crate::prompts::SearchContext;

use super::coordinator::Pipeline;

pub const PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["accommodations", "lodging", "hotels", "properties", "results", "options"],
    keywords: &["hotel", "accommodation", "stay", "night", "resort", "guesthouse", "airbnb"],
    providers: &["Marriott", "Hilton", "Hyatt", "Airbnb", "Four Seasons", "Holiday Inn", "Best Western"],
    limit: 5,
    min_records: 1,
};

pub async fn run(pipeline: &Pipeline, request: &TripRequest) -> Result<StageOutput<LodgingOption>> {
    debug!(owner = %request.owner, "lodging::run: called");

    let context = SearchContext {
        prompt: request.prompt.clone(),
        destination: request.destination.clone(),
        start_date: request.start_date.map(|d| d.to_string()),
        duration_days: request.duration_days,
        travelers: request.travelers,
        budget: request.budget,
        limit: PROFILE.limit,
        ..Default::default()
    };
    let prompt = pipeline.prompts().render("lodging", &context)?;

    let text = pipeline
        .generate(&prompt)
        .await
        .wrap_err("lodging search failed")?;

    let records: Vec<LodgingOption> = extract::extract(&text, &PROFILE)
        .iter()
        .filter_map(|raw| LodgingOption::from_raw(raw, request.duration_days))
        .collect();

    info!(count = records.len(), "lodging stage finished");
    Ok(StageOutput::new(StageKind::Lodging, records, text, PROFILE.min_records))
}
