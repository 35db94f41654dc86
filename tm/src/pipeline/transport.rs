//! Transportation stage
//!
//! Fan-out branch with three steps: route analysis picks the one mode
//! worth searching (a stated user preference overrides it), the mode
//! search produces candidates, and the selector marks the top scorer. When
//! the mode is air and the true destination is a specific address, a
//! secondary pass searches ground options from each inferred arrival
//! airport, kept separate from the primary candidates.

use eyre::{Result, WrapErr};
use tracing::{debug, info, warn};

use crate::domain::{
    LodgingOption, StageKind, StageOutput, TransportCandidate, TransportMode, TripRequest,
};
use crate::extract::{self, ExtractProfile};
use crate::prompts::{RouteContext, SearchContext};
use crate::routing::{self, RouteAnalysis};

use super::coordinator::Pipeline;

pub const FLIGHT_PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["flights", "results", "options"],
    keywords: &["flight", "airline", "fly", "airport", "nonstop"],
    providers: &[
        "United Airlines", "Delta", "American Airlines", "Lufthansa", "SWISS", "British Airways", "Air France",
        "KLM", "Emirates", "JetBlue", "Southwest",
    ],
    limit: 5,
    min_records: 1,
};

pub const TRAIN_PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["trains", "connections", "results", "options"],
    keywords: &["train", "rail", "railway", "station"],
    providers: &["Amtrak", "Eurostar", "SBB", "Deutsche Bahn", "Trenitalia", "SNCF"],
    limit: 5,
    min_records: 1,
};

pub const BUS_PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["buses", "coaches", "results", "options"],
    keywords: &["bus", "coach", "terminal"],
    providers: &["FlixBus", "Megabus", "Greyhound", "BoltBus"],
    limit: 5,
    min_records: 1,
};

pub const CAB_PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["cabs", "rides", "taxis", "results", "options"],
    keywords: &["cab", "taxi", "ride", "shuttle", "car"],
    providers: &["Uber", "Lyft"],
    limit: 5,
    min_records: 1,
};

fn profile_for(mode: TransportMode) -> &'static ExtractProfile {
    match mode {
        TransportMode::Flight => &FLIGHT_PROFILE,
        TransportMode::Train => &TRAIN_PROFILE,
        TransportMode::Bus => &BUS_PROFILE,
        TransportMode::Car => &CAB_PROFILE,
    }
}

fn template_for(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Flight => "flight",
        TransportMode::Train => "train",
        TransportMode::Bus => "bus",
        TransportMode::Car => "cab",
    }
}

/// Result of the transportation stage
#[derive(Debug, Clone)]
pub struct TransportOutput {
    pub output: StageOutput<TransportCandidate>,
    /// Ground options from arrival airports; never mixed into `output`
    pub airport_transfers: Vec<TransportCandidate>,
    pub mode: TransportMode,
    pub analysis: RouteAnalysis,
}

impl TransportOutput {
    pub fn empty() -> Self {
        Self {
            output: StageOutput::empty(StageKind::Transportation),
            airport_transfers: Vec::new(),
            mode: TransportMode::Flight,
            analysis: routing::fallback_analysis("", ""),
        }
    }

    /// Rebuild from a published plan for follow-up merging
    pub fn from_plan(plan: &crate::domain::TripPlan) -> Self {
        let mode = plan
            .transportation
            .first()
            .map(|c| c.mode)
            .unwrap_or(TransportMode::Flight);
        Self {
            output: StageOutput::new(
                StageKind::Transportation,
                plan.transportation.clone(),
                String::new(),
                1,
            ),
            airport_transfers: plan.airport_transfers.clone(),
            mode,
            analysis: routing::fallback_analysis(
                plan.request.origin.as_deref().unwrap_or(""),
                plan.request.destination.as_deref().unwrap_or(""),
            ),
        }
    }

    pub fn candidates(&self) -> &[TransportCandidate] {
        &self.output.records
    }
}

pub async fn run(
    pipeline: &Pipeline,
    request: &TripRequest,
    lodging: Option<&LodgingOption>,
) -> Result<TransportOutput> {
    let origin = request.origin.clone().unwrap_or_else(|| "User Location".to_string());
    let destination = request
        .destination
        .clone()
        .or_else(|| lodging.and_then(city_from_address))
        .ok_or_else(|| eyre::eyre!("destination is required for transportation planning"))?;

    debug!(%origin, %destination, "transport::run: called");

    // Mode choice: explicit user preference wins, otherwise analyze
    let analysis = match request.preferred_mode {
        Some(mode) => RouteAnalysis {
            mode,
            reasoning: format!("User explicitly requested {mode}"),
            international: false,
            same_continent: true,
        },
        None => analyze_route(pipeline, &origin, &destination).await,
    };
    let mode = analysis.mode;
    info!(%mode, reasoning = %analysis.reasoning, "route analysis complete");

    let (mut candidates, raw_text) =
        search_mode(pipeline, request, mode, &origin, &destination).await?;
    candidates.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));
    routing::mark_recommended(&mut candidates, request.priority);

    // Secondary ground legs from each arrival airport to a specific address
    let mut airport_transfers = Vec::new();
    if mode == TransportMode::Flight {
        if let Some(address) = lodging.map(|l| l.address.as_str()).filter(|a| routing::is_specific_address(a)) {
            airport_transfers = search_airport_transfers(pipeline, request, &candidates, address).await;
        }
    }

    let output = StageOutput::new(StageKind::Transportation, candidates, raw_text, 1);
    Ok(TransportOutput {
        output,
        airport_transfers,
        mode,
        analysis,
    })
}

async fn analyze_route(pipeline: &Pipeline, origin: &str, destination: &str) -> RouteAnalysis {
    let context = RouteContext {
        origin: origin.to_string(),
        destination: destination.to_string(),
    };
    let prompt = match pipeline.prompts().render("route-analysis", &context) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!(error = %e, "route analysis template failed, using heuristics");
            return routing::fallback_analysis(origin, destination);
        }
    };

    match pipeline.generate(&prompt).await {
        Ok(text) => routing::parse_analysis(&text).unwrap_or_else(|| {
            debug!("analyze_route: unparseable analysis, using heuristics");
            routing::fallback_analysis(origin, destination)
        }),
        Err(e) => {
            warn!(error = %e, "route analysis call failed, using heuristics");
            routing::fallback_analysis(origin, destination)
        }
    }
}

async fn search_mode(
    pipeline: &Pipeline,
    request: &TripRequest,
    mode: TransportMode,
    origin: &str,
    destination: &str,
) -> Result<(Vec<TransportCandidate>, String)> {
    let profile = profile_for(mode);
    let context = SearchContext {
        origin: Some(origin.to_string()),
        destination: Some(destination.to_string()),
        start_date: request.start_date.map(|d| d.to_string()),
        travelers: request.travelers,
        budget: request.budget,
        limit: profile.limit,
        ..Default::default()
    };
    let prompt = pipeline.prompts().render(template_for(mode), &context)?;

    let text = pipeline
        .generate(&prompt)
        .await
        .wrap_err_with(|| format!("{mode} search failed"))?;

    let candidates: Vec<TransportCandidate> = extract::extract(&text, profile)
        .iter()
        .filter_map(|raw| TransportCandidate::from_raw(raw, mode, origin, destination, request.travelers))
        .collect();

    debug!(%mode, count = candidates.len(), "search_mode: extracted candidates");
    Ok((candidates, text))
}

/// Search ground transport from each inferred arrival airport to the
/// address. The three ground modes per airport run concurrently; failures
/// here only shrink the transfer list, the primary route is already
/// settled.
async fn search_airport_transfers(
    pipeline: &Pipeline,
    request: &TripRequest,
    flights: &[TransportCandidate],
    address: &str,
) -> Vec<TransportCandidate> {
    let airports = routing::infer_airports(flights);
    if airports.is_empty() {
        return Vec::new();
    }

    let mut options = Vec::new();
    for airport in airports {
        let airport_name = if airport.len() == 3 {
            format!("{airport} Airport")
        } else {
            airport.clone()
        };
        info!(%airport_name, %address, "searching airport transfer options");

        let origin: &str = &airport_name;
        let searches = [
            (TransportMode::Train, 2usize),
            (TransportMode::Bus, 2),
            (TransportMode::Car, 3),
        ]
        .map(|(mode, take)| async move {
            (mode, take, search_mode(pipeline, request, mode, origin, address).await)
        });

        for (mode, take, result) in futures::future::join_all(searches).await {
            match result {
                Ok((candidates, _)) => {
                    options.extend(candidates.into_iter().take(take).map(|mut c| {
                        c.airport_transfer = true;
                        c
                    }));
                }
                Err(e) => {
                    warn!(%mode, error = %e, "airport transfer search failed");
                }
            }
        }
    }

    routing::dedup_transfers(options, 10)
}

/// City portion of a lodging address (the last comma-separated part)
fn city_from_address(lodging: &LodgingOption) -> Option<String> {
    lodging
        .address
        .rsplit(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;

    #[test]
    fn test_city_from_address() {
        let lodging = LodgingOption {
            id: "l".to_string(),
            name: "Chalet".to_string(),
            description: String::new(),
            address: "Hauptstrasse 12, Interlaken".to_string(),
            location: GeoPoint::default(),
            price_per_night: 0.0,
            total_price: 0.0,
            amenities: vec![],
            rating: None,
        };
        assert_eq!(city_from_address(&lodging), Some("Interlaken".to_string()));
    }

    #[test]
    fn test_profile_and_template_mapping() {
        assert_eq!(template_for(TransportMode::Car), "cab");
        assert!(profile_for(TransportMode::Train).anchor_keys.contains(&"trains"));
    }
}
