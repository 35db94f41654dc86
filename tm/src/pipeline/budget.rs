//! Budgeting stage
//!
//! Pure computation over the merged fan-out outputs; no generation-service
//! call. Runs strictly after the fan-out joins.

use tracing::{debug, info};

use crate::domain::{BudgetBreakdown, TripRequest};

use super::context::StageContext;

/// Estimated daily meal spend per traveler when no dining data exists
const DEFAULT_MEAL_COST_PER_DAY: f64 = 50.0;

pub fn run(request: &TripRequest, ctx: &StageContext) -> BudgetBreakdown {
    debug!(owner = %request.owner, "budget::run: called");
    let duration = request.duration_days.max(1);
    let travelers = request.travelers.max(1);

    let lodging = lodging_cost(request, ctx, duration);
    let transportation = transportation_cost(ctx, travelers);
    let meals = meals_cost(ctx, duration, travelers);
    let activities = activities_cost(ctx, travelers);

    let budget = BudgetBreakdown::from_components(lodging, transportation, activities, meals);
    info!(total = budget.total, "budget stage finished");
    budget
}

/// Selected lodging's total when picked, otherwise the average across
/// options
fn lodging_cost(request: &TripRequest, ctx: &StageContext, duration: u32) -> f64 {
    let records = ctx.lodging_records();
    if records.is_empty() {
        return 0.0;
    }

    let total_of = |l: &crate::domain::LodgingOption| {
        if l.total_price > 0.0 {
            l.total_price
        } else {
            l.price_per_night * duration as f64
        }
    };

    if let Some(selected) = ctx.selected_lodging(request) {
        if request.selected_lodging_id.is_some() {
            return total_of(selected);
        }
    }

    records.iter().map(total_of).sum::<f64>() / records.len() as f64
}

/// Recommended option when marked, otherwise the cheapest; round trip for
/// the whole party
fn transportation_cost(ctx: &StageContext, travelers: u32) -> f64 {
    let Some(transport) = &ctx.transport else {
        return 0.0;
    };
    let candidates = transport.candidates();
    if candidates.is_empty() {
        return 0.0;
    }

    let per_person = |c: &crate::domain::TransportCandidate| c.price_per_traveler.unwrap_or(c.price);

    let selected = candidates
        .iter()
        .find(|c| c.recommended)
        .or_else(|| {
            candidates.iter().min_by(|a, b| {
                per_person(a)
                    .partial_cmp(&per_person(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

    selected
        .map(|c| per_person(c) * travelers as f64 * 2.0)
        .unwrap_or(0.0)
}

/// Three meals a day: breakfast at 60% of the average restaurant price,
/// lunch and dinner at full price
fn meals_cost(ctx: &StageContext, duration: u32, travelers: u32) -> f64 {
    let records = ctx.dining_records();
    if records.is_empty() {
        return DEFAULT_MEAL_COST_PER_DAY * duration as f64 * travelers as f64;
    }

    let average: f64 =
        records.iter().map(|r| r.estimated_price_per_person()).sum::<f64>() / records.len() as f64;

    let daily = (average * 0.6 + average * 2.0) * travelers as f64;
    daily * duration as f64
}

/// Per-person activity prices summed for the party; unpriced activities
/// are treated as free
fn activities_cost(ctx: &StageContext, travelers: u32) -> f64 {
    ctx.activity_records()
        .iter()
        .filter_map(|a| a.price)
        .map(|p| p * travelers as f64)
        .sum()
}
