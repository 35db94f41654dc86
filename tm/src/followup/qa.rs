//! Plan question answering
//!
//! Reads fields off the existing plan and returns prose. Never re-runs a
//! stage and never creates a version; a query is always a pure read.

use crate::domain::TripPlan;

/// Answer a question about the plan
pub fn answer(question: &str, plan: &TripPlan) -> String {
    let lower = question.to_lowercase();

    if contains_any(&lower, &["carbon", "emission", "co2", "environment", "green"]) {
        carbon_answer(plan)
    } else if contains_any(&lower, &["budget", "cost", "price", "expensive", "cheap", "money"]) {
        budget_answer(plan)
    } else if contains_any(&lower, &["accommodation", "hotel", "stay", "lodging"]) {
        lodging_answer(plan)
    } else if contains_any(&lower, &["transport", "flight", "train", "bus", "travel", "how to get"]) {
        transportation_answer(plan)
    } else if contains_any(&lower, &["restaurant", "food", "meal", "dining", "eat"]) {
        dining_answer(plan)
    } else if contains_any(&lower, &["activity", "experience", "thing to do", "attraction"]) {
        activities_answer(plan)
    } else if contains_any(&lower, &["day", "schedule", "itinerary", "plan", "what happens"]) {
        schedule_answer(plan)
    } else {
        summary_answer(plan)
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

fn carbon_answer(plan: &TripPlan) -> String {
    let with_emissions: Vec<_> = plan
        .transportation
        .iter()
        .filter_map(|t| t.emissions_kg.map(|kg| (t, kg)))
        .collect();
    if with_emissions.is_empty() {
        return "I don't have carbon emission estimates for the transportation options in your plan.".to_string();
    }

    let total: f64 = with_emissions.iter().map(|(_, kg)| kg).sum();
    let (top, top_kg) = with_emissions[0];
    let mut out = format!(
        "Your main transportation ({} from {} to {}) produces roughly {:.0} kg of CO2. \
         Estimated total for all listed options: {:.0} kg.",
        top.mode, top.origin, top.destination, top_kg, total
    );
    if top_kg > 2000.0 {
        out.push_str(" This is a long-haul journey; consider offsetting or a greener priority next time.");
    } else if top_kg < 100.0 {
        out.push_str(" That is a relatively low-carbon way to travel.");
    }
    out
}

fn budget_answer(plan: &TripPlan) -> String {
    let b = &plan.budget;
    format!(
        "Budget breakdown (total ${:.2}):\n\
         - Lodging: ${:.2}\n\
         - Transportation: ${:.2}\n\
         - Activities: ${:.2}\n\
         - Meals: ${:.2}\n\
         - Miscellaneous buffer: ${:.2}",
        b.total, b.lodging, b.transportation, b.activities, b.meals, b.miscellaneous
    )
}

fn lodging_answer(plan: &TripPlan) -> String {
    match &plan.selected_lodging {
        Some(lodging) => {
            let mut out = format!(
                "You're staying at {} ({}), ${:.2} per night, ${:.2} total.",
                lodging.name, lodging.address, lodging.price_per_night, lodging.total_price
            );
            if !lodging.amenities.is_empty() {
                out.push_str(&format!(" Amenities: {}.", lodging.amenities.join(", ")));
            }
            out
        }
        None => "There is no accommodation in your plan yet.".to_string(),
    }
}

fn transportation_answer(plan: &TripPlan) -> String {
    if plan.transportation.is_empty() {
        return "There are no transportation options in your plan yet.".to_string();
    }
    let mut out = String::from("Transportation options:\n");
    for (i, t) in plan.transportation.iter().take(3).enumerate() {
        out.push_str(&format!(
            "{}. {} via {}: {} -> {}, ${:.2}",
            i + 1,
            t.mode,
            t.provider,
            t.origin,
            t.destination,
            t.price
        ));
        if let Some(minutes) = t.duration_minutes {
            out.push_str(&format!(", {}h {}m", minutes / 60, minutes % 60));
        }
        if t.recommended {
            out.push_str(" (recommended)");
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn dining_answer(plan: &TripPlan) -> String {
    if plan.dining.is_empty() {
        return "There are no restaurants in your plan yet.".to_string();
    }
    let mut out = String::from("Restaurants in your plan:\n");
    for (i, r) in plan.dining.iter().take(5).enumerate() {
        out.push_str(&format!("{}. {} - {} ({}), {}\n", i + 1, r.name, r.cuisine, r.price_range, r.address));
    }
    out.trim_end().to_string()
}

fn activities_answer(plan: &TripPlan) -> String {
    if plan.activities.is_empty() {
        return "There are no activities in your plan yet, but local attractions are easy to add.".to_string();
    }
    let mut out = String::from("Activities in your plan:\n");
    for (i, a) in plan.activities.iter().take(5).enumerate() {
        let price = a.price.map(|p| format!("${p:.2}")).unwrap_or_else(|| "Free".to_string());
        out.push_str(&format!("{}. {} ({}) - {}\n", i + 1, a.name, a.category, price));
    }
    out.trim_end().to_string()
}

fn schedule_answer(plan: &TripPlan) -> String {
    let mut out = format!(
        "Your {}-day trip{}:\n",
        plan.request.duration_days,
        plan.request
            .destination
            .as_deref()
            .map(|d| format!(" to {d}"))
            .unwrap_or_default()
    );
    for day in &plan.itinerary {
        out.push_str(&format!(
            "Day {} ({}): {} activities, {} meals\n",
            day.day,
            day.date,
            day.activities.len(),
            day.meals.len()
        ));
    }
    out.trim_end().to_string()
}

fn summary_answer(plan: &TripPlan) -> String {
    format!(
        "Trip summary: {} days{} for {} traveler(s), total budget ${:.2}. \
         {} lodging option(s), {} restaurant(s), {} transportation option(s), {} activity(ies).",
        plan.request.duration_days,
        plan.request
            .destination
            .as_deref()
            .map(|d| format!(" in {d}"))
            .unwrap_or_default(),
        plan.request.travelers,
        plan.budget.total,
        plan.lodging.len(),
        plan.dining.len(),
        plan.transportation.len(),
        plan.activities.len()
    )
}
