//! Itinerary assembly stage
//!
//! Final stage: asks the generation service for a day-by-day schedule over
//! the merged shortlists, then parses it into DayItinerary records. This
//! stage cannot fail the run - any provider or parse problem degrades to
//! the deterministic fallback of one empty-but-valid day per requested
//! day, and the result is always padded or truncated to exactly the
//! requested duration.

use chrono::{Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::domain::{DayItinerary, TripRequest};
use crate::extract::{self, ExtractProfile};
use crate::prompts::ItineraryContext;

use super::context::StageContext;
use super::coordinator::Pipeline;

pub const PROFILE: ExtractProfile = ExtractProfile {
    anchor_keys: &["itinerary", "days", "schedule"],
    keywords: &[],
    providers: &[],
    limit: 30,
    min_records: 1,
};

pub async fn run(
    pipeline: &Pipeline,
    request: &TripRequest,
    ctx: &StageContext,
    dietary: Option<&str>,
) -> Vec<DayItinerary> {
    debug!(owner = %request.owner, "assembly::run: called");
    let duration = request.duration_days.max(1);
    let start_date = start_date_for(request);

    let context = ItineraryContext {
        prompt: request.prompt.clone(),
        duration_days: duration,
        start_date: start_date.to_string(),
        travelers: request.travelers,
        lodging_summary: lodging_summary(request, ctx),
        dining_summary: dining_summary(ctx),
        activities_summary: activities_summary(ctx),
        dietary: dietary.map(str::to_string),
    };

    let days = match pipeline.prompts().render("itinerary", &context) {
        Ok(prompt) => match pipeline.generate(&prompt).await {
            Ok(text) => parse_days(&text, start_date, duration),
            Err(e) => {
                warn!(error = %e, "itinerary generation failed, using fallback days");
                Vec::new()
            }
        },
        Err(e) => {
            warn!(error = %e, "itinerary template failed, using fallback days");
            Vec::new()
        }
    };

    let days = pad_to_duration(days, start_date, duration);
    info!(days = days.len(), "assembly stage finished");
    days
}

/// Requested start date, defaulting to a week out
pub fn start_date_for(request: &TripRequest) -> NaiveDate {
    request
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() + Duration::days(7))
}

fn parse_days(text: &str, start_date: NaiveDate, duration: u32) -> Vec<DayItinerary> {
    let mut days: Vec<DayItinerary> = extract::extract(text, &PROFILE)
        .iter()
        .filter_map(|raw| DayItinerary::from_raw(raw, start_date, duration))
        .collect();

    // One entry per day number, in order
    days.sort_by_key(|d| d.day);
    days.dedup_by_key(|d| d.day);
    days
}

/// Guarantee exactly `duration` entries: missing days become structurally
/// valid placeholders, extras are dropped
fn pad_to_duration(parsed: Vec<DayItinerary>, start_date: NaiveDate, duration: u32) -> Vec<DayItinerary> {
    let mut by_day: BTreeMap<u32, DayItinerary> = parsed.into_iter().map(|d| (d.day, d)).collect();
    (1..=duration)
        .map(|day| {
            by_day
                .remove(&day)
                .unwrap_or_else(|| DayItinerary::placeholder(day, start_date))
        })
        .collect()
}

fn lodging_summary(request: &TripRequest, ctx: &StageContext) -> Option<String> {
    ctx.selected_lodging(request).map(|l| {
        let mut summary = format!("- Name: {}", l.name);
        if !l.address.is_empty() {
            summary.push_str(&format!("\n- Address: {}", l.address));
        }
        summary
    })
}

fn dining_summary(ctx: &StageContext) -> Option<String> {
    let records = ctx.dining_records();
    if records.is_empty() {
        return None;
    }
    Some(
        records
            .iter()
            .take(5)
            .enumerate()
            .map(|(i, r)| format!("{}. {} - {} ({}) - {}", i + 1, r.name, r.cuisine, r.price_range, r.address))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn activities_summary(ctx: &StageContext) -> Option<String> {
    let records = ctx.activity_records();
    if records.is_empty() {
        return None;
    }

    let mut by_category: BTreeMap<&str, Vec<&crate::domain::ActivityOption>> = BTreeMap::new();
    for activity in records {
        by_category.entry(activity.category.as_str()).or_default().push(activity);
    }

    let mut lines = Vec::new();
    for (category, activities) in by_category.iter().take(5) {
        lines.push(format!("{category}:"));
        for activity in activities.iter().take(3) {
            let price = activity
                .price
                .map(|p| format!("${p:.2}"))
                .unwrap_or_else(|| "Free".to_string());
            lines.push(format!("  - {} ({price})", activity.name));
        }
    }
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_days_from_fenced_json() {
        let text = r#"```json
{"itinerary": [
  {"day": 1, "activities": [{"time": "9:00 AM", "title": "Old town walk"}], "meals": []},
  {"day": 2, "activities": [], "meals": [{"time": "7:00 PM", "type": "dinner", "restaurant": "Chez Anna"}]}
]}
```"#;
        let days = parse_days(text, date("2026-09-01"), 3);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].activities[0].title, "Old town walk");
        assert_eq!(days[1].meals[0].restaurant, "Chez Anna");
    }

    #[test]
    fn test_parse_days_dedups_by_day_number() {
        let text = r#"{"itinerary": [{"day": 1, "notes": "first"}, {"day": 1, "notes": "dup"}]}"#;
        let days = parse_days(text, date("2026-09-01"), 3);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].notes, "first");
    }

    #[test]
    fn test_pad_fills_missing_days() {
        let text = r#"{"itinerary": [{"day": 2, "notes": "only day two"}]}"#;
        let days = pad_to_duration(parse_days(text, date("2026-09-01"), 4), date("2026-09-01"), 4);
        assert_eq!(days.len(), 4);
        assert_eq!(days.iter().map(|d| d.day).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(days[1].notes, "only day two");
        assert!(days[0].activities.is_empty());
        assert_eq!(days[3].date, date("2026-09-04"));
    }

    #[test]
    fn test_pad_truncates_extra_days() {
        let parsed: Vec<DayItinerary> = (1..=6).map(|d| DayItinerary::placeholder(d, date("2026-09-01"))).collect();
        assert_eq!(pad_to_duration(parsed, date("2026-09-01"), 2).len(), 2);
    }

    #[test]
    fn test_garbage_text_yields_all_placeholders() {
        let days = pad_to_duration(parse_days("not json at all", date("2026-09-01"), 3), date("2026-09-01"), 3);
        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|d| d.activities.is_empty()));
    }
}
