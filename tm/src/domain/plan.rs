//! TripPlan and its parts
//!
//! The TripPlan is the published state of a trip: everything the pipeline
//! assembled, plus the day-by-day itinerary and budget. Versioning wraps
//! whole plans; nothing in here is mutated after assembly.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::normalize;

use super::records::{ActivityOption, DiningOption, LodgingOption};
use super::request::TripRequest;
use super::transport::TransportCandidate;

/// One scheduled activity within a day
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItineraryEntry {
    #[serde(default)]
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// One scheduled meal within a day
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MealEntry {
    #[serde(default)]
    pub time: String,
    #[serde(default, rename = "type")]
    pub meal_type: String,
    #[serde(default)]
    pub restaurant: String,
    #[serde(default)]
    pub description: String,
}

/// A single day of the itinerary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayItinerary {
    /// 1-based day number
    pub day: u32,
    pub date: NaiveDate,
    pub activities: Vec<ItineraryEntry>,
    pub meals: Vec<MealEntry>,
    #[serde(default)]
    pub notes: String,
}

impl DayItinerary {
    /// Build a day from one extracted record; days outside 1..=duration
    /// are dropped
    pub fn from_raw(raw: &Map<String, Value>, start_date: NaiveDate, duration_days: u32) -> Option<Self> {
        let day = normalize::first_u32(raw, &["day"]).unwrap_or(1);
        if day < 1 || day > duration_days {
            return None;
        }

        let date = raw
            .get("date")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .unwrap_or(start_date + Duration::days(day as i64 - 1));

        let activities = raw
            .get("activities")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let meals = raw
            .get("meals")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            day,
            date,
            activities,
            meals,
            notes: normalize::first_string(raw, &["notes"]).unwrap_or_default(),
        })
    }

    /// Structurally valid but unplanned day, used by the assembly fallback
    pub fn placeholder(day: u32, start_date: NaiveDate) -> Self {
        Self {
            day,
            date: start_date + Duration::days(day as i64 - 1),
            activities: Vec::new(),
            meals: Vec::new(),
            notes: "Activities to be planned".to_string(),
        }
    }
}

/// Share of the subtotal reserved for unexpected expenses
pub const MISC_BUFFER_RATE: f64 = 0.12;

/// Budget breakdown; components plus the miscellaneous buffer sum to total
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BudgetBreakdown {
    pub lodging: f64,
    pub transportation: f64,
    pub activities: f64,
    pub meals: f64,
    pub miscellaneous: f64,
    pub total: f64,
    pub currency: String,
}

impl BudgetBreakdown {
    /// Build a breakdown from component costs, applying the fixed
    /// miscellaneous buffer and rounding to cents
    pub fn from_components(lodging: f64, transportation: f64, activities: f64, meals: f64) -> Self {
        let round = |v: f64| (v * 100.0).round() / 100.0;
        let lodging = round(lodging);
        let transportation = round(transportation);
        let activities = round(activities);
        let meals = round(meals);
        let subtotal = lodging + transportation + activities + meals;
        let miscellaneous = round(subtotal * MISC_BUFFER_RATE);
        Self {
            lodging,
            transportation,
            activities,
            meals,
            miscellaneous,
            total: round(lodging + transportation + activities + meals + miscellaneous),
            currency: "USD".to_string(),
        }
    }
}

/// The complete, published state of a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub request: TripRequest,

    pub lodging: Vec<LodgingOption>,
    pub selected_lodging: Option<LodgingOption>,

    pub dining: Vec<DiningOption>,

    /// Primary route candidates; at most one is recommended
    pub transportation: Vec<TransportCandidate>,
    /// Ground options from arrival airports to the final address, kept
    /// separate from the primary route
    #[serde(default)]
    pub airport_transfers: Vec<TransportCandidate>,

    pub activities: Vec<ActivityOption>,

    pub itinerary: Vec<DayItinerary>,
    pub budget: BudgetBreakdown,

    pub created_at: DateTime<Utc>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_budget_components_sum_to_total() {
        let budget = BudgetBreakdown::from_components(720.0, 1300.0, 280.0, 450.0);
        let subtotal = budget.lodging + budget.transportation + budget.activities + budget.meals;
        assert!((budget.miscellaneous - subtotal * MISC_BUFFER_RATE).abs() < 0.01);
        assert!((budget.total - (subtotal + budget.miscellaneous)).abs() < 1e-9);
    }

    #[test]
    fn test_day_from_raw() {
        let raw = json!({
            "day": 2,
            "date": "2026-09-02",
            "activities": [{"time": "9:00 AM", "title": "Harbor walk"}],
            "meals": [{"time": "1:00 PM", "type": "lunch", "restaurant": "Pier 7"}],
            "notes": "Bring a jacket"
        });
        let day = DayItinerary::from_raw(raw.as_object().unwrap(), date("2026-09-01"), 5).unwrap();
        assert_eq!(day.day, 2);
        assert_eq!(day.date, date("2026-09-02"));
        assert_eq!(day.activities.len(), 1);
        assert_eq!(day.meals[0].restaurant, "Pier 7");
    }

    #[test]
    fn test_day_out_of_range_is_dropped() {
        let raw = json!({"day": 9});
        assert!(DayItinerary::from_raw(raw.as_object().unwrap(), date("2026-09-01"), 5).is_none());
    }

    #[test]
    fn test_day_derives_date_from_day_number() {
        let raw = json!({"day": 3});
        let day = DayItinerary::from_raw(raw.as_object().unwrap(), date("2026-09-01"), 5).unwrap();
        assert_eq!(day.date, date("2026-09-03"));
    }

    #[test]
    fn test_placeholder_day() {
        let day = DayItinerary::placeholder(4, date("2026-09-01"));
        assert_eq!(day.date, date("2026-09-04"));
        assert!(day.activities.is_empty());
    }
}
