//! TripRequest domain type
//!
//! The resolved input for one pipeline run. Immutable once built; a
//! follow-up constructs a fresh instance from the stored plan.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::transport::TransportMode;

/// What the traveler cares about most when comparing transport options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportPriority {
    Cheapest,
    Fastest,
    Greenest,
    #[default]
    Balanced,
}

impl std::fmt::Display for TransportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cheapest => write!(f, "cheapest"),
            Self::Fastest => write!(f, "fastest"),
            Self::Greenest => write!(f, "greenest"),
            Self::Balanced => write!(f, "balanced"),
        }
    }
}

/// A resolved trip request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    /// Natural language description of the trip
    pub prompt: String,

    /// Owner of the trip (external user id)
    pub owner: String,

    /// Origin location, when stated or inferred
    pub origin: Option<String>,

    /// Destination city/region
    pub destination: Option<String>,

    /// Trip start date
    pub start_date: Option<NaiveDate>,

    /// Trip length in days
    pub duration_days: u32,

    /// Number of travelers
    pub travelers: u32,

    /// Total budget ceiling in USD
    pub budget: Option<f64>,

    /// Lodging option the user picked (by record id)
    #[serde(default)]
    pub selected_lodging_id: Option<String>,

    /// Scoring priority for transport candidates
    #[serde(default)]
    pub priority: TransportPriority,

    /// Explicit transport mode preference; always overrides route analysis
    #[serde(default)]
    pub preferred_mode: Option<TransportMode>,
}

impl TripRequest {
    /// Build a request by extracting trip details from a free-text prompt
    ///
    /// Pulls duration ("3 days", "weekend", "week"), traveler count
    /// ("2 people", "solo", "couple", "family"), budget ("$2,000",
    /// "2000 dollars"), origin ("from Boston") and destination ("to
    /// Portland", else trailing capitalized words) out of the utterance.
    /// Anything not stated falls back to defaults: 3 days, 1 traveler.
    pub fn from_prompt(prompt: &str, owner: impl Into<String>) -> Self {
        debug!(prompt_len = prompt.len(), "TripRequest::from_prompt: called");
        let lower = prompt.to_lowercase();

        let duration_days = extract_duration(&lower).unwrap_or(3);
        let travelers = extract_travelers(&lower).unwrap_or(1);
        let budget = extract_budget(&lower);
        let origin = extract_origin(prompt);
        let destination = extract_destination(prompt, origin.as_deref());
        let preferred_mode = TransportMode::detect_preference(&lower);

        debug!(
            duration_days,
            travelers,
            ?budget,
            ?origin,
            ?destination,
            "TripRequest::from_prompt: extracted details"
        );

        Self {
            prompt: prompt.to_string(),
            owner: owner.into(),
            origin,
            destination,
            start_date: None,
            duration_days,
            travelers,
            budget,
            selected_lodging_id: None,
            priority: TransportPriority::default(),
            preferred_mode,
        }
    }
}

fn extract_duration(lower: &str) -> Option<u32> {
    if lower.contains("weekend") {
        return Some(2);
    }
    let re = Regex::new(r"(\d+)\s*-?\s*(?:day|night)").expect("static regex");
    if let Some(caps) = re.captures(lower) {
        return caps[1].parse().ok();
    }
    if Regex::new(r"\bweek\b").expect("static regex").is_match(lower) {
        return Some(7);
    }
    None
}

fn extract_travelers(lower: &str) -> Option<u32> {
    if lower.contains("solo") {
        return Some(1);
    }
    if lower.contains("couple") {
        return Some(2);
    }
    if lower.contains("family") {
        return Some(4);
    }
    let re = Regex::new(r"(\d+)\s*(?:people|persons?|travelers?|guests?|adults?)").expect("static regex");
    re.captures(lower).and_then(|caps| caps[1].parse().ok())
}

fn extract_budget(lower: &str) -> Option<f64> {
    let patterns = [
        r"\$(\d+(?:,\d{3})*(?:\.\d{2})?)",
        r"(\d+(?:,\d{3})*)\s*dollars?",
        r"budget\s*(?:of|is)?\s*\$?(\d+(?:,\d{3})*)",
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).expect("static regex");
        if let Some(caps) = re.captures(lower) {
            return caps[1].replace(',', "").parse().ok();
        }
    }
    None
}

fn extract_origin(prompt: &str) -> Option<String> {
    let re = Regex::new(r"(?i)from\s+([A-Z][a-zA-Z\s,]+?)(?:\s+to|\s*,|\s+for|\s+with|$)").expect("static regex");
    re.captures(prompt)
        .map(|caps| caps[1].trim().trim_end_matches(',').to_string())
}

fn extract_destination(prompt: &str, origin: Option<&str>) -> Option<String> {
    let re = Regex::new(r"(?i)\bto\s+([A-Z][a-zA-Z\s,]+?)(?:\s+for|\s+with|\s*,|$)").expect("static regex");
    if let Some(caps) = re.captures(prompt) {
        return Some(caps[1].trim().trim_end_matches(',').to_string());
    }

    // No "to X" phrase: fall back to the last capitalized word pair that
    // isn't a trip noun and isn't the origin.
    let noise = ["weekend", "getaway", "trip", "vacation", "holiday"];
    let words: Vec<&str> = prompt.split_whitespace().collect();
    let mut candidates = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let word = words[i].trim_matches(|c: char| !c.is_alphanumeric());
        if word.len() > 2 && word.chars().next().is_some_and(|c| c.is_uppercase()) {
            if noise.contains(&word.to_lowercase().as_str()) {
                i += 1;
                continue;
            }
            let mut candidate = word.to_string();
            if let Some(next) = words.get(i + 1) {
                let next = next.trim_matches(|c: char| !c.is_alphanumeric());
                if next.chars().next().is_some_and(|c| c.is_uppercase())
                    && !["to", "from", "for", "with"].contains(&next.to_lowercase().as_str())
                {
                    candidate.push(' ');
                    candidate.push_str(next);
                    i += 1;
                }
            }
            candidates.push(candidate);
        }
        i += 1;
    }

    candidates
        .into_iter()
        .rev()
        .find(|c| origin.map(|o| o != c.as_str()).unwrap_or(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_prompt_extracts_details() {
        let req = TripRequest::from_prompt("A 5-day trip from Boston to Portland for 2 people under $3,000", "u1");
        assert_eq!(req.duration_days, 5);
        assert_eq!(req.travelers, 2);
        assert_eq!(req.budget, Some(3000.0));
        assert_eq!(req.origin.as_deref(), Some("Boston"));
        assert_eq!(req.destination.as_deref(), Some("Portland"));
    }

    #[test]
    fn test_from_prompt_weekend_couple() {
        let req = TripRequest::from_prompt("Weekend getaway to Portland for a couple", "u1");
        assert_eq!(req.duration_days, 2);
        assert_eq!(req.travelers, 2);
        assert_eq!(req.destination.as_deref(), Some("Portland"));
    }

    #[test]
    fn test_from_prompt_defaults() {
        let req = TripRequest::from_prompt("somewhere quiet please", "u1");
        assert_eq!(req.duration_days, 3);
        assert_eq!(req.travelers, 1);
        assert!(req.budget.is_none());
        assert!(req.destination.is_none());
    }

    #[test]
    fn test_from_prompt_trailing_capitalized_destination() {
        let req = TripRequest::from_prompt("A quiet week exploring New Zealand", "u1");
        assert_eq!(req.duration_days, 7);
        assert_eq!(req.destination.as_deref(), Some("New Zealand"));
    }

    #[test]
    fn test_from_prompt_mode_preference() {
        let req = TripRequest::from_prompt("Take me to Boston by train", "u1");
        assert_eq!(req.preferred_mode, Some(TransportMode::Train));
    }
}
