//! Defensive field coercion for extracted records
//!
//! Generation output is inconsistent about types: prices arrive as
//! numbers, `"$1,299"`, or `"From $192"`; durations as minutes, hours, or
//! `"8h 30m"`. These helpers coerce what they can and return `None` for
//! the rest, so callers drop individual fields or records instead of
//! failing a batch.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::GeoPoint;

static MONEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\s*(\d{1,3}(?:,\d{3})*(?:\.\d+)?)").expect("static regex"));

static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*h(?:ours?|rs?)?\b").expect("static regex"));

static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*m(?:in(?:ute)?s?)?\b").expect("static regex"));

/// Parse a currency-ish number out of a string: "$1,299.50", "From $192",
/// "450 USD"
pub fn money_from_str(s: &str) -> Option<f64> {
    if let Ok(value) = s.trim().parse::<f64>() {
        return Some(value);
    }
    MONEY_RE
        .captures(s)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}

static SIGIL_MONEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*(\d{1,3}(?:,\d{3})*(?:\.\d+)?)").expect("static regex"));

/// First currency-prefixed amount in free text (requires the `$`)
pub fn money_in_text(text: &str) -> Option<f64> {
    SIGIL_MONEY_RE
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}

/// Coerce a JSON value to f64: numbers directly, strings currency-aware
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => money_from_str(s),
        _ => None,
    }
}

/// First coercible f64 among the named fields
pub fn first_f64(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| map.get(*key).and_then(coerce_f64))
}

pub fn coerce_u32(value: &Value) -> Option<u32> {
    coerce_f64(value).filter(|v| *v >= 0.0).map(|v| v as u32)
}

/// First coercible u32 among the named fields
pub fn first_u32(map: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| map.get(*key).and_then(coerce_u32))
}

/// First non-empty string among the named fields (numbers stringified)
pub fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse a duration phrase into minutes: "8h 30m", "2 hours", "90 minutes",
/// bare "490"
pub fn parse_duration_text(s: &str) -> Option<u32> {
    let lower = s.trim().to_lowercase();
    if let Ok(minutes) = lower.parse::<u32>() {
        return Some(minutes);
    }

    let hours = HOURS_RE
        .captures(&lower)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    // Avoid re-reading the hour digits: only look for minutes after the hour match
    let minutes_text = match HOURS_RE.find(&lower) {
        Some(m) => &lower[m.end()..],
        None => lower.as_str(),
    };
    let minutes = MINUTES_RE
        .captures(minutes_text)
        .and_then(|caps| caps[1].parse::<u32>().ok());

    match (hours, minutes) {
        (None, None) => None,
        (h, m) => Some((h.unwrap_or(0.0) * 60.0) as u32 + m.unwrap_or(0)),
    }
}

/// Duration in minutes from whichever field a record carries
pub fn duration_minutes(map: &Map<String, Value>) -> Option<u32> {
    if let Some(minutes) = map.get("duration_minutes").and_then(coerce_u32) {
        return Some(minutes);
    }
    if let Some(hours) = map.get("duration_hours").and_then(coerce_f64) {
        return Some((hours * 60.0) as u32);
    }
    map.get("duration")
        .and_then(Value::as_str)
        .and_then(parse_duration_text)
}

/// First "Xh Ym" style duration phrase in free text
pub fn duration_in_text(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let hours_match = HOURS_RE.find(&lower)?;
    let hours: f64 = HOURS_RE.captures(&lower)?[1].parse().ok()?;
    let minutes = MINUTES_RE
        .captures(&lower[hours_match.end()..])
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .unwrap_or(0);
    Some((hours * 60.0) as u32 + minutes)
}

/// Nested location field; `{0,0}` when absent or malformed
pub fn location(value: Option<&Value>) -> GeoPoint {
    let Some(Value::Object(map)) = value else {
        return GeoPoint::default();
    };
    GeoPoint {
        lat: first_f64(map, &["lat", "latitude"]).unwrap_or(0.0),
        lng: first_f64(map, &["lng", "lon", "longitude"]).unwrap_or(0.0),
    }
}

/// String list field, tolerating scalars and skipping non-strings
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}
