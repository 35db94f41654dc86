//! Parse strategies for the extraction chain
//!
//! Each strategy is a pure function returning `Option`/`Vec`; the engine
//! tries them in order. Keeping them separate keeps each fallback testable
//! in isolation.

use serde_json::{Map, Value};

use super::ExtractProfile;
use super::normalize;

/// Strategy 1: locate a fenced code block and parse its contents
///
/// Prefers a block tagged ```json; falls back to the first fenced block of
/// any tag, stripping a leading language identifier.
pub fn fenced_block(text: &str) -> Option<Value> {
    let body = if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        let end = rest.find("```")?;
        rest[..end].trim()
    } else {
        let start = text.find("```")?;
        let rest = &text[start + 3..];
        let end = rest.find("```")?;
        let mut body = rest[..end].trim();
        if let Some(stripped) = body.strip_prefix("json") {
            body = stripped.trim_start();
        }
        body
    };
    serde_json::from_str(body).ok()
}

/// Strategy 2: scan for the first balanced object containing an anchor key
///
/// Walks each `{` in the text, finds its matching close brace (string- and
/// escape-aware), and parses the first balanced slice that mentions one of
/// the expected anchor keys.
pub fn anchored_object(text: &str, anchor_keys: &[&str]) -> Option<Value> {
    let bytes = text.as_bytes();
    for (start, _) in text.match_indices('{') {
        let Some(end) = balanced_end(bytes, start) else {
            continue;
        };
        let slice = &text[start..=end];
        let has_anchor = anchor_keys
            .iter()
            .any(|key| slice.contains(&format!("\"{key}\"")));
        if !has_anchor {
            continue;
        }
        if let Ok(value) = serde_json::from_str(slice) {
            return Some(value);
        }
    }
    None
}

/// Index of the brace closing the object opened at `start`
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Interpret a parsed container as a list of records
///
/// Accepts a bare array, an object with a list under one of the anchor
/// keys, an object with any other array-of-objects field, or a lone
/// object treated as a single record.
pub fn container_records(value: &Value, anchor_keys: &[&str]) -> Vec<Map<String, Value>> {
    match value {
        Value::Array(items) => objects_of(items),
        Value::Object(map) => {
            for key in anchor_keys {
                match map.get(*key) {
                    Some(Value::Array(items)) => {
                        let records = objects_of(items);
                        if !records.is_empty() {
                            return records;
                        }
                    }
                    Some(Value::Object(single)) => return vec![single.clone()],
                    _ => {}
                }
            }
            // Any other list field of objects
            for field in map.values() {
                if let Value::Array(items) = field {
                    let records = objects_of(items);
                    if !records.is_empty() {
                        return records;
                    }
                }
            }
            // Treat the object itself as one record
            vec![map.clone()]
        }
        _ => Vec::new(),
    }
}

fn objects_of(items: &[Value]) -> Vec<Map<String, Value>> {
    items
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect()
}

/// Strategy 4: paragraph-level heuristic extraction
///
/// Emits one low-confidence record per paragraph that mentions a domain
/// keyword and carries either a currency-prefixed price or a known
/// provider name. Capped at the profile's limit.
pub fn paragraph_records(text: &str, profile: &ExtractProfile) -> Vec<Map<String, Value>> {
    let mut records = Vec::new();

    for paragraph in text.split("\n\n") {
        if records.len() >= profile.limit {
            break;
        }
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let lower = paragraph.to_lowercase();
        if !profile.keywords.iter().any(|k| lower.contains(&k.to_lowercase())) {
            continue;
        }

        let provider = profile
            .providers
            .iter()
            .find(|p| lower.contains(&p.to_lowercase()))
            .map(|p| p.to_string());
        let price = normalize::money_in_text(paragraph);
        if provider.is_none() && price.is_none() {
            continue;
        }

        let mut record = Map::new();
        let first_line: String = paragraph.lines().next().unwrap_or_default().chars().take(80).collect();
        record.insert("name".to_string(), Value::String(first_line));
        if let Some(provider) = provider {
            record.insert("provider".to_string(), Value::String(provider));
        }
        if let Some(price) = price {
            record.insert("price".to_string(), Value::from(price));
        }
        if let Some(minutes) = normalize::duration_in_text(paragraph) {
            record.insert("duration_minutes".to_string(), Value::from(minutes));
        }
        record.insert("description".to_string(), Value::String(paragraph.to_string()));
        record.insert("confidence".to_string(), Value::String("low".to_string()));
        record.insert("extracted_from".to_string(), Value::String("text".to_string()));
        records.push(record);
    }

    records
}
