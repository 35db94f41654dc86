//! Structured extraction engine
//!
//! Turns free-form generation-service text into zero or more JSON records
//! via an ordered chain of parse strategies. The same engine and fallback
//! order serves every stage; only the anchor keys and keyword lists vary
//! per caller, carried in an [`ExtractProfile`].
//!
//! The contract is: never fail. Malformed input degrades to an empty
//! record list with a debug log, and a record that resists coercion is
//! dropped by its typed constructor, never fatal to the batch.

pub mod normalize;
mod strategies;

use serde_json::{Map, Value};
use tracing::debug;

/// Per-caller extraction parameters
///
/// `anchor_keys` name the list fields a structured container may use
/// ("flights", "accommodations", ...). `keywords` and `providers` drive
/// the paragraph-level heuristic fallback. `limit` caps the records one
/// invocation may yield; `min_records` feeds the stage's met-minimum flag.
#[derive(Debug, Clone, Copy)]
pub struct ExtractProfile {
    pub anchor_keys: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub providers: &'static [&'static str],
    pub limit: usize,
    pub min_records: usize,
}

/// Extract raw records from text using the ordered fallback chain
///
/// Strategies run in order, stopping at the first that yields at least one
/// record:
///
/// 1. fenced code block parsed as a structured container
/// 2. first balanced object in the text containing an anchor key
/// 3. the whole text as one container
/// 4. paragraph-level keyword heuristics (low confidence)
pub fn extract(text: &str, profile: &ExtractProfile) -> Vec<Map<String, Value>> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let structured = strategies::fenced_block(text)
        .and_then(|v| non_empty(strategies::container_records(&v, profile.anchor_keys)))
        .or_else(|| {
            strategies::anchored_object(text, profile.anchor_keys)
                .and_then(|v| non_empty(strategies::container_records(&v, profile.anchor_keys)))
        })
        .or_else(|| {
            serde_json::from_str::<Value>(text.trim())
                .ok()
                .and_then(|v| non_empty(strategies::container_records(&v, profile.anchor_keys)))
        });

    let mut records = match structured {
        Some(records) => records,
        None => {
            debug!(anchors = ?profile.anchor_keys, "extract: no structured container, trying paragraph heuristics");
            strategies::paragraph_records(text, profile)
        }
    };

    records.truncate(profile.limit);
    debug!(count = records.len(), "extract: finished");
    records
}

fn non_empty(records: Vec<Map<String, Value>>) -> Option<Vec<Map<String, Value>>> {
    if records.is_empty() { None } else { Some(records) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: ExtractProfile = ExtractProfile {
        anchor_keys: &["flights", "results", "options"],
        keywords: &["flight", "airline", "airport"],
        providers: &["Delta", "United Airlines", "SWISS"],
        limit: 5,
        min_records: 1,
    };

    #[test]
    fn test_fenced_block_returns_all_records() {
        let text = r#"Here are your options.

```json
{"flights": [
  {"airline": "Delta", "price": 420},
  {"airline": "SWISS", "price": 510},
  {"airline": "United Airlines", "price": 380}
]}
```

Let me know if you need more."#;
        let records = extract(text, &PROFILE);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["airline"], "Delta");
    }

    #[test]
    fn test_bare_array_in_fence() {
        let text = "```json\n[{\"airline\": \"Delta\", \"price\": 1}]\n```";
        assert_eq!(extract(text, &PROFILE).len(), 1);
    }

    #[test]
    fn test_inline_object_with_anchor() {
        let text = r#"I found these: {"flights": [{"airline": "SWISS", "price": 900}]} - enjoy!"#;
        let records = extract(text, &PROFILE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["airline"], "SWISS");
    }

    #[test]
    fn test_whole_text_as_container() {
        let text = r#"{"results": [{"airline": "Delta", "price": 99}]}"#;
        assert_eq!(extract(text, &PROFILE).len(), 1);
    }

    #[test]
    fn test_paragraph_fallback() {
        let text = "Your best airline option is Delta for $320, about 2h 15m nonstop.\n\n\
                    Another flight via United Airlines costs $280 with one stop.";
        let records = extract(text, &PROFILE);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["provider"], "Delta");
        assert_eq!(records[0]["confidence"], "low");
        assert_eq!(records[1]["price"], 280.0);
    }

    #[test]
    fn test_malformed_input_yields_empty_not_panic() {
        for text in ["", "   ", "{{{{", "``json broken", "no travel words at all", "]}{["] {
            let records = extract(text, &PROFILE);
            assert!(records.len() <= PROFILE.limit);
        }
    }

    #[test]
    fn test_limit_is_enforced() {
        let items: Vec<String> = (0..20)
            .map(|i| format!("{{\"airline\": \"A{i}\", \"price\": {i}}}"))
            .collect();
        let text = format!("```json\n{{\"flights\": [{}]}}\n```", items.join(","));
        assert_eq!(extract(&text, &PROFILE).len(), 5);
    }

    proptest::proptest! {
        // The engine's contract: arbitrary input never panics and never
        // exceeds the profile's cap
        #[test]
        fn test_extract_total_on_arbitrary_text(text in ".{0,400}") {
            let records = extract(&text, &PROFILE);
            proptest::prop_assert!(records.len() <= PROFILE.limit);
        }
    }

    #[test]
    fn test_extraction_is_idempotent_over_own_output() {
        let text = r#"```json
{"flights": [{"airline": "Delta", "price": 420, "duration": "2h 5m"}]}
```"#;
        let first = extract(text, &PROFILE);
        let rendered = format!(
            "```json\n{{\"flights\": {}}}\n```",
            serde_json::to_string(&first).unwrap()
        );
        let second = extract(&rendered, &PROFILE);
        assert_eq!(first, second);
    }
}
