//! Intent classifier
//!
//! Pure lexical classification of a follow-up utterance into
//! (intent, category, action, confidence). Question keywords outrank
//! modification keywords, so an utterance matching both reads as a query;
//! greetings only count when neither fires. Ambiguous input defaults to a
//! low-confidence query - never a silent mutation.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the user wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Modify,
    Query,
    Chat,
}

/// Which part of the plan the utterance is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Accommodation,
    Transportation,
    Restaurant,
    Experience,
    Budget,
    General,
}

/// The concrete operation implied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpAction {
    Add,
    Change,
    Remove,
    Find,
    Info,
    Chat,
}

/// Classification result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub category: Category,
    pub action: FollowUpAction,
    pub confidence: f64,
}

const MODIFY_KEYWORDS: &[&str] = &[
    "add", "change", "modify", "update", "replace", "remove", "delete", "switch", "edit", "make it", "make them",
];

const QUERY_KEYWORDS: &[&str] = &[
    "what", "which", "where", "when", "how", "why", "tell me", "explain", "describe", "information", "details",
    "about", "more about", "is the", "are the", "can you tell", "do you know",
];

const CHAT_KEYWORDS: &[&str] = &[
    "hello", "hi", "hey", "thanks", "thank you", "ok", "okay", "sure", "yes", "no",
];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Classify a follow-up utterance
pub fn classify(utterance: &str) -> Classification {
    let lower = utterance.to_lowercase();

    // Questions outrank modifications; chat only when neither fires
    let has_query = contains_any(&lower, QUERY_KEYWORDS);
    let has_modify = contains_any(&lower, MODIFY_KEYWORDS) && !has_query;
    let has_chat = contains_any(&lower, CHAT_KEYWORDS) && !has_query;

    // First match in fixed precedence order
    let category = if contains_any(&lower, &["hotel", "accommodation", "stay", "lodging", "place to stay"]) {
        Category::Accommodation
    } else if contains_any(&lower, &["flight", "train", "bus", "car", "transport", "travel", "transportation", "ride"])
    {
        Category::Transportation
    } else if contains_any(&lower, &["restaurant", "food", "meal", "dining", "eat", "cafe", "lunch", "dinner", "breakfast"])
    {
        Category::Restaurant
    } else if contains_any(&lower, &["activity", "experience", "thing to do", "attraction", "tour", "sightseeing"]) {
        Category::Experience
    } else if contains_any(&lower, &["budget", "cost", "price", "expensive", "cheap", "affordable", "money"]) {
        Category::Budget
    } else {
        Category::General
    };

    let action = if contains_any(&lower, &["add", "more", "additional", "extra"]) {
        FollowUpAction::Add
    } else if contains_any(&lower, &["change", "modify", "update", "switch", "replace"]) {
        FollowUpAction::Change
    } else if contains_any(&lower, &["remove", "delete", "cancel"]) {
        FollowUpAction::Remove
    } else if contains_any(&lower, &["find", "get", "show", "give"]) {
        FollowUpAction::Find
    } else if has_chat && !has_query {
        FollowUpAction::Chat
    } else {
        FollowUpAction::Info
    };

    let (intent, confidence) = if has_query {
        (Intent::Query, 0.9)
    } else if has_modify {
        (Intent::Modify, 0.8)
    } else if has_chat {
        (Intent::Chat, 0.9)
    } else {
        // No signal at all: read, never mutate
        (Intent::Query, 0.5)
    };

    debug!(?intent, ?category, ?action, confidence, "classify: done");
    Classification {
        intent,
        category,
        action,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_about_restaurants() {
        let c = classify("What restaurants are nearby?");
        assert_eq!(c.intent, Intent::Query);
        assert_eq!(c.category, Category::Restaurant);
        assert_eq!(c.confidence, 0.9);
    }

    #[test]
    fn test_add_hiking_activities() {
        let c = classify("Add more hiking activities");
        assert_eq!(c.intent, Intent::Modify);
        assert_eq!(c.category, Category::Experience);
        assert_eq!(c.action, FollowUpAction::Add);
    }

    #[test]
    fn test_change_hotel() {
        let c = classify("Change my hotel");
        assert_eq!(c.intent, Intent::Modify);
        assert_eq!(c.category, Category::Accommodation);
        assert_eq!(c.action, FollowUpAction::Change);
    }

    #[test]
    fn test_question_outranks_modify() {
        // "change" appears, but the question word wins
        let c = classify("What would change if we took the train?");
        assert_eq!(c.intent, Intent::Query);
        assert_eq!(c.category, Category::Transportation);
    }

    #[test]
    fn test_greeting_is_chat() {
        let c = classify("thanks!");
        assert_eq!(c.intent, Intent::Chat);
        assert_eq!(c.action, FollowUpAction::Chat);
    }

    #[test]
    fn test_no_signal_defaults_to_low_confidence_query() {
        let c = classify("hmm interesting");
        assert_eq!(c.intent, Intent::Query);
        assert_eq!(c.confidence, 0.5);
        assert_eq!(c.category, Category::General);
    }

    #[test]
    fn test_budget_category() {
        // "find" carries the action but is not a modification keyword,
        // so the intent stays a (low-confidence) read
        let c = classify("find cheaper options");
        assert_eq!(c.category, Category::Budget);
        assert_eq!(c.intent, Intent::Query);
        assert_eq!(c.action, FollowUpAction::Find);
    }

    #[test]
    fn test_update_transportation_is_modify() {
        let c = classify("update the flight to something faster");
        assert_eq!(c.intent, Intent::Modify);
        assert_eq!(c.category, Category::Transportation);
        assert_eq!(c.action, FollowUpAction::Change);
    }
}
