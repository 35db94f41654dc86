//! Stage result envelope
//!
//! Every pipeline stage produces a StageOutput: the typed records it
//! extracted, the raw text they came from, and whether the stage met its
//! minimum useful record count. Downstream stages consume these through
//! the typed StageContext, never through a generic map.

use serde::{Deserialize, Serialize};

/// The closed set of pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Lodging,
    Dining,
    Transportation,
    Activities,
    Budget,
    Itinerary,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lodging => "lodging",
            Self::Dining => "dining",
            Self::Transportation => "transportation",
            Self::Activities => "activities",
            Self::Budget => "budget",
            Self::Itinerary => "itinerary",
        };
        write!(f, "{name}")
    }
}

/// Result of one stage invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput<T> {
    pub kind: StageKind,
    pub records: Vec<T>,
    /// The generation-service text the records were extracted from
    pub raw_text: String,
    /// Whether the stage produced at least its minimum useful count
    pub met_minimum: bool,
}

impl<T> StageOutput<T> {
    pub fn new(kind: StageKind, records: Vec<T>, raw_text: String, min_records: usize) -> Self {
        let met_minimum = records.len() >= min_records;
        Self {
            kind,
            records,
            raw_text,
            met_minimum,
        }
    }

    /// Empty output for a failed or skipped stage branch
    pub fn empty(kind: StageKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            raw_text: String::new(),
            met_minimum: false,
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
