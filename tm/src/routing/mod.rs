//! Route analysis and transport selection
//!
//! Pure decision logic for the transportation stage: which mode to search
//! at all, how to score competing candidates under a priority, and how to
//! recognize routes that need a ground leg from the arrival airport.

mod analyzer;
mod scoring;
mod transfers;

pub use analyzer::{RouteAnalysis, fallback_analysis, parse_analysis};
pub use scoring::{mark_recommended, score};
pub use transfers::{dedup_transfers, infer_airports, is_specific_address};
