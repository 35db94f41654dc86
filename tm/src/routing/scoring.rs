//! Candidate scoring and recommendation marking
//!
//! Scores are comparable only within one candidate list; the absolute
//! values carry no meaning. A candidate missing the field a priority cares
//! about contributes 0 for that term, so it can still win under balanced
//! scoring but never under the single-axis priorities.

use tracing::debug;

use crate::domain::{TransportCandidate, TransportPriority};

/// Score one candidate under a priority
pub fn score(candidate: &TransportCandidate, priority: TransportPriority) -> f64 {
    match priority {
        TransportPriority::Cheapest => {
            if candidate.price > 0.0 {
                1000.0 / candidate.price
            } else {
                0.0
            }
        }
        TransportPriority::Fastest => match candidate.duration_minutes {
            Some(minutes) if minutes > 0 => 1000.0 / minutes as f64,
            _ => 0.0,
        },
        TransportPriority::Greenest => match candidate.emissions_kg {
            Some(kg) => 1000.0 / (kg + 1.0),
            None => 0.0,
        },
        TransportPriority::Balanced => {
            let price_term = if candidate.price > 0.0 {
                1000.0 / (candidate.price + 1.0)
            } else {
                0.0
            };
            let duration_term = candidate
                .duration_minutes
                .map(|m| 1000.0 / (m as f64 + 1.0))
                .unwrap_or(0.0);
            let emissions_term = candidate
                .emissions_kg
                .map(|kg| 1000.0 / (kg + 1.0))
                .unwrap_or(0.0);
            price_term * 0.3 + duration_term * 0.3 + emissions_term * 0.4
        }
    }
}

/// Mark exactly the top scorer recommended; an empty list marks none
///
/// Existing flags are cleared first so the selector can be re-applied to
/// a merged list without violating the at-most-one invariant.
pub fn mark_recommended(candidates: &mut [TransportCandidate], priority: TransportPriority) {
    for candidate in candidates.iter_mut() {
        candidate.recommended = false;
        candidate.recommendation_reason = None;
    }

    let Some(best) = candidates
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            score(a, priority)
                .partial_cmp(&score(b, priority))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
    else {
        return;
    };

    let winner = &mut candidates[best];
    winner.recommended = true;
    winner.recommendation_reason = Some(format!(
        "Best {} option for the {} priority",
        winner.mode, priority
    ));
    debug!(id = %winner.id, ?priority, "mark_recommended: selected");
}
