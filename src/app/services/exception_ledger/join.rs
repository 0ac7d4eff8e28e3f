//! Resolution to fact join

use crate::app::models::{Resolution, ResolutionFact, ResolutionId, ResolutionWithFacts};
use std::collections::HashMap;

/// Attach each fact to the resolution with the same id
///
/// Resolution order is kept. A resolution without facts gets an empty list;
/// facts whose resolution is not in `resolutions` are dropped.
pub fn join_facts(
    resolutions: Vec<Resolution>,
    facts: Vec<ResolutionFact>,
) -> Vec<ResolutionWithFacts> {
    let mut by_resolution: HashMap<ResolutionId, Vec<ResolutionFact>> = HashMap::new();
    for fact in facts {
        by_resolution
            .entry(fact.resolution_id)
            .or_default()
            .push(fact);
    }

    resolutions
        .into_iter()
        .map(|resolution| {
            let facts = by_resolution
                .remove(&resolution.resolution_id)
                .unwrap_or_default();
            ResolutionWithFacts { resolution, facts }
        })
        .collect()
}
