//! Most-specific match over wildcard-scoped parameters
//!
//! A parameter matches a query when its element equals the query element and
//! every other dimension is either [`WILDCARD`] or equal to the value the query
//! supplies. A dimension the query leaves open only matches wildcard
//! parameters. Among matches, specificity is compared station first, then
//! month, then stream.

use crate::app::models::{DeltaParameter, DiscreteQuery, DiscreteScope, RangeParameter};
use crate::constants::WILDCARD;
use crate::{Error, Result};
use tracing::debug;

/// A parameter scoped by element, stream, station and month
pub trait Scoped {
    fn scope(&self) -> DiscreteScope;
}

impl Scoped for RangeParameter {
    fn scope(&self) -> DiscreteScope {
        RangeParameter::scope(self)
    }
}

impl Scoped for DeltaParameter {
    fn scope(&self) -> DiscreteScope {
        DeltaParameter::scope(self)
    }
}

/// Concrete dimensions of a scope, in precedence order (station, month, stream)
///
/// Tuples compare lexicographically, so a station-specific parameter beats
/// any station-wildcard one regardless of month or stream.
pub fn specificity(scope: &DiscreteScope) -> (bool, bool, bool) {
    (
        scope.station_id != WILDCARD,
        scope.month != WILDCARD,
        scope.stream_id != WILDCARD,
    )
}

fn dimension_matches(parameter: i32, query: Option<i32>) -> bool {
    parameter == WILDCARD || query == Some(parameter)
}

/// Check whether a parameter scope applies to a query
pub fn matches(scope: &DiscreteScope, query: &DiscreteQuery) -> bool {
    scope.element_id == query.element_id
        && dimension_matches(scope.stream_id, query.stream_id)
        && dimension_matches(scope.station_id, query.station_id)
        && dimension_matches(scope.month, query.month)
}

/// Select the single most specific parameter applying to `query`
///
/// Returns `Ok(None)` when nothing applies. More than one candidate at the
/// highest specificity is an [`Error::AmbiguousParameter`].
pub fn resolve_discrete<'a, P: Scoped>(
    kind: &str,
    candidates: &'a [P],
    query: &DiscreteQuery,
) -> Result<Option<&'a P>> {
    let applicable: Vec<(&'a P, (bool, bool, bool))> = candidates
        .iter()
        .filter_map(|candidate| {
            let scope = candidate.scope();
            matches(&scope, query).then(|| (candidate, specificity(&scope)))
        })
        .collect();

    let Some(best) = applicable.iter().map(|(_, rank)| *rank).max() else {
        debug!("No {} parameter applies to {}", kind, query);
        return Ok(None);
    };

    let mut maximal = applicable.into_iter().filter(|(_, rank)| *rank == best);
    let first = maximal.next().map(|(candidate, _)| candidate);
    let others = maximal.count();

    if others > 0 {
        return Err(Error::ambiguous_parameter(
            kind,
            query.to_string(),
            others + 1,
        ));
    }

    if let Some(candidate) = first {
        debug!("Resolved {} parameter {} for {}", kind, candidate.scope(), query);
    }
    Ok(first)
}
