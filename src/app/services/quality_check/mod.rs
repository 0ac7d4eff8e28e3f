//! Range and delta quality checks
//!
//! Applies resolved range and delta limits to observed values and sets or
//! clears the RANGE and DELTA flags accordingly. Other flag kinds are left
//! untouched. A value with no resolvable limit is treated as passing.

use crate::Result;
use crate::app::models::{DiscreteQuery, FactKey, FlagKind, ObservedValue};
use crate::app::services::parameter_resolver::ParameterResolver;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub mod checks;

#[cfg(test)]
pub mod tests;

pub use checks::{CheckOutcome, check_delta, check_range};

/// Stream and month context shared by a batch of values
///
/// The month selects monthly overrides for every value in the series, so a
/// series spanning a month boundary must be split and checked once per month.
/// The first hour of each part then has no previous hour to delta-check against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckContext {
    pub stream_id: Option<i32>,
    pub month: Option<i32>,
}

impl CheckContext {
    pub fn new(stream_id: Option<i32>, month: Option<i32>) -> Self {
        Self { stream_id, month }
    }
}

/// Counts from one checking pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub checked: usize,
    pub range_failures: usize,
    pub delta_failures: usize,
    /// Values whose flags differ from before the pass
    pub changed: usize,
}

/// Applies range and delta limits from a resolver
#[derive(Debug, Clone, Copy)]
pub struct QualityChecker<'a> {
    resolver: &'a ParameterResolver,
}

impl<'a> QualityChecker<'a> {
    pub fn new(resolver: &'a ParameterResolver) -> Self {
        Self { resolver }
    }

    fn query(value: &ObservedValue, context: CheckContext) -> DiscreteQuery {
        DiscreteQuery {
            element_id: value.key.element_id,
            stream_id: context.stream_id,
            station_id: Some(value.key.station_id),
            month: context.month,
        }
    }

    /// Check a series of values in place
    ///
    /// Values are sorted by station, element and datetime first. The delta
    /// check compares each value with the one for the same station and
    /// element in the previous hour; a value with no previous hour in the
    /// series is not delta-checked.
    /// Ambiguous parameter configuration aborts the pass.
    pub fn check_series(
        &self,
        values: &mut [ObservedValue],
        context: CheckContext,
    ) -> Result<CheckSummary> {
        values.sort_by_key(|value| {
            (
                value.key.station_id,
                value.key.element_id,
                value.key.datetime_id,
            )
        });

        let mut summary = CheckSummary::default();
        let mut previous: Option<(FactKey, Option<Decimal>)> = None;

        for value in values.iter_mut() {
            let query = Self::query(value, context);
            let current = value.stored_value();
            let before = value.flags;

            let range = check_range(current, self.resolver.range_limits(&query)?);

            let prior = previous
                .filter(|(key, _)| {
                    key.station_id == value.key.station_id
                        && key.element_id == value.key.element_id
                        && key.datetime_id.checked_add(1) == Some(value.key.datetime_id)
                })
                .and_then(|(_, prior)| prior);
            let delta = check_delta(prior, current, self.resolver.delta_limit(&query)?);

            value.flags.set_flagged(FlagKind::Range, range.is_fail());
            value.flags.set_flagged(FlagKind::Delta, delta.is_fail());

            summary.checked += 1;
            summary.range_failures += usize::from(range.is_fail());
            summary.delta_failures += usize::from(delta.is_fail());
            summary.changed += usize::from(value.flags != before);

            previous = Some((value.key, current));
        }

        info!(
            "Checked {} values: {} range and {} delta failures, {} flag changes",
            summary.checked, summary.range_failures, summary.delta_failures, summary.changed
        );
        Ok(summary)
    }
}
