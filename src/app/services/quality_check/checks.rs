//! Single-value range and delta checks

use crate::app::models::{DeltaLimit, RangeLimits};
use rust_decimal::Decimal;
use serde::Serialize;

/// Result of checking one value against one limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Pass,
    Fail,
    /// No value or no limit defined
    NotChecked,
}

impl CheckOutcome {
    pub fn is_fail(self) -> bool {
        self == Self::Fail
    }
}

/// Check a value against inclusive range limits
pub fn check_range(value: Option<Decimal>, limits: Option<RangeLimits>) -> CheckOutcome {
    match (value, limits) {
        (Some(value), Some(limits)) if limits.contains(value) => CheckOutcome::Pass,
        (Some(_), Some(_)) => CheckOutcome::Fail,
        _ => CheckOutcome::NotChecked,
    }
}

/// Check the change from the previous hour's value
///
/// A change equal to `max_delta` passes.
pub fn check_delta(
    previous: Option<Decimal>,
    current: Option<Decimal>,
    limit: Option<DeltaLimit>,
) -> CheckOutcome {
    match (previous, current, limit) {
        (Some(previous), Some(current), Some(limit)) => {
            if (current - previous).abs() > limit.max_delta {
                CheckOutcome::Fail
            } else {
                CheckOutcome::Pass
            }
        }
        _ => CheckOutcome::NotChecked,
    }
}
