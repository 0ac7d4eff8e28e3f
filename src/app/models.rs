//! Data models for station QC
//!
//! This module contains the core data structures for observed values and their
//! identifying keys. Flag vectors, ledger records and resolver parameters live
//! in the submodules and are re-exported here.

use crate::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod flags;
pub mod ledger;
pub mod parameters;

pub use flags::{FlagKind, FlagVector};
pub use ledger::{
    Exception, ExceptionFact, ExceptionStatus, NewException, NewResolution, ReapplyPolicy,
    ReplacementValue, Resolution, ResolutionFact, ResolutionWithFacts, TicketRef,
};
pub use parameters::{
    DeltaLimit, DeltaParameter, DiscreteQuery, DiscreteScope, EffectiveRecord, GaugeInstall,
    ParameterSet, RangeLimits, RangeParameter,
};

/// Dense hourly timestamp identifier
pub type DatetimeId = i32;

/// Identifier assigned to an exception on creation
pub type ExceptionId = i64;

/// Identifier assigned to a resolution on insert
pub type ResolutionId = i64;

// =============================================================================
// Keys
// =============================================================================

/// Identity of one observation row: a station at an hourly datetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservationKey {
    pub station_id: i32,
    pub datetime_id: DatetimeId,
}

/// Identity of one observed value
///
/// Field order gives the natural (station, datetime, element) ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactKey {
    pub station_id: i32,
    pub datetime_id: DatetimeId,
    pub element_id: i32,
}

impl FactKey {
    pub fn new(station_id: i32, datetime_id: DatetimeId, element_id: i32) -> Self {
        Self {
            station_id,
            datetime_id,
            element_id,
        }
    }

    /// Observation row this value belongs to
    pub fn observation(&self) -> ObservationKey {
        ObservationKey {
            station_id: self.station_id,
            datetime_id: self.datetime_id,
        }
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "station={} datetime={} element={}",
            self.station_id, self.datetime_id, self.element_id
        )
    }
}

/// Inclusive span of datetime ids for one station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatetimeRange {
    pub begin: DatetimeId,
    pub end: DatetimeId,
}

impl DatetimeRange {
    /// Create a range, rejecting `begin > end`
    pub fn new(begin: DatetimeId, end: DatetimeId) -> Result<Self> {
        let range = Self { begin, end };
        range.validate()?;
        Ok(range)
    }

    /// Reject ranges built directly with `begin > end`
    pub fn validate(&self) -> Result<()> {
        if self.begin > self.end {
            return Err(Error::data_validation(format!(
                "Datetime range begin {} is after end {}",
                self.begin, self.end
            )));
        }
        Ok(())
    }

    /// Range covering a single datetime
    pub fn single(datetime_id: DatetimeId) -> Self {
        Self {
            begin: datetime_id,
            end: datetime_id,
        }
    }

    /// Number of datetime ids covered
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (i64::from(self.end) - i64::from(self.begin) + 1) as usize
    }

    pub fn contains(&self, datetime_id: DatetimeId) -> bool {
        (self.begin..=self.end).contains(&datetime_id)
    }
}

// =============================================================================
// Observed Value
// =============================================================================

/// A single numeric observation with its QC flags and precision hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedValue {
    /// Station, datetime and element identity
    pub key: FactKey,

    /// Stored value; `None` when the station reported nothing
    pub value: Option<Decimal>,

    /// QC flags raised against this value
    #[serde(default)]
    pub flags: FlagVector,

    /// Decimal places the value is stored with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_precision: Option<u32>,

    /// Decimal places the value is published with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_precision: Option<u32>,
}

impl ObservedValue {
    /// Create an unflagged value without precision hints
    pub fn new(key: FactKey, value: Option<Decimal>) -> Self {
        Self {
            key,
            value,
            flags: FlagVector::clear(),
            stored_precision: None,
            published_precision: None,
        }
    }

    /// Set both precision hints
    pub fn with_precision(mut self, stored: Option<u32>, published: Option<u32>) -> Self {
        self.stored_precision = stored;
        self.published_precision = published;
        self
    }

    /// Replace the flag vector
    pub fn with_flags(mut self, flags: FlagVector) -> Self {
        self.flags = flags;
        self
    }

    /// Value as stored, rounded to the stored precision when one is recorded
    pub fn stored_value(&self) -> Option<Decimal> {
        self.value.map(|value| round_to(value, self.stored_precision))
    }

    /// Value as published
    ///
    /// Rounded to the published precision only when that hint is present;
    /// otherwise the stored value is shown unrounded.
    pub fn published_value(&self) -> Option<Decimal> {
        self.value.map(|value| round_to(value, self.published_precision))
    }

    /// Check whether any QC flag is raised
    pub fn is_flagged(&self) -> bool {
        self.flags.is_flagged()
    }
}

fn round_to(value: Decimal, places: Option<u32>) -> Decimal {
    match places {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    }
}
