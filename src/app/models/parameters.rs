//! Resolver parameter records and query keys
//!
//! Discrete parameters (range and delta limits) are scoped by element, stream,
//! station and month, where [`WILDCARD`] in a dimension means "any value".
//! Effective-dated records (gauge installs) are scoped by station and apply
//! from their effective date until superseded.

use crate::constants::{MONTH_RANGE, WILDCARD};
use crate::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

fn wildcard() -> i32 {
    WILDCARD
}

// =============================================================================
// Discrete Scope
// =============================================================================

/// Dimensions a discrete parameter is scoped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteScope {
    pub element_id: i32,
    pub stream_id: i32,
    pub station_id: i32,
    pub month: i32,
}

impl DiscreteScope {
    /// Check the scope's own values are well formed
    pub fn validate(&self) -> Result<()> {
        if self.month != WILDCARD && !MONTH_RANGE.contains(&self.month) {
            return Err(Error::data_validation(format!(
                "Invalid month {} for element {}: must be 1-12 or {}",
                self.month, self.element_id, WILDCARD
            )));
        }
        Ok(())
    }
}

impl fmt::Display for DiscreteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "element={} stream={} station={} month={}",
            self.element_id, self.stream_id, self.station_id, self.month
        )
    }
}

/// Lookup key for a discrete parameter
///
/// The element must match exactly; every other dimension is optional and an
/// absent dimension only matches wildcard parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DiscreteQuery {
    pub element_id: i32,
    pub stream_id: Option<i32>,
    pub station_id: Option<i32>,
    pub month: Option<i32>,
}

impl DiscreteQuery {
    pub fn new(element_id: i32) -> Self {
        Self {
            element_id,
            ..Default::default()
        }
    }

    pub fn stream(mut self, stream_id: i32) -> Self {
        self.stream_id = Some(stream_id);
        self
    }

    pub fn station(mut self, station_id: i32) -> Self {
        self.station_id = Some(station_id);
        self
    }

    pub fn month(mut self, month: i32) -> Self {
        self.month = Some(month);
        self
    }
}

impl fmt::Display for DiscreteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(value: Option<i32>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "element={} stream={} station={} month={}",
            self.element_id,
            show(self.stream_id),
            show(self.station_id),
            show(self.month)
        )
    }
}

// =============================================================================
// Range and Delta Parameters
// =============================================================================

/// Inclusive bounds a value must fall within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeLimits {
    pub min: Decimal,
    pub max: Decimal,
}

impl RangeLimits {
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Largest accepted change between consecutive values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeltaLimit {
    pub max_delta: Decimal,
}

/// Range limits for an element, optionally narrowed by stream, station and month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeParameter {
    pub element_id: i32,
    #[serde(default = "wildcard")]
    pub stream_id: i32,
    #[serde(default = "wildcard")]
    pub station_id: i32,
    #[serde(default = "wildcard")]
    pub month: i32,
    pub min: Decimal,
    pub max: Decimal,
}

impl RangeParameter {
    pub fn scope(&self) -> DiscreteScope {
        DiscreteScope {
            element_id: self.element_id,
            stream_id: self.stream_id,
            station_id: self.station_id,
            month: self.month,
        }
    }

    pub fn limits(&self) -> RangeLimits {
        RangeLimits {
            min: self.min,
            max: self.max,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.scope().validate()?;
        if self.min > self.max {
            return Err(Error::data_validation(format!(
                "Range parameter {} has min {} above max {}",
                self.scope(),
                self.min,
                self.max
            )));
        }
        Ok(())
    }
}

/// Delta limit for an element, optionally narrowed by stream, station and month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaParameter {
    pub element_id: i32,
    #[serde(default = "wildcard")]
    pub stream_id: i32,
    #[serde(default = "wildcard")]
    pub station_id: i32,
    #[serde(default = "wildcard")]
    pub month: i32,
    pub max_delta: Decimal,
}

impl DeltaParameter {
    pub fn scope(&self) -> DiscreteScope {
        DiscreteScope {
            element_id: self.element_id,
            stream_id: self.stream_id,
            station_id: self.station_id,
            month: self.month,
        }
    }

    pub fn limit(&self) -> DeltaLimit {
        DeltaLimit {
            max_delta: self.max_delta,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.scope().validate()?;
        if self.max_delta.is_sign_negative() {
            return Err(Error::data_validation(format!(
                "Delta parameter {} has negative max_delta {}",
                self.scope(),
                self.max_delta
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Effective-Dated Records
// =============================================================================

/// A value that applies to a station from its effective date until superseded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRecord<V> {
    pub station_id: i32,
    pub effective_date: NaiveDate,
    /// Insertion sequence; orders records sharing an effective date
    pub ordinal: i64,
    pub value: V,
}

/// Rain gauge installation details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeInstall {
    /// Orifice depth in millimetres
    pub depth_mm: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// =============================================================================
// Parameter Set
// =============================================================================

/// Read-only parameter source consumed by the resolver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default)]
    pub range: Vec<RangeParameter>,
    #[serde(default)]
    pub delta: Vec<DeltaParameter>,
    #[serde(default)]
    pub gauge: Vec<EffectiveRecord<GaugeInstall>>,
}

impl ParameterSet {
    /// Parse a parameter set from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let set: ParameterSet = toml::from_str(text)?;
        set.validate()?;
        Ok(set)
    }

    /// Validate every parameter's own values
    pub fn validate(&self) -> Result<()> {
        for parameter in &self.range {
            parameter.validate()?;
        }
        for parameter in &self.delta {
            parameter.validate()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.range.len() + self.delta.len() + self.gauge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
