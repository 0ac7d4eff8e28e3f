//! Parameter resolution service
//!
//! Answers two kinds of question over a read-only parameter source:
//! - which range or delta limit applies to an element, given whatever stream,
//!   station and month are known (most specific wildcard match), and
//! - which effective-dated station record (rain gauge installation) was in
//!   force on a date.
//!
//! Lookups that find nothing return `None`; callers treat that as "no
//! constraint defined". Only an ambiguous configuration is an error.

use crate::app::models::{
    DeltaLimit, DeltaParameter, DiscreteQuery, EffectiveRecord, GaugeInstall, ParameterSet,
    RangeLimits, RangeParameter,
};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub mod discrete;
pub mod temporal;

#[cfg(test)]
pub mod tests;

pub use discrete::{Scoped, matches, resolve_discrete, specificity};
pub use temporal::{TemporalMatch, TemporalNote, resolve_temporal};

/// Indexed parameter source
///
/// Range and delta parameters are indexed by element id, gauge installs by
/// station id. The resolver holds no mutable state after construction.
#[derive(Debug, Clone, Default)]
pub struct ParameterResolver {
    range: HashMap<i32, Vec<RangeParameter>>,
    delta: HashMap<i32, Vec<DeltaParameter>>,
    gauge: HashMap<i32, Vec<EffectiveRecord<GaugeInstall>>>,
}

impl ParameterResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a validated parameter set
    pub fn from_set(set: ParameterSet) -> Result<Self> {
        set.validate()?;

        let mut resolver = Self::new();
        for parameter in set.range {
            resolver
                .range
                .entry(parameter.element_id)
                .or_default()
                .push(parameter);
        }
        for parameter in set.delta {
            resolver
                .delta
                .entry(parameter.element_id)
                .or_default()
                .push(parameter);
        }
        for record in set.gauge {
            resolver
                .gauge
                .entry(record.station_id)
                .or_default()
                .push(record);
        }

        info!(
            "Indexed {} range, {} delta and {} gauge records",
            resolver.range.values().map(Vec::len).sum::<usize>(),
            resolver.delta.values().map(Vec::len).sum::<usize>(),
            resolver.gauge.values().map(Vec::len).sum::<usize>()
        );
        Ok(resolver)
    }

    /// Load and index a TOML parameter file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::io(
                format!("Failed to read parameter file {}", path.display()),
                e,
            )
        })?;
        let set: ParameterSet = toml::from_str(&text).map_err(|e| {
            Error::config_parse(path.display().to_string(), e.message().to_string(), Some(e))
        })?;
        Self::from_set(set)
    }

    /// Most specific range parameter for a query
    pub fn range_parameter(&self, query: &DiscreteQuery) -> Result<Option<&RangeParameter>> {
        match self.range.get(&query.element_id) {
            Some(candidates) => resolve_discrete("range", candidates, query),
            None => Ok(None),
        }
    }

    /// Most specific delta parameter for a query
    pub fn delta_parameter(&self, query: &DiscreteQuery) -> Result<Option<&DeltaParameter>> {
        match self.delta.get(&query.element_id) {
            Some(candidates) => resolve_discrete("delta", candidates, query),
            None => Ok(None),
        }
    }

    pub fn range_limits(&self, query: &DiscreteQuery) -> Result<Option<RangeLimits>> {
        Ok(self.range_parameter(query)?.map(RangeParameter::limits))
    }

    pub fn delta_limit(&self, query: &DiscreteQuery) -> Result<Option<DeltaLimit>> {
        Ok(self.delta_parameter(query)?.map(DeltaParameter::limit))
    }

    /// Gauge installation in force at a station on a date
    pub fn gauge_install(
        &self,
        station_id: i32,
        date: NaiveDate,
    ) -> Option<TemporalMatch<'_, GaugeInstall>> {
        self.gauge
            .get(&station_id)
            .and_then(|records| resolve_temporal(records, date))
    }

    /// Stations with at least one gauge installation, ascending
    pub fn gauge_stations(&self) -> Vec<i32> {
        let mut stations: Vec<i32> = self.gauge.keys().copied().collect();
        stations.sort_unstable();
        stations
    }

    /// Total number of indexed records
    pub fn len(&self) -> usize {
        self.range.values().map(Vec::len).sum::<usize>()
            + self.delta.values().map(Vec::len).sum::<usize>()
            + self.gauge.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
