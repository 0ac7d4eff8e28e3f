//! Statistics returned by bulk operations

use crate::app::models::DatetimeRange;
use serde::Serialize;

/// Outcome of a chunked write or delete
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchStats {
    /// Name of the bulk operation
    pub operation: String,
    /// Records handed to the operation
    pub records: usize,
    /// Number of records in each chunk, in order
    pub chunk_sizes: Vec<usize>,
    /// Flushes issued
    pub flushes: usize,
}

impl BatchStats {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Default::default()
        }
    }

    pub fn chunks(&self) -> usize {
        self.chunk_sizes.len()
    }

    /// Records written across all chunks
    pub fn records_written(&self) -> usize {
        self.chunk_sizes.iter().sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} records in {} chunk(s), {} flush(es)",
            self.operation,
            self.records,
            self.chunks(),
            self.flushes
        )
    }
}

/// Outcome of a datetime span delete
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RangeDeleteStats {
    pub station_id: i32,
    /// Sub-ranges deleted, in order
    pub sub_ranges: Vec<DatetimeRange>,
    /// Observation rows removed
    pub observations_deleted: usize,
    pub flushes: usize,
}

impl RangeDeleteStats {
    pub fn summary(&self) -> String {
        format!(
            "station {}: {} observations deleted over {} sub-range(s), {} flush(es)",
            self.station_id,
            self.observations_deleted,
            self.sub_ranges.len(),
            self.flushes
        )
    }
}
