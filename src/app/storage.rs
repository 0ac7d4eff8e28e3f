//! Storage collaborator interfaces
//!
//! The core never talks to a database directly. It drives these traits in a
//! fixed order and with explicit flush boundaries; transport, pooling and
//! transactions belong to the implementor.

use crate::Result;
use crate::app::models::{
    DatetimeId, Exception, ExceptionFact, ExceptionId, ExceptionStatus, FactKey, NewException,
    NewResolution, ObservationKey, ObservedValue, Resolution, ResolutionFact, ResolutionId,
};

/// A storage session that can bound its outstanding work
pub trait StoreSession {
    /// Commit everything written since the previous flush
    fn flush(&mut self) -> Result<()>;
}

/// Observation, value and flag tables
///
/// Each method touches a single table so callers can finish one kind of
/// write across a whole chunk before starting the next.
pub trait ObservationStore: StoreSession {
    /// Insert value rows (one per fact)
    fn insert_values(&mut self, values: &[ObservedValue]) -> Result<()>;

    /// Insert flag rows for values that carry flags
    fn insert_flags(&mut self, values: &[ObservedValue]) -> Result<()>;

    /// Update stored values in place
    fn update_values(&mut self, values: &[ObservedValue]) -> Result<()>;

    /// Replace flag rows; an all-clear vector removes the row
    fn update_flags(&mut self, values: &[ObservedValue]) -> Result<()>;

    /// Remove load-log entries for observation rows
    fn delete_load_log(&mut self, observations: &[ObservationKey]) -> Result<()>;

    /// Remove flag rows for every fact of the observation rows
    fn delete_flags(&mut self, observations: &[ObservationKey]) -> Result<()>;

    /// Remove value rows for every fact of the observation rows
    fn delete_values(&mut self, observations: &[ObservationKey]) -> Result<()>;

    /// Remove the parent observation rows
    fn delete_observations(&mut self, observations: &[ObservationKey]) -> Result<()>;

    /// Observation rows stored for a station within an inclusive datetime span
    fn observations_in_range(
        &self,
        station_id: i32,
        begin: DatetimeId,
        end: DatetimeId,
    ) -> Result<Vec<ObservationKey>>;
}

/// Exception, resolution and fact tables
pub trait LedgerStore: StoreSession {
    /// Persist an exception and return its newly assigned id
    fn insert_exception(&mut self, exception: &NewException) -> Result<ExceptionId>;

    fn get_exception(&self, exception_id: ExceptionId) -> Result<Option<Exception>>;

    fn set_exception_status(
        &mut self,
        exception_id: ExceptionId,
        status: ExceptionStatus,
    ) -> Result<()>;

    fn insert_exception_facts(&mut self, facts: &[ExceptionFact]) -> Result<()>;

    fn delete_exception_facts(&mut self, keys: &[FactKey]) -> Result<()>;

    /// Persist a resolution and return its newly assigned id
    fn insert_resolution(&mut self, resolution: &NewResolution) -> Result<ResolutionId>;

    fn get_resolution(&self, resolution_id: ResolutionId) -> Result<Option<Resolution>>;

    fn insert_resolution_facts(&mut self, facts: &[ResolutionFact]) -> Result<()>;

    /// Resolutions scoped to a station within the span
    ///
    /// A resolution is in scope when its owning exception tracks a fact there
    /// or when it has a resolution fact there itself.
    fn resolutions_touching(
        &self,
        station_id: i32,
        begin: DatetimeId,
        end: DatetimeId,
    ) -> Result<Vec<Resolution>>;

    /// Every fact belonging to any of the given resolutions
    fn resolution_facts_for(&self, resolution_ids: &[ResolutionId])
    -> Result<Vec<ResolutionFact>>;
}
