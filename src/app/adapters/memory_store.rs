//! In-memory storage adapter
//!
//! Implements both storage traits over ordered maps. Row dependencies are
//! enforced the way foreign keys would be (flags need a value row, values
//! cannot be deleted while flags remain, and so on) and every call is written
//! to a journal so ordering and flush boundaries can be inspected.

use crate::app::models::{
    DatetimeId, DatetimeRange, Exception, ExceptionFact, ExceptionId, ExceptionStatus, FactKey,
    FlagVector, NewException, NewResolution, ObservationKey, ObservedValue, Resolution,
    ResolutionFact, ResolutionId,
};
use crate::app::storage::{LedgerStore, ObservationStore, StoreSession};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::trace;

/// Storage call recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    InsertValues,
    InsertFlags,
    UpdateValues,
    UpdateFlags,
    DeleteLoadLog,
    DeleteFlags,
    DeleteValues,
    DeleteObservations,
    InsertException,
    SetExceptionStatus,
    InsertExceptionFacts,
    DeleteExceptionFacts,
    InsertResolution,
    InsertResolutionFacts,
    Flush,
}

/// One journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub op: StoreOp,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy)]
struct InjectedFailure {
    op: StoreOp,
    on_call: usize,
}

/// Ordered-map store used by unit and integration tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    observations: BTreeSet<ObservationKey>,
    load_log: BTreeSet<ObservationKey>,
    values: BTreeMap<FactKey, ObservedValue>,
    flags: BTreeMap<FactKey, FlagVector>,
    exceptions: BTreeMap<ExceptionId, Exception>,
    exception_facts: BTreeMap<FactKey, ExceptionFact>,
    resolutions: BTreeMap<ResolutionId, Resolution>,
    resolution_facts: Vec<ResolutionFact>,
    next_exception_id: ExceptionId,
    next_resolution_id: ResolutionId,
    unflushed_rows: usize,
    journal: Vec<StoreEvent>,
    calls: HashMap<StoreOp, usize>,
    failure: Option<InjectedFailure>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_exception_id: 1,
            next_resolution_id: 1,
            ..Default::default()
        }
    }

    /// Make the n-th call (1-based) of `op` fail with a storage error
    pub fn fail_on(mut self, op: StoreOp, on_call: usize) -> Self {
        self.failure = Some(InjectedFailure { op, on_call });
        self
    }

    /// Every storage call so far, in order
    pub fn journal(&self) -> &[StoreEvent] {
        &self.journal
    }

    /// Journal operations without row counts
    pub fn journal_ops(&self) -> Vec<StoreOp> {
        self.journal.iter().map(|event| event.op).collect()
    }

    pub fn flush_count(&self) -> usize {
        self.calls.get(&StoreOp::Flush).copied().unwrap_or(0)
    }

    /// Rows written since the last flush
    pub fn unflushed_rows(&self) -> usize {
        self.unflushed_rows
    }

    pub fn value(&self, key: &FactKey) -> Option<&ObservedValue> {
        self.values.get(key)
    }

    pub fn flags(&self, key: &FactKey) -> Option<FlagVector> {
        self.flags.get(key).copied()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    pub fn load_log_count(&self) -> usize {
        self.load_log.len()
    }

    pub fn exception_fact(&self, key: &FactKey) -> Option<&ExceptionFact> {
        self.exception_facts.get(key)
    }

    pub fn exception_fact_count(&self) -> usize {
        self.exception_facts.len()
    }

    pub fn resolution_fact_count(&self) -> usize {
        self.resolution_facts.len()
    }

    fn record(&mut self, op: StoreOp, rows: usize) -> Result<()> {
        let calls = self.calls.entry(op).or_insert(0);
        *calls += 1;
        let call_number = *calls;

        if let Some(failure) = self.failure {
            if failure.op == op && failure.on_call == call_number {
                return Err(Error::storage(format!(
                    "injected failure on {:?} call {}",
                    op, call_number
                )));
            }
        }

        trace!("{:?} ({} rows)", op, rows);
        self.journal.push(StoreEvent { op, rows });
        if op != StoreOp::Flush {
            self.unflushed_rows += rows;
        }
        Ok(())
    }

    fn keys_for(&self, observations: &[ObservationKey]) -> Vec<FactKey> {
        let wanted: BTreeSet<&ObservationKey> = observations.iter().collect();
        self.values
            .keys()
            .filter(|key| wanted.contains(&key.observation()))
            .copied()
            .collect()
    }

    fn require_exception(&self, exception_id: ExceptionId) -> Result<()> {
        if self.exceptions.contains_key(&exception_id) {
            Ok(())
        } else {
            Err(Error::referential("exception", exception_id))
        }
    }
}

impl StoreSession for MemoryStore {
    fn flush(&mut self) -> Result<()> {
        self.record(StoreOp::Flush, 0)?;
        self.unflushed_rows = 0;
        Ok(())
    }
}

impl ObservationStore for MemoryStore {
    fn insert_values(&mut self, values: &[ObservedValue]) -> Result<()> {
        self.record(StoreOp::InsertValues, values.len())?;
        for value in values {
            if self.values.contains_key(&value.key) {
                return Err(Error::storage(format!("duplicate value row {}", value.key)));
            }
            let observation = value.key.observation();
            self.observations.insert(observation);
            self.load_log.insert(observation);
            self.values.insert(value.key, value.clone());
        }
        Ok(())
    }

    fn insert_flags(&mut self, values: &[ObservedValue]) -> Result<()> {
        self.record(StoreOp::InsertFlags, values.len())?;
        for value in values.iter().filter(|value| value.is_flagged()) {
            if !self.values.contains_key(&value.key) {
                return Err(Error::storage(format!(
                    "flag row for {} has no value row",
                    value.key
                )));
            }
            self.flags.insert(value.key, value.flags);
        }
        Ok(())
    }

    fn update_values(&mut self, values: &[ObservedValue]) -> Result<()> {
        self.record(StoreOp::UpdateValues, values.len())?;
        for value in values {
            let stored = self
                .values
                .get_mut(&value.key)
                .ok_or_else(|| Error::storage(format!("no value row {}", value.key)))?;
            *stored = value.clone();
        }
        Ok(())
    }

    fn update_flags(&mut self, values: &[ObservedValue]) -> Result<()> {
        self.record(StoreOp::UpdateFlags, values.len())?;
        for value in values {
            if !self.values.contains_key(&value.key) {
                return Err(Error::storage(format!(
                    "flag row for {} has no value row",
                    value.key
                )));
            }
            if value.is_flagged() {
                self.flags.insert(value.key, value.flags);
            } else {
                self.flags.remove(&value.key);
            }
        }
        Ok(())
    }

    fn delete_load_log(&mut self, observations: &[ObservationKey]) -> Result<()> {
        self.record(StoreOp::DeleteLoadLog, observations.len())?;
        for observation in observations {
            self.load_log.remove(observation);
        }
        Ok(())
    }

    fn delete_flags(&mut self, observations: &[ObservationKey]) -> Result<()> {
        self.record(StoreOp::DeleteFlags, observations.len())?;
        if let Some(logged) = observations.iter().find(|key| self.load_log.contains(*key)) {
            return Err(Error::storage(format!(
                "load log still references station={} datetime={}",
                logged.station_id, logged.datetime_id
            )));
        }
        for key in self.keys_for(observations) {
            self.flags.remove(&key);
        }
        Ok(())
    }

    fn delete_values(&mut self, observations: &[ObservationKey]) -> Result<()> {
        self.record(StoreOp::DeleteValues, observations.len())?;
        let keys = self.keys_for(observations);
        if let Some(flagged) = keys.iter().find(|key| self.flags.contains_key(*key)) {
            return Err(Error::storage(format!(
                "flag row still references value {}",
                flagged
            )));
        }
        for key in keys {
            self.values.remove(&key);
        }
        Ok(())
    }

    fn delete_observations(&mut self, observations: &[ObservationKey]) -> Result<()> {
        self.record(StoreOp::DeleteObservations, observations.len())?;
        if let Some(key) = self.keys_for(observations).first() {
            return Err(Error::storage(format!(
                "value row {} still references its observation",
                key
            )));
        }
        for observation in observations {
            self.observations.remove(observation);
        }
        Ok(())
    }

    fn observations_in_range(
        &self,
        station_id: i32,
        begin: DatetimeId,
        end: DatetimeId,
    ) -> Result<Vec<ObservationKey>> {
        DatetimeRange::new(begin, end)?;
        let from = ObservationKey {
            station_id,
            datetime_id: begin,
        };
        let to = ObservationKey {
            station_id,
            datetime_id: end,
        };
        Ok(self.observations.range(from..=to).copied().collect())
    }
}

impl LedgerStore for MemoryStore {
    fn insert_exception(&mut self, exception: &NewException) -> Result<ExceptionId> {
        self.record(StoreOp::InsertException, 1)?;
        let exception_id = self.next_exception_id;
        self.next_exception_id += 1;
        self.exceptions.insert(
            exception_id,
            Exception::from_new(exception_id, exception.clone()),
        );
        Ok(exception_id)
    }

    fn get_exception(&self, exception_id: ExceptionId) -> Result<Option<Exception>> {
        Ok(self.exceptions.get(&exception_id).cloned())
    }

    fn set_exception_status(
        &mut self,
        exception_id: ExceptionId,
        status: ExceptionStatus,
    ) -> Result<()> {
        self.record(StoreOp::SetExceptionStatus, 1)?;
        let exception = self
            .exceptions
            .get_mut(&exception_id)
            .ok_or_else(|| Error::referential("exception", exception_id))?;
        exception.status = status;
        Ok(())
    }

    fn insert_exception_facts(&mut self, facts: &[ExceptionFact]) -> Result<()> {
        self.record(StoreOp::InsertExceptionFacts, facts.len())?;
        for fact in facts {
            match fact.exception_id {
                Some(exception_id) => self.require_exception(exception_id)?,
                None => {
                    return Err(Error::storage(format!(
                        "exception fact {} has no exception id",
                        fact.key
                    )));
                }
            }
            self.exception_facts.insert(fact.key, *fact);
        }
        Ok(())
    }

    fn delete_exception_facts(&mut self, keys: &[FactKey]) -> Result<()> {
        self.record(StoreOp::DeleteExceptionFacts, keys.len())?;
        for key in keys {
            self.exception_facts.remove(key);
        }
        Ok(())
    }

    fn insert_resolution(&mut self, resolution: &NewResolution) -> Result<ResolutionId> {
        self.require_exception(resolution.exception_id)?;
        self.record(StoreOp::InsertResolution, 1)?;
        let resolution_id = self.next_resolution_id;
        self.next_resolution_id += 1;
        self.resolutions.insert(
            resolution_id,
            Resolution::from_new(resolution_id, resolution.clone()),
        );
        Ok(resolution_id)
    }

    fn get_resolution(&self, resolution_id: ResolutionId) -> Result<Option<Resolution>> {
        Ok(self.resolutions.get(&resolution_id).cloned())
    }

    fn insert_resolution_facts(&mut self, facts: &[ResolutionFact]) -> Result<()> {
        self.record(StoreOp::InsertResolutionFacts, facts.len())?;
        for fact in facts {
            if !self.resolutions.contains_key(&fact.resolution_id) {
                return Err(Error::referential("resolution", fact.resolution_id));
            }
            self.resolution_facts.push(fact.clone());
        }
        Ok(())
    }

    fn resolutions_touching(
        &self,
        station_id: i32,
        begin: DatetimeId,
        end: DatetimeId,
    ) -> Result<Vec<Resolution>> {
        let exceptions: BTreeSet<ExceptionId> = self
            .exception_facts
            .values()
            .filter(|fact| fact.touches(station_id, begin, end))
            .filter_map(|fact| fact.exception_id)
            .collect();

        let mut ids: BTreeSet<ResolutionId> = self
            .resolution_facts
            .iter()
            .filter(|fact| fact.touches(station_id, begin, end))
            .map(|fact| fact.resolution_id)
            .collect();
        ids.extend(
            self.resolutions
                .values()
                .filter(|resolution| exceptions.contains(&resolution.exception_id))
                .map(|resolution| resolution.resolution_id),
        );

        Ok(ids
            .iter()
            .filter_map(|id| self.resolutions.get(id).cloned())
            .collect())
    }

    fn resolution_facts_for(
        &self,
        resolution_ids: &[ResolutionId],
    ) -> Result<Vec<ResolutionFact>> {
        let wanted: BTreeSet<&ResolutionId> = resolution_ids.iter().collect();
        Ok(self
            .resolution_facts
            .iter()
            .filter(|fact| wanted.contains(&fact.resolution_id))
            .cloned()
            .collect())
    }
}
