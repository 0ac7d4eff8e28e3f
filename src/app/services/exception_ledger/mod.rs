//! Exception ledger service
//!
//! Tracks flagged data as exceptions and records the resolutions applied to
//! them. Status values are stored as given: the documented lifecycle
//! (OPEN, OPEN_PARTIAL, then one of the closed states) is the caller's to
//! follow, and transitions outside it are only logged.
//!
//! Fact collections go through the [`BatchPersister`] so that large exceptions
//! are written in flushed chunks like any other bulk data.

use crate::app::adapters::cache::CacheScope;
use crate::app::models::{
    DatetimeId, DatetimeRange, Exception, ExceptionFact, ExceptionId, ExceptionStatus, FactKey,
    NewException, NewResolution, ObservedValue, ReapplyPolicy, ReplacementValue, Resolution,
    ResolutionFact, ResolutionId, ResolutionWithFacts, TicketRef,
};
use crate::app::services::batch_persister::{BatchPersister, BatchStats};
use crate::app::storage::LedgerStore;
use crate::config::QcConfig;
use crate::constants::{DEFAULT_TICKET_SYSTEM, MAX_DESCRIPTION_LENGTH};
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

pub mod join;

#[cfg(test)]
pub mod tests;

pub use join::join_facts;

/// Outcome of opening an exception over flagged values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedException {
    pub exception_id: ExceptionId,
    pub facts: usize,
}

/// Ledger over a storage collaborator
#[derive(Debug)]
pub struct ExceptionLedger<S> {
    store: S,
    persister: BatchPersister,
    default_ticket_system: String,
}

impl<S: LedgerStore> ExceptionLedger<S> {
    pub fn new(store: S, persister: BatchPersister) -> Self {
        Self {
            store,
            persister,
            default_ticket_system: DEFAULT_TICKET_SYSTEM.to_string(),
        }
    }

    /// Create a ledger using the batch and ledger sections of the configuration
    pub fn from_config(store: S, config: &QcConfig) -> Result<Self> {
        let persister = BatchPersister::from_config(&config.batch)?;
        Ok(Self::new(store, persister)
            .with_default_ticket_system(config.ledger.default_ticket_system.clone()))
    }

    pub fn with_default_ticket_system(mut self, system: impl Into<String>) -> Self {
        self.default_ticket_system = system.into();
        self
    }

    /// Ticket reference in the default ticket system
    pub fn ticket(&self, ticket_id: impl Into<String>) -> TicketRef {
        TicketRef::new(self.default_ticket_system.clone(), ticket_id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn require_exception(&self, exception_id: ExceptionId) -> Result<Exception> {
        self.store
            .get_exception(exception_id)?
            .ok_or_else(|| Error::referential("exception", exception_id))
    }

    fn require_resolution(&self, resolution_id: ResolutionId) -> Result<Resolution> {
        self.store
            .get_resolution(resolution_id)?
            .ok_or_else(|| Error::referential("resolution", resolution_id))
    }

    /// Persist a new exception and return its assigned id
    pub fn create_exception(
        &mut self,
        ticket: TicketRef,
        description: impl Into<String>,
        status: ExceptionStatus,
    ) -> Result<ExceptionId> {
        let description = description.into();
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::data_validation(format!(
                "Exception description exceeds {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        if ticket.system.trim().is_empty() {
            return Err(Error::data_validation("Ticket system cannot be empty"));
        }

        let exception_id = self.store.insert_exception(&NewException {
            ticket,
            description,
            status,
        })?;
        self.store.flush()?;

        info!("Created exception {} with status {}", exception_id, status);
        self.persister.invalidate(CacheScope::Exceptions);
        Ok(exception_id)
    }

    /// Look up an exception; `None` means no such exception
    pub fn exception(&self, exception_id: ExceptionId) -> Result<Option<Exception>> {
        self.store.get_exception(exception_id)
    }

    /// Track flagged facts under an existing exception
    pub fn attach_facts(
        &mut self,
        exception_id: ExceptionId,
        keys: &[FactKey],
    ) -> Result<BatchStats> {
        self.require_exception(exception_id)?;

        let facts: Vec<ExceptionFact> = keys
            .iter()
            .map(|key| ExceptionFact::assigned(*key, exception_id))
            .collect();
        let stats = self
            .persister
            .insert_exception_facts(&mut self.store, &facts)?;

        self.persister.invalidate(CacheScope::Exceptions);
        Ok(stats)
    }

    /// Stop tracking facts, whichever exception they belong to
    pub fn detach_facts(&mut self, keys: &[FactKey]) -> Result<BatchStats> {
        self.persister.delete_exception_facts(&mut self.store, keys)
    }

    /// Record a new status for an exception
    ///
    /// Any status is accepted. Transitions outside the documented lifecycle
    /// are logged as warnings.
    pub fn update_status(
        &mut self,
        exception_id: ExceptionId,
        status: ExceptionStatus,
    ) -> Result<()> {
        let current = self.require_exception(exception_id)?;

        if current.status == status {
            debug!("Exception {} already {}", exception_id, status);
        } else if !current.status.permits(status) {
            warn!(
                "Exception {} moved from {} to {} outside the documented lifecycle",
                exception_id, current.status, status
            );
        }

        self.store.set_exception_status(exception_id, status)?;
        self.store.flush()?;
        info!(
            "Exception {} status {} -> {}",
            exception_id, current.status, status
        );
        self.persister.invalidate(CacheScope::Exceptions);
        Ok(())
    }

    /// Record a resolution against an existing exception
    pub fn create_resolution(
        &mut self,
        exception_id: ExceptionId,
        correction_ref: impl Into<String>,
        reapply: ReapplyPolicy,
    ) -> Result<ResolutionId> {
        self.require_exception(exception_id)?;

        let resolution_id = self.store.insert_resolution(&NewResolution {
            exception_id,
            correction_ref: correction_ref.into(),
            reapply,
        })?;
        self.store.flush()?;

        info!(
            "Created resolution {} for exception {} (reapply {})",
            resolution_id, exception_id, reapply
        );
        Ok(resolution_id)
    }

    /// Record the values a resolution touches and their replacements
    pub fn attach_resolution_facts(
        &mut self,
        resolution_id: ResolutionId,
        facts: impl IntoIterator<Item = (FactKey, ReplacementValue)>,
    ) -> Result<BatchStats> {
        self.require_resolution(resolution_id)?;

        let facts: Vec<ResolutionFact> = facts
            .into_iter()
            .map(|(key, replacement)| ResolutionFact::new(resolution_id, key, replacement))
            .collect();
        self.persister
            .insert_resolution_facts(&mut self.store, &facts)
    }

    /// Resolutions touching one value's station and datetime, with their facts
    ///
    /// `None` as the filter selects every reapply policy.
    pub fn resolutions_for_fact(
        &self,
        station_id: i32,
        datetime_id: DatetimeId,
        filter: Option<ReapplyPolicy>,
    ) -> Result<Vec<ResolutionWithFacts>> {
        self.resolutions_for_range(station_id, DatetimeRange::single(datetime_id), filter)
    }

    /// Resolutions touching a station within a datetime span, with their facts
    ///
    /// A resolution is in scope through its owning exception's facts or its
    /// own resolution facts. Each resolution carries every one of its facts,
    /// not only those inside the span, and an empty list when it has none.
    pub fn resolutions_for_range(
        &self,
        station_id: i32,
        range: DatetimeRange,
        filter: Option<ReapplyPolicy>,
    ) -> Result<Vec<ResolutionWithFacts>> {
        let resolutions: Vec<Resolution> = self
            .store
            .resolutions_touching(station_id, range.begin, range.end)?
            .into_iter()
            .filter(|resolution| resolution.reapply.matches_filter(filter))
            .collect();

        if resolutions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ResolutionId> = resolutions.iter().map(|r| r.resolution_id).collect();
        let facts = self.store.resolution_facts_for(&ids)?;

        debug!(
            "Station {} datetimes {}..={}: {} resolution(s), {} fact(s)",
            station_id,
            range.begin,
            range.end,
            resolutions.len(),
            facts.len()
        );
        Ok(join_facts(resolutions, facts))
    }

    /// A single resolution with its facts
    pub fn resolution(&self, resolution_id: ResolutionId) -> Result<Option<ResolutionWithFacts>> {
        let Some(resolution) = self.store.get_resolution(resolution_id)? else {
            return Ok(None);
        };
        let facts = self.store.resolution_facts_for(&[resolution_id])?;
        Ok(join_facts(vec![resolution], facts).pop())
    }

    /// Open an exception over every flagged value in `values`
    ///
    /// Returns `None`, creating nothing, when no value is flagged.
    pub fn open_for_flagged(
        &mut self,
        ticket: TicketRef,
        description: impl Into<String>,
        values: &[ObservedValue],
    ) -> Result<Option<OpenedException>> {
        let keys: Vec<FactKey> = values
            .iter()
            .filter(|value| value.is_flagged())
            .map(|value| value.key)
            .collect();

        if keys.is_empty() {
            debug!("No flagged values, no exception opened");
            return Ok(None);
        }

        let exception_id = self.create_exception(ticket, description, ExceptionStatus::Open)?;
        let stats = self.attach_facts(exception_id, &keys)?;

        Ok(Some(OpenedException {
            exception_id,
            facts: stats.records,
        }))
    }
}
