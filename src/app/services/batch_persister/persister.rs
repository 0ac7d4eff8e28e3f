//! Batch persister implementation

use crate::app::adapters::cache::{CacheInvalidator, CacheScope, NoCache};
use crate::app::models::{
    DatetimeRange, ExceptionFact, FactKey, ObservationKey, ObservedValue, ResolutionFact,
};
use crate::app::storage::{LedgerStore, ObservationStore, StoreSession};
use crate::config::BatchConfig;
use crate::constants::{BATCH_PROGRESS_TEMPLATE, MAX_CHUNK_SIZE};
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::chunking::{plan_chunks, plan_range_chunks};
use super::stats::{BatchStats, RangeDeleteStats};

/// One kind of write applied across a whole chunk
pub struct Phase<S, T> {
    pub name: &'static str,
    pub apply: fn(&mut S, &[T]) -> Result<()>,
}

impl<S, T> Phase<S, T> {
    pub fn new(name: &'static str, apply: fn(&mut S, &[T]) -> Result<()>) -> Self {
        Self { name, apply }
    }
}

/// Writes and deletes large record collections in flushed chunks
///
/// Chunks are processed strictly one after another: chunk N+1 starts only
/// after chunk N's flush succeeded.
#[derive(Clone)]
pub struct BatchPersister {
    chunk_size: usize,
    show_progress: bool,
    cache: Arc<dyn CacheInvalidator>,
}

impl fmt::Debug for BatchPersister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPersister")
            .field("chunk_size", &self.chunk_size)
            .field("show_progress", &self.show_progress)
            .finish_non_exhaustive()
    }
}

impl BatchPersister {
    /// Create a persister with an explicit chunk size
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::configuration(format!(
                "Chunk size {} must be between 1 and {}",
                chunk_size, MAX_CHUNK_SIZE
            )));
        }
        Ok(Self {
            chunk_size,
            show_progress: false,
            cache: Arc::new(NoCache),
        })
    }

    /// Create a persister from the batch section of the configuration
    pub fn from_config(config: &BatchConfig) -> Result<Self> {
        Ok(Self::new(config.chunk_size)?.with_progress(config.show_progress))
    }

    /// Send invalidation requests to `cache` after structural changes
    pub fn with_cache(mut self, cache: Arc<dyn CacheInvalidator>) -> Self {
        self.cache = cache;
        self
    }

    /// Show a progress bar over chunks
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Ask the cache collaborator to drop a scope
    pub fn invalidate(&self, scope: CacheScope) {
        self.cache.invalidate(scope);
    }

    /// Apply `phases` to `items` chunk by chunk
    ///
    /// Each phase runs over the whole chunk before the next phase starts, and
    /// the store is flushed after every chunk. The first failure aborts the
    /// batch; chunks already flushed stay committed.
    pub fn run_phased<S, T>(
        &self,
        store: &mut S,
        operation: &str,
        items: &[T],
        phases: &[Phase<S, T>],
    ) -> Result<BatchStats>
    where
        S: StoreSession,
    {
        let chunks = plan_chunks(items.len(), self.chunk_size);
        let mut stats = BatchStats::new(operation);
        stats.records = items.len();

        let progress = self.progress_bar(chunks.len(), operation);

        for (chunk_index, bounds) in chunks.into_iter().enumerate() {
            let chunk = &items[bounds];

            for phase in phases {
                (phase.apply)(store, chunk).map_err(|e| {
                    Error::batch_aborted(
                        format!("{}/{}", operation, phase.name),
                        chunk_index,
                        stats.flushes,
                        e,
                    )
                })?;
            }

            store.flush().map_err(|e| {
                Error::batch_aborted(
                    format!("{}/flush", operation),
                    chunk_index,
                    stats.flushes,
                    e,
                )
            })?;

            stats.flushes += 1;
            stats.chunk_sizes.push(chunk.len());

            debug!(
                "{}: chunk {} flushed ({} records)",
                operation,
                chunk_index + 1,
                chunk.len()
            );
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("{} complete", operation));
        }

        info!("{}", stats.summary());
        Ok(stats)
    }

    /// Insert values, writing all value rows of a chunk before its flag rows
    pub fn insert_values<S: ObservationStore>(
        &self,
        store: &mut S,
        values: &[ObservedValue],
    ) -> Result<BatchStats> {
        self.run_phased(
            store,
            "insert values",
            values,
            &[
                Phase::new("values", S::insert_values),
                Phase::new("flags", S::insert_flags),
            ],
        )
    }

    /// Update values and their flags
    pub fn update_values<S: ObservationStore>(
        &self,
        store: &mut S,
        values: &[ObservedValue],
    ) -> Result<BatchStats> {
        self.run_phased(
            store,
            "update values",
            values,
            &[
                Phase::new("values", S::update_values),
                Phase::new("flags", S::update_flags),
            ],
        )
    }

    /// Rewrite flags only, leaving stored values untouched
    pub fn update_flags<S: ObservationStore>(
        &self,
        store: &mut S,
        values: &[ObservedValue],
    ) -> Result<BatchStats> {
        self.run_phased(
            store,
            "update flags",
            values,
            &[Phase::new("flags", S::update_flags)],
        )
    }

    /// Delete composite observations
    ///
    /// Dependency order per chunk: load log, flags, values, observation row.
    pub fn delete_observations<S: ObservationStore>(
        &self,
        store: &mut S,
        observations: &[ObservationKey],
    ) -> Result<BatchStats> {
        let stats = self.run_phased(
            store,
            "delete observations",
            observations,
            &Self::delete_phases::<S>(),
        )?;

        let stations: BTreeSet<i32> = observations.iter().map(|key| key.station_id).collect();
        for station_id in stations {
            self.invalidate(CacheScope::Station(station_id));
        }
        Ok(stats)
    }

    /// Delete every observation of a station within an inclusive datetime span
    ///
    /// The span is deleted as consecutive chunk-sized sub-ranges, each in
    /// dependency order and followed by a flush.
    pub fn delete_range<S: ObservationStore>(
        &self,
        store: &mut S,
        station_id: i32,
        range: DatetimeRange,
    ) -> Result<RangeDeleteStats> {
        range.validate()?;
        let sub_ranges = plan_range_chunks(range, self.chunk_size);
        let operation = format!("delete station {} range", station_id);
        let mut stats = RangeDeleteStats {
            station_id,
            ..Default::default()
        };

        info!(
            "Deleting station {} datetimes {}..={} in {} sub-range(s)",
            station_id,
            range.begin,
            range.end,
            sub_ranges.len()
        );

        let progress = self.progress_bar(sub_ranges.len(), &operation);

        for (chunk_index, sub_range) in sub_ranges.into_iter().enumerate() {
            let keys = store
                .observations_in_range(station_id, sub_range.begin, sub_range.end)
                .map_err(|e| Error::batch_aborted(&operation, chunk_index, stats.flushes, e))?;

            for phase in Self::delete_phases::<S>() {
                (phase.apply)(store, &keys).map_err(|e| {
                    Error::batch_aborted(
                        format!("{}/{}", operation, phase.name),
                        chunk_index,
                        stats.flushes,
                        e,
                    )
                })?;
            }

            store.flush().map_err(|e| {
                Error::batch_aborted(
                    format!("{}/flush", operation),
                    chunk_index,
                    stats.flushes,
                    e,
                )
            })?;

            stats.flushes += 1;
            stats.observations_deleted += keys.len();
            stats.sub_ranges.push(sub_range);

            debug!(
                "Deleted {} observations for station {} in {}..={}",
                keys.len(),
                station_id,
                sub_range.begin,
                sub_range.end
            );
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("{} complete", operation));
        }

        self.invalidate(CacheScope::Station(station_id));
        info!("{}", stats.summary());
        Ok(stats)
    }

    /// Insert exception facts
    pub fn insert_exception_facts<S: LedgerStore>(
        &self,
        store: &mut S,
        facts: &[ExceptionFact],
    ) -> Result<BatchStats> {
        self.run_phased(
            store,
            "insert exception facts",
            facts,
            &[Phase::new("exception facts", S::insert_exception_facts)],
        )
    }

    /// Remove exception facts by key
    pub fn delete_exception_facts<S: LedgerStore>(
        &self,
        store: &mut S,
        keys: &[FactKey],
    ) -> Result<BatchStats> {
        let stats = self.run_phased(
            store,
            "delete exception facts",
            keys,
            &[Phase::new("exception facts", S::delete_exception_facts)],
        )?;
        self.invalidate(CacheScope::Exceptions);
        Ok(stats)
    }

    /// Insert resolution facts
    pub fn insert_resolution_facts<S: LedgerStore>(
        &self,
        store: &mut S,
        facts: &[ResolutionFact],
    ) -> Result<BatchStats> {
        self.run_phased(
            store,
            "insert resolution facts",
            facts,
            &[Phase::new("resolution facts", S::insert_resolution_facts)],
        )
    }

    fn delete_phases<S: ObservationStore>() -> [Phase<S, ObservationKey>; 4] {
        [
            Phase::new("load log", S::delete_load_log),
            Phase::new("flags", S::delete_flags),
            Phase::new("values", S::delete_values),
            Phase::new("observations", S::delete_observations),
        ]
    }

    fn progress_bar(&self, chunks: usize, operation: &str) -> Option<ProgressBar> {
        if !self.show_progress || chunks == 0 {
            return None;
        }
        let pb = ProgressBar::new(chunks as u64);
        if let Ok(style) = ProgressStyle::with_template(BATCH_PROGRESS_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(operation.to_string());
        Some(pb)
    }
}
