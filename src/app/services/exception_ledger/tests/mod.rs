//! Shared fixtures for exception ledger tests

use crate::app::adapters::cache::RecordingInvalidator;
use crate::app::adapters::memory_store::MemoryStore;
use crate::app::models::{FactKey, FlagKind, FlagVector, ObservedValue};
use crate::app::services::batch_persister::BatchPersister;
use crate::app::services::exception_ledger::ExceptionLedger;
use rust_decimal::Decimal;
use std::sync::Arc;


pub const STATION: i32 = 1026;

/// Ledger over an empty memory store with a small chunk size
pub fn create_ledger(chunk_size: usize) -> (ExceptionLedger<MemoryStore>, Arc<RecordingInvalidator>) {
    let cache = Arc::new(RecordingInvalidator::new());
    let persister = BatchPersister::new(chunk_size)
        .unwrap()
        .with_cache(cache.clone());
    (ExceptionLedger::new(MemoryStore::new(), persister), cache)
}

/// Fact keys for consecutive datetimes of one station and element
pub fn create_keys(station_id: i32, first_datetime: i32, count: usize) -> Vec<FactKey> {
    (0..count)
        .map(|offset| FactKey::new(station_id, first_datetime + offset as i32, 188))
        .collect()
}

/// Values where every other one carries a RANGE flag
pub fn create_flagged_values(count: usize) -> Vec<ObservedValue> {
    create_keys(STATION, 500, count)
        .into_iter()
        .enumerate()
        .map(|(index, key)| {
            let value = ObservedValue::new(key, Some(Decimal::new(index as i64, 0)));
            if index % 2 == 0 {
                value.with_flags(FlagVector::default().with(FlagKind::Range))
            } else {
                value
            }
        })
        .collect()
}
