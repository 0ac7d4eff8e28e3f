//! Tests for the chunked write and delete protocol

use super::*;
use crate::Error;
use crate::app::adapters::cache::{CacheScope, RecordingInvalidator};
use crate::app::adapters::memory_store::{MemoryStore, StoreOp};
use crate::app::models::{
    DatetimeRange, ExceptionFact, ExceptionStatus, NewException, ObservationKey, TicketRef,
};
use crate::app::services::batch_persister::BatchPersister;
use crate::app::storage::LedgerStore;
use crate::config::BatchConfig;
use std::sync::Arc;

#[test]
fn test_insert_250_values_uses_three_flushed_chunks() {
    let persister = BatchPersister::new(100).unwrap();
    let mut store = MemoryStore::new();
    let values = create_values(1026, 250);

    let stats = persister.insert_values(&mut store, &values).unwrap();

    assert_eq!(stats.records, 250);
    assert_eq!(stats.chunk_sizes, vec![100, 100, 50]);
    assert_eq!(stats.flushes, 3);
    assert_eq!(stats.records_written(), 250);
    assert_eq!(store.value_count(), 250);
    assert_eq!(store.flush_count(), 3);
    assert_eq!(store.unflushed_rows(), 0);
}

#[test]
fn test_insert_writes_all_values_before_flags_in_each_chunk() {
    let persister = BatchPersister::new(100).unwrap();
    let mut store = MemoryStore::new();
    let values = create_mixed_values(7, 250);

    persister.insert_values(&mut store, &values).unwrap();

    let segments = split_at_flushes(&store.journal_ops());
    assert_eq!(segments.len(), 3);
    for segment in segments {
        assert_eq!(segment, vec![StoreOp::InsertValues, StoreOp::InsertFlags]);
    }
    assert_eq!(store.flag_count(), 84);
    assert_eq!(store.journal_ops().last(), Some(&StoreOp::Flush));
}

#[test]
fn test_insert_count_independent_of_chunk_size() {
    for count in [0, 1, 99, 100, 101, 250, 333] {
        for chunk_size in [1, 7, 100] {
            let persister = BatchPersister::new(chunk_size).unwrap();
            let mut store = MemoryStore::new();
            let stats = persister
                .insert_values(&mut store, &create_values(1, count))
                .unwrap();

            assert_eq!(store.value_count(), count);
            assert_eq!(stats.records_written(), count);
            assert_eq!(stats.chunks(), count.div_ceil(chunk_size));
            assert_eq!(store.flush_count(), stats.chunks());
        }
    }
}

#[test]
fn test_failed_chunk_aborts_batch_and_keeps_committed_chunks() {
    let persister = BatchPersister::new(100).unwrap();
    let mut store = MemoryStore::new().fail_on(StoreOp::InsertFlags, 2);
    let values = create_mixed_values(3, 250);

    let error = persister.insert_values(&mut store, &values).unwrap_err();

    match error {
        Error::BatchAborted {
            operation,
            chunk_index,
            committed_chunks,
            source,
        } => {
            assert_eq!(operation, "insert values/flags");
            assert_eq!(chunk_index, 1);
            assert_eq!(committed_chunks, 1);
            assert!(matches!(*source, Error::Storage { .. }));
        }
        other => panic!("expected BatchAborted, got {:?}", other),
    }

    // First chunk committed, second chunk's values written but never flushed,
    // third chunk never started
    assert_eq!(store.flush_count(), 1);
    assert_eq!(store.value_count(), 200);
    assert_eq!(store.unflushed_rows(), 100);
}

#[test]
fn test_failed_flush_aborts_before_next_chunk() {
    let persister = BatchPersister::new(100).unwrap();
    let mut store = MemoryStore::new().fail_on(StoreOp::Flush, 1);

    let error = persister
        .insert_values(&mut store, &create_values(1, 150))
        .unwrap_err();

    assert!(matches!(
        error,
        Error::BatchAborted {
            chunk_index: 0,
            committed_chunks: 0,
            ..
        }
    ));
    assert_eq!(store.value_count(), 100);

    // The cause is reachable through the source chain, not repeated in the message
    let cause = std::error::Error::source(&error).unwrap().to_string();
    assert!(cause.starts_with("Storage error"));
    assert!(!error.to_string().contains(&cause));
}

#[test]
fn test_update_flags_clears_rows() {
    let persister = BatchPersister::new(2).unwrap();
    let mut store = MemoryStore::new();
    let mut values = create_mixed_values(4, 6);
    persister.insert_values(&mut store, &values).unwrap();
    assert_eq!(store.flag_count(), 2);

    for value in &mut values {
        value.flags = Default::default();
    }
    let stats = persister.update_flags(&mut store, &values).unwrap();

    assert_eq!(stats.chunk_sizes, vec![2, 2, 2]);
    assert_eq!(store.flag_count(), 0);
    assert_eq!(store.value_count(), 6);
}

#[test]
fn test_update_values_rewrites_value_then_flags() {
    let persister = BatchPersister::new(100).unwrap();
    let mut store = MemoryStore::new();
    let values = create_values(4, 3);
    persister.insert_values(&mut store, &values).unwrap();

    let corrected: Vec<_> = values
        .iter()
        .cloned()
        .map(|mut value| {
            value.value = None;
            value
        })
        .collect();
    persister.update_values(&mut store, &corrected).unwrap();

    assert_eq!(store.value(&values[0].key).unwrap().value, None);
    let segments = split_at_flushes(&store.journal_ops());
    assert_eq!(
        segments.last().unwrap(),
        &vec![StoreOp::UpdateValues, StoreOp::UpdateFlags]
    );
}

#[test]
fn test_delete_observations_follows_dependency_order() {
    let persister = BatchPersister::new(100).unwrap();
    let mut store = MemoryStore::new();
    persister
        .insert_values(&mut store, &create_mixed_values(9, 10))
        .unwrap();

    let keys: Vec<ObservationKey> = (0..10)
        .map(|index| ObservationKey {
            station_id: 9,
            datetime_id: 1000 + index,
        })
        .collect();
    persister.delete_observations(&mut store, &keys).unwrap();

    let segments = split_at_flushes(&store.journal_ops());
    assert_eq!(
        segments.last().unwrap(),
        &vec![
            StoreOp::DeleteLoadLog,
            StoreOp::DeleteFlags,
            StoreOp::DeleteValues,
            StoreOp::DeleteObservations,
        ]
    );
    assert_eq!(store.observation_count(), 0);
    assert_eq!(store.value_count(), 0);
    assert_eq!(store.flag_count(), 0);
    assert_eq!(store.load_log_count(), 0);
}

#[test]
fn test_delete_range_in_chunk_sized_sub_ranges() {
    let invalidator = Arc::new(RecordingInvalidator::new());
    let persister = BatchPersister::new(100)
        .unwrap()
        .with_cache(invalidator.clone());
    let mut store = MemoryStore::new();
    persister
        .insert_values(&mut store, &create_mixed_values(12, 306))
        .unwrap();
    let flushes_before = store.flush_count();

    let range = DatetimeRange::new(1000, 1305).unwrap();
    let stats = persister.delete_range(&mut store, 12, range).unwrap();

    let sizes: Vec<usize> = stats.sub_ranges.iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![100, 100, 100, 6]);
    assert_eq!(stats.observations_deleted, 306);
    assert_eq!(stats.flushes, 4);
    assert_eq!(store.flush_count() - flushes_before, 4);
    assert_eq!(store.observation_count(), 0);
    assert_eq!(invalidator.requests(), vec![CacheScope::Station(12)]);
}

#[test]
fn test_delete_range_leaves_other_stations_and_datetimes() {
    let persister = BatchPersister::new(50).unwrap();
    let mut store = MemoryStore::new();
    persister
        .insert_values(&mut store, &create_values(1, 20))
        .unwrap();
    persister
        .insert_values(&mut store, &create_values(2, 20))
        .unwrap();

    let range = DatetimeRange::new(1005, 1009).unwrap();
    let stats = persister.delete_range(&mut store, 1, range).unwrap();

    assert_eq!(stats.observations_deleted, 5);
    assert_eq!(store.value_count(), 35);
}

#[test]
fn test_delete_range_rejects_reversed_span() {
    let persister = BatchPersister::new(50).unwrap();
    let mut store = MemoryStore::new();
    persister
        .insert_values(&mut store, &create_values(1, 20))
        .unwrap();
    let flushes_before = store.flush_count();

    let error = persister
        .delete_range(&mut store, 1, DatetimeRange { begin: 1010, end: 1005 })
        .unwrap_err();

    assert!(matches!(error, Error::DataValidation { .. }));
    assert_eq!(store.value_count(), 20);
    assert_eq!(store.flush_count(), flushes_before);
}

#[test]
fn test_ledger_fact_batches() {
    let persister = BatchPersister::new(100).unwrap();
    let mut store = MemoryStore::new();
    let exception_id = store
        .insert_exception(&NewException {
            ticket: TicketRef::new("internal", "9"),
            description: "door open".to_string(),
            status: ExceptionStatus::Open,
        })
        .unwrap();

    let facts: Vec<ExceptionFact> = create_values(5, 120)
        .iter()
        .map(|value| ExceptionFact::assigned(value.key, exception_id))
        .collect();
    let stats = persister.insert_exception_facts(&mut store, &facts).unwrap();
    assert_eq!(stats.chunk_sizes, vec![100, 20]);
    assert_eq!(store.exception_fact_count(), 120);

    let keys: Vec<_> = facts.iter().map(|fact| fact.key).collect();
    persister.delete_exception_facts(&mut store, &keys).unwrap();
    assert_eq!(store.exception_fact_count(), 0);
}

#[test]
fn test_chunk_size_validation() {
    assert!(BatchPersister::new(0).is_err());
    assert!(BatchPersister::new(1).is_ok());
    assert!(BatchPersister::new(crate::constants::MAX_CHUNK_SIZE + 1).is_err());

    let config = BatchConfig {
        chunk_size: 25,
        show_progress: false,
    };
    assert_eq!(BatchPersister::from_config(&config).unwrap().chunk_size(), 25);
}
