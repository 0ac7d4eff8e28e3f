//! Tests for the batch persister
//!
//! Uses the in-memory store, whose journal records every storage call, to check
//! chunk sizes, phase ordering and flush boundaries.

pub mod persister_tests;

use crate::app::adapters::memory_store::StoreOp;
use crate::app::models::{FactKey, FlagKind, FlagVector, ObservedValue};
use rust_decimal::Decimal;

/// Create `count` unflagged values for one station, one element per datetime
pub fn create_values(station_id: i32, count: usize) -> Vec<ObservedValue> {
    (0..count)
        .map(|index| {
            ObservedValue::new(
                FactKey::new(station_id, 1000 + index as i32, 188),
                Some(Decimal::new(index as i64, 1)),
            )
        })
        .collect()
}

/// Create `count` values with every third one range-flagged
pub fn create_mixed_values(station_id: i32, count: usize) -> Vec<ObservedValue> {
    create_values(station_id, count)
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            if index % 3 == 0 {
                value.with_flags(FlagVector::clear().with(FlagKind::Range))
            } else {
                value
            }
        })
        .collect()
}

/// Split a journal into the operations between flushes
pub fn split_at_flushes(ops: &[StoreOp]) -> Vec<Vec<StoreOp>> {
    ops.split(|op| *op == StoreOp::Flush)
        .map(|segment| segment.to_vec())
        .filter(|segment| !segment.is_empty())
        .collect()
}
