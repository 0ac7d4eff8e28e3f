//! Shared fixtures for quality check tests

use crate::app::models::{
    DeltaParameter, FactKey, ObservedValue, ParameterSet, RangeParameter,
};
use crate::app::services::parameter_resolver::ParameterResolver;
use rust_decimal::Decimal;

pub mod checker_tests;

pub const STATION: i32 = 1026;
pub const MIN_TEMP: i32 = 188;

/// Resolver with a generic and a station range for element 188 and a 5.0 delta limit
pub fn create_resolver() -> ParameterResolver {
    ParameterResolver::from_set(create_parameter_set()).unwrap()
}

/// Parameters behind [`create_resolver`]
pub fn create_parameter_set() -> ParameterSet {
    ParameterSet {
        range: vec![
            RangeParameter {
                element_id: MIN_TEMP,
                stream_id: -1,
                station_id: -1,
                month: -1,
                min: Decimal::new(-60, 0),
                max: Decimal::new(60, 0),
            },
            RangeParameter {
                element_id: MIN_TEMP,
                stream_id: -1,
                station_id: STATION,
                month: -1,
                min: Decimal::new(48, 1),
                max: Decimal::new(211, 1),
            },
        ],
        delta: vec![DeltaParameter {
            element_id: MIN_TEMP,
            stream_id: -1,
            station_id: -1,
            month: -1,
            max_delta: Decimal::new(5, 0),
        }],
        gauge: Vec::new(),
    }
}

/// Hourly values for one station and element, starting at datetime 1
pub fn create_series(station_id: i32, element_id: i32, tenths: &[Option<i64>]) -> Vec<ObservedValue> {
    tenths
        .iter()
        .enumerate()
        .map(|(index, value)| {
            ObservedValue::new(
                FactKey::new(station_id, index as i32 + 1, element_id),
                value.map(|tenths| Decimal::new(tenths, 1)),
            )
        })
        .collect()
}
