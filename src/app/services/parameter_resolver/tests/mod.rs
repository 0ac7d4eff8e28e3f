//! Shared fixtures for parameter resolver tests

use crate::app::models::{
    DeltaParameter, EffectiveRecord, GaugeInstall, ParameterSet, RangeParameter,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub mod discrete_tests;

/// Element id for minimum air temperature in the fixtures
pub const MIN_TEMP: i32 = 188;

/// Station carrying overrides in the fixtures
pub const STATION: i32 = 1026;

/// Create a range parameter; `-1` in any dimension is a wildcard
pub fn range(stream_id: i32, station_id: i32, month: i32, min: Decimal, max: Decimal) -> RangeParameter {
    RangeParameter {
        element_id: MIN_TEMP,
        stream_id,
        station_id,
        month,
        min,
        max,
    }
}

/// Create a delta parameter; `-1` in any dimension is a wildcard
pub fn delta(stream_id: i32, station_id: i32, month: i32, max_delta: Decimal) -> DeltaParameter {
    DeltaParameter {
        element_id: MIN_TEMP,
        stream_id,
        station_id,
        month,
        max_delta,
    }
}

/// Overlapping range parameters for element 188
///
/// - generic: [-60, 60]
/// - station 1026, June: [7.0, 26.0]
/// - station 1026, any month: [4.8, 21.1]
pub fn acceptance_ranges() -> Vec<RangeParameter> {
    vec![
        range(-1, -1, -1, Decimal::new(-60, 0), Decimal::new(60, 0)),
        range(-1, STATION, 6, Decimal::new(70, 1), Decimal::new(260, 1)),
        range(-1, STATION, -1, Decimal::new(48, 1), Decimal::new(211, 1)),
    ]
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Create a gauge installation record
pub fn gauge(station_id: i32, effective_date: NaiveDate, ordinal: i64, depth_mm: i64) -> EffectiveRecord<GaugeInstall> {
    EffectiveRecord {
        station_id,
        effective_date,
        ordinal,
        value: GaugeInstall {
            depth_mm: Decimal::new(depth_mm, 0),
            note: None,
        },
    }
}

/// Acceptance ranges plus two gauge installs for the override station
pub fn acceptance_set() -> ParameterSet {
    ParameterSet {
        range: acceptance_ranges(),
        delta: vec![
            delta(-1, -1, -1, Decimal::new(100, 1)),
            delta(8, -1, -1, Decimal::new(55, 1)),
        ],
        gauge: vec![
            gauge(STATION, date(2005, 3, 1), 1, 300),
            gauge(STATION, date(2012, 9, 15), 2, 500),
        ],
    }
}
