//! Tests for applying range and delta limits to value series

use super::*;
use crate::app::models::{FlagKind, FlagVector, RangeParameter};
use crate::app::services::quality_check::{CheckContext, QualityChecker};

#[test]
fn test_range_flags_follow_station_limits() {
    let resolver = create_resolver();
    let checker = QualityChecker::new(&resolver);
    // 4.7 is below the station minimum but inside the generic range
    let mut values = create_series(STATION, MIN_TEMP, &[Some(47), Some(50), Some(60)]);

    let summary = checker.check_series(&mut values, CheckContext::default()).unwrap();

    assert_eq!(summary.checked, 3);
    assert_eq!(summary.range_failures, 1);
    assert!(values[0].flags.is_kind_flagged(FlagKind::Range));
    assert!(!values[1].flags.is_kind_flagged(FlagKind::Range));
    assert!(!values[2].flags.is_kind_flagged(FlagKind::Range));
}

#[test]
fn test_delta_flags_jump_between_consecutive_hours() {
    let resolver = create_resolver();
    let checker = QualityChecker::new(&resolver);
    let mut values = create_series(STATION, MIN_TEMP, &[Some(100), Some(150), Some(201), Some(200)]);

    let summary = checker.check_series(&mut values, CheckContext::default()).unwrap();

    assert_eq!(summary.delta_failures, 1);
    assert!(!values[0].flags.is_kind_flagged(FlagKind::Delta));
    assert!(!values[1].flags.is_kind_flagged(FlagKind::Delta));
    assert!(values[2].flags.is_kind_flagged(FlagKind::Delta));
    assert!(!values[3].flags.is_kind_flagged(FlagKind::Delta));
}

#[test]
fn test_missing_value_breaks_delta_chain() {
    let resolver = create_resolver();
    let checker = QualityChecker::new(&resolver);
    let mut values = create_series(STATION, MIN_TEMP, &[Some(100), None, Some(200)]);

    let summary = checker.check_series(&mut values, CheckContext::default()).unwrap();

    assert_eq!(summary.delta_failures, 0);
    assert_eq!(summary.range_failures, 0);
}

#[test]
fn test_gap_in_hours_skips_delta() {
    let resolver = create_resolver();
    let checker = QualityChecker::new(&resolver);
    let mut values = create_series(STATION, MIN_TEMP, &[Some(100), Some(200)]);
    values[1].key.datetime_id = 5;

    let summary = checker.check_series(&mut values, CheckContext::default()).unwrap();
    assert_eq!(summary.delta_failures, 0);
}

#[test]
fn test_interleaved_elements_are_checked_separately() {
    let resolver = create_resolver();
    let checker = QualityChecker::new(&resolver);
    let mut values = create_series(STATION, MIN_TEMP, &[Some(100), Some(110)]);
    values.extend(create_series(STATION, 42, &[Some(900), Some(100)]));
    values.reverse();

    let summary = checker.check_series(&mut values, CheckContext::default()).unwrap();

    // Element 42 has no limits, so its large jump is not a failure
    assert_eq!(summary.delta_failures, 0);
    assert_eq!(summary.range_failures, 0);
    assert_eq!(values[0].key.element_id, 42);
}

#[test]
fn test_passing_value_clears_stale_flags_only_for_checked_kinds() {
    let resolver = create_resolver();
    let checker = QualityChecker::new(&resolver);
    let stale = FlagVector::default()
        .with(FlagKind::Range)
        .with(FlagKind::Delta)
        .with(FlagKind::Door);
    let mut values: Vec<_> = create_series(STATION, MIN_TEMP, &[Some(100)])
        .into_iter()
        .map(|value| value.with_flags(stale))
        .collect();

    let summary = checker.check_series(&mut values, CheckContext::default()).unwrap();

    assert_eq!(summary.changed, 1);
    assert_eq!(values[0].flags.kinds(), vec![FlagKind::Door]);
}

#[test]
fn test_unknown_element_is_not_checked() {
    let resolver = create_resolver();
    let checker = QualityChecker::new(&resolver);
    let mut values = create_series(1, 999, &[Some(-9999), Some(9999)]);

    let summary = checker.check_series(&mut values, CheckContext::new(Some(8), Some(6))).unwrap();

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.range_failures + summary.delta_failures, 0);
    assert!(values.iter().all(|value| !value.is_flagged()));
}

#[test]
fn test_month_context_applies_per_checked_part() {
    let mut set = create_parameter_set();
    set.range.push(RangeParameter {
        element_id: MIN_TEMP,
        stream_id: -1,
        station_id: STATION,
        month: 6,
        min: Decimal::new(70, 1),
        max: Decimal::new(260, 1),
    });
    let resolver = ParameterResolver::from_set(set).unwrap();
    let checker = QualityChecker::new(&resolver);

    // 5.0 passes the station range in May but fails the June override
    let mut values = create_series(STATION, MIN_TEMP, &[Some(50), Some(52), Some(50), Some(52)]);
    let (may, june) = values.split_at_mut(2);

    let may_summary = checker.check_series(may, CheckContext::new(None, Some(5))).unwrap();
    let june_summary = checker.check_series(june, CheckContext::new(None, Some(6))).unwrap();

    assert_eq!(may_summary.range_failures, 0);
    assert_eq!(june_summary.range_failures, 2);
    assert!(!values[1].flags.is_kind_flagged(FlagKind::Range));
    assert!(values[2].flags.is_kind_flagged(FlagKind::Range));
}
