//! Tests for most-specific wildcard resolution

use super::*;
use crate::Error;
use crate::app::models::DiscreteQuery;
use crate::app::services::parameter_resolver::resolve_discrete;

#[test]
fn test_station_only_match_when_month_differs() {
    let ranges = acceptance_ranges();
    let query = DiscreteQuery::new(MIN_TEMP).stream(8).station(STATION).month(4);

    let found = resolve_discrete("range", &ranges, &query).unwrap().unwrap();
    assert_eq!(found.min, Decimal::new(48, 1));
    assert_eq!(found.max, Decimal::new(211, 1));
}

#[test]
fn test_station_and_month_match() {
    let ranges = acceptance_ranges();
    let query = DiscreteQuery::new(MIN_TEMP).stream(8).station(STATION).month(6);

    let found = resolve_discrete("range", &ranges, &query).unwrap().unwrap();
    assert_eq!(found.min, Decimal::new(70, 1));
    assert_eq!(found.max, Decimal::new(260, 1));
}

#[test]
fn test_other_station_falls_back_to_generic() {
    let ranges = acceptance_ranges();
    let query = DiscreteQuery::new(MIN_TEMP).stream(8).station(9999).month(6);

    let found = resolve_discrete("range", &ranges, &query).unwrap().unwrap();
    assert_eq!(found.min, Decimal::new(-60, 0));
    assert_eq!(found.max, Decimal::new(60, 0));
}

#[test]
fn test_query_without_month_skips_monthly_override() {
    let ranges = acceptance_ranges();
    let query = DiscreteQuery::new(MIN_TEMP).station(STATION);

    let found = resolve_discrete("range", &ranges, &query).unwrap().unwrap();
    assert_eq!(found.min, Decimal::new(48, 1));
}

#[test]
fn test_station_override_beats_stream_and_month_override() {
    let ranges = vec![
        range(8, -1, 4, Decimal::new(-10, 0), Decimal::new(10, 0)),
        range(-1, STATION, -1, Decimal::new(48, 1), Decimal::new(211, 1)),
    ];
    let query = DiscreteQuery::new(MIN_TEMP).stream(8).station(STATION).month(4);

    let found = resolve_discrete("range", &ranges, &query).unwrap().unwrap();
    assert_eq!(found.station_id, STATION);
}

#[test]
fn test_month_override_beats_stream_override() {
    let ranges = vec![
        range(8, -1, -1, Decimal::new(-10, 0), Decimal::new(10, 0)),
        range(-1, -1, 4, Decimal::new(-5, 0), Decimal::new(5, 0)),
    ];
    let query = DiscreteQuery::new(MIN_TEMP).stream(8).station(STATION).month(4);

    let found = resolve_discrete("range", &ranges, &query).unwrap().unwrap();
    assert_eq!(found.month, 4);
}

#[test]
fn test_no_match_is_not_an_error() {
    let ranges = vec![range(-1, STATION, -1, Decimal::new(0, 0), Decimal::new(1, 0))];
    let query = DiscreteQuery::new(MIN_TEMP).station(1);

    assert!(resolve_discrete("range", &ranges, &query).unwrap().is_none());
    assert!(resolve_discrete::<RangeParameter>("range", &[], &query).unwrap().is_none());
}

#[test]
fn test_duplicate_maximal_match_is_ambiguous() {
    let ranges = vec![
        range(-1, STATION, -1, Decimal::new(0, 0), Decimal::new(10, 0)),
        range(-1, STATION, -1, Decimal::new(1, 0), Decimal::new(11, 0)),
        range(-1, -1, -1, Decimal::new(-60, 0), Decimal::new(60, 0)),
    ];
    let query = DiscreteQuery::new(MIN_TEMP).station(STATION).month(2);

    let error = resolve_discrete("range", &ranges, &query).unwrap_err();
    assert!(error.is_configuration_error());
    match error {
        Error::AmbiguousParameter { kind, candidates, .. } => {
            assert_eq!(kind, "range");
            assert_eq!(candidates, 2);
        }
        other => panic!("Expected ambiguous parameter error, got {:?}", other),
    }
}

#[test]
fn test_ambiguity_below_maximum_is_ignored() {
    let ranges = vec![
        range(-1, -1, -1, Decimal::new(-60, 0), Decimal::new(60, 0)),
        range(-1, -1, -1, Decimal::new(-50, 0), Decimal::new(50, 0)),
        range(-1, STATION, -1, Decimal::new(48, 1), Decimal::new(211, 1)),
    ];
    let query = DiscreteQuery::new(MIN_TEMP).station(STATION);

    let found = resolve_discrete("range", &ranges, &query).unwrap().unwrap();
    assert_eq!(found.station_id, STATION);
}
