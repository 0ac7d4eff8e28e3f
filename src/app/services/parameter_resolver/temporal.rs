//! Effective-dated record selection
//!
//! Records for one station are split into those effective at or before the
//! query date and those effective after it. The policy for picking a record
//! from that split is carried in [`TemporalNote`] so callers can report it.

use crate::app::models::EffectiveRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// How a temporal match was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalNote {
    /// The station has one record, used regardless of date
    SingleRecord,
    /// Every record is effective after the query date; the earliest is used
    PrecedesFirstInstall,
    /// Every record is effective at or before the query date; the latest is used
    LastInstalled,
    /// Latest record effective at or before the query date
    MostRecentApplicable,
}

impl TemporalNote {
    /// Whether the match should be surfaced as a warning
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::PrecedesFirstInstall)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleRecord => "single record",
            Self::PrecedesFirstInstall => "query precedes first installation",
            Self::LastInstalled => "last installed",
            Self::MostRecentApplicable => "most recent applicable version",
        }
    }
}

impl fmt::Display for TemporalNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected record and the policy that selected it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalMatch<'a, V> {
    pub record: &'a EffectiveRecord<V>,
    pub note: TemporalNote,
}

impl<V> TemporalMatch<'_, V> {
    pub fn value(&self) -> &V {
        &self.record.value
    }
}

fn order_key<V>(record: &EffectiveRecord<V>) -> (NaiveDate, i64) {
    (record.effective_date, record.ordinal)
}

/// Pick the record in effect for a station on `date`
///
/// `records` must all belong to the same station; their order does not
/// matter. Records sharing an effective date are ordered by `ordinal`.
pub fn resolve_temporal<V>(
    records: &[EffectiveRecord<V>],
    date: NaiveDate,
) -> Option<TemporalMatch<'_, V>> {
    let (record, note) = match records {
        [] => return None,
        [only] => (only, TemporalNote::SingleRecord),
        _ => {
            let applicable = records.iter().filter(|r| r.effective_date <= date);
            let applicable_count = applicable.clone().count();

            if applicable_count == 0 {
                let earliest = records.iter().min_by_key(|r| order_key(r))?;
                (earliest, TemporalNote::PrecedesFirstInstall)
            } else if applicable_count == records.len() {
                let latest = records.iter().max_by_key(|r| order_key(r))?;
                (latest, TemporalNote::LastInstalled)
            } else {
                let latest = applicable.max_by_key(|r| order_key(r))?;
                (latest, TemporalNote::MostRecentApplicable)
            }
        }
    };

    match note {
        TemporalNote::PrecedesFirstInstall => warn!(
            "Station {}: query date {} precedes first installation on {}",
            record.station_id, date, record.effective_date
        ),
        _ => debug!(
            "Station {}: record effective {} selected for {} ({})",
            record.station_id, record.effective_date, date, note
        ),
    }

    Some(TemporalMatch { record, note })
}
