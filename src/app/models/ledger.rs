//! Exception and resolution records
//!
//! An exception is a tracked data-quality case covering one or more flagged
//! facts. Resolutions document the corrections applied under an exception and
//! resolution facts record their concrete effect on individual values.

use super::{DatetimeId, ExceptionId, FactKey, ResolutionId};
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Exception Status
// =============================================================================

/// Lifecycle state of an exception
///
/// The derived ordering (`Open < OpenPartial < ClosedResolved <
/// ClosedUnresolvable < ClosedPartial`) is used for deterministic sorting only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionStatus {
    /// Newly tracked, nothing resolved yet
    Open,
    /// Some resolutions applied, some flags remain
    OpenPartial,
    /// All associated flags cleared by resolutions
    ClosedResolved,
    /// No resolution possible; flags remain indefinitely
    ClosedUnresolvable,
    /// No further resolution possible; some flags remain
    ClosedPartial,
}

impl ExceptionStatus {
    /// Every status in sort order
    pub const ALL: [ExceptionStatus; 5] = [
        ExceptionStatus::Open,
        ExceptionStatus::OpenPartial,
        ExceptionStatus::ClosedResolved,
        ExceptionStatus::ClosedUnresolvable,
        ExceptionStatus::ClosedPartial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExceptionStatus::Open => "OPEN",
            ExceptionStatus::OpenPartial => "OPEN_PARTIAL",
            ExceptionStatus::ClosedResolved => "CLOSED_RESOLVED",
            ExceptionStatus::ClosedUnresolvable => "CLOSED_UNRESOLVABLE",
            ExceptionStatus::ClosedPartial => "CLOSED_PARTIAL",
        }
    }

    /// Check whether this is one of the closed states
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExceptionStatus::ClosedResolved
                | ExceptionStatus::ClosedUnresolvable
                | ExceptionStatus::ClosedPartial
        )
    }

    /// Check whether the documented workflow moves from this status to `next`
    ///
    /// Advisory only: the ledger stores whatever status the caller assigns.
    pub fn permits(self, next: ExceptionStatus) -> bool {
        use ExceptionStatus::*;
        matches!(
            (self, next),
            (Open, OpenPartial)
                | (Open, ClosedResolved)
                | (Open, ClosedUnresolvable)
                | (OpenPartial, ClosedUnresolvable)
                | (OpenPartial, ClosedPartial)
        )
    }
}

impl FromStr for ExceptionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ExceptionStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::data_validation(format!("Invalid exception status '{}'", s)))
    }
}

impl fmt::Display for ExceptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reapply Policy
// =============================================================================

/// Whether a resolution is reapplied when its fact is reprocessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReapplyPolicy {
    /// Reapplied automatically
    Auto,
    /// Never reapplied
    No,
    /// Left for developer review
    Manual,
}

impl ReapplyPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ReapplyPolicy::Auto => "AUTO",
            ReapplyPolicy::No => "NO",
            ReapplyPolicy::Manual => "MANUAL",
        }
    }

    /// Check a resolution's policy against an optional filter
    ///
    /// `None` selects every policy.
    pub fn matches_filter(self, filter: Option<ReapplyPolicy>) -> bool {
        filter.is_none_or(|wanted| wanted == self)
    }
}

impl FromStr for ReapplyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTO" => Ok(ReapplyPolicy::Auto),
            "NO" => Ok(ReapplyPolicy::No),
            "MANUAL" => Ok(ReapplyPolicy::Manual),
            _ => Err(Error::data_validation(format!(
                "Invalid reapply policy '{}': must be AUTO, NO or MANUAL",
                s
            ))),
        }
    }
}

impl fmt::Display for ReapplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Exceptions
// =============================================================================

/// Opaque reference into an external ticket system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketRef {
    pub system: String,
    pub ticket_id: String,
}

impl TicketRef {
    pub fn new(system: impl Into<String>, ticket_id: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            ticket_id: ticket_id.into(),
        }
    }
}

impl fmt::Display for TicketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.system, self.ticket_id)
    }
}

/// Exception fields supplied by the caller before an id is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewException {
    pub ticket: TicketRef,
    pub description: String,
    pub status: ExceptionStatus,
}

/// A persisted exception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exception {
    /// Assigned on creation, never changed afterwards
    pub exception_id: ExceptionId,
    pub ticket: TicketRef,
    pub description: String,
    pub status: ExceptionStatus,
}

impl Exception {
    pub fn from_new(exception_id: ExceptionId, new: NewException) -> Self {
        Self {
            exception_id,
            ticket: new.ticket,
            description: new.description,
            status: new.status,
        }
    }
}

/// One flagged datum tracked under an exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExceptionFact {
    pub key: FactKey,
    /// `None` only until the owning exception is persisted
    pub exception_id: Option<ExceptionId>,
}

impl ExceptionFact {
    /// A fact not yet assigned to an exception
    pub fn unassigned(key: FactKey) -> Self {
        Self {
            key,
            exception_id: None,
        }
    }

    pub fn assigned(key: FactKey, exception_id: ExceptionId) -> Self {
        Self {
            key,
            exception_id: Some(exception_id),
        }
    }

    /// Check whether this fact lies at a station within a datetime span
    pub fn touches(&self, station_id: i32, begin: DatetimeId, end: DatetimeId) -> bool {
        self.key.station_id == station_id && (begin..=end).contains(&self.key.datetime_id)
    }
}

// =============================================================================
// Resolutions
// =============================================================================

/// Resolution fields supplied by the caller before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResolution {
    pub exception_id: ExceptionId,
    /// Name of the correction procedure or script
    pub correction_ref: String,
    pub reapply: ReapplyPolicy,
}

/// A persisted resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub resolution_id: ResolutionId,
    pub exception_id: ExceptionId,
    pub correction_ref: String,
    pub reapply: ReapplyPolicy,
}

impl Resolution {
    pub fn from_new(resolution_id: ResolutionId, new: NewResolution) -> Self {
        Self {
            resolution_id,
            exception_id: new.exception_id,
            correction_ref: new.correction_ref,
            reapply: new.reapply,
        }
    }
}

/// Replacement carried by a resolution fact
///
/// Formulas are opaque here and interpreted by whoever applies the resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReplacementValue {
    Literal(Decimal),
    Formula(String),
}

impl ReplacementValue {
    /// Parse text as a literal number, falling back to a formula
    pub fn parse(text: &str) -> Self {
        match Decimal::from_str(text.trim()) {
            Ok(value) => ReplacementValue::Literal(value),
            Err(_) => ReplacementValue::Formula(text.trim().to_string()),
        }
    }

    pub fn as_literal(&self) -> Option<Decimal> {
        match self {
            ReplacementValue::Literal(value) => Some(*value),
            ReplacementValue::Formula(_) => None,
        }
    }
}

impl fmt::Display for ReplacementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementValue::Literal(value) => write!(f, "{}", value),
            ReplacementValue::Formula(formula) => f.write_str(formula),
        }
    }
}

/// Effect of a resolution on one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionFact {
    pub resolution_id: ResolutionId,
    pub key: FactKey,
    pub replacement: ReplacementValue,
}

impl ResolutionFact {
    pub fn new(resolution_id: ResolutionId, key: FactKey, replacement: ReplacementValue) -> Self {
        Self {
            resolution_id,
            key,
            replacement,
        }
    }

    /// Check whether this fact touches a station within a datetime span
    pub fn touches(&self, station_id: i32, begin: DatetimeId, end: DatetimeId) -> bool {
        self.key.station_id == station_id && (begin..=end).contains(&self.key.datetime_id)
    }
}

/// A resolution joined with its facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionWithFacts {
    pub resolution: Resolution,
    /// Empty, never absent, when the resolution has no facts
    pub facts: Vec<ResolutionFact>,
}
