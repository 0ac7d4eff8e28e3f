//! QC flag kinds and their integer encoding
//!
//! Each flag kind owns one bit of a non-negative integer. The bit index comes
//! from an explicit table ([`FlagKind::bit`]) rather than from the enum's
//! declaration order, because the integer is the persisted wire format.

use crate::constants::{FLAG_TABLE_VERSION, KNOWN_FLAG_MASK};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Flag Kind
// =============================================================================

/// A named QC concern that can be raised independently on a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagKind {
    /// Value outside the resolved range limits
    Range,
    /// Change from the previous value exceeds the resolved delta limit
    Delta,
    /// Enclosure door open during the observation
    Door,
    /// Value is covered by a tracked exception
    Exception,
    /// Sensor reported the same value for too long
    Frozen,
    /// Sensor fault reported by the station
    Sensor,
}

impl FlagKind {
    /// Every flag kind, in wire-format bit order
    pub const ALL: [FlagKind; 6] = [
        FlagKind::Range,
        FlagKind::Delta,
        FlagKind::Door,
        FlagKind::Exception,
        FlagKind::Frozen,
        FlagKind::Sensor,
    ];

    /// Bit index of this kind in the persisted integer
    ///
    /// Table version [`FLAG_TABLE_VERSION`]. Never renumber an entry without
    /// migrating stored flag integers.
    pub const fn bit(self) -> u32 {
        match self {
            FlagKind::Range => 0,
            FlagKind::Delta => 1,
            FlagKind::Door => 2,
            FlagKind::Exception => 3,
            FlagKind::Frozen => 4,
            FlagKind::Sensor => 5,
        }
    }

    /// Single-bit mask for this kind
    pub const fn mask(self) -> u64 {
        1 << self.bit()
    }

    /// Upper-case wire name of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            FlagKind::Range => "RANGE",
            FlagKind::Delta => "DELTA",
            FlagKind::Door => "DOOR",
            FlagKind::Exception => "EXCEPTION",
            FlagKind::Frozen => "FROZEN",
            FlagKind::Sensor => "SENSOR",
        }
    }

    /// Version of the bit table used by [`FlagKind::bit`]
    pub fn table_version() -> u32 {
        FLAG_TABLE_VERSION
    }
}

impl FromStr for FlagKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        FlagKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::data_validation(format!(
                    "Invalid flag kind '{}': must be one of RANGE, DELTA, DOOR, EXCEPTION, FROZEN, SENSOR",
                    s
                ))
            })
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Flag Vector
// =============================================================================

/// Set of raised flag kinds, persisted as a single non-negative integer
///
/// Bits beyond the declared kinds are kept on round-trip so that data written
/// by a newer table version is not silently rewritten, but named accessors
/// ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagVector(u64);

impl FlagVector {
    /// The all-clear vector
    pub const fn clear() -> Self {
        Self(0)
    }

    /// Decode a persisted integer
    pub const fn from_int(value: u64) -> Self {
        Self(value)
    }

    /// Decode a nullable column value
    ///
    /// `None` yields the all-clear vector. Negative integers are rejected.
    pub fn from_nullable(value: Option<i64>) -> Result<Self> {
        match value {
            None => Ok(Self::clear()),
            Some(raw) => Self::try_from(raw),
        }
    }

    /// Integer wire representation
    pub const fn to_int(self) -> u64 {
        self.0
    }

    /// Raise or clear one kind, leaving every other bit untouched
    pub fn set_flagged(&mut self, kind: FlagKind, flagged: bool) {
        if flagged {
            self.0 |= kind.mask();
        } else {
            self.0 &= !kind.mask();
        }
    }

    /// Builder form of [`FlagVector::set_flagged`]
    pub fn with(mut self, kind: FlagKind) -> Self {
        self.set_flagged(kind, true);
        self
    }

    /// Check whether one kind is raised
    pub fn is_kind_flagged(self, kind: FlagKind) -> bool {
        self.0 & kind.mask() != 0
    }

    /// Check whether anything is raised, including unknown bits
    pub fn is_flagged(self) -> bool {
        self.0 != 0
    }

    /// Raised kinds in bit order
    pub fn kinds(self) -> Vec<FlagKind> {
        FlagKind::ALL
            .into_iter()
            .filter(|kind| self.is_kind_flagged(*kind))
            .collect()
    }

    /// Bits that no declared kind owns
    pub fn unknown_bits(self) -> u64 {
        self.0 & !KNOWN_FLAG_MASK
    }
}

impl TryFrom<i64> for FlagVector {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u64::try_from(value).map(Self).map_err(|_| {
            Error::data_validation(format!(
                "Invalid flag integer {}: flag vectors are never negative",
                value
            ))
        })
    }
}

impl From<FlagVector> for u64 {
    fn from(flags: FlagVector) -> Self {
        flags.0
    }
}

impl FromIterator<FlagKind> for FlagVector {
    fn from_iter<I: IntoIterator<Item = FlagKind>>(iter: I) -> Self {
        iter.into_iter().fold(FlagVector::clear(), FlagVector::with)
    }
}

impl fmt::Display for FlagVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
