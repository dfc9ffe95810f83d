//! Shared identifier and time types

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable catalog identifier of a creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureId(pub u32);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Milliseconds since the Unix epoch
pub type Millis = i64;

/// A single captured "now", shared by every check of one evaluation
///
/// Carries both the absolute instant (for cadence and window arithmetic) and
/// the local wall-clock reading (for weekday, month, hour and holiday checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    instant: DateTime<FixedOffset>,
}

impl Moment {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self { instant }
    }

    pub fn millis(&self) -> Millis {
        self.instant.timestamp_millis()
    }

    pub fn local(&self) -> NaiveDateTime {
        self.instant.naive_local()
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}

impl From<DateTime<FixedOffset>> for Moment {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self::new(instant)
    }
}
