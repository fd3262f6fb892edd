//! Candidate values.

use serde::{Deserialize, Serialize};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Minimum separation, in hours, applied when a row does not specify one.
pub const DEFAULT_GAP_HOURS: u32 = 24;

/// A concrete (date, time) pair taken from the timeslot table.
///
/// Carries the minimum gap of the item whose domain it belongs to. The
/// same calendar slot is copied into each item's domain with that item's
/// gap, so two items never share one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateValue {
    /// Calendar date.
    pub date: NaiveDate,
    /// Time of day.
    pub time: NaiveTime,
    /// Minimum gap (hours) required before this value when it is the later one.
    pub gap_hours: u32,
}

impl CandidateValue {
    /// Creates a value with the default gap.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time,
            gap_hours: DEFAULT_GAP_HOURS,
        }
    }

    /// Sets the minimum gap.
    pub fn with_gap(mut self, gap_hours: u32) -> Self {
        self.gap_hours = gap_hours;
        self
    }

    /// Combined date and time.
    #[inline]
    pub fn datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

impl fmt::Display for CandidateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime())
    }
}
