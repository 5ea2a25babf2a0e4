//! Fixed-field historian timestamp.
//!
//! The historian takes calendar fields rather than an epoch offset. No time
//! zone conversion happens here: callers hand in the wall-clock moment in the
//! zone the historian reports in, and `tzinfo` stays at zero (unspecified).

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    /// Whole seconds plus the millisecond fraction.
    pub second: f64,
    pub tzinfo: i32,
}

impl Timestamp {
    /// Build from calendar fields. The fields are trusted to already be in
    /// range.
    pub fn from_parts(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second: f64::from(second) + f64::from(millisecond) / 1000.0,
            tzinfo: 0,
        }
    }

    /// Wall-clock fields of a zone-aware moment, in that moment's own zone.
    pub fn from_datetime<Tz: TimeZone>(moment: &DateTime<Tz>) -> Self {
        Self::from(moment.naive_local())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(moment: NaiveDateTime) -> Self {
        // Sub-millisecond precision is dropped; a leap second shows up as a
        // millisecond count of 1000 or more.
        let millis = moment.nanosecond() / 1_000_000;
        Self::from_parts(
            moment.year(),
            moment.month() as i32,
            moment.day() as i32,
            moment.hour() as i32,
            moment.minute() as i32,
            moment.second() as i32,
            millis as i32,
        )
    }
}

impl fmt::Display for Timestamp {
    /// `hour:minute:second`, unpadded. Diagnostics only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hour, self.minute, self.second)
    }
}
