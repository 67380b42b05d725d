//! Date-based partition derivation.
//!
//! Partitions are Hive-style `year=YYYY/month=MM/day=DD` prefixes taken from
//! the calendar date of a record timestamp, in the timestamp's own offset.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use ic_common::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Calendar-date partition of a curated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PartitionKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PartitionKey {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year={:04}/month={:02}/day={:02}",
            self.year, self.month, self.day
        )
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// Derive the partition of an ISO-8601 timestamp.
///
/// A trailing `Z` is read as `+00:00`. Offset-aware timestamps are dated in
/// their own offset; naive date-times and bare dates are taken as written.
pub fn derive_partition(ts: &str) -> Result<PartitionKey> {
    let normalized = match ts.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => ts.to_string(),
    };

    parse_date(&normalized)
        .map(PartitionKey::for_date)
        .ok_or_else(|| Error::MalformedTimestamp {
            value: ts.to_string(),
            reason: "expected an ISO-8601 date or date-time".to_string(),
        })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.date_naive());
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
