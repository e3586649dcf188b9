//! Timestamp parsing and report time zones
//!
//! Health exports mix several ISO-8601 flavours. Offset-less timestamps are
//! read in the report zone, the same way a browser reads them in local time.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use std::str::FromStr;

use super::error::RecordsError;

/// Offset-less formats, tried in order
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Apple Health export format: `2024-01-15 22:30:00 -0500`
const APPLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Time zone used to decide "local" calendar dates and hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportZone {
    /// The system's local time zone
    #[default]
    Local,
    /// Coordinated Universal Time
    Utc,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl ReportZone {
    /// Wall-clock time of `instant` in this zone
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            ReportZone::Local => instant.with_timezone(&Local).naive_local(),
            ReportZone::Utc => instant.naive_utc(),
            ReportZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Local hour-of-day of `instant` in this zone
    pub fn hour(&self, instant: DateTime<Utc>) -> u32 {
        self.to_local(instant).hour()
    }

    /// Interpret a wall-clock time in this zone
    ///
    /// Ambiguous local times (DST fold) resolve to the earlier instant;
    /// nonexistent ones (DST gap) yield `None`.
    pub fn resolve(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            ReportZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            ReportZone::Utc => Some(naive.and_utc()),
            ReportZone::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl FromStr for ReportZone {
    type Err = RecordsError;

    /// Accepts `local`, `utc` / `z`, or an offset like `+05:30` / `-0800`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "local" | "" => return Ok(ReportZone::Local),
            "utc" | "z" => return Ok(ReportZone::Utc),
            _ => {}
        }

        parse_offset(s)
            .map(ReportZone::Fixed)
            .ok_or_else(|| RecordsError::InvalidZone(s.to_string()))
    }
}

impl std::fmt::Display for ReportZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportZone::Local => write!(f, "local"),
            ReportZone::Utc => write!(f, "utc"),
            ReportZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse an export timestamp into an instant
///
/// Returns `None` for anything unparsable; callers treat that as a
/// malformed record.
pub fn parse_timestamp(s: &str, zone: ReportZone) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(s, APPLE_FORMAT) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return zone.resolve(naive);
        }
    }

    // Date-only strings are midnight UTC
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
