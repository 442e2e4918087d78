//! Time-slot arithmetic.
//!
//! Windows are half-open minute ranges `[start, end)` measured from midnight.
//! An end past midnight is kept as-is (e.g. `23:00 + 90min` ends at minute
//! 1470) so comparisons never wrap; only display folds it back to `HH:MM`.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};

/// Width of every reservation slot.
pub const SLOT_MINUTES: u32 = 90;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse an `HH:MM` time.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// A half-open interval of minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeWindow {
    start: u32,
    end: u32,
}

impl TimeWindow {
    /// Window between two times; `None` unless `end` is strictly after `start`.
    pub fn between(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        let (start, end) = (minute_of_day(start), minute_of_day(end));
        (end > start).then_some(Self { start, end })
    }

    /// The standard 90 minute slot beginning at `start`.
    pub fn slot_at(start: NaiveTime) -> Self {
        let start = minute_of_day(start);
        Self {
            start,
            end: start + SLOT_MINUTES,
        }
    }

    /// Parse a configured slot string of the form `HH:MM-HH:MM`.
    pub fn parse_slot(value: &str) -> Option<Self> {
        let (start, end) = value.split_once('-')?;
        Self::between(parse_time(start)?, parse_time(end)?)
    }

    /// `[a,b)` and `[c,d)` overlap iff `a < d && c < b`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn starts_after(&self, time: NaiveTime) -> bool {
        self.start > minute_of_day(time)
    }

    pub fn start_minute(&self) -> u32 {
        self.start
    }
}

fn write_minute(f: &mut fmt::Formatter<'_>, minute: u32) -> fmt::Result {
    let minute = minute % MINUTES_PER_DAY;
    write!(f, "{:02}:{:02}", minute / 60, minute % 60)
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_minute(f, self.start)?;
        f.write_str("-")?;
        write_minute(f, self.end)
    }
}
