//! Year-less syslog timestamps ("Jan 10 12:00:01").

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::fmt;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Leap year whose month lengths place each month on the seconds-in-year axis
const REFERENCE_YEAR: i32 = 2000;

/// A calendar timestamp without a year, as written in auth.log headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyslogTimestamp {
    month: u32,
    day: u32,
    time: NaiveTime,
}

impl SyslogTimestamp {
    /// Build from numeric components; `None` if any component is out of range.
    /// Days are checked against 1..=31 only, not the month's length.
    pub fn new(month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        Some(SyslogTimestamp { month, day, time })
    }

    /// Parse the three header fields `Mon`, `D`, `HH:MM:SS`
    pub fn from_parts(month: &str, day: &str, time: &str) -> Option<Self> {
        let month_num = MONTHS.iter().position(|m| *m == month)? as u32 + 1;

        if day.is_empty() || day.len() > 2 || !day.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let day_num: u32 = day.parse().ok()?;

        let parts: Vec<&str> = time.split(':').collect();
        if parts.len() != 3 {
            return None;
        }
        let mut hms = [0u32; 3];
        for (slot, part) in hms.iter_mut().zip(&parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }

        Self::new(month_num, day_num, hms[0], hms[1], hms[2])
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Seconds elapsed since Jan 1 00:00:00 of the (unknown) year.
    ///
    /// Only meaningful for comparisons within one year; wraparound is not handled.
    /// A day past the end of its month lands on the following month's days.
    pub fn seconds_since_year_start(&self) -> i64 {
        let month_start = NaiveDate::from_ymd_opt(REFERENCE_YEAR, self.month, 1)
            .map(|d| d.ordinal0())
            .unwrap_or(0);
        let ordinal0 = month_start + self.day - 1;
        i64::from(ordinal0) * 86_400 + i64::from(self.time.num_seconds_from_midnight())
    }
}

impl fmt::Display for SyslogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {:02}:{:02}:{:02}",
            MONTHS[(self.month - 1) as usize],
            self.day,
            self.time.hour(),
            self.time.minute(),
            self.time.second()
        )
    }
}
