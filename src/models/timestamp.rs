use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Wall-clock point in time. No calendar validation is performed, so values
/// like month 13 are representable and still totally ordered.
///
/// Ordering is lexicographic over (year, month, day, hour, minute, second),
/// which is exactly what the derived `Ord` gives given the field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl Timestamp {
    pub const fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Timestamp { year, month, day, hour, minute, second }
    }

    pub fn is_earlier(&self, other: &Timestamp) -> bool {
        self < other
    }

    pub fn is_newer(&self, other: &Timestamp) -> bool {
        self > other
    }

    pub fn equals(&self, other: &Timestamp) -> bool {
        self == other
    }

    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Timestamp {
            year: dt.year(),
            month: dt.month() as i32,
            day: dt.day() as i32,
            hour: dt.hour() as i32,
            minute: dt.minute() as i32,
            second: dt.second() as i32,
        }
    }

    /// `None` when the fields do not name a real calendar instant.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let month = u32::try_from(self.month).ok()?;
        let day = u32::try_from(self.day).ok()?;
        let hour = u32::try_from(self.hour).ok()?;
        let minute = u32::try_from(self.minute).ok()?;
        let second = u32::try_from(self.second).ok()?;
        NaiveDate::from_ymd_opt(self.year, month, day)?.and_hms_opt(hour, minute, second)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}', expected YYYY-MM-DD HH:MM:SS")]
pub struct ParseTimestampError(String);

fn next_field<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<i32> {
    parts.next().and_then(|p| p.parse::<i32>().ok())
}

/// Accepts the `Display` form. A leading `-` belongs to the year, so
/// negative years read back; the other fields must be non-negative.
impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimestampError(s.to_string());
        let (date, time) = s.trim().split_once(' ').ok_or_else(err)?;
        let (negative, date) = match date.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, date),
        };

        let mut date_parts = date.split('-');
        let mut time_parts = time.trim().split(':');

        let year_text = date_parts.next().ok_or_else(err)?;
        let year = if negative {
            format!("-{}", year_text).parse::<i32>()
        } else {
            year_text.parse::<i32>()
        };

        let ts = Timestamp {
            year: year.map_err(|_| err())?,
            month: next_field(&mut date_parts).ok_or_else(err)?,
            day: next_field(&mut date_parts).ok_or_else(err)?,
            hour: next_field(&mut time_parts).ok_or_else(err)?,
            minute: next_field(&mut time_parts).ok_or_else(err)?,
            second: next_field(&mut time_parts).ok_or_else(err)?,
        };
        if date_parts.next().is_some() || time_parts.next().is_some() {
            return Err(err());
        }
        Ok(ts)
    }
}
