//! Calendar day keys in US Eastern time.
//!
//! A [`DayKey`] is the unit of freshness for both the daily selection and the
//! progress store. It rolls over at Eastern midnight regardless of where the
//! process runs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::DayKeyError;

const EST_OFFSET_SECS: i32 = -5 * 3600;
const EDT_OFFSET_SECS: i32 = -4 * 3600;

/// A `YYYY-MM-DD` calendar day evaluated in US Eastern time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(String);

impl DayKey {
    /// The day key for the current instant.
    pub fn today() -> Self {
        Self::for_instant(Utc::now())
    }

    /// The Eastern calendar day containing `instant`.
    pub fn for_instant(instant: DateTime<Utc>) -> Self {
        let local = instant.with_timezone(&eastern_offset(instant));
        Self::from_date(local.date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DayKey {
    type Err = DayKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields, so check the shape first.
        let shaped = s.len() == 10
            && s.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shaped {
            return Err(DayKeyError(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|_| DayKeyError(s.to_string()))
    }
}

impl TryFrom<String> for DayKey {
    type Error = DayKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.0
    }
}

/// UTC offset of US Eastern time at `instant`.
///
/// Daylight time runs from the second Sunday of March, 07:00 UTC (02:00 EST),
/// to the first Sunday of November, 06:00 UTC (02:00 EDT).
pub fn eastern_offset(instant: DateTime<Utc>) -> FixedOffset {
    let year = instant.year();
    let dst_start = nth_sunday(year, 3, 2)
        .and_hms_opt(7, 0, 0)
        .map(|t| t.and_utc());
    let dst_end = nth_sunday(year, 11, 1)
        .and_hms_opt(6, 0, 0)
        .map(|t| t.and_utc());

    let in_dst = match (dst_start, dst_end) {
        (Some(start), Some(end)) => instant >= start && instant < end,
        _ => false,
    };
    let secs = if in_dst {
        EDT_OFFSET_SECS
    } else {
        EST_OFFSET_SECS
    };
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

/// The `n`th Sunday (1-based) of `month` in `year`.
fn nth_sunday(year: i32, month: u32, n: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let to_sunday = (7 - first.weekday().num_days_from_sunday()) % 7;
    debug_assert_eq!(
        (first + Duration::days(i64::from(to_sunday))).weekday(),
        Weekday::Sun
    );
    first + Duration::days(i64::from(to_sunday + 7 * (n - 1)))
}
