//! Calendar dates for model output and observations.
//!
//! [`Date`] is a UTC timestamp with millisecond resolution. Model output is
//! usually stored as seconds since a cold start date, so the type supports
//! adding fractional seconds directly:
//!
//! ```
//! use hmdf::Date;
//!
//! let coldstart = Date::new(2019, 2, 5, 0, 0, 0).unwrap();
//! let d = coldstart + 3600.5;
//! assert_eq!(d.to_string(), "2019-02-05 01:00:00");
//! assert_eq!(d.millisecond(), 500);
//! ```

use std::fmt::{self, Write as _};
use std::ops::{Add, AddAssign, Sub, SubAssign};

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{HmdfError, Result};

/// Format used by `Display` and as the default for parsing.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A UTC calendar timestamp with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    datetime: NaiveDateTime,
}

impl Default for Date {
    /// The Unix epoch.
    fn default() -> Self {
        Self::from_mseconds(0)
    }
}

impl Date {
    /// Create a date from calendar components.
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Result<Self> {
        Self::with_millisecond(year, month, day, hour, minute, second, 0)
    }

    /// Create a date from calendar components including milliseconds.
    pub fn with_millisecond(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
    ) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_milli_opt(hour, minute, second, millisecond))
            .map(|datetime| Self { datetime })
            .ok_or_else(|| {
                HmdfError::InvalidDate(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
                    year, month, day, hour, minute, second, millisecond
                ))
            })
    }

    /// Earliest date used as a sentinel in bounds searches.
    pub fn min_date() -> Self {
        Self::from_ymd_midnight(1900, 1, 1)
    }

    /// Latest date used as a sentinel in bounds searches.
    pub fn max_date() -> Self {
        Self::from_ymd_midnight(3000, 1, 1)
    }

    fn from_ymd_midnight(year: i32, month: u32, day: u32) -> Self {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|datetime| Self { datetime })
            .unwrap_or_default()
    }

    /// Current system time.
    pub fn now() -> Self {
        Self {
            datetime: chrono::Utc::now().naive_utc(),
        }
    }

    /// Date from whole seconds since the Unix epoch.
    pub fn from_seconds(seconds: i64) -> Self {
        Self::from_mseconds(seconds.saturating_mul(1000))
    }

    /// Date from milliseconds since the Unix epoch.
    ///
    /// Values outside chrono's range saturate to its limits.
    pub fn from_mseconds(mseconds: i64) -> Self {
        let datetime = DateTime::from_timestamp_millis(mseconds)
            .map(|d| d.naive_utc())
            .unwrap_or(if mseconds < 0 {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            });
        Self { datetime }
    }

    /// Whole seconds since the Unix epoch.
    pub fn to_seconds(&self) -> i64 {
        self.datetime.and_utc().timestamp()
    }

    /// Milliseconds since the Unix epoch.
    pub fn to_mseconds(&self) -> i64 {
        self.datetime.and_utc().timestamp_millis()
    }

    /// Underlying chrono value.
    pub fn as_naive(&self) -> NaiveDateTime {
        self.datetime
    }

    fn shift_mseconds(&mut self, mseconds: i64) {
        self.datetime = Duration::try_milliseconds(mseconds)
            .and_then(|d| self.datetime.checked_add_signed(d))
            .unwrap_or(if mseconds < 0 {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            });
    }

    pub fn add_seconds(&mut self, value: i64) {
        self.shift_mseconds(value.saturating_mul(1000));
    }

    pub fn add_minutes(&mut self, value: i64) {
        self.add_seconds(value.saturating_mul(60));
    }

    pub fn add_hours(&mut self, value: i64) {
        self.add_seconds(value.saturating_mul(3600));
    }

    pub fn add_days(&mut self, value: i64) {
        self.add_seconds(value.saturating_mul(86_400));
    }

    pub fn add_weeks(&mut self, value: i64) {
        self.add_days(value.saturating_mul(7));
    }

    /// Calendar month arithmetic; the day is clamped to the end of the
    /// target month (Jan 31 + 1 month = Feb 28/29).
    pub fn add_months(&mut self, value: i64) -> Result<()> {
        let months = u32::try_from(value.unsigned_abs())
            .map_err(|_| HmdfError::InvalidDate(format!("month offset {} too large", value)))?;
        let shifted = if value >= 0 {
            self.datetime.checked_add_months(Months::new(months))
        } else {
            self.datetime.checked_sub_months(Months::new(months))
        };
        self.datetime = shifted.ok_or_else(|| {
            HmdfError::InvalidDate(format!("{} + {} months out of range", self, value))
        })?;
        Ok(())
    }

    pub fn add_years(&mut self, value: i64) -> Result<()> {
        self.add_months(value.saturating_mul(12))
    }

    /// Calendar components as `[year, month, day, hour, minute, second, millisecond]`.
    pub fn components(&self) -> [i32; 7] {
        [
            self.year(),
            self.month() as i32,
            self.day() as i32,
            self.hour() as i32,
            self.minute() as i32,
            self.second() as i32,
            self.millisecond() as i32,
        ]
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    pub fn month(&self) -> u32 {
        self.datetime.month()
    }

    pub fn day(&self) -> u32 {
        self.datetime.day()
    }

    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    pub fn minute(&self) -> u32 {
        self.datetime.minute()
    }

    pub fn second(&self) -> u32 {
        self.datetime.second()
    }

    pub fn millisecond(&self) -> u32 {
        self.datetime.nanosecond() / 1_000_000
    }

    pub fn set_year(&mut self, year: i32) -> Result<()> {
        self.replace(self.datetime.with_year(year), "year", year as i64)
    }

    pub fn set_month(&mut self, month: u32) -> Result<()> {
        self.replace(self.datetime.with_month(month), "month", month as i64)
    }

    pub fn set_day(&mut self, day: u32) -> Result<()> {
        self.replace(self.datetime.with_day(day), "day", day as i64)
    }

    pub fn set_hour(&mut self, hour: u32) -> Result<()> {
        self.replace(self.datetime.with_hour(hour), "hour", hour as i64)
    }

    pub fn set_minute(&mut self, minute: u32) -> Result<()> {
        self.replace(self.datetime.with_minute(minute), "minute", minute as i64)
    }

    pub fn set_second(&mut self, second: u32) -> Result<()> {
        self.replace(self.datetime.with_second(second), "second", second as i64)
    }

    pub fn set_millisecond(&mut self, millisecond: u32) -> Result<()> {
        let nanos = if millisecond < 1000 {
            self.datetime.with_nanosecond(millisecond * 1_000_000)
        } else {
            None
        };
        self.replace(nanos, "millisecond", millisecond as i64)
    }

    fn replace(&mut self, value: Option<NaiveDateTime>, field: &str, raw: i64) -> Result<()> {
        self.datetime = value
            .ok_or_else(|| HmdfError::InvalidDate(format!("{} {} invalid for {}", field, raw, self)))?;
        Ok(())
    }

    /// Parse a date with a strftime-style format.
    ///
    /// A format without time fields yields midnight. `%OS` is accepted as
    /// an alias for `%S`.
    pub fn from_string(text: &str, format: &str) -> Result<Self> {
        let format = normalize_format(format);
        let text = text.trim();
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, &format) {
            return Ok(Self { datetime });
        }
        NaiveDate::parse_from_str(text, &format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|datetime| Self { datetime })
            .ok_or_else(|| {
                HmdfError::InvalidDate(format!("`{}` does not match format `{}`", text, format))
            })
    }

    /// Format with a strftime-style format string.
    pub fn to_string_fmt(&self, format: &str) -> Result<String> {
        let format = normalize_format(format);
        let mut out = String::new();
        write!(out, "{}", self.datetime.format(&format))
            .map_err(|_| HmdfError::InvalidDate(format!("invalid format string `{}`", format)))?;
        Ok(out)
    }
}

fn normalize_format(format: &str) -> String {
    format.replace("%OS", "%S")
}

impl From<NaiveDateTime> for Date {
    fn from(datetime: NaiveDateTime) -> Self {
        Self { datetime }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format(DEFAULT_DATE_FORMAT))
    }
}

/// Fractional seconds, truncated to whole milliseconds.
impl AddAssign<f64> for Date {
    fn add_assign(&mut self, rhs: f64) {
        self.shift_mseconds((rhs * 1000.0).floor() as i64);
    }
}

impl SubAssign<f64> for Date {
    fn sub_assign(&mut self, rhs: f64) {
        self.shift_mseconds(((rhs * 1000.0).floor() as i64).saturating_neg());
    }
}

/// Whole seconds.
impl AddAssign<i64> for Date {
    fn add_assign(&mut self, rhs: i64) {
        self.add_seconds(rhs);
    }
}

impl SubAssign<i64> for Date {
    fn sub_assign(&mut self, rhs: i64) {
        self.add_seconds(rhs.saturating_neg());
    }
}

impl AddAssign<Duration> for Date {
    fn add_assign(&mut self, rhs: Duration) {
        self.shift_mseconds(rhs.num_milliseconds());
    }
}

impl Add<f64> for Date {
    type Output = Date;

    fn add(mut self, rhs: f64) -> Date {
        self += rhs;
        self
    }
}

impl Sub<f64> for Date {
    type Output = Date;

    fn sub(mut self, rhs: f64) -> Date {
        self -= rhs;
        self
    }
}

impl Add<i64> for Date {
    type Output = Date;

    fn add(mut self, rhs: i64) -> Date {
        self += rhs;
        self
    }
}

impl Sub<i64> for Date {
    type Output = Date;

    fn sub(mut self, rhs: i64) -> Date {
        self -= rhs;
        self
    }
}

impl Add<Duration> for Date {
    type Output = Date;

    fn add(mut self, rhs: Duration) -> Date {
        self += rhs;
        self
    }
}

impl Sub for Date {
    type Output = Duration;

    fn sub(self, rhs: Date) -> Duration {
        self.datetime.signed_duration_since(rhs.datetime)
    }
}
