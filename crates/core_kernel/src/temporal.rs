//! Time handling for the ledger
//!
//! This module provides:
//! - `Timezone`: the business timezone used to decide what "today" is
//! - `Clock`: an injectable source of the current instant
//! - `elapsed_months`: calendar-aware fractional month arithmetic
//! - `DateRange`: inclusive calendar date ranges for ledger queries

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::RwLock;
use thiserror::Error;

/// Timezone wrapper for the business location
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the local calendar date of a UTC instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }

    /// Gets the first instant of the local day as UTC
    ///
    /// Falls back to midnight UTC when local midnight does not exist
    /// (DST gap at 00:00).
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN);
        naive
            .and_local_timezone(self.0)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Source of the current instant
///
/// Interest accrual and overdue detection depend on "now"; engines take a
/// clock so the same code runs against wall time and against fixed test time.
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;

    /// The business timezone
    fn timezone(&self) -> Timezone {
        Timezone::default()
    }

    /// Today's date in the business timezone
    fn today(&self) -> NaiveDate {
        self.timezone().local_date(self.now())
    }

    /// The first instant of a business day, as UTC
    fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.timezone().start_of_day(date)
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// A manually controlled clock
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
    timezone: Timezone,
}

impl FixedClock {
    /// Creates a clock frozen at `now`, in UTC
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_timezone(now, Timezone::default())
    }

    pub fn with_timezone(now: DateTime<Utc>, timezone: Timezone) -> Self {
        Self {
            now: RwLock::new(now),
            timezone,
        }
    }

    /// Moves the clock to `now`
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Moves the clock forward (or backward, for negative durations)
    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// Fractional calendar months elapsed between two instants
///
/// Counts whole calendar months stepping from `from` (day-of-month clamped
/// the way chrono does, e.g. Jan 31 + 1 month = Feb 28/29), then adds the
/// elapsed share of the following calendar month. Returns zero when `to` is
/// not after `from`.
pub fn elapsed_months(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    if to <= from {
        return Decimal::ZERO;
    }

    let mut whole: u32 = 0;
    let mut anchor = from;
    loop {
        match from.checked_add_months(Months::new(whole + 1)) {
            Some(next) if next <= to => {
                whole += 1;
                anchor = next;
            }
            _ => break,
        }
    }

    let Some(next) = from.checked_add_months(Months::new(whole + 1)) else {
        return Decimal::from(whole);
    };

    let elapsed_ms = (to - anchor).num_milliseconds();
    let month_ms = (next - anchor).num_milliseconds();
    if elapsed_ms <= 0 || month_ms <= 0 {
        return Decimal::from(whole);
    }

    Decimal::from(whole) + Decimal::from(elapsed_ms) / Decimal::from(month_ms)
}

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Half-open UTC bounds `[start of first day, start of day after last)`
    pub fn utc_bounds(&self, tz: &Timezone) -> (DateTime<Utc>, DateTime<Utc>) {
        let lower = tz.start_of_day(self.start);
        let upper = self
            .end
            .checked_add_days(Days::new(1))
            .map(|d| tz.start_of_day(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_one_calendar_month_is_exactly_one() {
        let from = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(from, to), dec!(1));
    }

    #[test]
    fn test_half_month() {
        let from = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 4, 16, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(from, to), dec!(0.5));
    }

    #[test]
    fn test_reversed_range_is_zero() {
        let from = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(elapsed_months(from, from), Decimal::ZERO);
        assert_eq!(elapsed_months(from, from - chrono::Duration::days(3)), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_date_range_bounds() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap();
        let (lo, hi) = range.utc_bounds(&Timezone::default());
        assert_eq!(lo, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(hi, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(range.days(), 31);
    }
}
