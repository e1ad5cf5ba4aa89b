//! Calendar-day keys used to decide when assignments expire.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar day, counted as days since 0001-01-01 (proleptic Gregorian).
///
/// Consecutive dates always differ by exactly one, across month and year
/// boundaries, so equality means "same date" and nothing else.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayKey(i64);

impl DayKey {
    /// Key of a store that has never been reset.
    pub const NEVER: DayKey = DayKey(0);

    /// Key for a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(i64::from(date.num_days_from_ce()))
    }

    /// Key for the calendar date `now` falls on in its own time zone.
    pub fn from_datetime<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self::from_date(now.date_naive())
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// The date this key stands for, if it is one.
    pub fn to_date(self) -> Option<NaiveDate> {
        let days = i32::try_from(self.0).ok()?;
        if days < 1 {
            return None;
        }
        NaiveDate::from_num_days_from_ce_opt(days)
    }
}

impl From<i64> for DayKey {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_date() {
            Some(date) => write!(f, "{date}"),
            None => write!(f, "day#{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_consecutive_days_across_month_end() {
        let jan31 = DayKey::from_date(date(2026, 1, 31));
        let feb1 = DayKey::from_date(date(2026, 2, 1));
        assert_eq!(feb1.get() - jan31.get(), 1);
    }

    #[test]
    fn test_same_day_of_month_in_different_months_differ() {
        // Day-of-month alone would call these equal.
        let a = DayKey::from_date(date(2026, 3, 1));
        let b = DayKey::from_date(date(2026, 4, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_year_boundary_and_leap_day() {
        let dec31 = DayKey::from_date(date(2027, 12, 31));
        let jan1 = DayKey::from_date(date(2028, 1, 1));
        assert_eq!(jan1.get() - dec31.get(), 1);

        let feb28 = DayKey::from_date(date(2028, 2, 28));
        let feb29 = DayKey::from_date(date(2028, 2, 29));
        let mar1 = DayKey::from_date(date(2028, 3, 1));
        assert_eq!(feb29.get() - feb28.get(), 1);
        assert_eq!(mar1.get() - feb29.get(), 1);
    }

    #[test]
    fn test_from_datetime_uses_local_date_of_zone() {
        // 23:30 UTC on the 5th is already the 6th at UTC+2.
        let utc = Utc.with_ymd_and_hms(2026, 10, 5, 23, 30, 0).unwrap();
        let kyiv = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(DayKey::from_datetime(&utc), DayKey::from_date(date(2026, 10, 5)));
        assert_eq!(DayKey::from_datetime(&kyiv), DayKey::from_date(date(2026, 10, 6)));
    }

    #[test]
    fn test_same_date_different_times_are_equal() {
        let morning = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 1).unwrap();
        let night = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap();
        assert_eq!(DayKey::from_datetime(&morning), DayKey::from_datetime(&night));
    }

    #[test]
    fn test_never_and_legacy_values_are_not_dates() {
        assert_eq!(DayKey::NEVER.to_date(), None);
        assert_eq!(DayKey::NEVER.to_string(), "day#0");
        // A day-of-month value from an older state file.
        assert_eq!(DayKey::from(17).to_date(), Some(date(1, 1, 17)));
        let today = DayKey::from_date(date(2026, 10, 18));
        assert_eq!(today.to_string(), "2026-10-18");
        assert_eq!(today.to_date(), Some(date(2026, 10, 18)));
    }
}
