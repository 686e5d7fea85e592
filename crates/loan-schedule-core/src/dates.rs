//! Calendar handling for schedules.
//!
//! Periods are spaced by a fixed 30-day "month" rather than true calendar
//! months, so a schedule starting on the 1st drifts earlier over time.

use chrono::{Duration, NaiveDate};

use crate::error::ScheduleError;
use crate::ScheduleResult;

/// Days between consecutive periods.
pub const PERIOD_DAYS: i64 = 30;

/// Date layout used for inputs and exported cells.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a `MM/DD/YYYY` start date.
pub fn parse_date(value: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        ScheduleError::DateError(format!(
            "'{value}' is not a valid MM/DD/YYYY date: {e}"
        ))
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Date of the period following `date`.
pub fn next_period(date: NaiveDate) -> ScheduleResult<NaiveDate> {
    date.checked_add_signed(Duration::days(PERIOD_DAYS))
        .ok_or_else(|| ScheduleError::DateError(format!("date overflow after {date}")))
}

/// Serde adapter keeping dates in `MM/DD/YYYY` form on the wire.
pub mod mdy {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_us_date() {
        let d = parse_date("09/01/2023").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 9, 1).unwrap());
    }

    #[test]
    fn test_parse_rejects_iso_and_garbage() {
        assert!(matches!(parse_date("2023-09-01"), Err(ScheduleError::DateError(_))));
        assert!(matches!(parse_date("13/01/2023"), Err(ScheduleError::DateError(_))));
        assert!(matches!(parse_date(""), Err(ScheduleError::DateError(_))));
    }

    #[test]
    fn test_next_period_is_thirty_days_not_a_month() {
        let d = parse_date("01/31/2024").unwrap();
        // 2024 is a leap year: Jan 31 + 30 days = Mar 1
        assert_eq!(format_date(next_period(d).unwrap()), "03/01/2024");

        let d = parse_date("09/01/2023").unwrap();
        assert_eq!(format_date(next_period(d).unwrap()), "10/01/2023");
        let d = next_period(next_period(d).unwrap()).unwrap();
        assert_eq!(format_date(d), "10/31/2023");
    }

    #[test]
    fn test_format_zero_pads() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(d), "03/05/2024");
    }
}
