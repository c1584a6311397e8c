//! Reporting period helpers
//!
//! Earnings reports are keyed by `YYYY-MM` strings.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::{Error, Result};

fn parse_period(period: &str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidPeriod(period.to_string());
    let (year, month) = period.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// "2024-06" → "June 2024"
pub fn month_name(period: &str) -> Result<String> {
    Ok(parse_period(period)?.format("%B %Y").to_string())
}

/// Period containing `now`
pub fn current_year_month(now: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}

/// The last `n` periods ending with the one containing `now`, oldest first.
pub fn last_n_months(n: usize, now: DateTime<Utc>) -> Vec<String> {
    let mut year = now.year();
    let mut month = now.month() as i32;
    let mut periods = Vec::with_capacity(n);

    for _ in 0..n {
        periods.push(format!("{:04}-{:02}", year, month));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }

    periods.reverse();
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name("2024-01").unwrap(), "January 2024");
        assert_eq!(month_name("2024-06").unwrap(), "June 2024");
        assert_eq!(month_name("2024-12").unwrap(), "December 2024");
    }

    #[test]
    fn test_month_name_invalid() {
        assert!(matches!(month_name("2024-13"), Err(Error::InvalidPeriod(_))));
        assert!(month_name("June").is_err());
        assert!(month_name("2024-6").is_err());
    }

    #[test]
    fn test_current_year_month_pads() {
        assert_eq!(current_year_month(at(2024, 6, 15)), "2024-06");
        assert_eq!(current_year_month(at(2024, 1, 15)), "2024-01");
    }

    #[test]
    fn test_last_n_months() {
        assert_eq!(
            last_n_months(3, at(2024, 6, 15)),
            vec!["2024-04", "2024-05", "2024-06"]
        );
        assert!(last_n_months(0, at(2024, 6, 15)).is_empty());
        assert_eq!(last_n_months(12, at(2024, 6, 15)).len(), 12);
    }

    #[test]
    fn test_last_n_months_year_boundary() {
        let months = last_n_months(4, at(2024, 2, 15));
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }
}
