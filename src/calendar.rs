//! Month arithmetic and date parsing
//!
//! Months are represented by the `NaiveDate` of their first day.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month `n` months after the month containing `date`
pub fn month_start_after(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(n))
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    let start = month_start(date);
    match month_start_after(start, 1) {
        Some(next) => (next - start).num_days() as u32,
        None => 31,
    }
}

/// Every month start from the month of `start` to the month of `end`, inclusive.
/// Empty when `end` falls in an earlier month than `start`.
pub fn months_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let last = month_start(end);
    let mut months = Vec::new();
    let mut current = month_start(start);
    while current <= last {
        months.push(current);
        match month_start_after(current, 1) {
            Some(next) => current = next,
            None => break,
        }
    }
    months
}

/// Parse a date cell. Blank or unrecognised text yields `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    // Year-month only
    NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok()
}

/// ISO rendering used for every date cell in the output workbook
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Whether a column name marks a date-valued column
pub fn is_date_column(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("date") || lower.contains("month")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(ymd(2024, 1, 15)), 31);
        assert_eq!(days_in_month(ymd(2024, 2, 1)), 29);
        assert_eq!(days_in_month(ymd(2023, 2, 28)), 28);
        assert_eq!(days_in_month(ymd(2024, 4, 30)), 30);
        assert_eq!(days_in_month(ymd(2024, 12, 31)), 31);
    }

    #[test]
    fn test_months_inclusive_spans_year_end() {
        let months = months_inclusive(ymd(2024, 11, 20), ymd(2025, 2, 3));
        assert_eq!(months, vec![ymd(2024, 11, 1), ymd(2024, 12, 1), ymd(2025, 1, 1), ymd(2025, 2, 1)]);
    }

    #[test]
    fn test_months_inclusive_same_month() {
        assert_eq!(months_inclusive(ymd(2024, 5, 2), ymd(2024, 5, 30)), vec![ymd(2024, 5, 1)]);
        assert!(months_inclusive(ymd(2024, 5, 2), ymd(2024, 4, 30)).is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-03-07"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse_date("2024-03-07 13:45:00"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse_date("2024-03-07T13:45:00"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse_date("2024/03/07"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse_date("25/12/2024"), Some(ymd(2024, 12, 25)));
        assert_eq!(parse_date("2024-03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_date_column_detection() {
        assert!(is_date_column("registration_date"));
        assert!(is_date_column("Pay_Month"));
        assert!(!is_date_column("total_paid"));
    }
}
