use chrono::{Datelike, NaiveDate};

use crate::error::{HavenError, Result};

/// Parse a YYYY-MM period string into (year, month).
pub fn parse_period(period: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = period.split('-').collect();
    if parts.len() != 2 || parts[0].len() != 4 {
        return Err(HavenError::InvalidPeriod(period.to_string()));
    }
    let year: i32 = parts[0]
        .parse()
        .map_err(|_| HavenError::InvalidPeriod(period.to_string()))?;
    let month: u32 = parts[1]
        .parse()
        .map_err(|_| HavenError::InvalidPeriod(period.to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(HavenError::InvalidPeriod(period.to_string()));
    }
    Ok((year, month))
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(ny, nm, 1).expect("valid month start");
    first_of_next.pred_opt().expect("date has predecessor").day()
}

/// First calendar day of the period: YYYY-MM-01.
pub fn period_start(period: &str) -> Result<String> {
    parse_period(period)?;
    Ok(format!("{period}-01"))
}

/// Last calendar day of the period as a full date string.
pub fn period_end(period: &str) -> Result<String> {
    let (year, month) = parse_period(period)?;
    Ok(format!("{period}-{:02}", last_day_of_month(year, month)))
}

/// Build a date string for a day-of-month within the period. The day is not
/// clamped to the month length; claim days come from plan data as-is.
pub fn day_in_period(period: &str, day: u32) -> String {
    format!("{period}-{day:02}")
}

/// Whole days between two YYYY-MM-DD strings, or None if either fails to parse.
pub fn days_between(a: &str, b: &str) -> Option<i64> {
    let da = NaiveDate::parse_from_str(a, "%Y-%m-%d").ok()?;
    let db = NaiveDate::parse_from_str(b, "%Y-%m-%d").ok()?;
    Some((da - db).num_days().abs())
}
