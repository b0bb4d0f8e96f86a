use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::ParseError;

/// On-disk timestamp layout: `yyyy-MM-dd HHmm`
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H%M";

/// Human-facing layout, e.g. `Dec 25 2024, 6:00PM`
pub const DISPLAY_FORMAT: &str = "%b %d %Y, %-I:%M%p";

static TIME_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})(\d{2})$").expect("valid regex"));
static MONTH_DAY_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})-(\d{2}) (\d{2})(\d{2})$").expect("valid regex"));
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})-(\d{2})$").expect("valid regex"));
static FULL_DATE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (\d{2})(\d{2})$").expect("valid regex"));
static FULL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid regex"));

/// Parse a loosely formatted date/time relative to the local clock
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime, ParseError> {
    parse_datetime_at(text, Local::now().naive_local())
}

/// Parse a loosely formatted date/time relative to `now`.
///
/// Accepted forms, first match wins:
/// `now`, `today`, `HHmm`, `MM-dd HHmm`, `MM-dd`, `yyyy-MM-dd HHmm`, `yyyy-MM-dd`.
/// Forms without a year use the year of `now`; forms without a time use the start
/// of the day.
pub fn parse_datetime_at(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime, ParseError> {
    let text = text.trim().to_lowercase();
    let invalid = || ParseError::InvalidTimestamp(text.clone());

    if text == "now" {
        return now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(invalid);
    }
    if text == "today" {
        return Ok(now.date().and_time(NaiveTime::MIN));
    }
    if let Some(caps) = TIME_ONLY.captures(&text) {
        let time = time_of(&caps[1], &caps[2]).ok_or_else(invalid)?;
        return Ok(now.date().and_time(time));
    }
    if let Some(caps) = MONTH_DAY_TIME.captures(&text) {
        let date = date_of(now.year(), &caps[1], &caps[2]).ok_or_else(invalid)?;
        let time = time_of(&caps[3], &caps[4]).ok_or_else(invalid)?;
        return Ok(date.and_time(time));
    }
    if let Some(caps) = MONTH_DAY.captures(&text) {
        let date = date_of(now.year(), &caps[1], &caps[2]).ok_or_else(invalid)?;
        return Ok(date.and_time(NaiveTime::MIN));
    }
    if let Some(caps) = FULL_DATE_TIME.captures(&text) {
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let date = date_of(year, &caps[2], &caps[3]).ok_or_else(invalid)?;
        let time = time_of(&caps[4], &caps[5]).ok_or_else(invalid)?;
        return Ok(date.and_time(time));
    }
    if let Some(caps) = FULL_DATE.captures(&text) {
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let date = date_of(year, &caps[2], &caps[3]).ok_or_else(invalid)?;
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(invalid())
}

/// Strict parse of the canonical storage layout
pub fn parse_storage(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), STORAGE_FORMAT)
}

pub fn format_storage(instant: &NaiveDateTime) -> String {
    instant.format(STORAGE_FORMAT).to_string()
}

pub fn format_display(instant: &NaiveDateTime) -> String {
    instant.format(DISPLAY_FORMAT).to_string()
}

fn date_of(year: i32, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn time_of(hour: &str, minute: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn now_and_today_follow_reference_clock() {
        assert_eq!(parse_datetime_at("now", reference()).unwrap(), at(2025, 3, 14, 9, 26));
        assert_eq!(parse_datetime_at(" TODAY ", reference()).unwrap(), at(2025, 3, 14, 0, 0));
    }

    #[test]
    fn time_only_uses_todays_date() {
        assert_eq!(parse_datetime_at("1430", reference()).unwrap(), at(2025, 3, 14, 14, 30));
    }

    #[test]
    fn month_day_forms_use_current_year() {
        assert_eq!(parse_datetime_at("12-25 1800", reference()).unwrap(), at(2025, 12, 25, 18, 0));
        assert_eq!(parse_datetime_at("12-25", reference()).unwrap(), at(2025, 12, 25, 0, 0));
    }

    #[test]
    fn full_forms_are_exact() {
        assert_eq!(parse_datetime_at("2024-12-25 1800", reference()).unwrap(), at(2024, 12, 25, 18, 0));
        assert_eq!(parse_datetime_at("2024-02-29", reference()).unwrap(), at(2024, 2, 29, 0, 0));
    }

    #[test]
    fn invalid_calendar_values_are_rejected() {
        for text in ["2460", "13-01", "02-30 1200", "2023-02-29", "2024-12-25 2400", "invalid", ""] {
            let err = parse_datetime_at(text, reference()).unwrap_err();
            assert!(matches!(err, ParseError::InvalidTimestamp(_)), "{text} should fail");
        }
    }

    #[test]
    fn storage_and_display_formats() {
        let due = at(2024, 12, 25, 18, 0);
        assert_eq!(format_storage(&due), "2024-12-25 1800");
        assert_eq!(format_display(&due), "Dec 25 2024, 6:00PM");
        assert_eq!(parse_storage("2024-12-25 1800").unwrap(), due);
        assert!(parse_storage("12-25 1800").is_err());
    }
}
