//! Calendar date formatting for task records.
//!
//! # Invariants
//! - Output is always `YYYY-MM-DD`: four-digit year, zero-padded month/day.
//! - No locale or timezone conversion happens here.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date shape regex"));

/// Formats a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Formats `year`/`month`/`day` (1-based month), or `None` if no such date exists.
pub fn format_ymd(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(format_date)
}

/// Parses strict `YYYY-MM-DD` text into a real calendar date.
///
/// Returns `None` for any other shape (`2024-3-7`, surrounding spaces) and for
/// impossible dates such as `2023-02-29`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if !DATE_SHAPE_RE.is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Local calendar date used as the default selection for new tasks.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
