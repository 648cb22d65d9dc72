//! Text helpers for the messy fragments racecards print: dates in five
//! different formats, clock times with three separators, numbers wrapped
//! in braces or brackets.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First run of digits anywhere in the text: "{75}" -> 75, "(83)" -> 83.
pub fn first_number(text: &str) -> Option<u32> {
    let re = Regex::new(r"\d+").unwrap();
    re.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Strip bracketed annotations (run-count-back markers and similar) so the
/// remaining text can be parsed as a date: "25.06.25 (2)" -> "25.06.25".
pub fn strip_annotations(text: &str) -> String {
    let re = Regex::new(r"\([^)]*\)|\[[^\]]*\]|\{[^}]*\}").unwrap();
    clean_text(&re.replace_all(text, " "))
}

/// Parse a form-table run date. Formats are tried in a fixed order and the
/// first one yielding a valid calendar date wins: YY.MM.DD, DD.MM.YY,
/// YYMMDD, DD/MM/YYYY, DD/MM/YY. Two-digit years are 2000-based.
pub fn parse_run_date(text: &str) -> Option<NaiveDate> {
    let dotted = Regex::new(r"\b(\d{2})\.(\d{2})\.(\d{2})\b").unwrap();
    if let Some(caps) = dotted.captures(text) {
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        let c: u32 = caps[3].parse().ok()?;
        // YY.MM.DD first, DD.MM.YY when that is not a real date
        if let Some(date) = NaiveDate::from_ymd_opt(2000 + a as i32, b, c) {
            return Some(date);
        }
        if let Some(date) = NaiveDate::from_ymd_opt(2000 + c as i32, b, a) {
            return Some(date);
        }
    }

    let compact = Regex::new(r"\b(\d{2})(\d{2})(\d{2})\b").unwrap();
    if let Some(caps) = compact.captures(text) {
        let yy: i32 = caps[1].parse().ok()?;
        let mm: u32 = caps[2].parse().ok()?;
        let dd: u32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(2000 + yy, mm, dd) {
            return Some(date);
        }
    }

    parse_header_date(text)
}

/// Parse a header date: DD/MM/YYYY, then DD/MM/YY. Two-digit years are
/// 2000-based.
pub fn parse_header_date(text: &str) -> Option<NaiveDate> {
    let full = Regex::new(r"\b(\d{2})/(\d{2})/(\d{4})\b").unwrap();
    if let Some(caps) = full.captures(text) {
        let dd: u32 = caps[1].parse().ok()?;
        let mm: u32 = caps[2].parse().ok()?;
        let yyyy: i32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(yyyy, mm, dd) {
            return Some(date);
        }
    }

    let short = Regex::new(r"\b(\d{2})/(\d{2})/(\d{2})\b").unwrap();
    if let Some(caps) = short.captures(text) {
        let dd: u32 = caps[1].parse().ok()?;
        let mm: u32 = caps[2].parse().ok()?;
        let yy: i32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(2000 + yy, mm, dd) {
            return Some(date);
        }
    }

    None
}

/// Parse a race time: "14.20", "14:20" or a bare 3-4 digit "1420". The
/// last two digits of the bare form are minutes.
pub fn parse_race_time(text: &str) -> Option<NaiveTime> {
    let separated = Regex::new(r"\b(\d{1,2})[.:](\d{2})\b").unwrap();
    if let Some(caps) = separated.captures(text) {
        let hh: u32 = caps[1].parse().ok()?;
        let mm: u32 = caps[2].parse().ok()?;
        if let Some(time) = NaiveTime::from_hms_opt(hh, mm, 0) {
            return Some(time);
        }
    }

    let bare = Regex::new(r"\b(\d{3,4})\b").unwrap();
    if let Some(caps) = bare.captures(text) {
        let digits = &caps[1];
        let (hh, mm) = digits.split_at(digits.len() - 2);
        let hh: u32 = hh.parse().ok()?;
        let mm: u32 = mm.parse().ok()?;
        if let Some(time) = NaiveTime::from_hms_opt(hh, mm, 0) {
            return Some(time);
        }
    }

    None
}
