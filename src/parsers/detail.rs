//! Race detail parser: name, distance, class fragment, merit band.

use crate::layout::CardLayout;
use crate::parsers::header::find_header_cell;
use crate::parsers::text_lines;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

/// Descriptive block of a racecard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceDetail {
    pub name: String,
    /// Metres, 0 when not stated.
    pub distance_m: u32,
    /// Verbatim class fragment, empty when absent.
    pub race_class: String,
    /// Merit band from the class fragment, 0 when absent.
    pub merit: u32,
}

/// Words that mark a text fragment as a class description.
pub const CLASS_KEYWORDS: [&str; 13] = [
    "class",
    "maiden",
    "merit rated",
    "benchmark",
    "handicap",
    "stakes",
    "conditions",
    "plate",
    "allowance",
    "apprentice",
    "novice",
    "graduation",
    "restricted",
];

/// Parser for the race description block.
pub struct DetailParser;

impl DetailParser {
    /// Extract the detail block. Every field here is optional: absences
    /// degrade to empty/zero values with a warning, never an error.
    pub fn parse(document: &Html, layout: CardLayout) -> RaceDetail {
        let mut detail = RaceDetail::default();

        let lines = find_detail_lines(document, layout);
        if lines.is_empty() {
            warn!("no race detail block found, name and class left empty");
            return detail;
        }

        // First line is the race name.
        detail.name = lines[0].clone();

        // Distance: integer immediately before the word "Metres".
        let joined = lines.join(" ");
        let dist_re = Regex::new(r"(?i)\b(\d+)\s*metres\b").unwrap();
        if let Some(caps) = dist_re.captures(&joined) {
            detail.distance_m = caps[1].parse().unwrap_or(0);
        } else {
            warn!("race distance missing from detail block");
        }

        // Class: first fragment after the title carrying a class keyword,
        // kept verbatim. Race names themselves often contain words like
        // "Stakes", so the title line never counts.
        let class_line = lines.iter().skip(1).find(|l| {
            let lower = l.to_lowercase();
            CLASS_KEYWORDS.iter().any(|k| lower.contains(k))
        });
        match class_line {
            Some(line) => {
                detail.race_class = line.clone();
                detail.merit = Self::merit_from_class(line);
            }
            None => warn!("race class missing from detail block"),
        }

        detail
    }

    /// Merit band of a class fragment: "Merit Rated n" first, "Benchmark n"
    /// next, then the first bare 2-3 digit number. 0 when nothing matches.
    fn merit_from_class(fragment: &str) -> u32 {
        let merit_re = Regex::new(r"(?i)\bmerit\s+rated\s+(\d{1,3})\b").unwrap();
        if let Some(caps) = merit_re.captures(fragment) {
            return caps[1].parse().unwrap_or(0);
        }
        let bench_re = Regex::new(r"(?i)\bbenchmark\s+(\d{1,3})\b").unwrap();
        if let Some(caps) = bench_re.captures(fragment) {
            return caps[1].parse().unwrap_or(0);
        }
        let bare_re = Regex::new(r"\b(\d{2,3})\b").unwrap();
        if let Some(caps) = bare_re.captures(fragment) {
            return caps[1].parse().unwrap_or(0);
        }
        0
    }
}

/// Detail block lines: by dedicated selector where the layout has one,
/// otherwise the cell following the header cell in document order.
fn find_detail_lines(document: &Html, layout: CardLayout) -> Vec<String> {
    for sel_str in layout.detail_selectors() {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(elem) = document.select(&selector).next() {
                return text_lines(&elem);
            }
        }
    }

    if let Some(header) = find_header_cell(document, layout) {
        let td_selector = Selector::parse("td").unwrap();
        let mut cells = document.select(&td_selector);
        for cell in cells.by_ref() {
            if cell.id() == header.id() {
                break;
            }
        }
        if let Some(next) = cells.next() {
            return text_lines(&next);
        }
    }

    Vec::new()
}
