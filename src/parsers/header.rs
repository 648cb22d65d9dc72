//! Race header parser: course, date, race number, off time.

use crate::error::{HeaderField, ImportError};
use crate::layout::CardLayout;
use crate::parsers::text_lines;
use crate::text;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Identity block of a racecard.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceHeader {
    pub course: String,
    pub race_date: NaiveDate,
    pub race_no: u32,
    pub race_time: NaiveTime,
}

/// Caller-supplied identity for cards whose printed header is incomplete,
/// typically recovered from the source filename.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderFallback {
    pub course: Option<String>,
    pub race_date: Option<NaiveDate>,
    pub race_no: Option<u32>,
}

impl HeaderFallback {
    fn is_complete(&self) -> bool {
        self.course.is_some() && self.race_date.is_some() && self.race_no.is_some()
    }
}

/// Parser for the card's identity header.
pub struct HeaderParser;

impl HeaderParser {
    /// Extract the header. Course, date and race number missing from both
    /// the document and the fallback are errors; a missing off time only
    /// warns and defaults to midnight.
    pub fn parse(
        document: &Html,
        layout: CardLayout,
        fallback: &HeaderFallback,
    ) -> Result<RaceHeader, ImportError> {
        let lines = match find_header_cell(document, layout) {
            Some(cell) => text_lines(&cell),
            None => {
                if !fallback.is_complete() {
                    return Err(ImportError::HeaderNotFound);
                }
                debug!("no header cell found, using caller-supplied identity");
                Vec::new()
            }
        };

        let date_idx = lines
            .iter()
            .position(|l| text::parse_header_date(l).is_some());
        let race_date = date_idx
            .and_then(|i| text::parse_header_date(&lines[i]))
            .or(fallback.race_date)
            .ok_or(ImportError::MissingHeaderField(HeaderField::Date))?;

        // Everything before the date line is the course name. It can wrap
        // over more than one line.
        let course = match date_idx {
            Some(i) if i > 0 => Some(lines[..i].join(" ")),
            _ => None,
        };
        let course = course
            .or_else(|| fallback.course.clone())
            .ok_or(ImportError::MissingHeaderField(HeaderField::Course))?;

        let after_date = date_idx.map(|i| i + 1).unwrap_or(0);
        let race_no_re =
            Regex::new(r"(?i)\brace\s*(?:no\.?|number)?\s*[:#]?\s*(\d{1,2})\b").unwrap();
        let race_no_idx = lines[after_date..]
            .iter()
            .position(|l| race_no_re.is_match(l))
            .map(|i| after_date + i);
        let race_no = race_no_idx
            .and_then(|i| race_no_re.captures(&lines[i]))
            .and_then(|caps| caps[1].parse().ok())
            .or(fallback.race_no)
            .ok_or(ImportError::MissingHeaderField(HeaderField::RaceNumber))?;

        // The off time is only looked for from the race-number line on, so
        // digits in the course or date lines cannot be misread as a time.
        let time_from = race_no_idx.unwrap_or(after_date);
        let race_time = lines[time_from..]
            .iter()
            .find_map(|l| text::parse_race_time(l));
        let race_time = match race_time {
            Some(t) => t,
            None => {
                warn!("race time missing from header, defaulting to 00:00");
                NaiveTime::from_hms_opt(0, 0, 0).unwrap()
            }
        };

        Ok(RaceHeader {
            course,
            race_date,
            race_no,
            race_time,
        })
    }
}

/// Find the cell holding the card header: the first selector candidate
/// whose text contains a parseable date line.
pub(crate) fn find_header_cell<'a>(
    document: &'a Html,
    layout: CardLayout,
) -> Option<ElementRef<'a>> {
    for sel_str in layout.header_selectors() {
        if let Ok(selector) = Selector::parse(sel_str) {
            for elem in document.select(&selector) {
                let has_date = text_lines(&elem)
                    .iter()
                    .any(|l| text::parse_header_date(l).is_some());
                if has_date {
                    return Some(elem);
                }
            }
        }
    }
    None
}
