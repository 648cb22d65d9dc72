//! Entrant block parser.

use crate::layout::CardLayout;
use crate::parsers::cell_texts;
use crate::parsers::jt_stats::is_stats_header;
use crate::parsers::run_history::RunHistoryParser;
use crate::text;
use crate::types::Horse;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Parser for the per-entrant blocks of a card.
pub struct EntrantParser;

impl EntrantParser {
    /// Extract every entrant block in document order. Blocks without a
    /// usable program number are skipped, and a repeated program number
    /// updates the earlier record instead of duplicating it.
    pub fn parse(document: &Html, layout: CardLayout, race_class: &str) -> Vec<Horse> {
        let mut horses: Vec<Horse> = Vec::new();

        for sel_str in layout.entrant_selectors() {
            if let Ok(selector) = Selector::parse(sel_str) {
                for table in document.select(&selector) {
                    let Some(horse) = Self::parse_block(&table, layout, race_class) else {
                        continue;
                    };
                    if let Some(existing) =
                        horses.iter_mut().find(|h| h.horse_no == horse.horse_no)
                    {
                        debug!("repeated block for entrant {}, updating", horse.horse_no);
                        *existing = horse;
                    } else {
                        horses.push(horse);
                    }
                }
            }
            if !horses.is_empty() {
                break;
            }
        }

        horses
    }

    fn parse_block(table: &ElementRef, layout: CardLayout, race_class: &str) -> Option<Horse> {
        let tr_selector = Selector::parse("tr").unwrap();
        let row = table.select(&tr_selector).next()?;
        let cells = cell_texts(&row);

        // The statistics table matches generic entrant selectors too.
        if is_stats_header(&cells) {
            return None;
        }

        // Program number is the one mandatory field.
        let horse_no = cells.first().and_then(|c| text::first_number(c));
        let Some(horse_no) = horse_no.filter(|n| (1..=40).contains(n)) else {
            debug!("table without a program number skipped");
            return None;
        };

        let raw_name = cells.get(1).cloned().unwrap_or_default();
        let age = cells.get(2).cloned().unwrap_or_default();

        // Blinkers marker can sit in either the name or the age cell and
        // is stripped from the display name.
        let blinkers_re = Regex::new(r"(?i)\(\s*b\s*\)").unwrap();
        let blinkers = blinkers_re.is_match(&raw_name) || blinkers_re.is_match(&age);
        let name = text::clean_text(&blinkers_re.replace_all(&raw_name, " "));
        if name.is_empty() {
            warn!("entrant {} has no name", horse_no);
        }

        // Date of birth, on the rare cards that print one.
        let birth_re = Regex::new(r"\b\d{2}/\d{2}/\d{2,4}\b").unwrap();
        let birth_date = birth_re
            .find(&age)
            .or_else(|| birth_re.find(&raw_name))
            .map(|m| m.as_str().to_string());

        let odds = cells.get(3).cloned().unwrap_or_default();
        let merit_rating = cells.get(4).and_then(|c| text::first_number(c));
        let jockey = cells.get(5).cloned().unwrap_or_default();
        let trainer = cells.get(6).cloned().unwrap_or_default();

        let runs = RunHistoryParser::parse(table, layout);

        Some(Horse {
            horse_no,
            name,
            blinkers,
            age,
            birth_date,
            odds,
            merit_rating,
            race_class: race_class.to_string(),
            jockey,
            trainer,
            runs,
        })
    }
}
