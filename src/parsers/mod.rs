//! Racecard HTML parsers.
//!
//! Each parser consumes the same parsed document and extracts one record
//! family: header, detail block, entrant blocks, run histories and the
//! jockey/trainer statistics table. All of them are layout-driven, taking
//! selectors and column offsets from the detected
//! [`CardLayout`](crate::layout::CardLayout) instead of hard-coding one
//! markup.

pub mod detail;
pub mod entrant;
pub mod header;
pub mod jt_stats;
pub mod run_history;

pub use detail::{DetailParser, RaceDetail};
pub use entrant::EntrantParser;
pub use header::{HeaderFallback, HeaderParser, RaceHeader};
pub use jt_stats::JtStatsParser;
pub use run_history::RunHistoryParser;

use crate::text;
use scraper::{ElementRef, Selector};

/// Element text with whitespace collapsed.
pub(crate) fn element_text(elem: &ElementRef) -> String {
    text::clean_text(&elem.text().collect::<String>())
}

/// Trimmed, non-empty text lines of an element in document order. Line
/// breaks come from both `<br>` splits and literal newlines.
pub(crate) fn text_lines(elem: &ElementRef) -> Vec<String> {
    elem.text()
        .flat_map(|t| t.split('\n'))
        .map(text::clean_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Texts of every cell in a row, th and td alike.
pub(crate) fn cell_texts(row: &ElementRef) -> Vec<String> {
    let cell_selector = Selector::parse("td, th").unwrap();
    row.select(&cell_selector)
        .map(|cell| element_text(&cell))
        .collect()
}
