//! Card layout detection.
//!
//! Providers have shipped two near-identical card markups over the years:
//! an attribute-driven legacy one and a class-annotated restyle whose form
//! tables gained a leading venue column. Rather than one extraction routine
//! per variant, a single pipeline reads per-variant selectors and column
//! offsets from the detected layout.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Column offsets inside one run-history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunColumns {
    pub date: usize,
    pub position: usize,
    pub margin: usize,
    pub distance: usize,
    pub race_class: usize,
    /// Rows with fewer cells than this are not data rows.
    pub min_cells: usize,
}

/// Recognized card markups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardLayout {
    /// Legacy markup: centered header cell, bordered entrant tables,
    /// five-column form lines.
    Classic,
    /// Restyled markup: class attributes on every block, form lines with
    /// a venue column between date and position.
    Styled,
}

impl CardLayout {
    /// Probe the document for layout markers. The restyled markup wins
    /// when its class names are present, anything else is treated as the
    /// legacy layout.
    pub fn detect(document: &Html) -> Self {
        let marker = Selector::parse(".card-header, table.entrant").unwrap();
        if document.select(&marker).next().is_some() {
            CardLayout::Styled
        } else {
            CardLayout::Classic
        }
    }

    /// Candidate selectors for the header cell, most specific first.
    pub fn header_selectors(&self) -> &'static [&'static str] {
        match self {
            CardLayout::Classic => &[r#"td[align="center"]"#, "center"],
            CardLayout::Styled => &["td.card-header", ".card-header"],
        }
    }

    /// Candidate selectors for the race detail block. Empty for layouts
    /// where the detail cell is only findable relative to the header.
    pub fn detail_selectors(&self) -> &'static [&'static str] {
        match self {
            CardLayout::Classic => &[],
            CardLayout::Styled => &["td.card-details", ".card-details"],
        }
    }

    /// Candidate selectors for entrant blocks.
    pub fn entrant_selectors(&self) -> &'static [&'static str] {
        match self {
            CardLayout::Classic => &["table[border]"],
            CardLayout::Styled => &["table.entrant"],
        }
    }

    /// Candidate selectors for the run-history table nested inside an
    /// entrant block.
    pub fn run_table_selectors(&self) -> &'static [&'static str] {
        match self {
            CardLayout::Classic => &["table"],
            CardLayout::Styled => &["table.form-lines", "table"],
        }
    }

    pub fn run_columns(&self) -> RunColumns {
        match self {
            CardLayout::Classic => RunColumns {
                date: 0,
                position: 1,
                margin: 2,
                distance: 3,
                race_class: 4,
                min_cells: 5,
            },
            // The venue column sits at offset 1 and is not extracted.
            CardLayout::Styled => RunColumns {
                date: 0,
                position: 2,
                margin: 3,
                distance: 4,
                race_class: 5,
                min_cells: 6,
            },
        }
    }
}
