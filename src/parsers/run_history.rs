//! Run-history (form line) parser.

use crate::layout::CardLayout;
use crate::parsers::cell_texts;
use crate::text;
use crate::types::{Run, RECENT_RUNS};
use scraper::{ElementRef, Selector};
use tracing::warn;

/// Parser for the past-performance table nested inside an entrant block.
pub struct RunHistoryParser;

impl RunHistoryParser {
    /// Extract at most [`RECENT_RUNS`] runs, most recent first. The date
    /// cell must parse after annotation stripping or the row is skipped
    /// with a warning; every other cell passes through verbatim.
    pub fn parse(entrant_table: &ElementRef, layout: CardLayout) -> Vec<Run> {
        let mut runs = Vec::new();
        let Some(table) = find_run_table(entrant_table, layout) else {
            return runs;
        };

        let cols = layout.run_columns();
        let tr_selector = Selector::parse("tr").unwrap();
        let th_selector = Selector::parse("th").unwrap();

        for row in table.select(&tr_selector) {
            // Header rows carry th cells.
            if row.select(&th_selector).next().is_some() {
                continue;
            }
            let cells = cell_texts(&row);
            if cells.len() < cols.min_cells {
                continue;
            }

            let date_text = text::strip_annotations(&cells[cols.date]);
            let Some(run_date) = text::parse_run_date(&date_text) else {
                warn!("run row with unparseable date {:?} skipped", cells[cols.date]);
                continue;
            };

            runs.push(Run {
                run_date,
                position: cells.get(cols.position).cloned().unwrap_or_default(),
                margin: cells.get(cols.margin).cloned().unwrap_or_default(),
                distance: cells.get(cols.distance).cloned().unwrap_or_default(),
                race_class: cells.get(cols.race_class).cloned().unwrap_or_default(),
            });
            if runs.len() >= RECENT_RUNS {
                break;
            }
        }

        runs
    }
}

/// First nested table matching the layout's run-table selectors.
fn find_run_table<'a>(
    entrant_table: &ElementRef<'a>,
    layout: CardLayout,
) -> Option<ElementRef<'a>> {
    for sel_str in layout.run_table_selectors() {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(table) = entrant_table.select(&selector).next() {
                return Some(table);
            }
        }
    }
    None
}
