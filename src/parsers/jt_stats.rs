//! Jockey/trainer statistics parser and combination scoring.

use crate::parsers::cell_texts;
use crate::types::{JockeyTrainerStat, JtRating};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Labels that identify a statistics header row.
pub const STATS_HEADER_LABELS: [&str; 9] = [
    "jockey", "trainer", "starts", "runs", "1st", "2nd", "3rd", "win%", "place%",
];

/// How many of the labels must appear before a table is treated as the
/// statistics table.
const MIN_LABEL_MATCHES: usize = 5;

/// Name cells longer than this are taken to be trainer names.
const TRAINER_NAME_LEN: usize = 20;

/// Rows at least this wide pack two entrants side by side.
const PACKED_ROW_CELLS: usize = 18;

/// Does this row read like a statistics header? Labels are compared with
/// case and spaces removed, so "Win %" still matches.
pub(crate) fn is_stats_header(cells: &[String]) -> bool {
    let joined = cells.join(" ").to_lowercase().replace(' ', "");
    let matches = STATS_HEADER_LABELS
        .iter()
        .filter(|label| joined.contains(*label))
        .count();
    matches >= MIN_LABEL_MATCHES
}

/// Composite 0-100 score for a jockey/trainer pairing: place rate carries
/// the most, then win rate, a small experience term capped at 50 starts,
/// and a flat bonus once the pairing has more than 10 starts. Truncated
/// to a whole number, as the provider sheets print integer scores.
pub fn combo_score(starts: u32, win_pct: f64, place_pct: f64) -> f64 {
    let experience = starts.min(50) as f64 * 0.1;
    let bonus = if starts > 10 { 25.0 } else { 0.0 };
    (place_pct * 0.4 + win_pct * 0.3 + experience + bonus)
        .floor()
        .clamp(0.0, 100.0)
}

/// Parser for the jockey/trainer statistics table.
pub struct JtStatsParser;

impl JtStatsParser {
    /// Find the statistics table and extract one record per entrant,
    /// keyed by program number. A document without such a table yields an
    /// empty map; the scoring layer substitutes neutral defaults.
    pub fn parse(document: &Html) -> BTreeMap<u32, JockeyTrainerStat> {
        let mut stats = BTreeMap::new();

        let table_selector = Selector::parse("table").unwrap();
        let tr_selector = Selector::parse("tr").unwrap();

        let table = document.select(&table_selector).find(|t| {
            t.select(&tr_selector)
                .next()
                .map(|row| is_stats_header(&cell_texts(&row)))
                .unwrap_or(false)
        });
        let Some(table) = table else {
            debug!("no jockey/trainer statistics table found");
            return stats;
        };

        for row in table.select(&tr_selector) {
            let cells = cell_texts(&row);
            if cells.is_empty() || is_stats_header(&cells) {
                continue;
            }
            // Wide sheets print two entrants per row.
            if cells.len() >= PACKED_ROW_CELLS {
                let (left, right) = cells.split_at(cells.len() / 2);
                Self::insert_row(&mut stats, left);
                Self::insert_row(&mut stats, right);
            } else {
                Self::insert_row(&mut stats, &cells);
            }
        }

        stats
    }

    fn insert_row(stats: &mut BTreeMap<u32, JockeyTrainerStat>, cells: &[String]) {
        if let Some(stat) = Self::parse_row(cells) {
            stats.insert(stat.horse_no, stat);
        }
    }

    fn parse_row(cells: &[String]) -> Option<JockeyTrainerStat> {
        // Rows without a leading program number (footers, spacers) are
        // not entrant rows.
        let horse_no: u32 = cells.first().and_then(|c| c.trim().parse().ok())?;
        if !(1..=40).contains(&horse_no) {
            return None;
        }

        let first = cells.get(1)?.clone();
        let second = cells.get(2)?.clone();
        let (jockey, trainer) = assign_names(first, second);

        let counts: Option<Vec<u32>> = (3..7)
            .map(|i| parse_count(cells.get(i)?))
            .collect();
        let Some(counts) = counts else {
            warn!("statistics row for entrant {} has unparseable counts, skipped", horse_no);
            return None;
        };
        let (starts, wins, seconds, thirds) = (counts[0], counts[1], counts[2], counts[3]);
        let places = wins + seconds + thirds;

        // Rates are derived from the counts rather than read from the
        // sheet's own percentage columns, which round inconsistently.
        let (win_pct, place_pct) = if starts > 0 {
            (
                wins as f64 / starts as f64 * 100.0,
                places as f64 / starts as f64 * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        let score = combo_score(starts, win_pct, place_pct);

        Some(JockeyTrainerStat {
            horse_no,
            jockey,
            trainer,
            starts,
            wins,
            places,
            win_pct,
            place_pct,
            score,
            rating: JtRating::from_score(score),
        })
    }
}

/// Decide which of two name cells is the jockey and which the trainer.
/// A cell containing "trainer" or longer than the threshold is assumed to
/// be the trainer; with no signal, sheet order jockey-then-trainer holds.
fn assign_names(first: String, second: String) -> (String, String) {
    let first_is_trainer =
        first.to_lowercase().contains("trainer") || first.len() > TRAINER_NAME_LEN;
    let second_is_trainer =
        second.to_lowercase().contains("trainer") || second.len() > TRAINER_NAME_LEN;
    if first_is_trainer && !second_is_trainer {
        (second, first)
    } else {
        (first, second)
    }
}

fn parse_count(cell: &str) -> Option<u32> {
    cell.trim().replace(',', "").parse().ok()
}
