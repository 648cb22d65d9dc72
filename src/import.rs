//! One-call racecard import: parse the document once, extract every
//! record family, then score and rank the field.

use crate::class::ClassWeights;
use crate::error::ImportError;
use crate::layout::CardLayout;
use crate::parsers::{
    DetailParser, EntrantParser, HeaderFallback, HeaderParser, JtStatsParser,
};
use crate::ranking::rank_horses;
use crate::scoring::{score_race, ScoreWeights};
use crate::types::{Horse, JockeyTrainerStat, Race, RaceKey, Ranking};
use scraper::Html;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Options for a single racecard import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Identity used when the printed header is incomplete, typically
    /// recovered from the source filename.
    pub header_fallback: HeaderFallback,
    /// Component weights, legacy defaults unless overridden.
    pub weights: ScoreWeights,
}

/// Everything extracted and computed from one racecard document.
#[derive(Debug, Clone, Serialize)]
pub struct RacecardImport {
    pub race: Race,
    /// Entrants in card order, each with its recent runs.
    pub horses: Vec<Horse>,
    /// One entry per entrant; entrants absent from the statistics table
    /// carry the neutral default.
    pub jt_stats: BTreeMap<u32, JockeyTrainerStat>,
    /// Best first, dense ranks.
    pub rankings: Vec<Ranking>,
    /// Which markup variant the card was recognized as.
    pub layout: CardLayout,
}

/// Import one racecard document end to end.
///
/// Fails only when the race identity (course, date, race number) cannot
/// be recovered from the document or the fallback; every other defect
/// degrades to defaults or skipped rows with a log line.
pub fn import_racecard(
    html: &str,
    table: &ClassWeights,
    options: &ImportOptions,
) -> Result<RacecardImport, ImportError> {
    let document = Html::parse_document(html);
    let layout = CardLayout::detect(&document);
    debug!("detected card layout {:?}", layout);

    let header = HeaderParser::parse(&document, layout, &options.header_fallback)?;
    let detail = DetailParser::parse(&document, layout);

    let race = Race {
        key: RaceKey {
            race_date: header.race_date,
            race_no: header.race_no,
            course: header.course,
        },
        race_time: header.race_time,
        name: detail.name,
        distance_m: detail.distance_m,
        race_class: detail.race_class,
        merit: detail.merit,
    };

    let horses = EntrantParser::parse(&document, layout, &race.race_class);

    let mut jt_stats = JtStatsParser::parse(&document);
    for horse in &horses {
        jt_stats
            .entry(horse.horse_no)
            .or_insert_with(|| JockeyTrainerStat::neutral(horse.horse_no));
    }

    let scored = score_race(&race, &horses, &jt_stats, table, &options.weights);
    let rankings = rank_horses(&scored);

    debug!(
        "imported {} with {} entrants ({} ranked)",
        race.key,
        horses.len(),
        rankings.len()
    );

    Ok(RacecardImport {
        race,
        horses,
        jt_stats,
        rankings,
        layout,
    })
}
