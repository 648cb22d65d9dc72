//! Final ordering of a scored field.

use crate::scoring::ScoredHorse;
use crate::types::Ranking;

/// Order scored entrants best first and assign dense ranks 1..N.
///
/// The sort is stable, so entrants level on overall score keep their
/// card order, and ranking the same scored set twice always produces
/// identical assignments.
pub fn rank_horses(scored: &[ScoredHorse]) -> Vec<Ranking> {
    let mut ordered: Vec<&ScoredHorse> = scored.iter().collect();
    ordered.sort_by(|a, b| b.overall.partial_cmp(&a.overall).unwrap());

    ordered
        .iter()
        .enumerate()
        .map(|(i, s)| Ranking {
            horse_no: s.horse_no,
            rank: (i + 1) as u32,
            overall: s.overall,
            components: s.components,
            class_trend: s.class_trend,
        })
        .collect()
}
