//! Composite scoring: six per-entrant signals folded into one overall
//! score.

use crate::class::{self, ClassWeights};
use crate::text;
use crate::types::{ClassTrend, ComponentScores, Horse, JockeyTrainerStat, Race, RECENT_RUNS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-step decay when averaging recent finishing positions.
const FORM_DECAY: f64 = 0.8;

/// Component value used when an entrant has no usable history.
const NEUTRAL_SCORE: f64 = 50.0;

/// Weights applied to the six component scores.
///
/// The default set reproduces the legacy sheets exactly. Those weights
/// sum to 1.20, not 1.0, so overall scores can run past 100; rankings
/// only ever compare entrants within one race, where the inflation
/// cancels out. [`ScoreWeights::normalized`] gives the same ratios
/// rescaled to sum 1.0 for callers that want a true 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub merit: f64,
    pub class: f64,
    pub form: f64,
    pub consistency: f64,
    pub distance: f64,
    pub jockey_trainer: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            merit: 0.30,
            class: 0.20,
            form: 0.20,
            consistency: 0.15,
            distance: 0.10,
            jockey_trainer: 0.25,
        }
    }
}

impl ScoreWeights {
    /// The legacy ratios rescaled so the weights sum to 1.0.
    pub fn normalized() -> Self {
        let legacy = Self::default();
        let total = legacy.total();
        ScoreWeights {
            merit: legacy.merit / total,
            class: legacy.class / total,
            form: legacy.form / total,
            consistency: legacy.consistency / total,
            distance: legacy.distance / total,
            jockey_trainer: legacy.jockey_trainer / total,
        }
    }

    pub fn total(&self) -> f64 {
        self.merit + self.class + self.form + self.consistency + self.distance + self.jockey_trainer
    }
}

/// A scored entrant, before ranks are assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredHorse {
    pub horse_no: u32,
    pub overall: f64,
    pub components: ComponentScores,
    pub class_trend: ClassTrend,
}

/// Score every entrant of a race, in field order. The class table and
/// statistics lookup are explicit inputs; nothing is read from ambient
/// state, so the same inputs always produce the same scores.
pub fn score_race(
    race: &Race,
    horses: &[Horse],
    jt_stats: &BTreeMap<u32, JockeyTrainerStat>,
    table: &ClassWeights,
    weights: &ScoreWeights,
) -> Vec<ScoredHorse> {
    horses
        .iter()
        .map(|horse| score_horse(horse, race, jt_stats.get(&horse.horse_no), table, weights))
        .collect()
}

/// Score one entrant against its race.
pub fn score_horse(
    horse: &Horse,
    race: &Race,
    jt: Option<&JockeyTrainerStat>,
    table: &ClassWeights,
    weights: &ScoreWeights,
) -> ScoredHorse {
    let components = ComponentScores {
        merit: horse.merit_rating.unwrap_or(0) as f64,
        class: class::class_suitability(horse, race, table),
        form: form_score(horse),
        consistency: consistency_score(horse),
        distance: distance_score(horse, race),
        jockey_trainer: jt.map(|s| s.score).unwrap_or(NEUTRAL_SCORE),
    };

    let overall = weights.merit * components.merit
        + weights.class * components.class
        + weights.form * components.form
        + weights.consistency * components.consistency
        + weights.distance * components.distance
        + weights.jockey_trainer * components.jockey_trainer;

    ScoredHorse {
        horse_no: horse.horse_no,
        overall,
        components,
        class_trend: class::class_trend(horse, table),
    }
}

/// Recent form on a 0-100 scale: 5 points off per position of the
/// decay-weighted average finish, most recent weighted highest. No
/// numeric finishes means a neutral 50.
fn form_score(horse: &Horse) -> f64 {
    let positions = recent_positions(horse);
    if positions.is_empty() {
        return NEUTRAL_SCORE;
    }
    let mut total = 0.0;
    let mut total_weight = 0.0;
    let mut w = 1.0;
    for p in &positions {
        total += p * w;
        total_weight += w;
        w *= FORM_DECAY;
    }
    let form_rating = total / total_weight;
    100.0 - 5.0 * form_rating
}

/// Share of recent runs finishing within 2 positions of the entrant's
/// own average, as a percentage. Fewer than two numeric finishes means a
/// neutral 50.
fn consistency_score(horse: &Horse) -> f64 {
    let positions = recent_positions(horse);
    if positions.len() < 2 {
        return NEUTRAL_SCORE;
    }
    let avg = positions.iter().sum::<f64>() / positions.len() as f64;
    let within = positions.iter().filter(|p| (*p - avg).abs() <= 2.0).count();
    within as f64 / positions.len() as f64 * 100.0
}

/// 90 when the entrant's most common recent distance equals the race
/// distance, otherwise a base 70. Count ties go to the more recent
/// distance.
fn distance_score(horse: &Horse, race: &Race) -> f64 {
    if race.distance_m == 0 {
        return 70.0;
    }
    let mut seen: Vec<(u32, usize)> = Vec::new();
    for run in horse.runs.iter().take(RECENT_RUNS) {
        if let Some(d) = text::first_number(&run.distance) {
            match seen.iter_mut().find(|(dist, _)| *dist == d) {
                Some(entry) => entry.1 += 1,
                None => seen.push((d, 1)),
            }
        }
    }
    let mut modal: Option<(u32, usize)> = None;
    for &(d, count) in &seen {
        if modal.map(|(_, c)| count > c).unwrap_or(true) {
            modal = Some((d, count));
        }
    }
    match modal {
        Some((d, _)) if d == race.distance_m => 90.0,
        _ => 70.0,
    }
}

/// Numeric finishing positions of the recent runs, in run order.
fn recent_positions(horse: &Horse) -> Vec<f64> {
    horse
        .runs
        .iter()
        .take(RECENT_RUNS)
        .filter_map(|r| text::first_number(&r.position))
        .filter(|&p| p >= 1)
        .map(|p| p as f64)
        .collect()
}
