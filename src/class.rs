//! Race-class weighting and class-movement analysis.
//!
//! Class labels are free text and providers are inconsistent: "Class 4",
//! "Cl4", "Benchmark 80", "MR 84 Handicap" and "Group 1" can all describe
//! comparable fields. A weight table maps labels onto one ordinal scale
//! (higher is tougher) so classes can be compared across runs and races.

use crate::text;
use crate::types::{ClassTrend, Horse, Race, Run, RECENT_RUNS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Weight assigned to labels no table entry recognizes. Deliberately the
/// top of the scale: an unknown class is assumed tough, never cheap.
pub const DEFAULT_CLASS_WEIGHT: u32 = 25;

/// Per-step decay when averaging recent class weights (most recent first).
const CLASS_DECAY: f64 = 0.8;

/// One class group: display name, printed abbreviations, ordinal weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassGroup {
    pub name: String,
    pub abbreviations: Vec<String>,
    pub weight: u32,
}

/// Ordinal weight table for race classes.
///
/// Loadable from JSON so a deployment can re-rank local class names
/// without a rebuild:
///
/// ```json
/// {
///   "groups": [
///     { "name": "Group 1", "abbreviations": ["G1", "Gr1"], "weight": 25 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    pub groups: Vec<ClassGroup>,
}

impl Default for ClassWeights {
    fn default() -> Self {
        fn group(name: &str, abbreviations: &[&str], weight: u32) -> ClassGroup {
            ClassGroup {
                name: name.to_string(),
                abbreviations: abbreviations.iter().map(|a| a.to_string()).collect(),
                weight,
            }
        }

        // Scanned in order by the substring passes, so specific quality
        // labels come before generic race-type words like Plate.
        ClassWeights {
            groups: vec![
                group("Group 1", &["G1", "Gr1"], 25),
                group("Group 2", &["G2", "Gr2"], 24),
                group("Group 3", &["G3", "Gr3"], 23),
                group("Listed", &["L", "LR"], 22),
                group("Class 1", &["Cl1"], 21),
                group("Class 2", &["Cl2"], 20),
                group("Class 3", &["Cl3"], 18),
                group("Class 4", &["Cl4"], 16),
                group("Class 5", &["Cl5"], 14),
                group("Class 6", &["Cl6"], 12),
                group("Benchmark", &["BM"], 17),
                group("Maiden", &["Mdn", "M"], 10),
                group("Novice", &["Nov"], 12),
                group("Apprentice", &["App"], 12),
                group("Graduation", &["Grad"], 13),
                group("Restricted", &[], 14),
                group("Stakes", &["Stk"], 21),
                group("Conditions", &["Cond"], 19),
                group("Handicap", &["Hcp"], 18),
                group("Allowance", &["Alw"], 16),
                group("Plate", &[], 15),
            ],
        }
    }
}

impl ClassWeights {
    /// Load a weight table from a JSON file. A missing or malformed file
    /// is not an error: the embedded table is used and a warning logged.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("class weight table {:?} not found, using built-in table", path);
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<ClassWeights>(&content) {
                Ok(table) => {
                    debug!("loaded {} class groups from {:?}", table.groups.len(), path);
                    table
                }
                Err(e) => {
                    warn!("failed to parse class weight table {:?}: {}, using built-in table", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to read class weight table {:?}: {}, using built-in table", path, e);
                Self::default()
            }
        }
    }

    /// Weight for a class label. Matching precedence: exact abbreviation,
    /// abbreviation as substring, group name as substring, "MR n" scaling,
    /// then [`DEFAULT_CLASS_WEIGHT`]. All matching is case-insensitive.
    pub fn weight(&self, label: &str) -> u32 {
        let lower = label.trim().to_lowercase();

        for group in &self.groups {
            for abbr in &group.abbreviations {
                if lower == abbr.to_lowercase() {
                    return group.weight;
                }
            }
        }

        // Single-letter abbreviations only ever match exactly; as
        // substrings they would match almost anything.
        for group in &self.groups {
            for abbr in &group.abbreviations {
                if abbr.len() >= 2 && lower.contains(&abbr.to_lowercase()) {
                    return group.weight;
                }
            }
        }

        for group in &self.groups {
            if lower.contains(&group.name.to_lowercase()) {
                return group.weight;
            }
        }

        let mr = Regex::new(r"(?i)\bMR\s*(\d{1,3})\b").unwrap();
        if let Some(caps) = mr.captures(label) {
            let n: u32 = caps[1].parse().unwrap_or(0);
            return (n / 2 + 10).clamp(16, 25);
        }

        DEFAULT_CLASS_WEIGHT
    }
}

/// 0-100 performance figure for a printed finishing position: a win is
/// 100 and each further place costs 10, floored at 0. Non-numeric
/// positions ("DQ", "PU") yield None.
pub fn position_performance(position: &str) -> Option<f64> {
    let pos = text::first_number(position)?;
    if pos == 0 {
        return None;
    }
    Some((110.0 - 10.0 * pos as f64).clamp(0.0, 100.0))
}

/// How well the race's class fits this entrant's recent history, 0-100.
///
/// The base score falls 2 points per weight unit between the race class
/// and the recency-weighted average of the entrant's recent run classes.
/// It is then scaled by a consistency factor (entrants that bounce
/// between class levels are less predictable) and a performance factor,
/// boosted 1.2x when the entrant has already raced at this level or
/// higher, and cut 0.8x when the race is a step more than 5 weight units
/// above its usual company.
///
/// An entrant with no recorded runs scores exactly 50.
pub fn class_suitability(horse: &Horse, race: &Race, table: &ClassWeights) -> f64 {
    if horse.runs.is_empty() {
        return 50.0;
    }
    let recent = recent_runs(horse);
    let current = table.weight(&race.race_class) as f64;
    let run_weights: Vec<f64> = recent
        .iter()
        .map(|r| table.weight(&r.race_class) as f64)
        .collect();

    let avg = decayed_average(&run_weights);
    let mut score = 100.0 - 2.0 * (current - avg).abs();

    let consistency = (1.0 - variance(&run_weights) / 100.0).clamp(0.6, 1.0);
    score *= consistency;

    let perfs: Vec<f64> = recent
        .iter()
        .filter_map(|r| position_performance(&r.position))
        .collect();
    let avg_perf = if perfs.is_empty() { 50.0 } else { mean(&perfs) };
    score *= 0.7 + 0.3 * (avg_perf / 100.0);

    let best = run_weights.iter().cloned().fold(f64::MIN, f64::max);
    if best >= current {
        score = (score * 1.2).min(100.0);
    }
    if current - avg > 5.0 {
        score *= 0.8;
    }

    score.clamp(0.0, 100.0)
}

/// Direction of class movement: the latest run's class weight against the
/// average of the runs before it, crossed with whether the latest finish
/// beat the earlier average. Moves within 3 weight units are Stable, as
/// is any entrant with fewer than two recorded runs.
pub fn class_trend(horse: &Horse, table: &ClassWeights) -> ClassTrend {
    let recent = recent_runs(horse);
    if recent.len() < 2 {
        return ClassTrend::Stable;
    }

    let latest = &recent[0];
    let prior = &recent[1..];

    let latest_weight = table.weight(&latest.race_class) as f64;
    let prior_weights: Vec<f64> = prior
        .iter()
        .map(|r| table.weight(&r.race_class) as f64)
        .collect();
    let diff = latest_weight - mean(&prior_weights);

    let latest_perf = position_performance(&latest.position).unwrap_or(50.0);
    let prior_perfs: Vec<f64> = prior
        .iter()
        .filter_map(|r| position_performance(&r.position))
        .collect();
    let prior_perf = if prior_perfs.is_empty() { 50.0 } else { mean(&prior_perfs) };
    let improving = latest_perf >= prior_perf;

    if diff > 3.0 {
        if improving {
            ClassTrend::MovingUpStrong
        } else {
            ClassTrend::MovingUpWeak
        }
    } else if diff < -3.0 {
        if improving {
            ClassTrend::MovingDownStrong
        } else {
            ClassTrend::MovingDownWeak
        }
    } else {
        ClassTrend::Stable
    }
}

fn recent_runs(horse: &Horse) -> &[Run] {
    let n = horse.runs.len().min(RECENT_RUNS);
    &horse.runs[..n]
}

/// Average with a 0.8 decay per step back. The slice is most recent
/// first and never empty.
fn decayed_average(values: &[f64]) -> f64 {
    let mut total = 0.0;
    let mut total_weight = 0.0;
    let mut w = 1.0;
    for v in values {
        total += v * w;
        total_weight += w;
        w *= CLASS_DECAY;
    }
    total / total_weight
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RaceKey;
    use chrono::{NaiveDate, NaiveTime};

    fn run(class: &str, position: &str) -> Run {
        Run {
            run_date: NaiveDate::from_ymd_opt(2025, 6, 25).unwrap(),
            position: position.to_string(),
            margin: "1.50".to_string(),
            distance: "1600m".to_string(),
            race_class: class.to_string(),
        }
    }

    fn horse_with_runs(runs: Vec<Run>) -> Horse {
        Horse {
            horse_no: 1,
            name: "TEST HORSE".to_string(),
            runs,
            ..Horse::default()
        }
    }

    fn race_with_class(class: &str) -> Race {
        Race {
            key: RaceKey {
                race_date: NaiveDate::from_ymd_opt(2025, 7, 25).unwrap(),
                race_no: 1,
                course: "VAAL".to_string(),
            },
            race_time: NaiveTime::from_hms_opt(14, 20, 0).unwrap(),
            name: "Test Stakes".to_string(),
            distance_m: 1600,
            race_class: class.to_string(),
            merit: 0,
        }
    }

    #[test]
    fn test_weight_ordering() {
        let table = ClassWeights::default();
        let g1 = table.weight("Group 1");
        let cl4 = table.weight("Class 4");
        let maiden = table.weight("Maiden");
        assert!(g1 > cl4);
        assert!(cl4 > maiden);
        assert_eq!(g1, 25);
        assert_eq!(cl4, 16);
        assert_eq!(maiden, 10);
    }

    #[test]
    fn test_weight_matching_precedence() {
        let table = ClassWeights::default();
        // Exact abbreviation, case-insensitive
        assert_eq!(table.weight("Cl4"), 16);
        assert_eq!(table.weight("cl4"), 16);
        // Abbreviation as substring beats the later Handicap group name
        assert_eq!(table.weight("Cl4 Handicap"), 16);
        // Group name as substring
        assert_eq!(table.weight("Class 4 Handicap"), 16);
        assert_eq!(table.weight("Maiden Plate"), 10);
        // Single-letter abbreviations never match as substrings
        assert_eq!(table.weight("Handicap"), 18);
    }

    #[test]
    fn test_weight_mr_scaling() {
        let table = ClassWeights::default();
        // 84/2 + 10 = 52, clamped to 25
        assert_eq!(table.weight("MR 84"), 25);
        // 20/2 + 10 = 20, inside the band
        assert_eq!(table.weight("MR 20"), 20);
        // 8/2 + 10 = 14, clamped up to 16
        assert_eq!(table.weight("MR 8"), 16);
        // The Handicap group name wins before MR scaling is reached
        assert_eq!(table.weight("MR 84 Handicap"), 18);
    }

    #[test]
    fn test_weight_unknown_label_defaults_high() {
        let table = ClassWeights::default();
        assert_eq!(table.weight("Juvenile Dash"), DEFAULT_CLASS_WEIGHT);
        assert_eq!(table.weight(""), DEFAULT_CLASS_WEIGHT);
    }

    #[test]
    fn test_weight_custom_table_from_json() {
        let json = r#"{"groups":[{"name":"Feature","abbreviations":["Ft"],"weight":30}]}"#;
        let table: ClassWeights = serde_json::from_str(json).unwrap();
        assert_eq!(table.weight("Ft"), 30);
        assert_eq!(table.weight("Feature Race"), 30);
        assert_eq!(table.weight("Group 1"), DEFAULT_CLASS_WEIGHT);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let table = ClassWeights::load("/nonexistent/class_weights.json");
        assert_eq!(table, ClassWeights::default());
    }

    #[test]
    fn test_position_performance() {
        assert_eq!(position_performance("1"), Some(100.0));
        assert_eq!(position_performance("2"), Some(90.0));
        assert_eq!(position_performance("11"), Some(0.0));
        assert_eq!(position_performance("15"), Some(0.0));
        assert_eq!(position_performance("DQ"), None);
        assert_eq!(position_performance("0"), None);
    }

    #[test]
    fn test_suitability_no_history_is_neutral() {
        let horse = horse_with_runs(vec![]);
        let race = race_with_class("Cl4");
        let score = class_suitability(&horse, &race, &ClassWeights::default());
        assert!((score - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_suitability_perfect_fit_hits_cap() {
        // Four runs at the race's own class with strong finishes: base 100,
        // no variance penalty, boosted for proven level, capped at 100.
        let horse = horse_with_runs(vec![
            run("Cl4", "1"),
            run("Cl4", "2"),
            run("Cl4", "1"),
            run("Cl4", "3"),
        ]);
        let race = race_with_class("Cl4");
        let score = class_suitability(&horse, &race, &ClassWeights::default());
        assert!((score - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_suitability_class_jump_penalized() {
        // Maiden winner thrown into a Group 1: 15 weight units adrift.
        let horse = horse_with_runs(vec![run("Maiden", "5"), run("Maiden", "6")]);
        let race = race_with_class("Group 1");
        let score = class_suitability(&horse, &race, &ClassWeights::default());
        // base 70, perf factor 0.865, over-reach cut 0.8
        assert!((score - 48.44).abs() < 0.001);
    }

    #[test]
    fn test_suitability_prefers_matched_class() {
        let table = ClassWeights::default();
        let horse = horse_with_runs(vec![run("Cl4", "2"), run("Cl4", "3")]);
        let matched = class_suitability(&horse, &race_with_class("Cl4"), &table);
        let stretched = class_suitability(&horse, &race_with_class("Group 1"), &table);
        assert!(matched > stretched);
    }

    #[test]
    fn test_suitability_bounded() {
        let table = ClassWeights::default();
        let horse = horse_with_runs(vec![
            run("Maiden", "12"),
            run("Group 1", "1"),
            run("Maiden", "14"),
            run("Group 1", "2"),
        ]);
        for class in ["Maiden", "Cl4", "Group 1", "Unknown Feature"] {
            let score = class_suitability(&horse, &race_with_class(class), &table);
            assert!((0.0..=100.0).contains(&score), "{} -> {}", class, score);
        }
    }

    #[test]
    fn test_trend_needs_two_runs() {
        let table = ClassWeights::default();
        let none = horse_with_runs(vec![]);
        let one = horse_with_runs(vec![run("Cl4", "1")]);
        assert_eq!(class_trend(&none, &table), ClassTrend::Stable);
        assert_eq!(class_trend(&one, &table), ClassTrend::Stable);
    }

    #[test]
    fn test_trend_moving_up() {
        let table = ClassWeights::default();
        // Stepping up from Maiden company while finishing closer
        let strong = horse_with_runs(vec![run("Group 1", "2"), run("Maiden", "5")]);
        assert_eq!(class_trend(&strong, &table), ClassTrend::MovingUpStrong);
        // Same step up but form going the wrong way
        let weak = horse_with_runs(vec![run("Group 1", "8"), run("Maiden", "2")]);
        assert_eq!(class_trend(&weak, &table), ClassTrend::MovingUpWeak);
    }

    #[test]
    fn test_trend_moving_down() {
        let table = ClassWeights::default();
        let strong = horse_with_runs(vec![run("Maiden", "1"), run("Group 1", "9")]);
        assert_eq!(class_trend(&strong, &table), ClassTrend::MovingDownStrong);
        let weak = horse_with_runs(vec![run("Maiden", "9"), run("Group 1", "2")]);
        assert_eq!(class_trend(&weak, &table), ClassTrend::MovingDownWeak);
    }

    #[test]
    fn test_trend_stable_within_threshold() {
        let table = ClassWeights::default();
        // Benchmark 17 vs Class 4 16: one weight unit apart
        let horse = horse_with_runs(vec![run("Benchmark", "1"), run("Cl4", "8")]);
        assert_eq!(class_trend(&horse, &table), ClassTrend::Stable);
    }
}
