//! Core record types shared across extraction, scoring and storage.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum past runs considered "recent" per entrant.
pub const RECENT_RUNS: usize = 4;

/// Composite identity of a race. One card per (date, race number, course).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RaceKey {
    pub race_date: NaiveDate,
    pub race_no: u32,
    pub course: String,
}

impl fmt::Display for RaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R{}", self.course, self.race_date, self.race_no)
    }
}

/// Race-level facts from the card header and detail blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub key: RaceKey,
    /// Scheduled off time, minute precision. Midnight when the card omits it.
    pub race_time: NaiveTime,
    pub name: String,
    /// Distance in metres, 0 when not stated on the card.
    pub distance_m: u32,
    /// Verbatim class fragment, e.g. "MR 84 Handicap". Empty when absent.
    pub race_class: String,
    /// Merit/benchmark band lifted from the class fragment, 0 when absent.
    pub merit: u32,
}

/// One entrant as printed on the card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Horse {
    /// Program number, the join key against the statistics table.
    pub horse_no: u32,
    pub name: String,
    /// True when the name/age block carries a "(B)" marker.
    pub blinkers: bool,
    /// Free text, e.g. "4yo". Empty when absent.
    pub age: String,
    /// Date of birth as printed. Cards rarely carry it.
    pub birth_date: Option<String>,
    /// Free text, e.g. "4/1". Empty when absent.
    pub odds: String,
    /// None when the card shows no rating for this entrant.
    pub merit_rating: Option<u32>,
    /// Class label of the race this entrant was extracted from.
    pub race_class: String,
    pub jockey: String,
    pub trainer: String,
    /// Past performances, most recent first, at most [`RECENT_RUNS`].
    pub runs: Vec<Run>,
}

/// A past performance line from an entrant's form table.
///
/// Position and margin stay verbatim: form tables print non-numeric
/// tokens ("DQ", "sh.hd", "dh") that downstream scoring interprets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_date: NaiveDate,
    /// Finishing position as printed.
    pub position: String,
    /// Beaten margin as printed.
    pub margin: String,
    /// Distance as printed, units included ("1600m").
    pub distance: String,
    /// Class label of that run.
    pub race_class: String,
}

/// Qualitative bucket for a jockey/trainer combination score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JtRating {
    Excellent,
    VeryGood,
    Good,
    Average,
    Poor,
}

impl JtRating {
    /// Bucket a combination score: >=80 Excellent, >=60 Very Good,
    /// >=40 Good, >=20 Average, below that Poor.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            JtRating::Excellent
        } else if score >= 60.0 {
            JtRating::VeryGood
        } else if score >= 40.0 {
            JtRating::Good
        } else if score >= 20.0 {
            JtRating::Average
        } else {
            JtRating::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JtRating::Excellent => "Excellent",
            JtRating::VeryGood => "Very Good",
            JtRating::Good => "Good",
            JtRating::Average => "Average",
            JtRating::Poor => "Poor",
        }
    }
}

impl fmt::Display for JtRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-race statistics for one jockey/trainer combination, keyed back to
/// the entrant by program number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JockeyTrainerStat {
    pub horse_no: u32,
    pub jockey: String,
    pub trainer: String,
    pub starts: u32,
    pub wins: u32,
    /// Top-three finishes, wins included.
    pub places: u32,
    pub win_pct: f64,
    pub place_pct: f64,
    /// Composite 0-100, whole number.
    pub score: f64,
    pub rating: JtRating,
}

impl JockeyTrainerStat {
    /// Neutral stand-in for an entrant missing from the statistics table.
    ///
    /// Carries a flat 50 labelled "Average" without going through
    /// [`JtRating::from_score`], matching the legacy sheets (a bucketed
    /// 50 would read "Good").
    pub fn neutral(horse_no: u32) -> Self {
        JockeyTrainerStat {
            horse_no,
            jockey: String::new(),
            trainer: String::new(),
            starts: 0,
            wins: 0,
            places: 0,
            win_pct: 0.0,
            place_pct: 0.0,
            score: 50.0,
            rating: JtRating::Average,
        }
    }
}

/// Direction of an entrant's class movement over its recent runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassTrend {
    /// Stepping up in class off improving form.
    MovingUpStrong,
    /// Stepping up in class with form flat or declining.
    MovingUpWeak,
    /// Dropping in class off improving form.
    MovingDownStrong,
    /// Dropping in class with form flat or declining.
    MovingDownWeak,
    #[default]
    Stable,
}

impl ClassTrend {
    pub fn label(&self) -> &'static str {
        match self {
            ClassTrend::MovingUpStrong => "moving up (strong)",
            ClassTrend::MovingUpWeak => "moving up (weak)",
            ClassTrend::MovingDownStrong => "moving down (strong)",
            ClassTrend::MovingDownWeak => "moving down (weak)",
            ClassTrend::Stable => "stable",
        }
    }
}

impl fmt::Display for ClassTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six signals behind an overall score, each on its own 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub merit: f64,
    pub class: f64,
    pub form: f64,
    pub consistency: f64,
    pub distance: f64,
    pub jockey_trainer: f64,
}

/// One entrant's position in the final ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub horse_no: u32,
    /// Dense 1..N, 1 is best.
    pub rank: u32,
    pub overall: f64,
    pub components: ComponentScores,
    pub class_trend: ClassTrend,
}
