//! FormRank
//!
//! Racecard extraction and multi-factor ranking for printed horse racing
//! cards. Feed [`import_racecard`] one HTML document and get back the race,
//! its entrants with recent form, jockey/trainer statistics, and a ranked
//! field; keep results across cards in a [`RaceStore`].

pub mod class;
pub mod error;
pub mod import;
pub mod layout;
pub mod parsers;
pub mod ranking;
pub mod scoring;
pub mod store;
pub mod text;
pub mod types;

pub use class::ClassWeights;
pub use error::{HeaderField, ImportError};
pub use import::{import_racecard, ImportOptions, RacecardImport};
pub use layout::CardLayout;
pub use parsers::HeaderFallback;
pub use ranking::rank_horses;
pub use scoring::{score_race, ScoreWeights, ScoredHorse};
pub use store::{DuplicatePolicy, ImportOutcome, RaceStore, StoredRace};
pub use types::{
    ClassTrend, ComponentScores, Horse, JockeyTrainerStat, JtRating, Race, RaceKey, Ranking, Run,
};
