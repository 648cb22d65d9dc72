//! In-memory store of imported races with explicit duplicate handling.

use crate::error::ImportError;
use crate::import::RacecardImport;
use crate::types::{Horse, Race, RaceKey, Ranking};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::mem;
use tracing::debug;

/// How an import should treat a race that is already stored. There is no
/// default on purpose: callers always state what a duplicate means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Leave the stored race untouched.
    Skip,
    /// Update the stored race in place: race facts replaced, horses
    /// upserted by program number, runs appended, rankings swapped whole.
    Overwrite,
    /// Refuse with [`ImportError::DuplicateRace`].
    Error,
}

/// What an import did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created,
    Updated,
    Skipped,
}

/// A stored race with its entrants and current rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRace {
    pub race: Race,
    pub horses: Vec<Horse>,
    pub rankings: Vec<Ranking>,
}

/// Keyed storage for imported races.
///
/// Horses live inside their race and rankings inside the store entry, so
/// removing a race removes everything under it. Rankings are only ever
/// replaced as a whole set, never row by row.
#[derive(Debug, Default)]
pub struct RaceStore {
    races: BTreeMap<RaceKey, StoredRace>,
}

impl RaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an imported race under the given duplicate policy.
    pub fn import(
        &mut self,
        import: RacecardImport,
        policy: DuplicatePolicy,
    ) -> Result<ImportOutcome, ImportError> {
        let key = import.race.key.clone();

        let Some(existing) = self.races.get_mut(&key) else {
            self.races.insert(
                key,
                StoredRace {
                    race: import.race,
                    horses: import.horses,
                    rankings: import.rankings,
                },
            );
            return Ok(ImportOutcome::Created);
        };

        match policy {
            DuplicatePolicy::Skip => {
                debug!("race {} already stored, skipped", key);
                Ok(ImportOutcome::Skipped)
            }
            DuplicatePolicy::Error => Err(ImportError::DuplicateRace(key)),
            DuplicatePolicy::Overwrite => {
                existing.race = import.race;
                for horse in import.horses {
                    upsert_horse(&mut existing.horses, horse);
                }
                // One assignment, so a reader never sees a partial set.
                existing.rankings = import.rankings;
                Ok(ImportOutcome::Updated)
            }
        }
    }

    /// Replace a race's ranking set in one step. Returns false when the
    /// race is not stored.
    pub fn replace_rankings(&mut self, key: &RaceKey, rankings: Vec<Ranking>) -> bool {
        match self.races.get_mut(key) {
            Some(stored) => {
                stored.rankings = rankings;
                true
            }
            None => false,
        }
    }

    /// Drop all recorded runs for a race's horses. Re-imports append
    /// runs, so callers clear first when they want a clean re-read.
    pub fn clear_runs(&mut self, key: &RaceKey) -> bool {
        match self.races.get_mut(key) {
            Some(stored) => {
                for horse in &mut stored.horses {
                    horse.runs.clear();
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &RaceKey) -> Option<&StoredRace> {
        self.races.get(key)
    }

    pub fn contains(&self, key: &RaceKey) -> bool {
        self.races.contains_key(key)
    }

    /// Remove a race and everything stored under it.
    pub fn remove(&mut self, key: &RaceKey) -> Option<StoredRace> {
        self.races.remove(key)
    }

    pub fn races(&self) -> impl Iterator<Item = &StoredRace> {
        self.races.values()
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }
}

/// Update the horse with the same program number, keeping previously
/// recorded runs and appending the new ones behind them.
fn upsert_horse(horses: &mut Vec<Horse>, incoming: Horse) {
    match horses.iter_mut().find(|h| h.horse_no == incoming.horse_no) {
        Some(existing) => {
            let mut runs = mem::take(&mut existing.runs);
            runs.extend(incoming.runs.iter().cloned());
            *existing = incoming;
            existing.runs = runs;
        }
        None => horses.push(incoming),
    }
}
