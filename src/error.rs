//! Errors that abort a racecard import.
//!
//! Only a missing race identity is fatal. Malformed rows, absent optional
//! fields and unrecognized labels degrade to defaults and a log line.

use crate::types::RaceKey;
use std::fmt;
use thiserror::Error;

/// Header fields that must be recovered for a card to be importable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Course,
    Date,
    RaceNumber,
}

impl HeaderField {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderField::Course => "course",
            HeaderField::Date => "race date",
            HeaderField::RaceNumber => "race number",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    /// Nothing in the document looked like a racecard header and the
    /// caller supplied no fallback identity.
    #[error("no racecard header found in document")]
    HeaderNotFound,

    /// A header block was found but a composite-key field could not be
    /// recovered from it or the fallback.
    #[error("racecard header is missing {0}")]
    MissingHeaderField(HeaderField),

    /// The race is already stored and the duplicate policy forbids both
    /// skipping and overwriting.
    #[error("race already imported: {0}")]
    DuplicateRace(RaceKey),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_error_messages() {
        let err = ImportError::MissingHeaderField(HeaderField::RaceNumber);
        assert_eq!(err.to_string(), "racecard header is missing race number");

        let key = RaceKey {
            race_date: NaiveDate::from_ymd_opt(2025, 7, 25).unwrap(),
            race_no: 7,
            course: "VAAL".to_string(),
        };
        let err = ImportError::DuplicateRace(key);
        assert_eq!(err.to_string(), "race already imported: VAAL 2025-07-25 R7");
    }
}
