use crate::types::ErrorKind;
use serde::Serialize;
use std::fmt;

/// Terminal state of one feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    AlreadyPresent,
    TooOld,
    Error(ErrorKind),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub processed: u64,
    pub inserted: u64,
    pub already_present: u64,
    pub too_old: u64,
    pub errors: u64,
    pub cumulative_cost: u64,
}

impl RunStatistics {
    pub fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::Inserted => self.inserted += 1,
            Outcome::AlreadyPresent => self.already_present += 1,
            Outcome::TooOld => self.too_old += 1,
            Outcome::Error(_) => self.errors += 1,
        }
    }

    /// Items that did not end up in the store, whatever the reason.
    pub fn not_inserted(&self) -> u64 {
        self.processed - self.inserted
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run summary:")?;
        writeln!(f, "  Items processed      : {}", self.processed)?;
        writeln!(f, "  Inserted             : {}", self.inserted)?;
        writeln!(f, "  Already present      : {}", self.already_present)?;
        writeln!(f, "  Too old              : {}", self.too_old)?;
        writeln!(f, "  Errors               : {}", self.errors)?;
        writeln!(f, "  Not inserted (total) : {}", self.not_inserted())?;
        write!(f, "  Tokens used          : {}", self.cumulative_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_outcome_lands_in_one_bucket() {
        let mut stats = RunStatistics::default();
        stats.record(Outcome::Inserted);
        stats.record(Outcome::AlreadyPresent);
        stats.record(Outcome::TooOld);
        stats.record(Outcome::TooOld);
        stats.record(Outcome::Error(ErrorKind::Storage));

        assert_eq!(stats.processed, 5);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.already_present, 1);
        assert_eq!(stats.too_old, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.not_inserted(), 4);
    }

    #[test]
    fn summary_shows_every_figure() {
        let stats = RunStatistics {
            processed: 3,
            inserted: 1,
            already_present: 1,
            too_old: 1,
            errors: 0,
            cumulative_cost: 4242,
        };
        let text = stats.to_string();
        for needle in ["processed      : 3", "Inserted             : 1", "Already present      : 1", "Too old              : 1", "Errors               : 0", "Tokens used          : 4242"] {
            assert!(text.contains(needle), "missing {needle:?} in\n{text}");
        }
    }
}
