//! Score aggregation for a round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running totals for the round in progress.
///
/// `score` counts first-try solves (matching: every matched pair);
/// `corrections` counts recall items solved only on the retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    pub score: u32,
    pub corrections: u32,
}

impl ScoreTally {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Credit the matched count of a completed page.
    pub fn add_matches(&mut self, matched: u32) {
        self.score += matched;
    }

    pub fn record_first_try(&mut self) {
        self.score += 1;
    }

    pub fn record_correction(&mut self) {
        self.corrections += 1;
    }

    pub fn summary(&self, total: usize) -> RoundSummary {
        RoundSummary {
            score: self.score,
            total: total as u32,
            corrections: self.corrections,
            perfect: self.score as usize == total,
            finished_at: Utc::now(),
        }
    }
}

/// What the score screen shows once a round is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u32,
    pub total: u32,
    pub corrections: u32,
    /// Every item was solved on the first try.
    pub perfect: bool,
    pub finished_at: DateTime<Utc>,
}

impl RoundSummary {
    pub fn headline(&self) -> &'static str {
        if self.perfect {
            "Congratulations!"
        } else {
            "Round Complete!"
        }
    }

    /// Fraction of the round solved first time, in `0.0..=1.0`.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_accumulates_and_resets() {
        let mut tally = ScoreTally::default();
        tally.add_matches(4);
        tally.record_first_try();
        tally.record_correction();
        assert_eq!(tally.score, 5);
        assert_eq!(tally.corrections, 1);
        tally.reset();
        assert_eq!(tally, ScoreTally::default());
    }

    #[test]
    fn perfect_summary() {
        let mut tally = ScoreTally::default();
        tally.add_matches(5);
        let summary = tally.summary(5);
        assert!(summary.perfect);
        assert_eq!(summary.headline(), "Congratulations!");
        assert!((summary.accuracy() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn corrections_do_not_make_a_round_perfect() {
        let mut tally = ScoreTally::default();
        tally.record_first_try();
        tally.record_correction();
        let summary = tally.summary(2);
        assert!(!summary.perfect);
        assert_eq!(summary.headline(), "Round Complete!");
        assert_eq!(summary.corrections, 1);
    }

    #[test]
    fn empty_total_has_zero_accuracy() {
        let summary = ScoreTally::default().summary(0);
        assert_eq!(summary.accuracy(), 0.0);
    }
}
