//! Free-text recall state machine (Spelling Bee, Verb Challenge, Listen and
//! Spell).
//!
//! Each item gets one retry: the first wrong answer flashes and clears the
//! input, the second reveals the answer. Only a first-try solve scores; a
//! solve on the retry counts as a correction.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::model::RecallPair;
use crate::score::{RoundSummary, ScoreTally};
use crate::shuffle::shuffle;

/// Where the current item is in its answer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerStatus {
    AwaitingInput,
    Correct,
    /// First wrong answer is flashing; input is blocked until the flash ends.
    IncorrectRetry,
    /// Second wrong answer; the answer is shown and the item is over.
    RevealAnswer,
}

impl AnswerStatus {
    /// The item is over and the player may continue.
    pub fn is_terminal(self) -> bool {
        matches!(self, AnswerStatus::Correct | AnswerStatus::RevealAnswer)
    }
}

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or the item is not accepting answers.
    Rejected,
    Correct { first_try: bool },
    Retry,
    Revealed { answer: String },
}

/// Result of moving past a finished item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecallAdvance {
    Next(usize),
    Finished(RoundSummary),
}

/// Case-insensitive comparison that ignores surrounding whitespace.
pub fn answers_match(input: &str, answer: &str) -> bool {
    input.trim().to_lowercase() == answer.trim().to_lowercase()
}

/// A full recall round over shuffled prompt/answer pairs.
#[derive(Debug, Clone)]
pub struct RecallRound {
    source: Vec<RecallPair>,
    question_limit: Option<usize>,
    rng: StdRng,
    items: Vec<RecallPair>,
    index: usize,
    attempts: u32,
    status: AnswerStatus,
    input: String,
    tally: ScoreTally,
    finished: bool,
    summary: Option<RoundSummary>,
    epoch: u64,
}

impl RecallRound {
    pub fn new(source: Vec<RecallPair>, question_limit: Option<usize>, mut rng: StdRng) -> Self {
        let items = deal(&source, question_limit, &mut rng);
        Self {
            source,
            question_limit,
            rng,
            items,
            index: 0,
            attempts: 0,
            status: AnswerStatus::AwaitingInput,
            input: String::new(),
            tally: ScoreTally::default(),
            finished: false,
            summary: None,
            epoch: 0,
        }
    }

    /// Replace the typed text. Ignored unless the item is awaiting input.
    pub fn set_input(&mut self, text: &str) -> bool {
        if self.finished || self.status != AnswerStatus::AwaitingInput {
            return false;
        }
        self.input = text.to_string();
        true
    }

    /// Check the typed text against the current item's answer.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.finished || self.status != AnswerStatus::AwaitingInput {
            return SubmitOutcome::Rejected;
        }
        if self.input.trim().is_empty() {
            return SubmitOutcome::Rejected;
        }
        let Some(item) = self.items.get(self.index) else {
            return SubmitOutcome::Rejected;
        };

        if answers_match(&self.input, &item.answer) {
            self.status = AnswerStatus::Correct;
            let first_try = self.attempts == 0;
            if first_try {
                self.tally.record_first_try();
            } else {
                self.tally.record_correction();
            }
            tracing::debug!(id = item.id, first_try, "correct answer");
            return SubmitOutcome::Correct { first_try };
        }

        if self.attempts == 0 {
            self.attempts = 1;
            self.status = AnswerStatus::IncorrectRetry;
            self.input.clear();
            tracing::debug!(id = item.id, "wrong answer, retry");
            SubmitOutcome::Retry
        } else {
            self.attempts += 1;
            self.status = AnswerStatus::RevealAnswer;
            tracing::debug!(id = item.id, "wrong answer, revealing");
            SubmitOutcome::Revealed {
                answer: item.answer.clone(),
            }
        }
    }

    /// `set_input` followed by `submit`.
    pub fn submit_answer(&mut self, text: &str) -> SubmitOutcome {
        if !self.set_input(text) {
            return SubmitOutcome::Rejected;
        }
        self.submit()
    }

    /// End the retry flash. Returns `false` if no flash was showing.
    pub fn end_retry_flash(&mut self) -> bool {
        if self.status != AnswerStatus::IncorrectRetry {
            return false;
        }
        self.status = AnswerStatus::AwaitingInput;
        self.input.clear();
        true
    }

    /// Move past a solved or revealed item. `None` while the item is still
    /// open or the round is already over.
    pub fn advance(&mut self) -> Option<RecallAdvance> {
        if self.finished || !self.status.is_terminal() {
            return None;
        }
        self.attempts = 0;
        self.input.clear();
        self.status = AnswerStatus::AwaitingInput;

        if self.index + 1 < self.items.len() {
            self.index += 1;
            Some(RecallAdvance::Next(self.index))
        } else {
            self.finished = true;
            let summary = self.tally.summary(self.total());
            self.summary = Some(summary.clone());
            Some(RecallAdvance::Finished(summary))
        }
    }

    /// Re-deal the round from the original content with fresh counters.
    pub fn restart(&mut self) {
        self.items = deal(&self.source, self.question_limit, &mut self.rng);
        self.index = 0;
        self.attempts = 0;
        self.status = AnswerStatus::AwaitingInput;
        self.input.clear();
        self.tally.reset();
        self.finished = false;
        self.summary = None;
        self.epoch += 1;
    }

    pub fn current(&self) -> Option<&RecallPair> {
        if self.finished {
            return None;
        }
        self.items.get(self.index)
    }

    /// The answer, once the second wrong attempt has revealed it.
    pub fn revealed_answer(&self) -> Option<&str> {
        match self.status {
            AnswerStatus::RevealAnswer => self.current().map(|p| p.answer.as_str()),
            _ => None,
        }
    }

    pub fn status(&self) -> AnswerStatus {
        self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn tally(&self) -> ScoreTally {
        self.tally
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

fn deal(source: &[RecallPair], question_limit: Option<usize>, rng: &mut StdRng) -> Vec<RecallPair> {
    let mut items = shuffle(source, rng);
    if let Some(limit) = question_limit {
        items.truncate(limit);
    }
    items
}
