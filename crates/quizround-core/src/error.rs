//! Round engine error types.
//!
//! Gameplay itself has no failure modes: mismatches, wrong answers and clicks
//! on resolved cells are all ordinary states. These errors only cover rounds
//! that cannot be started at all.

use thiserror::Error;

use crate::model::Mode;

/// Errors that prevent a round from being set up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// The content list has no pairs, so there is nothing to play.
    #[error("no content: list '{0}' has no pairs")]
    NoContent(String),

    /// Pages must hold at least one item.
    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),

    /// The content shape does not fit the requested state machine.
    #[error("wrong content mode: expected {expected}, found {found}")]
    WrongMode { expected: Mode, found: Mode },
}

impl QuizError {
    /// Returns `true` if the host should show its empty "no lists found" state
    /// rather than report a failure.
    pub fn is_empty_content(&self) -> bool {
        matches!(self, QuizError::NoContent(_))
    }
}
