//! quizround-core: Round engine for matching and recall quiz games.
//!
//! This crate holds the content model, the shuffled and paginated round
//! state machines, scoring, and the timer-driven sessions that a host screen
//! drives one selection or answer at a time.

pub mod config;
pub mod error;
pub mod matching;
pub mod model;
pub mod paginator;
pub mod parser;
pub mod recall;
pub mod score;
pub mod session;
pub mod shuffle;
pub mod timer;
