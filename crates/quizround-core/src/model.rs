//! Core data model types for quizround.
//!
//! Content reaches the engine as a [`ContentList`] whose pairs are a tagged
//! union: matching games play [`MatchPair`]s, recall games play
//! [`RecallPair`]s. The state machines pick their behavior from the variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique key of a pair within one content list.
pub type PairId = u32;

/// A left/right unit for the two-column matching games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    /// Equality key for matching correctness.
    pub id: PairId,
    /// Text shown in the left column (e.g. the English word, or a date).
    pub left: String,
    /// Text shown in the right column (e.g. the French word, or an event).
    pub right: String,
}

/// A prompt/answer unit for the free-text recall games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallPair {
    pub id: PairId,
    /// What the player is shown (or hears).
    pub prompt: String,
    /// What the player must type.
    pub answer: String,
}

/// The pairs of a content list, tagged by the game mode they drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "pairs", rename_all = "lowercase")]
pub enum Content {
    Matching(Vec<MatchPair>),
    Recall(Vec<RecallPair>),
}

impl Content {
    pub fn mode(&self) -> Mode {
        match self {
            Content::Matching(_) => Mode::Matching,
            Content::Recall(_) => Mode::Recall,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Content::Matching(pairs) => pairs.len(),
            Content::Recall(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pair ids in list order.
    pub fn ids(&self) -> Vec<PairId> {
        match self {
            Content::Matching(pairs) => pairs.iter().map(|p| p.id).collect(),
            Content::Recall(pairs) => pairs.iter().map(|p| p.id).collect(),
        }
    }

    /// The same pairs as recall items: left becomes the prompt, right the
    /// answer.
    pub fn as_recall(&self) -> Content {
        match self {
            Content::Matching(pairs) => Content::Recall(
                pairs
                    .iter()
                    .map(|p| RecallPair {
                        id: p.id,
                        prompt: p.left.clone(),
                        answer: p.right.clone(),
                    })
                    .collect(),
            ),
            Content::Recall(_) => self.clone(),
        }
    }
}

/// Which state machine a round runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Matching,
    Recall,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Matching => write!(f, "matching"),
            Mode::Recall => write!(f, "recall"),
        }
    }
}

/// The mini-games that run on the round engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    WordMatch,
    HistoryMatch,
    SpellingBee,
    VerbChallenge,
    ListenAndSpell,
}

impl GameKind {
    pub fn mode(self) -> Mode {
        match self {
            GameKind::WordMatch | GameKind::HistoryMatch => Mode::Matching,
            GameKind::SpellingBee | GameKind::VerbChallenge | GameKind::ListenAndSpell => {
                Mode::Recall
            }
        }
    }

    /// Question cap applied when the configuration does not set one.
    ///
    /// History Match and Spelling Bee draw 20 questions from larger lists;
    /// the other games play the whole list.
    pub fn default_question_limit(self) -> Option<usize> {
        match self {
            GameKind::HistoryMatch | GameKind::SpellingBee => Some(20),
            _ => None,
        }
    }

    /// Title shown above the board.
    pub fn title(self) -> &'static str {
        match self {
            GameKind::WordMatch => "Word Match",
            GameKind::HistoryMatch => "History Match",
            GameKind::SpellingBee => "Spelling Bee",
            GameKind::VerbChallenge => "Verb Challenge",
            GameKind::ListenAndSpell => "Listen and Spell",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::WordMatch => write!(f, "word-match"),
            GameKind::HistoryMatch => write!(f, "history-match"),
            GameKind::SpellingBee => write!(f, "spelling-bee"),
            GameKind::VerbChallenge => write!(f, "verb-challenge"),
            GameKind::ListenAndSpell => write!(f, "listen-and-spell"),
        }
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "word-match" | "wordmatch" => Ok(GameKind::WordMatch),
            "history-match" | "historymatch" | "history" => Ok(GameKind::HistoryMatch),
            "spelling-bee" | "spellingbee" | "spelling" => Ok(GameKind::SpellingBee),
            "verb-challenge" | "verbchallenge" | "verbs" => Ok(GameKind::VerbChallenge),
            "listen-and-spell" | "listenandspell" | "single-language-spelling" => {
                Ok(GameKind::ListenAndSpell)
            }
            other => Err(format!("unknown game: {other}")),
        }
    }
}

/// A named content list as supplied by the content catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The game this list is played with.
    pub game: GameKind,
    /// Academic year the list belongs to (e.g. "Year 5").
    #[serde(default)]
    pub year: Option<String>,
    /// Academic term the list belongs to (e.g. "Autumn").
    #[serde(default)]
    pub term: Option<String>,
    pub content: Content,
}

impl ContentList {
    /// Whether this list belongs to the given year and term. `None` filters
    /// match every list.
    pub fn matches_period(&self, year: Option<&str>, term: Option<&str>) -> bool {
        let eq = |want: Option<&str>, have: &Option<String>| match want {
            None => true,
            Some(w) => have.as_deref().is_some_and(|h| h.eq_ignore_ascii_case(w)),
        };
        eq(year, &self.year) && eq(term, &self.term)
    }

    /// This list reshaped for `game`, if it can be played that way.
    ///
    /// Matching lists also serve the recall games; recall lists have no
    /// second column and cannot be matched.
    pub fn playable_as(&self, game: GameKind) -> Option<ContentList> {
        let content = match (game.mode(), &self.content) {
            (Mode::Matching, Content::Matching(_)) | (Mode::Recall, Content::Recall(_)) => {
                self.content.clone()
            }
            (Mode::Recall, Content::Matching(_)) => self.content.as_recall(),
            (Mode::Matching, Content::Recall(_)) => return None,
        };
        Some(ContentList {
            game,
            content,
            ..self.clone()
        })
    }
}
