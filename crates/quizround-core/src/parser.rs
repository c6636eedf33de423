//! TOML content list parser.
//!
//! Loads content lists from TOML files and directories, validates them, and
//! picks the lists that belong to a year and term.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Content, ContentList, GameKind, MatchPair, Mode, PairId, RecallPair};

/// Intermediate TOML structure for parsing content list files.
///
/// A `words` array must come before the `[list]` table, or TOML reads it as
/// part of the header.
#[derive(Debug, Deserialize)]
struct TomlContentFile {
    list: TomlListHeader,
    #[serde(default)]
    pairs: Vec<TomlPair>,
    #[serde(default)]
    events: Vec<TomlEvent>,
    #[serde(default)]
    verbs: Vec<TomlVerb>,
    #[serde(default)]
    words: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlListHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    game: String,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    term: Option<String>,
}

/// `left`/`right` for matching lists, `prompt`/`answer` for recall lists.
#[derive(Debug, Deserialize)]
struct TomlPair {
    #[serde(default)]
    id: Option<PairId>,
    #[serde(default, alias = "prompt")]
    left: String,
    #[serde(default, alias = "answer")]
    right: String,
}

#[derive(Debug, Deserialize)]
struct TomlEvent {
    #[serde(default)]
    id: Option<PairId>,
    date: String,
    event: String,
}

#[derive(Debug, Deserialize)]
struct TomlVerb {
    #[serde(default)]
    id: Option<PairId>,
    person: String,
    number: String,
    english: String,
    latin: String,
}

/// Explicit id, else the 1-based position in the file.
fn pair_id(id: Option<PairId>, index: usize) -> PairId {
    id.unwrap_or(index as PairId + 1)
}

/// Parse a single TOML file into a `ContentList`.
pub fn parse_content_list(path: &Path) -> Result<ContentList> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read content file: {}", path.display()))?;

    parse_content_str(&content, path)
}

/// Parse a TOML string into a `ContentList` (useful for testing).
pub fn parse_content_str(content: &str, source_path: &Path) -> Result<ContentList> {
    let parsed: TomlContentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let game: GameKind = parsed
        .list
        .game
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let content = match game {
        GameKind::WordMatch => Content::Matching(match_pairs(parsed.pairs)),
        GameKind::HistoryMatch => {
            let mut pairs = match_pairs(parsed.pairs);
            let offset = pairs.len();
            pairs.extend(parsed.events.into_iter().enumerate().map(|(i, e)| MatchPair {
                id: pair_id(e.id, offset + i),
                left: e.date,
                right: e.event,
            }));
            Content::Matching(pairs)
        }
        GameKind::SpellingBee => Content::Recall(recall_pairs(parsed.pairs)),
        GameKind::VerbChallenge => {
            let mut pairs = recall_pairs(parsed.pairs);
            let offset = pairs.len();
            pairs.extend(parsed.verbs.into_iter().enumerate().map(|(i, v)| RecallPair {
                id: pair_id(v.id, offset + i),
                prompt: format!("{}, {}: \"{}\"", v.person, v.number, v.english),
                answer: v.latin,
            }));
            Content::Recall(pairs)
        }
        GameKind::ListenAndSpell => {
            let mut pairs = recall_pairs(parsed.pairs);
            let offset = pairs.len();
            pairs.extend(parsed.words.into_iter().enumerate().map(|(i, w)| RecallPair {
                id: pair_id(None, offset + i),
                prompt: w.clone(),
                answer: w,
            }));
            Content::Recall(pairs)
        }
    };

    Ok(ContentList {
        id: parsed.list.id,
        name: parsed.list.name,
        description: parsed.list.description,
        game,
        year: parsed.list.year,
        term: parsed.list.term,
        content,
    })
}

fn match_pairs(pairs: Vec<TomlPair>) -> Vec<MatchPair> {
    pairs
        .into_iter()
        .enumerate()
        .map(|(i, p)| MatchPair {
            id: pair_id(p.id, i),
            left: p.left,
            right: p.right,
        })
        .collect()
}

fn recall_pairs(pairs: Vec<TomlPair>) -> Vec<RecallPair> {
    pairs
        .into_iter()
        .enumerate()
        .map(|(i, p)| RecallPair {
            id: pair_id(p.id, i),
            prompt: p.left,
            answer: p.right,
        })
        .collect()
}

/// Recursively load all `.toml` content files from a directory.
///
/// Files that fail to parse are logged and skipped.
pub fn load_content_directory(dir: &Path) -> Result<Vec<ContentList>> {
    let mut lists = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            lists.extend(load_content_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_content_list(&path) {
                Ok(list) => lists.push(list),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(lists)
}

/// A warning from content list validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The pair ID (if applicable).
    pub pair_id: Option<PairId>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn list(message: impl Into<String>) -> Self {
        Self {
            pair_id: None,
            message: message.into(),
        }
    }

    fn pair(id: PairId, message: impl Into<String>) -> Self {
        Self {
            pair_id: Some(id),
            message: message.into(),
        }
    }
}

/// Validate a content list for common issues.
pub fn validate_content_list(list: &ContentList) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if list.content.is_empty() {
        warnings.push(ValidationWarning::list("list has no pairs"));
        return warnings;
    }

    if list.content.mode() != list.game.mode() {
        warnings.push(ValidationWarning::list(format!(
            "{} is a {} game but the list holds {} content",
            list.game,
            list.game.mode(),
            list.content.mode()
        )));
    }

    // Matching correctness is decided by id, so ids must be unique.
    let mut seen = HashSet::new();
    for id in list.content.ids() {
        if !seen.insert(id) {
            warnings.push(ValidationWarning::pair(id, format!("duplicate pair ID: {id}")));
        }
    }

    let sides: Vec<(PairId, &str, &str)> = match &list.content {
        Content::Matching(pairs) => pairs
            .iter()
            .map(|p| (p.id, p.left.as_str(), p.right.as_str()))
            .collect(),
        Content::Recall(pairs) => pairs
            .iter()
            .map(|p| (p.id, p.prompt.as_str(), p.answer.as_str()))
            .collect(),
    };
    let (first, second) = match list.content.mode() {
        Mode::Matching => ("left", "right"),
        Mode::Recall => ("prompt", "answer"),
    };
    for (id, a, b) in sides {
        if a.trim().is_empty() {
            warnings.push(ValidationWarning::pair(id, format!("{first} is empty")));
        }
        if b.trim().is_empty() {
            warnings.push(ValidationWarning::pair(id, format!("{second} is empty")));
        }
    }

    warnings
}

/// Lists for the given year and term, playable as `game` when one is given.
pub fn select_lists(
    lists: &[ContentList],
    year: Option<&str>,
    term: Option<&str>,
    game: Option<GameKind>,
) -> Vec<ContentList> {
    lists
        .iter()
        .filter(|l| l.matches_period(year, term))
        .filter_map(|l| match game {
            Some(game) => l.playable_as(game),
            None => Some(l.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const WORD_MATCH: &str = r#"
[list]
id = "y5-autumn-animals"
name = "Animals"
description = "French animal words"
game = "word-match"
year = "Year 5"
term = "Autumn"

[[pairs]]
left = "dog"
right = "chien"

[[pairs]]
left = "cat"
right = "chat"
"#;

    fn path() -> PathBuf {
        PathBuf::from("test.toml")
    }

    #[test]
    fn parse_word_match() {
        let list = parse_content_str(WORD_MATCH, &path()).unwrap();
        assert_eq!(list.id, "y5-autumn-animals");
        assert_eq!(list.game, GameKind::WordMatch);
        assert_eq!(list.year.as_deref(), Some("Year 5"));
        let Content::Matching(pairs) = &list.content else {
            panic!("expected matching content");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].id, 2);
        assert_eq!(pairs[1].right, "chat");
        assert!(validate_content_list(&list).is_empty());
    }

    #[test]
    fn parse_history_events() {
        let toml = r#"
[list]
id = "romans"
name = "Romans"
game = "history-match"

[[events]]
date = "43 AD"
event = "Claudius invades Britain"

[[events]]
date = "410 AD"
event = "Romans leave Britain"
"#;
        let list = parse_content_str(toml, &path()).unwrap();
        let Content::Matching(pairs) = &list.content else {
            panic!("expected matching content");
        };
        assert_eq!(pairs[0].left, "43 AD");
        assert_eq!(pairs[1].id, 2);
    }

    #[test]
    fn parse_verbs_builds_prompts() {
        let toml = r#"
[list]
id = "amo"
name = "Amo"
game = "verb-challenge"

[[verbs]]
person = "1st"
number = "singular"
english = "I love"
latin = "amo"
"#;
        let list = parse_content_str(toml, &path()).unwrap();
        let Content::Recall(pairs) = &list.content else {
            panic!("expected recall content");
        };
        assert_eq!(pairs[0].prompt, "1st, singular: \"I love\"");
        assert_eq!(pairs[0].answer, "amo");
    }

    #[test]
    fn parse_words_and_prompt_aliases() {
        let words = r#"
words = ["because", "friend"]

[list]
id = "spell"
name = "Spell"
game = "listen-and-spell"
"#;
        let list = parse_content_str(words, &path()).unwrap();
        assert_eq!(list.content.ids(), vec![1, 2]);
        let Content::Recall(pairs) = &list.content else {
            panic!("expected recall content");
        };
        assert_eq!(pairs[1].prompt, pairs[1].answer);

        let bee = r#"
[list]
id = "bee"
name = "Bee"
game = "spelling-bee"

[[pairs]]
id = 10
prompt = "house"
answer = "maison"
"#;
        let list = parse_content_str(bee, &path()).unwrap();
        let Content::Recall(pairs) = &list.content else {
            panic!("expected recall content");
        };
        assert_eq!(pairs[0].id, 10);
        assert_eq!(pairs[0].answer, "maison");
    }

    #[test]
    fn unknown_game_is_an_error() {
        let toml = r#"
[list]
id = "x"
name = "X"
game = "chess"
"#;
        let err = parse_content_str(toml, &path()).unwrap_err();
        assert!(err.to_string().contains("unknown game"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_content_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_duplicates_and_blanks() {
        let toml = r#"
[list]
id = "dupes"
name = "Dupes"
game = "word-match"

[[pairs]]
id = 1
left = "one"
right = "un"

[[pairs]]
id = 1
left = "  "
right = "deux"
"#;
        let list = parse_content_str(toml, &path()).unwrap();
        let warnings = validate_content_list(&list);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings
            .iter()
            .any(|w| w.pair_id == Some(1) && w.message == "left is empty"));
    }

    #[test]
    fn validate_empty_list() {
        let toml = r#"
[list]
id = "empty"
name = "Empty"
game = "spelling-bee"
"#;
        let list = parse_content_str(toml, &path()).unwrap();
        let warnings = validate_content_list(&list);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no pairs"));
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("animals.toml"), WORD_MATCH).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("year6");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(
            nested.join("words.toml"),
            WORD_MATCH.replace("y5-autumn-animals", "y6-animals"),
        )
        .unwrap();

        let lists = load_content_directory(dir.path()).unwrap();
        let ids: Vec<&str> = lists.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["y5-autumn-animals", "y6-animals"]);
    }

    #[test]
    fn load_missing_directory_fails() {
        assert!(load_content_directory(Path::new("/no/such/content")).is_err());
    }

    #[test]
    fn select_by_period_and_game() {
        let animals = parse_content_str(WORD_MATCH, &path()).unwrap();
        let mut spring = animals.clone();
        spring.id = "spring".into();
        spring.term = Some("Spring".into());
        let lists = vec![animals, spring];

        let autumn = select_lists(&lists, Some("year 5"), Some("autumn"), None);
        assert_eq!(autumn.len(), 1);
        assert_eq!(autumn[0].id, "y5-autumn-animals");

        let bee = select_lists(&lists, None, None, Some(GameKind::SpellingBee));
        assert_eq!(bee.len(), 2);
        assert_eq!(bee[0].content.mode(), Mode::Recall);

        assert!(select_lists(&lists, Some("Year 3"), None, None).is_empty());
    }
}
