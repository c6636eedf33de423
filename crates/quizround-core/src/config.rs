//! Round configuration.
//!
//! Everything a round needs to know about its host (page size, question cap,
//! delays, the academic year and term, an optional seed) is passed in
//! explicitly through [`QuizConfig`] when the round starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::model::GameKind;

/// Top-level quizround configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Pairs shown per page in the matching games.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Cap on questions per round. Falls back to the game's own cap.
    #[serde(default)]
    pub question_limit: Option<usize>,
    /// How long a mismatched pair flashes before the picks clear.
    #[serde(default = "default_mismatch_flash")]
    pub mismatch_flash_ms: u64,
    /// How long a first wrong answer flashes before the retry.
    #[serde(default = "default_retry_flash")]
    pub retry_flash_ms: u64,
    /// Settle time before a finished page (or auto-advanced item) moves on.
    #[serde(default = "default_advance_delay")]
    pub advance_delay_ms: u64,
    /// Move past solved or revealed recall items without waiting for the player.
    #[serde(default)]
    pub auto_advance: bool,
    /// Academic year used to pick content lists (e.g. "Year 5").
    #[serde(default)]
    pub year: Option<String>,
    /// Academic term used to pick content lists (e.g. "Autumn").
    #[serde(default)]
    pub term: Option<String>,
    /// Fixed shuffle seed for reproducible rounds.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Directory searched for content lists.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
}

fn default_page_size() -> usize {
    5
}
fn default_mismatch_flash() -> u64 {
    500
}
fn default_retry_flash() -> u64 {
    800
}
fn default_advance_delay() -> u64 {
    1500
}
fn default_content_dir() -> PathBuf {
    PathBuf::from("./content")
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            question_limit: None,
            mismatch_flash_ms: default_mismatch_flash(),
            retry_flash_ms: default_retry_flash(),
            advance_delay_ms: default_advance_delay(),
            auto_advance: false,
            year: None,
            term: None,
            seed: None,
            content_dir: default_content_dir(),
        }
    }
}

impl QuizConfig {
    pub fn mismatch_flash(&self) -> Duration {
        Duration::from_millis(self.mismatch_flash_ms)
    }

    pub fn retry_flash(&self) -> Duration {
        Duration::from_millis(self.retry_flash_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    /// Question cap for `game`: the configured one, else the game's default.
    pub fn question_limit_for(&self, game: GameKind) -> Option<usize> {
        self.question_limit.or(game.default_question_limit())
    }

    /// RNG for a new round; seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizround.toml` in the current directory
/// 2. `~/.config/quizround/config.toml`
///
/// Environment variable overrides: `QUIZROUND_YEAR`, `QUIZROUND_TERM`,
/// `QUIZROUND_SEED`.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizround.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Parse a TOML string into a `QuizConfig`.
pub fn parse_config_str(content: &str) -> Result<QuizConfig> {
    let config: QuizConfig = toml::from_str(content)?;
    anyhow::ensure!(config.page_size >= 1, "page_size must be at least 1");
    anyhow::ensure!(
        config.question_limit != Some(0),
        "question_limit must be at least 1"
    );
    Ok(config)
}

fn apply_env_overrides(
    config: &mut QuizConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(year) = lookup("QUIZROUND_YEAR") {
        config.year = Some(year);
    }
    if let Some(term) = lookup("QUIZROUND_TERM") {
        config.term = Some(term);
    }
    if let Some(seed) = lookup("QUIZROUND_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid QUIZROUND_SEED: '{seed}'"))?;
        config.seed = Some(seed);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizround"))
}
