//! The `quizround play` command.
//!
//! Plays one round on stdin/stdout. Matching games take `l<N>` / `r<N>` to
//! pick row N of a column; recall games take one answer per line, and a blank
//! line continues past a solved or revealed item.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;

use quizround_core::config::load_config_from;
use quizround_core::matching::{Cell, Column, PairOutcome, SelectOutcome};
use quizround_core::model::{ContentList, GameKind, Mode};
use quizround_core::parser::parse_content_list;
use quizround_core::recall::SubmitOutcome;
use quizround_core::score::RoundSummary;
use quizround_core::session::{MatchingSession, RecallSession, RoundObserver};

type Input = Lines<BufReader<Stdin>>;

pub async fn execute(
    content_path: PathBuf,
    game: Option<String>,
    seed: Option<u64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if seed.is_some() {
        config.seed = seed;
    }

    let console = Console::new(&format)?;
    let list = parse_content_list(&content_path)?;
    let list = match game {
        Some(g) => {
            let game: GameKind = g.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
            list.playable_as(game)
                .with_context(|| format!("'{}' cannot be played as {game}", list.name))?
        }
        None => list,
    };

    if list.content.is_empty() {
        println!("No lists found");
        return Ok(());
    }

    let observer = Arc::new(ConsoleObserver { console });
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    console.say(&format!("{}: {}", list.game.title(), list.name));
    let summary = match list.game.mode() {
        Mode::Matching => play_matching(&list, &config, observer, &mut input).await?,
        Mode::Recall => play_recall(&list, &config, observer, &mut input).await?,
    };

    match summary {
        Some(summary) => console.score_screen(&summary, list.game.mode())?,
        None => console.say("Round abandoned."),
    }
    Ok(())
}

async fn play_matching(
    list: &ContentList,
    config: &quizround_core::config::QuizConfig,
    observer: Arc<ConsoleObserver>,
    input: &mut Input,
) -> Result<Option<RoundSummary>> {
    let console = observer.console;
    let session = MatchingSession::start(list, config, observer)?;
    let mut changes = session.subscribe();

    loop {
        wait_until(&mut changes, || {
            let view = session.view();
            view.finished || view.accepting_input()
        })
        .await;

        let view = session.view();
        if view.finished {
            return Ok(view.summary);
        }
        console.say(&format!(
            "\nPage {} of {}  (score {})",
            view.page + 1,
            view.total_pages,
            view.score
        ));
        for (row, (left, right)) in view.left.iter().zip(&view.right).enumerate() {
            console.say(&format!(
                "{:>2}. {:<28} {:>2}. {}",
                row + 1,
                cell_label(left),
                row + 1,
                cell_label(right)
            ));
        }

        let Some(line) = input.next_line().await? else {
            session.teardown();
            return Ok(None);
        };
        let Some((column, row)) = parse_pick(&line) else {
            console.say("Pick with l<N> or r<N>.");
            continue;
        };
        let cells = match column {
            Column::Left => &view.left,
            Column::Right => &view.right,
        };
        let Some(cell) = row.checked_sub(1).and_then(|i| cells.get(i)) else {
            console.say("No such row.");
            continue;
        };

        match session.select(column, cell.id) {
            SelectOutcome::Matched(_) => console.say("Match!"),
            SelectOutcome::Mismatch { .. } => console.say("Not a match."),
            SelectOutcome::Ignored => console.say("That one is already done."),
            SelectOutcome::Selected(_) | SelectOutcome::Deselected(_) => {}
        }
    }
}

async fn play_recall(
    list: &ContentList,
    config: &quizround_core::config::QuizConfig,
    observer: Arc<ConsoleObserver>,
    input: &mut Input,
) -> Result<Option<RoundSummary>> {
    let console = observer.console;
    let session = RecallSession::start(list, config, observer)?;
    let mut changes = session.subscribe();

    loop {
        wait_until(&mut changes, || {
            let view = session.view();
            view.finished || view.accepting_input() || view.can_continue()
        })
        .await;

        let view = session.view();
        if view.finished {
            return Ok(view.summary);
        }
        if view.accepting_input() {
            if let Some(prompt) = &view.prompt {
                console.say(&format!(
                    "\n[{}/{}] {prompt}",
                    view.index + 1,
                    view.total
                ));
            }
        }

        let Some(line) = input.next_line().await? else {
            session.teardown();
            return Ok(None);
        };

        if session.view().can_continue() {
            if line.trim().is_empty() {
                session.advance();
            } else {
                console.say("Press enter to continue.");
            }
            continue;
        }

        match session.submit(&line) {
            SubmitOutcome::Correct { first_try: true } => console.say("Correct!"),
            SubmitOutcome::Correct { first_try: false } => console.say("Correct on the second try."),
            SubmitOutcome::Retry => console.say("Try again."),
            SubmitOutcome::Revealed { answer } => console.say(&format!("The answer was: {answer}")),
            SubmitOutcome::Rejected => {}
        }
    }
}

/// Block until `ready` holds, re-checking on every session change.
async fn wait_until(changes: &mut watch::Receiver<u64>, ready: impl Fn() -> bool) {
    loop {
        changes.borrow_and_update();
        if ready() {
            return;
        }
        if changes.changed().await.is_err() {
            return;
        }
    }
}

fn parse_pick(line: &str) -> Option<(Column, usize)> {
    let line = line.trim().to_lowercase();
    let (column, rest) = if let Some(rest) = line.strip_prefix('l') {
        (Column::Left, rest)
    } else if let Some(rest) = line.strip_prefix('r') {
        (Column::Right, rest)
    } else {
        return None;
    };
    rest.trim().parse().ok().map(|row| (column, row))
}

fn cell_label(cell: &Cell) -> String {
    let mark = match (cell.outcome, cell.selected, cell.incorrect) {
        (Some(PairOutcome::Matched), _, _) => "[+]",
        (Some(PairOutcome::Missed), _, _) => "[-]",
        (None, _, true) => "[x]",
        (None, true, _) => "[*]",
        (None, false, _) => "[ ]",
    };
    format!("{mark} {}", cell.text)
}

/// Where output goes: prompts and progress on stdout in text mode, on stderr
/// in JSON mode so stdout carries only the summary.
#[derive(Debug, Clone, Copy)]
struct Console {
    json: bool,
}

impl Console {
    fn new(format: &str) -> Result<Self> {
        match format {
            "text" => Ok(Self { json: false }),
            "json" => Ok(Self { json: true }),
            other => anyhow::bail!("unknown format: {other} (expected text or json)"),
        }
    }

    fn say(&self, line: &str) {
        if self.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn score_screen(&self, summary: &RoundSummary, mode: Mode) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(summary)?);
            return Ok(());
        }
        println!("\n{}", summary.headline());
        println!("Your Score: {} / {}", summary.score, summary.total);
        if mode == Mode::Recall {
            println!("Corrections: {}", summary.corrections);
        }
        Ok(())
    }
}

struct ConsoleObserver {
    console: Console,
}

impl RoundObserver for ConsoleObserver {
    fn on_round_start(&self, list_id: &str, total: usize) {
        tracing::debug!(list = list_id, total, "round on screen");
    }

    fn on_page_complete(&self, page_index: usize, matched: u32) {
        self.console
            .say(&format!("Page {} complete: {matched} matched", page_index + 1));
    }

    fn on_round_complete(&self, _summary: &RoundSummary) {}
}
