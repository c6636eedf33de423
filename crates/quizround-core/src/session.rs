//! Game sessions: a round plus the timers and callbacks that drive it.
//!
//! A session is what a host screen holds while a game is on screen. It owns
//! its round exclusively, schedules every delay (mismatch flash, retry flash,
//! page settle, auto-advance) on its own [`TimerSet`], and reports progress to
//! a [`RoundObserver`]. Tearing the session down, or dropping it, cancels any
//! timer that has not fired. A timer that fires after a restart sees a newer
//! round epoch and does nothing.
//!
//! Sessions must be created and driven inside a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::matching::{BoardState, Cell, Column, MatchingRound, SelectOutcome};
use crate::model::{Content, ContentList, GameKind, Mode, PairId};
use crate::recall::{AnswerStatus, RecallAdvance, RecallRound, SubmitOutcome};
use crate::score::RoundSummary;
use crate::timer::TimerSet;

/// Progress callbacks for the screen hosting a session.
pub trait RoundObserver: Send + Sync {
    fn on_round_start(&self, list_id: &str, total: usize);
    /// Once per matching page, with the page's correct-match count.
    fn on_page_complete(&self, page_index: usize, matched: u32);
    /// Exactly once per round.
    fn on_round_complete(&self, summary: &RoundSummary);
}

/// No-op observer.
pub struct NoopObserver;

impl RoundObserver for NoopObserver {
    fn on_round_start(&self, _: &str, _: usize) {}
    fn on_page_complete(&self, _: usize, _: u32) {}
    fn on_round_complete(&self, _: &RoundSummary) {}
}

/// Identity of the list a session plays.
#[derive(Debug, Clone, Serialize)]
pub struct ListInfo {
    pub id: String,
    pub name: String,
    pub game: GameKind,
}

/// Delays a session schedules, taken from [`QuizConfig`].
#[derive(Debug, Clone, Copy)]
struct Timing {
    mismatch_flash: Duration,
    retry_flash: Duration,
    advance_delay: Duration,
    auto_advance: bool,
}

impl From<&QuizConfig> for Timing {
    fn from(config: &QuizConfig) -> Self {
        Self {
            mismatch_flash: config.mismatch_flash(),
            retry_flash: config.retry_flash(),
            advance_delay: config.advance_delay(),
            auto_advance: config.auto_advance,
        }
    }
}

struct Shared<R> {
    id: Uuid,
    list: ListInfo,
    round: Mutex<R>,
    timers: Mutex<TimerSet>,
    observer: Arc<dyn RoundObserver>,
    timing: Timing,
    changes: watch::Sender<u64>,
    closed: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<R: Send + 'static> Shared<R> {
    fn new(
        list: ListInfo,
        round: R,
        config: &QuizConfig,
        observer: Arc<dyn RoundObserver>,
    ) -> Arc<Self> {
        let (changes, _) = watch::channel(0);
        Arc::new(Self {
            id: Uuid::new_v4(),
            list,
            round: Mutex::new(round),
            timers: Mutex::new(TimerSet::new()),
            observer,
            timing: Timing::from(config),
            changes,
            closed: AtomicBool::new(false),
        })
    }

    fn round(&self) -> MutexGuard<'_, R> {
        lock(&self.round)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Run `f` after `delay` unless the session is gone or closed by then.
    fn schedule<F>(self: &Arc<Self>, delay: Duration, f: F)
    where
        F: FnOnce(&Arc<Self>) + Send + 'static,
    {
        let weak: Weak<Self> = Arc::downgrade(self);
        lock(&self.timers).schedule(delay, move || {
            if let Some(shared) = weak.upgrade() {
                if !shared.is_closed() {
                    f(&shared);
                }
            }
        });
    }

    fn notify(&self) {
        self.changes.send_modify(|rev| *rev += 1);
    }

    fn cancel_timers(&self) {
        lock(&self.timers).cancel_all();
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.cancel_timers();
            tracing::debug!(session = %self.id, list = %self.list.id, "session closed");
            self.notify();
        }
    }
}

fn check_start(list: &ContentList, expected: Mode) -> Result<(), QuizError> {
    if list.content.is_empty() {
        return Err(QuizError::NoContent(list.name.clone()));
    }
    let found = list.content.mode();
    if found != expected {
        return Err(QuizError::WrongMode { expected, found });
    }
    Ok(())
}

fn list_info(list: &ContentList) -> ListInfo {
    ListInfo {
        id: list.id.clone(),
        name: list.name.clone(),
        game: list.game,
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Everything a host needs to draw the matching board.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingView {
    pub list: ListInfo,
    #[serde(skip)]
    pub state: BoardState,
    pub page: usize,
    pub total_pages: usize,
    pub left: Vec<Cell>,
    pub right: Vec<Cell>,
    pub score: u32,
    pub total: usize,
    pub finished: bool,
    pub summary: Option<RoundSummary>,
}

impl MatchingView {
    /// The player can pick something right now.
    pub fn accepting_input(&self) -> bool {
        !self.finished && matches!(self.state, BoardState::Idle | BoardState::OneSelected(_))
    }
}

/// A Word Match or History Match game in progress.
pub struct MatchingSession {
    shared: Arc<Shared<MatchingRound>>,
}

impl MatchingSession {
    pub fn start(
        list: &ContentList,
        config: &QuizConfig,
        observer: Arc<dyn RoundObserver>,
    ) -> Result<Self, QuizError> {
        check_start(list, Mode::Matching)?;
        let Content::Matching(pairs) = &list.content else {
            return Err(QuizError::WrongMode {
                expected: Mode::Matching,
                found: list.content.mode(),
            });
        };
        let round = MatchingRound::new(
            pairs.clone(),
            config.page_size,
            config.question_limit_for(list.game),
            config.rng(),
        )?;
        let total = round.total();
        if total == 0 {
            return Err(QuizError::NoContent(list.name.clone()));
        }
        let shared = Shared::new(list_info(list), round, config, observer);
        tracing::info!(session = %shared.id, list = %list.id, total, "matching round started");
        shared.observer.on_round_start(&list.id, total);
        Ok(Self { shared })
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Pick `id` in `column`. Mismatches and finished pages schedule their
    /// follow-up on the session's timers.
    pub fn select(&self, column: Column, id: PairId) -> SelectOutcome {
        if self.shared.is_closed() {
            return SelectOutcome::Ignored;
        }
        let (outcome, epoch, page_done) = {
            let mut round = self.shared.round();
            let outcome = round.select(column, id);
            (outcome, round.epoch(), round.board().is_complete())
        };
        match outcome {
            SelectOutcome::Ignored => return outcome,
            SelectOutcome::Mismatch { .. } => {
                let delay = self.shared.timing.mismatch_flash;
                self.shared
                    .schedule(delay, move |shared| end_mismatch(shared, epoch));
            }
            SelectOutcome::Matched(_) if page_done => schedule_settle(&self.shared, epoch),
            _ => {}
        }
        self.shared.notify();
        outcome
    }

    /// Deal a fresh round from the same list. Safe from any state.
    pub fn restart(&self) {
        self.shared.cancel_timers();
        let total = {
            let mut round = self.shared.round();
            round.restart();
            round.total()
        };
        self.shared.closed.store(false, Ordering::SeqCst);
        tracing::info!(session = %self.shared.id, list = %self.shared.list.id, "matching round restarted");
        self.shared.observer.on_round_start(&self.shared.list.id, total);
        self.shared.notify();
    }

    /// Cancel pending timers and stop accepting input.
    pub fn teardown(&self) {
        self.shared.close();
    }

    pub fn view(&self) -> MatchingView {
        let round = self.shared.round();
        let board = round.board();
        MatchingView {
            list: self.shared.list.clone(),
            state: round.state(),
            page: round.current_page(),
            total_pages: round.total_pages(),
            left: board.column(Column::Left),
            right: board.column(Column::Right),
            score: round.tally().score,
            total: round.total(),
            finished: round.is_finished(),
            summary: round.summary().cloned(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.shared.round().is_finished()
    }

    /// Receiver that ticks whenever the session state changes, timers included.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }

    /// Timers scheduled but not yet fired.
    pub fn pending_timers(&self) -> usize {
        lock(&self.shared.timers).pending()
    }
}

impl Drop for MatchingSession {
    fn drop(&mut self) {
        self.shared.close();
    }
}

fn end_mismatch(shared: &Arc<Shared<MatchingRound>>, epoch: u64) {
    let page_done = {
        let mut round = shared.round();
        if round.epoch() != epoch || !round.clear_mismatch() {
            return;
        }
        round.board().is_complete()
    };
    shared.notify();
    if page_done {
        schedule_settle(shared, epoch);
    }
}

fn schedule_settle(shared: &Arc<Shared<MatchingRound>>, epoch: u64) {
    let delay = shared.timing.advance_delay;
    shared.schedule(delay, move |shared| settle_page(shared, epoch));
}

fn settle_page(shared: &Arc<Shared<MatchingRound>>, epoch: u64) {
    let outcome = {
        let mut round = shared.round();
        if round.epoch() != epoch {
            return;
        }
        round.complete_page()
    };
    let Some(outcome) = outcome else {
        return;
    };
    shared
        .observer
        .on_page_complete(outcome.page_index, outcome.matched);
    if let Some(summary) = &outcome.summary {
        tracing::info!(
            session = %shared.id,
            list = %shared.list.id,
            score = summary.score,
            total = summary.total,
            "matching round complete"
        );
        shared.observer.on_round_complete(summary);
    }
    // Subscribers wake only after the callbacks have run.
    shared.notify();
}

// ---------------------------------------------------------------------------
// Recall
// ---------------------------------------------------------------------------

/// Everything a host needs to draw the recall screen.
#[derive(Debug, Clone, Serialize)]
pub struct RecallView {
    pub list: ListInfo,
    pub prompt: Option<String>,
    pub status: AnswerStatus,
    pub attempts: u32,
    pub input: String,
    /// Shown after the second wrong answer.
    pub revealed_answer: Option<String>,
    pub index: usize,
    pub total: usize,
    pub score: u32,
    pub corrections: u32,
    pub finished: bool,
    pub summary: Option<RoundSummary>,
}

impl RecallView {
    /// The player can type an answer right now.
    pub fn accepting_input(&self) -> bool {
        !self.finished && self.status == AnswerStatus::AwaitingInput
    }

    /// The current item is over and the player can continue.
    pub fn can_continue(&self) -> bool {
        !self.finished && self.status.is_terminal()
    }
}

/// A Spelling Bee, Verb Challenge or Listen and Spell game in progress.
pub struct RecallSession {
    shared: Arc<Shared<RecallRound>>,
}

impl RecallSession {
    pub fn start(
        list: &ContentList,
        config: &QuizConfig,
        observer: Arc<dyn RoundObserver>,
    ) -> Result<Self, QuizError> {
        check_start(list, Mode::Recall)?;
        let Content::Recall(pairs) = &list.content else {
            return Err(QuizError::WrongMode {
                expected: Mode::Recall,
                found: list.content.mode(),
            });
        };
        let round = RecallRound::new(pairs.clone(), config.question_limit_for(list.game), config.rng());
        let total = round.total();
        if total == 0 {
            return Err(QuizError::NoContent(list.name.clone()));
        }
        let shared = Shared::new(list_info(list), round, config, observer);
        tracing::info!(session = %shared.id, list = %list.id, total, "recall round started");
        shared.observer.on_round_start(&list.id, total);
        Ok(Self { shared })
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Check `text` against the current item.
    pub fn submit(&self, text: &str) -> SubmitOutcome {
        if self.shared.is_closed() {
            return SubmitOutcome::Rejected;
        }
        let (outcome, epoch, index) = {
            let mut round = self.shared.round();
            let outcome = round.submit_answer(text);
            (outcome, round.epoch(), round.index())
        };
        match &outcome {
            SubmitOutcome::Rejected => return SubmitOutcome::Rejected,
            SubmitOutcome::Retry => {
                let delay = self.shared.timing.retry_flash;
                self.shared.schedule(delay, move |shared| {
                    let ended = {
                        let mut round = shared.round();
                        round.epoch() == epoch && round.end_retry_flash()
                    };
                    if ended {
                        shared.notify();
                    }
                });
            }
            SubmitOutcome::Correct { .. } | SubmitOutcome::Revealed { .. } => {
                if self.shared.timing.auto_advance {
                    let delay = self.shared.timing.advance_delay;
                    self.shared.schedule(delay, move |shared| {
                        advance_item(shared, Some((epoch, index)));
                    });
                }
            }
        }
        self.shared.notify();
        outcome
    }

    /// Continue past a solved or revealed item.
    pub fn advance(&self) -> Option<RecallAdvance> {
        if self.shared.is_closed() {
            return None;
        }
        advance_item(&self.shared, None)
    }

    /// Deal a fresh round from the same list. Safe from any state.
    pub fn restart(&self) {
        self.shared.cancel_timers();
        let total = {
            let mut round = self.shared.round();
            round.restart();
            round.total()
        };
        self.shared.closed.store(false, Ordering::SeqCst);
        tracing::info!(session = %self.shared.id, list = %self.shared.list.id, "recall round restarted");
        self.shared.observer.on_round_start(&self.shared.list.id, total);
        self.shared.notify();
    }

    /// Cancel pending timers and stop accepting input.
    pub fn teardown(&self) {
        self.shared.close();
    }

    pub fn view(&self) -> RecallView {
        let round = self.shared.round();
        let tally = round.tally();
        RecallView {
            list: self.shared.list.clone(),
            prompt: round.current().map(|p| p.prompt.clone()),
            status: round.status(),
            attempts: round.attempts(),
            input: round.input().to_string(),
            revealed_answer: round.revealed_answer().map(str::to_string),
            index: round.index(),
            total: round.total(),
            score: tally.score,
            corrections: tally.corrections,
            finished: round.is_finished(),
            summary: round.summary().cloned(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.shared.round().is_finished()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }

    pub fn pending_timers(&self) -> usize {
        lock(&self.shared.timers).pending()
    }
}

impl Drop for RecallSession {
    fn drop(&mut self) {
        self.shared.close();
    }
}

/// Advance the current item. `expected` pins an auto-advance to the epoch
/// and item it was scheduled for.
fn advance_item(
    shared: &Arc<Shared<RecallRound>>,
    expected: Option<(u64, usize)>,
) -> Option<RecallAdvance> {
    let advanced = {
        let mut round = shared.round();
        if let Some((epoch, index)) = expected {
            if round.epoch() != epoch || round.index() != index {
                return None;
            }
        }
        round.advance()
    }?;
    shared.notify();
    if let RecallAdvance::Finished(summary) = &advanced {
        tracing::info!(
            session = %shared.id,
            list = %shared.list.id,
            score = summary.score,
            corrections = summary.corrections,
            total = summary.total,
            "recall round complete"
        );
        shared.observer.on_round_complete(summary);
    }
    Some(advanced)
}
