//! Two-column "tap to pair" state machine.
//!
//! A [`MatchingBoard`] plays one page: the player picks an item in each
//! column and the board decides whether the picks belong to the same pair.
//! A [`MatchingRound`] strings boards together over the pages of a shuffled
//! round and feeds the score tally.
//!
//! The board never sleeps. A mismatch leaves it in [`BoardState::Evaluating`]
//! until the host calls [`MatchingBoard::clear_mismatch`] after the flash
//! delay; the session layer owns that timer.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{MatchPair, PairId};
use crate::paginator::{PageAdvance, Paginator};
use crate::score::{RoundSummary, ScoreTally};
use crate::shuffle::shuffle;

/// One of the two columns on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

impl Column {
    pub fn opposite(self) -> Column {
        match self {
            Column::Left => Column::Right,
            Column::Right => Column::Left,
        }
    }
}

/// Where the board is in its select/evaluate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState {
    Idle,
    OneSelected(Column),
    /// A mismatch is being shown; all input is blocked.
    Evaluating,
    /// Every pair on the page is matched or missed.
    PageComplete,
}

/// What a single selection did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Blocked, unknown or already resolved; nothing changed.
    Ignored,
    Selected(Column),
    Deselected(Column),
    Matched(PairId),
    /// The picks differ. `missed` is the first-clicked side's id and is now
    /// resolved; `other` stays in play.
    Mismatch { missed: PairId, other: PairId },
}

/// Terminal outcome of a pair on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairOutcome {
    Matched,
    Missed,
}

/// Display state of one button in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: PairId,
    pub text: String,
    pub selected: bool,
    /// Flashing red while a mismatch is shown.
    pub incorrect: bool,
    pub outcome: Option<PairOutcome>,
    pub disabled: bool,
}

/// One page of the matching game.
#[derive(Debug, Clone)]
pub struct MatchingBoard {
    pairs: Vec<MatchPair>,
    left_order: Vec<PairId>,
    right_order: Vec<PairId>,
    selected_left: Option<PairId>,
    selected_right: Option<PairId>,
    first_pick: Option<Column>,
    matched: BTreeSet<PairId>,
    missed: BTreeSet<PairId>,
    flashing: bool,
}

impl MatchingBoard {
    /// Build a board; each column gets its own shuffled order.
    pub fn new(pairs: Vec<MatchPair>, rng: &mut StdRng) -> Self {
        let ids: Vec<PairId> = pairs.iter().map(|p| p.id).collect();
        let left_order = shuffle(&ids, rng);
        let right_order = shuffle(&ids, rng);
        Self {
            pairs,
            left_order,
            right_order,
            selected_left: None,
            selected_right: None,
            first_pick: None,
            matched: BTreeSet::new(),
            missed: BTreeSet::new(),
            flashing: false,
        }
    }

    pub fn state(&self) -> BoardState {
        if self.flashing {
            return BoardState::Evaluating;
        }
        if self.is_complete() {
            return BoardState::PageComplete;
        }
        match (self.selected_left, self.selected_right) {
            (Some(_), None) => BoardState::OneSelected(Column::Left),
            (None, Some(_)) => BoardState::OneSelected(Column::Right),
            _ => BoardState::Idle,
        }
    }

    /// Pick (or un-pick) the item `id` in `column`.
    pub fn select(&mut self, column: Column, id: PairId) -> SelectOutcome {
        if self.flashing || !self.contains(id) || self.is_resolved(id) {
            return SelectOutcome::Ignored;
        }

        if self.selected(column) == Some(id) {
            *self.slot(column) = None;
            if self.first_pick == Some(column) {
                let other = column.opposite();
                self.first_pick = self.selected(other).map(|_| other);
            }
            tracing::debug!(?column, id, "deselected");
            return SelectOutcome::Deselected(column);
        }

        // A different pick in an occupied column replaces it.
        *self.slot(column) = Some(id);
        if self.first_pick.is_none() {
            self.first_pick = Some(column);
        }

        let (Some(left), Some(right)) = (self.selected_left, self.selected_right) else {
            return SelectOutcome::Selected(column);
        };

        if left == right {
            self.matched.insert(left);
            self.clear_selection();
            tracing::debug!(id = left, "matched");
            return SelectOutcome::Matched(left);
        }

        let first = self.first_pick.unwrap_or(column.opposite());
        let (missed, other) = match first {
            Column::Left => (left, right),
            Column::Right => (right, left),
        };
        self.missed.insert(missed);
        self.flashing = true;
        tracing::debug!(missed, other, "mismatch");
        SelectOutcome::Mismatch { missed, other }
    }

    /// End the mismatch flash and clear both picks. Returns `false` if no
    /// mismatch was showing.
    pub fn clear_mismatch(&mut self) -> bool {
        if !self.flashing {
            return false;
        }
        self.flashing = false;
        self.clear_selection();
        true
    }

    pub fn selected(&self, column: Column) -> Option<PairId> {
        match column {
            Column::Left => self.selected_left,
            Column::Right => self.selected_right,
        }
    }

    pub fn is_resolved(&self, id: PairId) -> bool {
        self.matched.contains(&id) || self.missed.contains(&id)
    }

    pub fn outcome(&self, id: PairId) -> Option<PairOutcome> {
        if self.matched.contains(&id) {
            Some(PairOutcome::Matched)
        } else if self.missed.contains(&id) {
            Some(PairOutcome::Missed)
        } else {
            None
        }
    }

    /// All pairs resolved and no mismatch still showing.
    pub fn is_complete(&self) -> bool {
        !self.flashing && self.resolved_count() == self.pairs.len()
    }

    pub fn resolved_count(&self) -> usize {
        self.matched.len() + self.missed.len()
    }

    pub fn matched(&self) -> &BTreeSet<PairId> {
        &self.matched
    }

    pub fn missed(&self) -> &BTreeSet<PairId> {
        &self.missed
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Column contents in display order.
    pub fn column(&self, column: Column) -> Vec<Cell> {
        let order = match column {
            Column::Left => &self.left_order,
            Column::Right => &self.right_order,
        };
        order
            .iter()
            .filter_map(|id| self.pairs.iter().find(|p| p.id == *id))
            .map(|pair| {
                let selected = self.selected(column) == Some(pair.id);
                let outcome = self.outcome(pair.id);
                Cell {
                    id: pair.id,
                    text: match column {
                        Column::Left => pair.left.clone(),
                        Column::Right => pair.right.clone(),
                    },
                    selected,
                    incorrect: self.flashing && selected,
                    outcome,
                    disabled: outcome.is_some() || (self.flashing && !selected),
                }
            })
            .collect()
    }

    fn contains(&self, id: PairId) -> bool {
        self.pairs.iter().any(|p| p.id == id)
    }

    fn slot(&mut self, column: Column) -> &mut Option<PairId> {
        match column {
            Column::Left => &mut self.selected_left,
            Column::Right => &mut self.selected_right,
        }
    }

    fn clear_selection(&mut self) {
        self.selected_left = None;
        self.selected_right = None;
        self.first_pick = None;
    }
}

/// Result of closing a completed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub page_index: usize,
    /// Pairs matched on the page; this is what the page callback receives.
    pub matched: u32,
    /// Set when this was the last page.
    pub summary: Option<RoundSummary>,
}

/// A full matching round: shuffled content, pages, and the running score.
#[derive(Debug, Clone)]
pub struct MatchingRound {
    source: Vec<MatchPair>,
    question_limit: Option<usize>,
    rng: StdRng,
    paginator: Paginator<MatchPair>,
    board: MatchingBoard,
    tally: ScoreTally,
    finished: bool,
    summary: Option<RoundSummary>,
    epoch: u64,
}

impl MatchingRound {
    pub fn new(
        source: Vec<MatchPair>,
        page_size: usize,
        question_limit: Option<usize>,
        mut rng: StdRng,
    ) -> Result<Self, QuizError> {
        let mut paginator = Paginator::new(Vec::new(), page_size)?;
        let board = deal(&source, question_limit, &mut rng, &mut paginator);
        Ok(Self {
            source,
            question_limit,
            rng,
            paginator,
            board,
            tally: ScoreTally::default(),
            finished: false,
            summary: None,
            epoch: 0,
        })
    }

    /// Forward a selection to the current board.
    pub fn select(&mut self, column: Column, id: PairId) -> SelectOutcome {
        if self.finished {
            return SelectOutcome::Ignored;
        }
        self.board.select(column, id)
    }

    pub fn clear_mismatch(&mut self) -> bool {
        self.board.clear_mismatch()
    }

    /// Score the finished page and move on. `None` unless the current board
    /// is complete, so each page is reported once.
    pub fn complete_page(&mut self) -> Option<PageOutcome> {
        if self.finished || !self.board.is_complete() {
            return None;
        }
        let page_index = self.paginator.current_page();
        let matched = self.board.matched().len() as u32;
        self.tally.add_matches(matched);

        let summary = match self.paginator.advance() {
            PageAdvance::Next(_) => {
                let page = self.paginator.current_items().to_vec();
                self.board = MatchingBoard::new(page, &mut self.rng);
                None
            }
            PageAdvance::Finished => {
                self.finished = true;
                self.summary = Some(self.tally.summary(self.total()));
                self.summary.clone()
            }
        };
        tracing::debug!(page_index, matched, finished = self.finished, "page complete");
        Some(PageOutcome {
            page_index,
            matched,
            summary,
        })
    }

    /// Re-deal the round from the original content with fresh counters.
    pub fn restart(&mut self) {
        self.board = deal(
            &self.source,
            self.question_limit,
            &mut self.rng,
            &mut self.paginator,
        );
        self.tally.reset();
        self.finished = false;
        self.summary = None;
        self.epoch += 1;
    }

    pub fn board(&self) -> &MatchingBoard {
        &self.board
    }

    pub fn state(&self) -> BoardState {
        self.board.state()
    }

    pub fn current_page(&self) -> usize {
        self.paginator.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages()
    }

    /// Number of pairs in the round.
    pub fn total(&self) -> usize {
        self.paginator.len()
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

    /// Bumped on every restart.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Ids dealt into this round, in round order.
    pub fn round_ids(&self) -> Vec<PairId> {
        self.paginator.items().iter().map(|p| p.id).collect()
    }
}

/// Shuffle a fresh round into `paginator` and build the board for its first
/// page.
fn deal(
    source: &[MatchPair],
    question_limit: Option<usize>,
    rng: &mut StdRng,
    paginator: &mut Paginator<MatchPair>,
) -> MatchingBoard {
    let mut round = shuffle(source, rng);
    if let Some(limit) = question_limit {
        round.truncate(limit);
    }
    paginator.reload(round);
    MatchingBoard::new(paginator.current_items().to_vec(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn pairs(n: u32) -> Vec<MatchPair> {
        (1..=n)
            .map(|id| MatchPair {
                id,
                left: format!("L{id}"),
                right: format!("R{id}"),
            })
            .collect()
    }

    fn board(n: u32) -> MatchingBoard {
        MatchingBoard::new(pairs(n), &mut StdRng::seed_from_u64(5))
    }

    fn round(n: u32, page_size: usize) -> MatchingRound {
        MatchingRound::new(pairs(n), page_size, None, StdRng::seed_from_u64(11)).unwrap()
    }

    /// Match every pair left on the current page.
    fn solve_page(round: &mut MatchingRound) {
        let ids: Vec<PairId> = round.board().column(Column::Left).iter().map(|c| c.id).collect();
        for id in ids {
            if !round.board().is_resolved(id) {
                round.select(Column::Left, id);
                assert_eq!(round.select(Column::Right, id), SelectOutcome::Matched(id));
            }
        }
    }

    #[test]
    fn select_then_match() {
        let mut b = board(3);
        assert_eq!(b.state(), BoardState::Idle);
        assert_eq!(b.select(Column::Left, 2), SelectOutcome::Selected(Column::Left));
        assert_eq!(b.state(), BoardState::OneSelected(Column::Left));
        assert_eq!(b.select(Column::Right, 2), SelectOutcome::Matched(2));
        assert_eq!(b.state(), BoardState::Idle);
        assert!(b.matched().contains(&2));
        assert_eq!(b.selected(Column::Left), None);
        assert_eq!(b.selected(Column::Right), None);
    }

    #[test]
    fn reselect_deselects() {
        let mut b = board(3);
        b.select(Column::Right, 1);
        assert_eq!(b.select(Column::Right, 1), SelectOutcome::Deselected(Column::Right));
        assert_eq!(b.state(), BoardState::Idle);
    }

    #[test]
    fn different_pick_in_same_column_replaces() {
        let mut b = board(3);
        b.select(Column::Left, 1);
        assert_eq!(b.select(Column::Left, 3), SelectOutcome::Selected(Column::Left));
        assert_eq!(b.selected(Column::Left), Some(3));
        assert_eq!(b.select(Column::Right, 3), SelectOutcome::Matched(3));
    }

    #[test]
    fn mismatch_records_first_clicked_side() {
        // Left A clicked first, then right B.
        let mut b = board(3);
        b.select(Column::Left, 1);
        assert_eq!(
            b.select(Column::Right, 2),
            SelectOutcome::Mismatch { missed: 1, other: 2 }
        );
        assert!(b.missed().contains(&1));
        assert!(!b.missed().contains(&2));
        assert_eq!(b.state(), BoardState::Evaluating);

        // Right first this time.
        let mut b = board(3);
        b.select(Column::Right, 2);
        assert_eq!(
            b.select(Column::Left, 1),
            SelectOutcome::Mismatch { missed: 2, other: 1 }
        );
    }

    #[test]
    fn first_pick_passes_over_after_deselect() {
        let mut b = board(3);
        b.select(Column::Left, 1);
        b.select(Column::Left, 1);
        b.select(Column::Right, 2);
        assert_eq!(
            b.select(Column::Left, 3),
            SelectOutcome::Mismatch { missed: 2, other: 3 }
        );
    }

    #[test]
    fn input_blocked_while_evaluating() {
        let mut b = board(3);
        b.select(Column::Left, 1);
        b.select(Column::Right, 2);
        assert_eq!(b.select(Column::Left, 3), SelectOutcome::Ignored);
        assert_eq!(b.select(Column::Right, 3), SelectOutcome::Ignored);
        let left = b.column(Column::Left);
        assert!(left.iter().find(|c| c.id == 1).unwrap().incorrect);
        assert!(left.iter().find(|c| c.id == 3).unwrap().disabled);

        assert!(b.clear_mismatch());
        assert!(!b.clear_mismatch());
        assert_eq!(b.state(), BoardState::Idle);
        assert_eq!(b.selected(Column::Left), None);
        assert_eq!(b.selected(Column::Right), None);
    }

    #[test]
    fn second_clicked_item_can_still_match() {
        let mut b = board(2);
        b.select(Column::Left, 1);
        b.select(Column::Right, 2);
        b.clear_mismatch();
        b.select(Column::Left, 2);
        assert_eq!(b.select(Column::Right, 2), SelectOutcome::Matched(2));
        assert!(b.is_complete());
        assert_eq!(b.state(), BoardState::PageComplete);
    }

    #[test]
    fn resolved_items_are_ignored() {
        let mut b = board(3);
        b.select(Column::Left, 1);
        b.select(Column::Right, 1);
        assert_eq!(b.select(Column::Left, 1), SelectOutcome::Ignored);
        assert_eq!(b.select(Column::Right, 1), SelectOutcome::Ignored);

        b.select(Column::Left, 2);
        b.select(Column::Right, 3);
        b.clear_mismatch();
        assert_eq!(b.select(Column::Right, 2), SelectOutcome::Ignored);
        assert_eq!(b.select(Column::Left, 99), SelectOutcome::Ignored);
    }

    #[test]
    fn resolved_never_exceeds_page_and_fills_it_at_completion() {
        let mut b = board(4);
        let script = [
            (Column::Left, 1),
            (Column::Right, 2),
            (Column::Right, 3),
            (Column::Left, 4),
            (Column::Left, 2),
            (Column::Right, 2),
            (Column::Left, 4),
            (Column::Right, 4),
        ];
        for (column, id) in script {
            if b.select(column, id) == SelectOutcome::Ignored {
                b.clear_mismatch();
                b.select(column, id);
            }
            assert!(b.resolved_count() <= b.len());
        }
        b.clear_mismatch();
        assert!(b.is_complete());
        assert_eq!(b.resolved_count(), b.len());
        assert_eq!(b.matched().len() + b.missed().len(), 4);
        assert!(b.matched().is_disjoint(b.missed()));
    }

    #[test]
    fn columns_hold_every_pair() {
        let b = board(5);
        let mut left: Vec<PairId> = b.column(Column::Left).iter().map(|c| c.id).collect();
        let mut right: Vec<PairId> = b.column(Column::Right).iter().map(|c| c.id).collect();
        left.sort_unstable();
        right.sort_unstable();
        assert_eq!(left, vec![1, 2, 3, 4, 5]);
        assert_eq!(right, left);
        assert!(b.column(Column::Right).iter().all(|c| c.text.starts_with('R')));
    }

    #[test]
    fn single_page_all_correct() {
        let mut r = round(5, 5);
        assert_eq!(r.total_pages(), 1);
        solve_page(&mut r);
        let outcome = r.complete_page().unwrap();
        assert_eq!(outcome.matched, 5);
        let summary = outcome.summary.unwrap();
        assert_eq!(summary.score, 5);
        assert_eq!(summary.total, 5);
        assert!(r.board().missed().is_empty());
        assert!(r.is_finished());
        assert!(r.complete_page().is_none());
    }

    #[test]
    fn page_score_plus_missed_equals_page_length() {
        let mut r = round(3, 5);
        let ids = r.round_ids();
        r.select(Column::Left, ids[0]);
        r.select(Column::Right, ids[1]);
        r.clear_mismatch();
        solve_page(&mut r);
        let missed = r.board().missed().len() as u32;
        let outcome = r.complete_page().unwrap();
        assert_eq!(outcome.matched + missed, 3);
        assert_eq!(outcome.summary.unwrap().score, 2);
    }

    #[test]
    fn pages_advance_then_finish() {
        let mut r = round(12, 5);
        assert_eq!(r.total_pages(), 3);
        assert!(r.complete_page().is_none());

        solve_page(&mut r);
        let first = r.complete_page().unwrap();
        assert_eq!((first.page_index, first.matched), (0, 5));
        assert!(first.summary.is_none());
        assert_eq!(r.current_page(), 1);

        solve_page(&mut r);
        r.complete_page().unwrap();
        assert_eq!(r.board().len(), 2);

        solve_page(&mut r);
        let last = r.complete_page().unwrap();
        assert_eq!(last.page_index, 2);
        assert_eq!(last.summary.unwrap().score, 12);
        assert_eq!(r.select(Column::Left, 1), SelectOutcome::Ignored);
    }

    #[test]
    fn question_limit_caps_round() {
        let r = MatchingRound::new(pairs(30), 5, Some(20), StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(r.total(), 20);
        assert_eq!(r.total_pages(), 4);
    }

    #[test]
    fn restart_resets_everything() {
        let mut r = round(5, 5);
        solve_page(&mut r);
        r.complete_page();
        assert!(r.is_finished());

        r.restart();
        assert!(!r.is_finished());
        assert_eq!(r.tally(), ScoreTally::default());
        assert_eq!(r.current_page(), 0);
        assert_eq!(r.board().resolved_count(), 0);
        assert_eq!(r.epoch(), 1);
        r.restart();
        assert_eq!(r.epoch(), 2);
        assert_eq!(r.total(), 5);
    }

    #[test]
    fn restart_mid_round_redeals_from_first_page() {
        let mut r = round(7, 3);
        solve_page(&mut r);
        r.complete_page();
        assert_eq!(r.current_page(), 1);
        assert_eq!(r.tally().score, 3);

        r.restart();
        assert_eq!(r.current_page(), 0);
        assert_eq!(r.total_pages(), 3);
        assert_eq!(r.board().len(), 3);
        assert_eq!(r.tally().score, 0);
        let mut ids = r.round_ids();
        ids.sort_unstable();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = MatchingRound::new(pairs(2), 0, None, StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, QuizError::InvalidPageSize(0));
    }
}
