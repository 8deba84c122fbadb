//! Two-line viewport paging.
//!
//! Deciding whether to page is a pure function of the rendered layout and
//! the cursor. Applying the page goes through the session's single pending
//! slot and a scheduled commit after the settle delay.

use tracing::{debug, warn};

use crate::constants::{LINE_TOLERANCE, SETTLE_DELAY_MS};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::session::{PendingTransition, SessionState};

/// Vertical position of a rendered word, as reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordPlacement {
    pub word_idx: usize,
    pub top: f32,
}

impl WordPlacement {
    pub fn new(word_idx: usize, top: f32) -> Self {
        Self { word_idx, top }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NotNeeded,
    /// A transition is already in flight; this request was dropped.
    AlreadyPending { target: usize },
    Scheduled { target: usize },
}

/// Index of the first word whose top lies more than `tolerance` below the
/// first rendered word.
pub fn second_line_start(layout: &[WordPlacement], tolerance: f32) -> Option<usize> {
    let first_top = layout.first()?.top;
    layout
        .iter()
        .skip(1)
        .find(|p| p.top > first_top + tolerance)
        .map(|p| p.word_idx)
}

/// New window start if the cursor's word has reached the second line.
pub fn next_page_start(
    display_start: usize,
    cursor_word: usize,
    layout: &[WordPlacement],
    tolerance: f32,
) -> Option<usize> {
    let second = second_line_start(layout, tolerance)?;
    (cursor_word >= second && second > display_start).then_some(second)
}

#[derive(Debug, Clone, Copy)]
pub struct ViewportPager {
    tolerance: f32,
    settle_delay_ms: u64,
}

impl Default for ViewportPager {
    fn default() -> Self {
        Self::new(LINE_TOLERANCE, SETTLE_DELAY_MS)
    }
}

impl ViewportPager {
    pub fn new(tolerance: f32, settle_delay_ms: u64) -> Self {
        Self {
            tolerance,
            settle_delay_ms,
        }
    }

    pub fn check_advance(
        &self,
        session: &mut SessionState,
        layout: &[WordPlacement],
        scheduler: &mut Scheduler,
        now_ms: u64,
    ) -> AdvanceOutcome {
        if let Some(pending) = session.viewport.pending {
            return AdvanceOutcome::AlreadyPending {
                target: pending.target,
            };
        }
        if !session.is_active() {
            return AdvanceOutcome::NotNeeded;
        }

        let Some(target) = next_page_start(
            session.viewport.display_start,
            session.cursor.word_idx,
            layout,
            self.tolerance,
        ) else {
            return AdvanceOutcome::NotNeeded;
        };

        let handle = scheduler.schedule_once(now_ms, self.settle_delay_ms, Task::CommitPage);
        session.viewport.pending = Some(PendingTransition { target, handle });
        debug!(
            from = session.viewport.display_start,
            target, "page transition scheduled"
        );
        AdvanceOutcome::Scheduled { target }
    }

    /// Applies the pending transition owned by `handle`.
    pub fn commit(&self, session: &mut SessionState, handle: TaskHandle) -> Option<usize> {
        match session.viewport.pending {
            Some(pending) if pending.handle == handle => {
                session.viewport.pending = None;
                session.viewport.display_start = pending.target;
                session.viewport.lines_scrolled += 1;
                debug!(
                    display_start = pending.target,
                    lines = session.viewport.lines_scrolled,
                    "page committed"
                );
                Some(pending.target)
            }
            _ => {
                warn!(?handle, "commit for a transition that is not pending");
                None
            }
        }
    }

    /// Drops the pending transition, if any, and its scheduled commit.
    pub fn cancel_pending(session: &mut SessionState, scheduler: &mut Scheduler) {
        if let Some(pending) = session.viewport.pending.take() {
            scheduler.cancel(pending.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Cursor, Phase, TestDuration, Word};

    fn two_lines(first: std::ops::Range<usize>, second: std::ops::Range<usize>) -> Vec<WordPlacement> {
        first
            .map(|i| WordPlacement::new(i, 0.0))
            .chain(second.map(|i| WordPlacement::new(i, 36.0)))
            .collect()
    }

    fn active_session(cursor_word: usize) -> SessionState {
        let mut session = SessionState::new(TestDuration::Sixty, vec![Word::from("ab"); 60]);
        session.phase = Phase::Active;
        session.cursor = Cursor::new(cursor_word, 0);
        session
    }

    #[test]
    fn test_second_line_uses_tolerance() {
        let layout = vec![
            WordPlacement::new(0, 100.0),
            WordPlacement::new(1, 104.0),
            WordPlacement::new(2, 110.0),
            WordPlacement::new(3, 110.5),
        ];
        assert_eq!(second_line_start(&layout, 10.0), Some(3));
        assert_eq!(second_line_start(&[], 10.0), None);
    }

    #[test]
    fn test_no_page_while_cursor_on_first_line() {
        let layout = two_lines(0..8, 8..16);
        assert_eq!(next_page_start(0, 7, &layout, 10.0), None);
        assert_eq!(next_page_start(0, 8, &layout, 10.0), Some(8));
    }

    #[test]
    fn test_no_page_when_everything_fits_one_line() {
        let layout = two_lines(0..8, 0..0);
        assert_eq!(next_page_start(0, 20, &layout, 10.0), None);
    }

    #[test]
    fn test_no_page_when_second_line_not_ahead_of_window() {
        let layout = two_lines(0..8, 8..16);
        assert_eq!(next_page_start(8, 9, &layout, 10.0), None);
    }

    #[test]
    fn test_check_advance_opens_single_pending_transition() {
        let pager = ViewportPager::default();
        let mut scheduler = Scheduler::new();
        let mut session = active_session(8);

        let first = pager.check_advance(&mut session, &two_lines(0..8, 8..16), &mut scheduler, 0);
        session.cursor = Cursor::new(9, 0);
        let second =
            pager.check_advance(&mut session, &two_lines(0..9, 9..16), &mut scheduler, 50);

        assert_eq!(first, AdvanceOutcome::Scheduled { target: 8 });
        assert_eq!(second, AdvanceOutcome::AlreadyPending { target: 8 });
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(session.viewport.display_start, 0);
    }

    #[test]
    fn test_commit_after_settle_delay() {
        let pager = ViewportPager::new(LINE_TOLERANCE, 150);
        let mut scheduler = Scheduler::new();
        let mut session = active_session(8);

        pager.check_advance(&mut session, &two_lines(0..8, 8..16), &mut scheduler, 1_000);
        assert_eq!(scheduler.pop_due(1_149), None);
        let (handle, task) = scheduler.pop_due(1_150).unwrap();
        assert_eq!(task, Task::CommitPage);

        assert_eq!(pager.commit(&mut session, handle), Some(8));
        assert_eq!(session.viewport.display_start, 8);
        assert_eq!(session.viewport.lines_scrolled, 1);
        assert!(session.viewport.pending.is_none());
    }

    #[test]
    fn test_stale_commit_is_ignored() {
        let pager = ViewportPager::default();
        let mut scheduler = Scheduler::new();
        let mut session = active_session(8);

        pager.check_advance(&mut session, &two_lines(0..8, 8..16), &mut scheduler, 0);
        let stale = session.viewport.pending.unwrap().handle;
        ViewportPager::cancel_pending(&mut session, &mut scheduler);

        assert_eq!(pager.commit(&mut session, stale), None);
        assert_eq!(session.viewport.display_start, 0);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_empty_layout_or_idle_session_does_nothing() {
        let pager = ViewportPager::default();
        let mut scheduler = Scheduler::new();
        let mut session = active_session(8);

        assert_eq!(
            pager.check_advance(&mut session, &[], &mut scheduler, 0),
            AdvanceOutcome::NotNeeded
        );

        session.phase = Phase::Idle;
        assert_eq!(
            pager.check_advance(&mut session, &two_lines(0..8, 8..16), &mut scheduler, 0),
            AdvanceOutcome::NotNeeded
        );
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_cancel_pending_is_idempotent() {
        let mut scheduler = Scheduler::new();
        let mut session = active_session(0);

        ViewportPager::cancel_pending(&mut session, &mut scheduler);
        ViewportPager::cancel_pending(&mut session, &mut scheduler);
        assert!(session.viewport.pending.is_none());
    }
}
