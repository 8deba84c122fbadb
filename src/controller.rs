use tracing::{debug, trace};

use crate::constants::{
    CARET_BLINK_MS, LINE_TOLERANCE, RESULT_FADE_MS, SETTLE_DELAY_MS, TICK_INTERVAL_MS,
};
use crate::engine::{self, TickOutcome};
use crate::language::WordSupply;
use crate::pager::{ViewportPager, WordPlacement};
use crate::results::TestSummary;
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::session::{Cursor, JudgmentMap, Phase, SessionState, TestDuration, Word};
use crate::throttle::InputThrottle;

/// Everything the renderer needs to draw the current window.
#[derive(Debug, Clone, Copy)]
pub struct WindowView<'a> {
    pub words: &'a [Word],
    /// Stream index of `words[0]`.
    pub first_word_idx: usize,
    pub judgments: &'a JudgmentMap,
    pub cursor: Cursor,
    pub phase: Phase,
    pub duration: TestDuration,
    pub time_remaining: u64,
    /// A page transition is in flight; draw the window one line up.
    pub shifted: bool,
    /// Newly revealed content is fading in: the incoming bottom line while a
    /// page transition settles, or the results right after the countdown ends.
    pub fading: bool,
    pub caret_visible: bool,
}

impl WindowView<'_> {
    pub fn current_word_idx(&self) -> usize {
        self.cursor.word_idx
    }
}

/// Output side of the typing test.
pub trait Renderer {
    fn render_window(&mut self, view: &WindowView<'_>);
    /// Called once per session, when the countdown reaches zero.
    fn report_result(&mut self, summary: &TestSummary);
    /// Vertical placement of the words from the last rendered window.
    fn line_layout(&self) -> Vec<WordPlacement>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestSettings {
    pub duration: TestDuration,
    pub throttle_ms: u64,
    pub settle_delay_ms: u64,
    pub line_tolerance: f32,
    pub caret_blink: bool,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            duration: TestDuration::default(),
            throttle_ms: 0,
            settle_delay_ms: SETTLE_DELAY_MS,
            line_tolerance: LINE_TOLERANCE,
            caret_blink: true,
        }
    }
}

/// Owns the live session and turns inbound events into state changes,
/// scheduled callbacks and renderer calls.
pub struct TypingTest<S: WordSupply, R: Renderer> {
    session: SessionState,
    scheduler: Scheduler,
    pager: ViewportPager,
    throttle: InputThrottle,
    timer: Option<TaskHandle>,
    result_fade: Option<TaskHandle>,
    caret_blink: bool,
    caret_phase: bool,
    supply: S,
    renderer: R,
}

impl<S: WordSupply, R: Renderer> TypingTest<S, R> {
    pub fn new(mut supply: S, renderer: R, settings: TestSettings) -> Self {
        let session = engine::new_session(settings.duration, &mut supply);
        let mut test = Self {
            session,
            scheduler: Scheduler::new(),
            pager: ViewportPager::new(settings.line_tolerance, settings.settle_delay_ms),
            throttle: InputThrottle::new(settings.throttle_ms),
            timer: None,
            result_fade: None,
            caret_blink: settings.caret_blink,
            caret_phase: true,
            supply,
            renderer,
        };
        test.render();
        test
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer
            .is_some_and(|handle| self.scheduler.is_scheduled(handle))
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn character_typed(&mut self, ch: char, now_ms: u64) {
        if !self.throttle.admit(now_ms) {
            trace!(?ch, now_ms, "keystroke dropped by throttle");
            return;
        }

        let outcome = engine::on_character(&mut self.session, ch, &mut self.supply);
        if outcome.started {
            self.cancel_timer();
            self.timer = Some(self.scheduler.schedule_repeating(
                now_ms,
                TICK_INTERVAL_MS,
                Task::CountdownTick,
            ));
        }
        if outcome.crossed_word {
            let layout = self.renderer.line_layout();
            self.pager
                .check_advance(&mut self.session, &layout, &mut self.scheduler, now_ms);
        }
        if !outcome.is_noop() {
            self.render();
        }
    }

    pub fn backspace_pressed(&mut self, now_ms: u64) {
        if !self.throttle.admit(now_ms) {
            trace!(now_ms, "backspace dropped by throttle");
            return;
        }
        if let engine::BackspaceOutcome::Retreated(_) = engine::on_backspace(&mut self.session) {
            self.render();
        }
    }

    pub fn duration_selected(&mut self, duration: TestDuration) {
        if engine::select_duration(&mut self.session, duration) {
            self.render();
        }
    }

    pub fn restart_requested(&mut self) {
        self.cancel_timer();
        self.cancel_result_fade();
        ViewportPager::cancel_pending(&mut self.session, &mut self.scheduler);
        self.throttle.reset();
        self.session = engine::restart(&self.session, &mut self.supply);
        self.caret_phase = true;
        self.render();
    }

    /// One countdown step. Normally driven by the scheduler.
    pub fn tick(&mut self, now_ms: u64) {
        match engine::on_tick(&mut self.session) {
            TickOutcome::Ignored => {}
            TickOutcome::Counting { .. } => self.render(),
            TickOutcome::Ended { .. } => {
                self.cancel_timer();
                ViewportPager::cancel_pending(&mut self.session, &mut self.scheduler);
                self.result_fade =
                    Some(self.scheduler.schedule_once(now_ms, RESULT_FADE_MS, Task::FadeComplete));
                self.render();
                let summary = TestSummary::from_session(&self.session);
                self.renderer.report_result(&summary);
            }
        }
    }

    /// Runs every callback due at `now_ms`, then refreshes the caret.
    pub fn advance_clock(&mut self, now_ms: u64) {
        while let Some((handle, task)) = self.scheduler.pop_due(now_ms) {
            match task {
                Task::CountdownTick => self.tick(now_ms),
                Task::CommitPage => {
                    if self.pager.commit(&mut self.session, handle).is_some() {
                        self.render();
                    }
                }
                Task::FadeComplete => {
                    if self.result_fade == Some(handle) {
                        self.result_fade = None;
                        self.render();
                    }
                }
            }
        }

        let phase = self.caret_visible_at(now_ms);
        if phase != self.caret_phase {
            self.caret_phase = phase;
            self.render();
        }
    }

    fn caret_visible_at(&self, now_ms: u64) -> bool {
        if !self.caret_blink || self.session.phase != Phase::Idle {
            return true;
        }
        (now_ms / CARET_BLINK_MS) % 2 == 0
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            if self.scheduler.cancel(handle) {
                debug!("countdown cancelled");
            }
        }
    }

    fn cancel_result_fade(&mut self) {
        if let Some(handle) = self.result_fade.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn render(&mut self) {
        let session = &self.session;
        let range = session.visible_range();
        let view = WindowView {
            words: session.words.slice(range.clone()),
            first_word_idx: range.start,
            judgments: &session.judgments,
            cursor: session.cursor,
            phase: session.phase,
            duration: session.timer.duration,
            time_remaining: session.timer.remaining,
            shifted: session.viewport.is_shifting(),
            fading: session.viewport.is_shifting() || self.result_fade.is_some(),
            caret_visible: self.caret_phase || session.phase != Phase::Idle,
        };
        self.renderer.render_window(&view);
    }
}
