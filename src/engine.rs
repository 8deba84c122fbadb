//! Session transitions.
//!
//! Every function here mutates only the `SessionState` it is given and
//! reports what the caller has to do about timers and the viewport through
//! its return value. Scheduling lives in the controller.

use tracing::{debug, info, warn};

use crate::constants::{INITIAL_WORDS, LOOKAHEAD_MARGIN, REFILL_BATCH};
use crate::language::WordSupply;
use crate::results::compute_wpm;
use crate::session::{Cursor, Judgment, Phase, SessionState, TestDuration, TimerState};

/// Effects of a typed character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The keystroke moved the session from idle to active; start the countdown.
    pub started: bool,
    /// `None` when the keystroke was ignored.
    pub judgment: Option<Judgment>,
    /// The cursor moved onto a new word; re-check the viewport.
    pub crossed_word: bool,
}

impl KeyOutcome {
    pub fn is_noop(&self) -> bool {
        !self.started && self.judgment.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackspaceOutcome {
    Ignored,
    Retreated(Cursor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Counting { remaining: u64 },
    Ended { wpm: u32 },
}

/// Fresh idle session with an initial word batch.
pub fn new_session(duration: TestDuration, supply: &mut dyn WordSupply) -> SessionState {
    let mut session = SessionState::new(duration, supply.generate(INITIAL_WORDS));
    ensure_lookahead(&mut session, supply);
    session
}

/// Replaces the session wholesale, keeping only the selected duration.
pub fn restart(session: &SessionState, supply: &mut dyn WordSupply) -> SessionState {
    debug!(duration = session.timer.duration.secs(), "session restarted");
    new_session(session.timer.duration, supply)
}

/// Ignored unless the session is idle. Returns whether it applied.
pub fn select_duration(session: &mut SessionState, duration: TestDuration) -> bool {
    if session.phase != Phase::Idle {
        debug!(?duration, phase = ?session.phase, "duration change ignored");
        return false;
    }
    session.timer = TimerState::new(duration);
    true
}

pub fn on_character(
    session: &mut SessionState,
    ch: char,
    supply: &mut dyn WordSupply,
) -> KeyOutcome {
    let mut outcome = KeyOutcome::default();

    match session.phase {
        Phase::Ended => return outcome,
        Phase::Idle => {
            session.phase = Phase::Active;
            outcome.started = true;
            debug!(duration = session.timer.duration.secs(), "session started");
        }
        Phase::Active => {}
    }

    let at = session.cursor;
    let Some(expected) = session.expected_char(at) else {
        warn!(?at, len = session.words.len(), "cursor outside word stream");
        return outcome;
    };

    let judgment = if ch == expected {
        session.correct_keystrokes += 1;
        Judgment::Correct
    } else {
        Judgment::Incorrect
    };
    session.judged_keystrokes += 1;
    session.judgments.set(at, judgment);
    outcome.judgment = Some(judgment);

    outcome.crossed_word = advance(session, supply);
    outcome
}

pub fn on_backspace(session: &mut SessionState) -> BackspaceOutcome {
    if !session.is_active() || session.cursor.is_origin() {
        return BackspaceOutcome::Ignored;
    }

    retreat(session);
    let at = session.cursor;
    session.judgments.clear(at);
    BackspaceOutcome::Retreated(at)
}

pub fn on_tick(session: &mut SessionState) -> TickOutcome {
    if !session.is_active() {
        return TickOutcome::Ignored;
    }

    session.timer.remaining = session.timer.remaining.saturating_sub(1);
    if session.timer.remaining > 0 {
        return TickOutcome::Counting {
            remaining: session.timer.remaining,
        };
    }

    let wpm = compute_wpm(session.correct_keystrokes, session.timer.duration);
    session.phase = Phase::Ended;
    session.wpm = Some(wpm);
    info!(
        wpm,
        correct = session.correct_keystrokes,
        duration = session.timer.duration.secs(),
        "session ended"
    );
    TickOutcome::Ended { wpm }
}

/// Returns true when the cursor moved onto the next word.
fn advance(session: &mut SessionState, supply: &mut dyn WordSupply) -> bool {
    let word_len = session
        .words
        .get(session.cursor.word_idx)
        .map(|w| w.len())
        .unwrap_or_default();

    if session.cursor.char_idx >= word_len {
        session.cursor = Cursor::new(session.cursor.word_idx + 1, 0);
        ensure_lookahead(session, supply);
        true
    } else {
        session.cursor.char_idx += 1;
        false
    }
}

fn retreat(session: &mut SessionState) {
    let cursor = &mut session.cursor;
    if cursor.char_idx > 0 {
        cursor.char_idx -= 1;
    } else if cursor.word_idx > 0 {
        cursor.word_idx -= 1;
        cursor.char_idx = session
            .words
            .get(cursor.word_idx)
            .map(|w| w.len())
            .unwrap_or_default();
    }
}

/// Tops up the stream until more than `LOOKAHEAD_MARGIN` words lie past the
/// cursor. Returns the number of words appended.
pub fn ensure_lookahead(session: &mut SessionState, supply: &mut dyn WordSupply) -> usize {
    let mut appended = 0;
    while session.words_ahead() <= LOOKAHEAD_MARGIN {
        let batch = supply.generate(REFILL_BATCH);
        if batch.is_empty() {
            warn!(ahead = session.words_ahead(), "word supply returned no words");
            break;
        }
        appended += batch.len();
        session.append_words(batch);
    }
    if appended > 0 {
        debug!(appended, total = session.words.len(), "word stream extended");
    }
    appended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::CyclingWordSupply;
    use assert_matches::assert_matches;

    fn supply() -> CyclingWordSupply {
        CyclingWordSupply::new(&["ab", "cd", "ef"])
    }

    fn type_str(session: &mut SessionState, s: &str, supply: &mut CyclingWordSupply) {
        for c in s.chars() {
            on_character(session, c, supply);
        }
    }

    #[test]
    fn test_new_session_is_idle_at_origin() {
        let session = new_session(TestDuration::Thirty, &mut supply());

        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.cursor, Cursor::ORIGIN);
        assert_eq!(session.words.len(), INITIAL_WORDS);
        assert_eq!(session.timer.remaining, 30);
    }

    #[test]
    fn test_first_character_starts_session() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        let outcome = on_character(&mut session, 'a', &mut supply);

        assert!(outcome.started);
        assert_eq!(outcome.judgment, Some(Judgment::Correct));
        assert!(session.is_active());
        assert_eq!(session.cursor, Cursor::new(0, 1));

        let outcome = on_character(&mut session, 'b', &mut supply);
        assert!(!outcome.started);
    }

    #[test]
    fn test_incorrect_character_still_advances() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        let outcome = on_character(&mut session, 'z', &mut supply);

        assert_eq!(outcome.judgment, Some(Judgment::Incorrect));
        assert_eq!(session.correct_keystrokes, 0);
        assert_eq!(session.judged_keystrokes, 1);
        assert_eq!(session.judgments.get(Cursor::ORIGIN), Judgment::Incorrect);
        assert_eq!(session.cursor, Cursor::new(0, 1));
    }

    #[test]
    fn test_space_slot_crosses_word() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        type_str(&mut session, "ab", &mut supply);
        assert_eq!(session.cursor, Cursor::new(0, 2));

        let outcome = on_character(&mut session, ' ', &mut supply);
        assert!(outcome.crossed_word);
        assert_eq!(outcome.judgment, Some(Judgment::Correct));
        assert_eq!(session.cursor, Cursor::new(1, 0));
        assert_eq!(session.correct_keystrokes, 3);
    }

    #[test]
    fn test_wrong_key_on_space_slot_still_crosses() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        type_str(&mut session, "ab", &mut supply);
        let outcome = on_character(&mut session, 'x', &mut supply);

        assert!(outcome.crossed_word);
        assert_eq!(session.judgments.get(Cursor::new(0, 2)), Judgment::Incorrect);
    }

    #[test]
    fn test_backspace_ignored_when_idle_or_at_origin() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        assert_eq!(on_backspace(&mut session), BackspaceOutcome::Ignored);

        on_character(&mut session, 'a', &mut supply);
        on_backspace(&mut session);
        assert_eq!(session.cursor, Cursor::ORIGIN);
        assert_eq!(on_backspace(&mut session), BackspaceOutcome::Ignored);
    }

    #[test]
    fn test_backspace_keeps_correct_count() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        on_character(&mut session, 'a', &mut supply);
        let outcome = on_backspace(&mut session);

        assert_eq!(outcome, BackspaceOutcome::Retreated(Cursor::ORIGIN));
        assert_eq!(session.judgments.get(Cursor::ORIGIN), Judgment::Unset);
        assert_eq!(session.correct_keystrokes, 1);
    }

    #[test]
    fn test_backspace_across_word_lands_on_space_slot() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        type_str(&mut session, "ab ", &mut supply);
        assert_eq!(session.cursor, Cursor::new(1, 0));

        on_backspace(&mut session);
        assert_eq!(session.cursor, Cursor::new(0, 2));
        assert_eq!(session.judgments.get(Cursor::new(0, 2)), Judgment::Unset);
        assert_eq!(session.judgments.get(Cursor::new(0, 1)), Judgment::Correct);
    }

    #[test]
    fn test_lookahead_refills_stream() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        for _ in 0..(INITIAL_WORDS - LOOKAHEAD_MARGIN) {
            type_str(&mut session, "xxx", &mut supply);
            assert!(session.words_ahead() > LOOKAHEAD_MARGIN);
        }
        assert_eq!(session.words.len(), INITIAL_WORDS + REFILL_BATCH);
    }

    #[test]
    fn test_tick_counts_down_and_ends_once() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Fifteen, &mut supply);
        type_str(&mut session, "ab cd ", &mut supply);

        for remaining in (1..15).rev() {
            assert_eq!(on_tick(&mut session), TickOutcome::Counting { remaining });
        }
        assert_matches!(on_tick(&mut session), TickOutcome::Ended { wpm: 4 });
        assert!(session.has_finished());
        assert_eq!(on_tick(&mut session), TickOutcome::Ignored);
    }

    #[test]
    fn test_input_after_end_is_ignored() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Fifteen, &mut supply);
        on_character(&mut session, 'a', &mut supply);
        while on_tick(&mut session) != TickOutcome::Ignored {}

        let cursor = session.cursor;
        assert!(on_character(&mut session, 'b', &mut supply).is_noop());
        assert_eq!(on_backspace(&mut session), BackspaceOutcome::Ignored);
        assert_eq!(session.cursor, cursor);
        assert_eq!(session.correct_keystrokes, 1);
    }

    #[test]
    fn test_tick_ignored_while_idle() {
        let mut session = new_session(TestDuration::Fifteen, &mut supply());
        assert_eq!(on_tick(&mut session), TickOutcome::Ignored);
        assert_eq!(session.timer.remaining, 15);
    }

    #[test]
    fn test_select_duration_only_while_idle() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        assert!(select_duration(&mut session, TestDuration::Thirty));
        assert_eq!(session.timer, TimerState::new(TestDuration::Thirty));

        on_character(&mut session, 'a', &mut supply);
        assert!(!select_duration(&mut session, TestDuration::Fifteen));
        assert_eq!(session.timer.duration, TestDuration::Thirty);
    }

    #[test]
    fn test_restart_keeps_duration_and_resets_everything_else() {
        let mut supply = supply();
        let mut session = new_session(TestDuration::Sixty, &mut supply);
        select_duration(&mut session, TestDuration::Fifteen);
        type_str(&mut session, "ab cd", &mut supply);
        on_tick(&mut session);
        session.viewport.display_start = 12;

        let fresh = restart(&session, &mut supply);

        assert_eq!(fresh.phase, Phase::Idle);
        assert_eq!(fresh.cursor, Cursor::ORIGIN);
        assert_eq!(fresh.correct_keystrokes, 0);
        assert_eq!(fresh.viewport.display_start, 0);
        assert_eq!(fresh.timer.remaining, 15);
        assert_eq!(fresh.timer.duration, TestDuration::Fifteen);
    }

    #[test]
    fn test_cursor_outside_stream_is_noop() {
        let mut supply = CyclingWordSupply::new::<&str>(&[]);
        let mut session = new_session(TestDuration::Sixty, &mut supply);

        let outcome = on_character(&mut session, 'a', &mut supply);

        assert!(outcome.started);
        assert_eq!(outcome.judgment, None);
        assert_eq!(session.cursor, Cursor::ORIGIN);
    }
}
