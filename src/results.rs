use crate::constants::CHARS_PER_WORD;
use crate::session::{SessionState, TestDuration};

/// Words per minute from correct keystrokes.
///
/// The raw word count is rounded first and then scaled to a minute; scaling
/// an unrounded count gives different numbers for 15s and 30s tests.
pub fn compute_wpm(correct_keystrokes: u32, duration: TestDuration) -> u32 {
    let raw_words = (correct_keystrokes + CHARS_PER_WORD / 2) / CHARS_PER_WORD;
    raw_words * duration.per_minute_factor()
}

pub fn accuracy(correct: u32, judged: u32) -> f64 {
    if judged == 0 {
        return 0.0;
    }
    ((correct as f64 / judged as f64) * 100.0).round()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestSummary {
    pub wpm: u32,
    pub accuracy: f64,
    pub correct_keystrokes: u32,
    pub duration: TestDuration,
}

impl TestSummary {
    pub fn from_session(session: &SessionState) -> Self {
        Self {
            wpm: compute_wpm(session.correct_keystrokes, session.timer.duration),
            accuracy: accuracy(session.correct_keystrokes, session.judged_keystrokes),
            correct_keystrokes: session.correct_keystrokes,
            duration: session.timer.duration,
        }
    }
}
