use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::constants::PAGE_SIZE;
use crate::error::TypetestError;
use crate::scheduler::TaskHandle;

/// A single dictionary word. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word(String);

impl Word {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.0.chars().nth(idx)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Word {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Append-only sequence of words.
#[derive(Debug, Clone, Default)]
pub struct WordStream {
    words: Vec<Word>,
}

impl WordStream {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Word> {
        self.words.get(idx)
    }

    pub fn append(&mut self, batch: Vec<Word>) {
        self.words.extend(batch);
    }

    pub fn slice(&self, range: Range<usize>) -> &[Word] {
        let end = range.end.min(self.words.len());
        let start = range.start.min(end);
        &self.words[start..end]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }
}

/// Position of the next expected keystroke.
///
/// `char_idx == word.len()` is the trailing space slot of the word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub word_idx: usize,
    pub char_idx: usize,
}

impl Cursor {
    pub const ORIGIN: Cursor = Cursor {
        word_idx: 0,
        char_idx: 0,
    };

    pub fn new(word_idx: usize, char_idx: usize) -> Self {
        Self { word_idx, char_idx }
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Judgment {
    #[default]
    Unset,
    Correct,
    Incorrect,
}

/// Per-character judgments, one slot per character plus one for the
/// trailing space of every word in the stream.
#[derive(Debug, Clone, Default)]
pub struct JudgmentMap {
    slots: Vec<Vec<Judgment>>,
}

impl JudgmentMap {
    pub fn for_words<'a>(words: impl IntoIterator<Item = &'a Word>) -> Self {
        let mut map = Self::default();
        map.extend_for(words);
        map
    }

    pub fn extend_for<'a>(&mut self, words: impl IntoIterator<Item = &'a Word>) {
        self.slots
            .extend(words.into_iter().map(|w| vec![Judgment::Unset; w.len() + 1]));
    }

    pub fn get(&self, at: Cursor) -> Judgment {
        self.slots
            .get(at.word_idx)
            .and_then(|w| w.get(at.char_idx))
            .copied()
            .unwrap_or_default()
    }

    /// Returns false when `at` is outside the stream.
    pub fn set(&mut self, at: Cursor, judgment: Judgment) -> bool {
        match self
            .slots
            .get_mut(at.word_idx)
            .and_then(|w| w.get_mut(at.char_idx))
        {
            Some(slot) => {
                *slot = judgment;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, at: Cursor) -> bool {
        self.set(at, Judgment::Unset)
    }

    pub fn word(&self, word_idx: usize) -> &[Judgment] {
        self.slots.get(word_idx).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A page advance waiting for its settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    pub target: usize,
    pub handle: TaskHandle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewportWindow {
    pub display_start: usize,
    pub lines_scrolled: u32,
    pub pending: Option<PendingTransition>,
}

impl ViewportWindow {
    pub fn visible_range(&self, stream_len: usize) -> Range<usize> {
        let start = self.display_start.min(stream_len);
        start..(start + PAGE_SIZE).min(stream_len)
    }

    pub fn is_shifting(&self) -> bool {
        self.pending.is_some()
    }
}

/// Selectable test lengths. Every variant divides 60 so the WPM
/// normalisation factor stays integral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(try_from = "u64", into = "u64")]
pub enum TestDuration {
    #[strum(to_string = "15")]
    Fifteen,
    #[strum(to_string = "30")]
    Thirty,
    #[default]
    #[strum(to_string = "60")]
    Sixty,
}

impl TestDuration {
    pub const ALL: [TestDuration; 3] = [Self::Fifteen, Self::Thirty, Self::Sixty];

    pub fn secs(self) -> u64 {
        match self {
            Self::Fifteen => 15,
            Self::Thirty => 30,
            Self::Sixty => 60,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Fifteen => Self::Thirty,
            Self::Thirty => Self::Sixty,
            Self::Sixty => Self::Fifteen,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Fifteen => Self::Sixty,
            Self::Thirty => Self::Fifteen,
            Self::Sixty => Self::Thirty,
        }
    }

    /// Multiplier that brings a count over this duration to a per-minute rate.
    pub fn per_minute_factor(self) -> u32 {
        (60 / self.secs()) as u32
    }
}

impl TryFrom<u64> for TestDuration {
    type Error = TypetestError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.secs() == secs)
            .ok_or(TypetestError::UnsupportedDuration(secs))
    }
}

impl From<TestDuration> for u64 {
    fn from(d: TestDuration) -> Self {
        d.secs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub duration: TestDuration,
    pub remaining: u64,
}

impl TimerState {
    pub fn new(duration: TestDuration) -> Self {
        Self {
            duration,
            remaining: duration.secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Ended,
}

/// The single live typing session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub words: WordStream,
    pub judgments: JudgmentMap,
    pub cursor: Cursor,
    pub viewport: ViewportWindow,
    pub timer: TimerState,
    pub phase: Phase,
    pub correct_keystrokes: u32,
    pub judged_keystrokes: u32,
    pub wpm: Option<u32>,
}

impl SessionState {
    pub fn new(duration: TestDuration, words: Vec<Word>) -> Self {
        let words = WordStream::new(words);
        let judgments = JudgmentMap::for_words(words.iter());
        Self {
            words,
            judgments,
            cursor: Cursor::ORIGIN,
            viewport: ViewportWindow::default(),
            timer: TimerState::new(duration),
            phase: Phase::Idle,
            correct_keystrokes: 0,
            judged_keystrokes: 0,
            wpm: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Character expected at `at`; the trailing slot of a word expects a space.
    pub fn expected_char(&self, at: Cursor) -> Option<char> {
        let word = self.words.get(at.word_idx)?;
        match at.char_idx.cmp(&word.len()) {
            std::cmp::Ordering::Less => word.char_at(at.char_idx),
            std::cmp::Ordering::Equal => Some(' '),
            std::cmp::Ordering::Greater => None,
        }
    }

    pub fn append_words(&mut self, batch: Vec<Word>) {
        self.judgments.extend_for(batch.iter());
        self.words.append(batch);
    }

    pub fn words_ahead(&self) -> usize {
        self.words.len().saturating_sub(self.cursor.word_idx)
    }

    pub fn visible_range(&self) -> Range<usize> {
        self.viewport.visible_range(self.words.len())
    }
}
