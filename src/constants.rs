/// Words generated when a session is created.
pub const INITIAL_WORDS: usize = 200;

/// Words appended each time the stream runs low.
pub const REFILL_BATCH: usize = 50;

/// Minimum number of words kept ahead of the cursor.
pub const LOOKAHEAD_MARGIN: usize = 20;

/// Number of words handed to the renderer per window.
pub const PAGE_SIZE: usize = 50;

/// Delay between opening a page transition and committing it.
pub const SETTLE_DELAY_MS: u64 = 150;

/// How long the results stay dimmed after the countdown ends.
pub const RESULT_FADE_MS: u64 = 300;

/// Countdown period.
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// Vertical distance under which two words are considered on the same line.
pub const LINE_TOLERANCE: f32 = 10.0;

/// Caret blink half-period while waiting for the first keystroke.
pub const CARET_BLINK_MS: u64 = 530;

/// Characters per "word" in the WPM convention.
pub const CHARS_PER_WORD: u32 = 5;
