pub mod screen;
pub mod wrap;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::controller::{Renderer, WindowView};
use crate::pager::WordPlacement;
use crate::results::TestSummary;
use crate::session::{Cursor, Judgment, Phase, TestDuration};

const HORIZONTAL_MARGIN: u16 = 5;
const MAX_TEXT_WIDTH: u16 = 72;
const VISIBLE_LINES: usize = 2;

/// Rows are one unit apart in the reported layout.
pub const TUI_LINE_TOLERANCE: f32 = 0.5;

#[derive(Debug, Clone, Default)]
struct RenderedWord {
    text: String,
    judgments: Vec<Judgment>,
}

/// Terminal renderer. Keeps a copy of the last window so it can draw and
/// report layout between controller calls.
#[derive(Debug, Clone)]
pub struct TuiRenderer {
    words: Vec<RenderedWord>,
    first_word_idx: usize,
    cursor: Cursor,
    current_word_idx: usize,
    phase: Phase,
    duration: TestDuration,
    time_remaining: u64,
    shifted: bool,
    fading: bool,
    caret_visible: bool,
    result: Option<TestSummary>,
    text_width: u16,
}

impl TuiRenderer {
    pub fn new(area_width: u16) -> Self {
        let mut renderer = Self {
            words: Vec::new(),
            first_word_idx: 0,
            cursor: Cursor::ORIGIN,
            current_word_idx: 0,
            phase: Phase::Idle,
            duration: TestDuration::default(),
            time_remaining: TestDuration::default().secs(),
            shifted: false,
            fading: false,
            caret_visible: true,
            result: None,
            text_width: MAX_TEXT_WIDTH,
        };
        renderer.resize(area_width);
        renderer
    }

    pub fn resize(&mut self, area_width: u16) {
        self.text_width = area_width
            .saturating_sub(HORIZONTAL_MARGIN * 2)
            .clamp(1, MAX_TEXT_WIDTH);
    }

    pub fn result(&self) -> Option<&TestSummary> {
        self.result.as_ref()
    }

    pub fn draw(&self, f: &mut Frame) {
        screen::current_screen(self.phase).render(self, f);
    }

    fn rows(&self) -> Vec<usize> {
        let widths: Vec<usize> = self.words.iter().map(|w| w.text.width()).collect();
        wrap::wrap_rows(&widths, self.text_width as usize)
    }

    fn centered(&self, area: Rect) -> Rect {
        let width = self.text_width.min(area.width);
        Rect {
            x: area.x + (area.width - width) / 2,
            width,
            ..area
        }
    }

    fn word_spans(&self, offset: usize, fading: bool) -> Vec<Span<'static>> {
        let word = &self.words[offset];
        let word_idx = self.first_word_idx + offset;
        let is_current = word_idx == self.current_word_idx;

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let pending = if is_current {
            bold
        } else {
            bold.add_modifier(Modifier::DIM)
        };

        word.text
            .chars()
            .chain(std::iter::once(' '))
            .enumerate()
            .map(|(char_idx, c)| {
                let judgment = word.judgments.get(char_idx).copied().unwrap_or_default();
                let (text, mut style) = match judgment {
                    Judgment::Correct => (c, bold.fg(Color::Green)),
                    Judgment::Incorrect if c == ' ' => ('·', bold.fg(Color::Red)),
                    Judgment::Incorrect => (c, bold.fg(Color::Red)),
                    Judgment::Unset => (c, pending),
                };
                if self.caret_visible && self.cursor == Cursor::new(word_idx, char_idx) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                if fading {
                    style = style.add_modifier(Modifier::DIM);
                }
                Span::styled(text.to_string(), style)
            })
            .collect()
    }

    fn word_lines(&self) -> Vec<Line<'static>> {
        let rows = self.rows();
        let skip = usize::from(self.shifted);

        let chunks = rows.iter().enumerate().chunk_by(|(_, row)| **row);
        let lines: Vec<Line<'static>> = (&chunks)
            .into_iter()
            .skip(skip)
            .take(VISIBLE_LINES)
            .enumerate()
            .map(|(line, (_, group))| {
                // the line scrolled in by a pending page
                let fading = self.fading && self.shifted && line + 1 == VISIBLE_LINES;
                Line::from(
                    group
                        .flat_map(|(offset, _)| self.word_spans(offset, fading))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        lines
    }

    fn header_line(&self) -> Line<'static> {
        let dim_bold = Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::DIM);

        match self.phase {
            Phase::Idle => Line::from(
                TestDuration::ALL
                    .iter()
                    .flat_map(|d| {
                        let style = if *d == self.duration {
                            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                        } else {
                            dim_bold
                        };
                        [Span::styled(d.to_string(), style), Span::raw("  ")]
                    })
                    .collect::<Vec<_>>(),
            ),
            _ => Line::from(Span::styled(
                self.time_remaining.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
        }
    }
}

impl Renderer for TuiRenderer {
    fn render_window(&mut self, view: &WindowView<'_>) {
        self.words = view
            .words
            .iter()
            .enumerate()
            .map(|(offset, word)| RenderedWord {
                text: word.to_string(),
                judgments: view.judgments.word(view.first_word_idx + offset).to_vec(),
            })
            .collect();
        self.first_word_idx = view.first_word_idx;
        self.cursor = view.cursor;
        self.current_word_idx = view.current_word_idx();
        self.phase = view.phase;
        self.duration = view.duration;
        self.time_remaining = view.time_remaining;
        self.shifted = view.shifted;
        self.fading = view.fading;
        self.caret_visible = view.caret_visible;
        if view.phase != Phase::Ended {
            self.result = None;
        }
    }

    fn report_result(&mut self, summary: &TestSummary) {
        self.result = Some(*summary);
    }

    fn line_layout(&self) -> Vec<WordPlacement> {
        self.rows()
            .into_iter()
            .enumerate()
            .map(|(offset, row)| WordPlacement::new(self.first_word_idx + offset, row as f32))
            .collect()
    }
}

impl Widget for &TuiRenderer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let italic_dim = Style::default()
            .add_modifier(Modifier::ITALIC)
            .add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(VISIBLE_LINES as u16),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .split(area);

        Paragraph::new(self.header_line())
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(self.word_lines()).render(self.centered(chunks[3]), buf);

        let hint = match self.phase {
            Phase::Idle => "←/→ duration · tab restart · esc quit",
            _ => "tab restart · esc quit",
        };
        Paragraph::new(Span::styled(hint, italic_dim))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

/// Final result in place of the word window.
pub struct ResultsWidget<'a>(pub &'a TuiRenderer);

impl Widget for ResultsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold = if self.0.fading {
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::DIM)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .split(area);

        let (wpm, details) = match self.0.result {
            Some(summary) => (
                summary.wpm.to_string(),
                format!(
                    "{}% acc / {}s / {} correct keystrokes",
                    summary.accuracy, summary.duration, summary.correct_keystrokes
                ),
            ),
            None => ("-".to_string(), String::new()),
        };

        Paragraph::new(Line::from(vec![
            Span::styled(wpm, bold.fg(Color::Magenta)),
            Span::styled(" wpm", bold.add_modifier(Modifier::DIM)),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Span::styled(details, bold.add_modifier(Modifier::DIM)))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            "(tab) restart / (esc) quit",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }
}
