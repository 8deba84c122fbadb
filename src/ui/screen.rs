use ratatui::Frame;

use super::TuiRenderer;
use crate::session::Phase;

/// A UI Screen boundary: responsible for rendering one phase of the test
pub trait Screen {
    fn render(&self, renderer: &TuiRenderer, f: &mut Frame);
}

/// Duration selector or countdown above the word window
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, renderer: &TuiRenderer, f: &mut Frame) {
        f.render_widget(renderer, f.area());
    }
}

/// WPM and accuracy in place of the word window
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, renderer: &TuiRenderer, f: &mut Frame) {
        f.render_widget(super::ResultsWidget(renderer), f.area());
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle | Phase::Active => Box::new(TypingScreen),
        Phase::Ended => Box::new(ResultsScreen),
    }
}
