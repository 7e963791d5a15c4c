use ratatui::Frame;

use wordflow::app::{App, AppState};

use crate::ui::{results, welcome, writing};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Duration picker, streak and entry point
pub struct WelcomeScreen;

impl Screen for WelcomeScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        welcome::render(app, f);
    }
}

/// Live round: stats bar over the text area
pub struct WritingScreen;

impl Screen for WritingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        writing::render(app, f);
    }
}

/// Final score, the round's text and the analysis panel
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        results::render(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Welcome => Box::new(WelcomeScreen),
        AppState::Writing => Box::new(WritingScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
