use ratatui::Frame;

use crate::app::{App, AppState};

/// A UI screen boundary, rendered from the app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        super::render_menu(app, f.area(), f.buffer_mut());
    }
}

pub struct ExerciseScreen;

impl Screen for ExerciseScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        super::render_exercise(app, f.area(), f.buffer_mut());
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        super::render_results(app, f.area(), f.buffer_mut());
    }
}

pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Exercise => Box::new(ExerciseScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}

/// Draw whichever screen matches the app state
pub fn draw(app: &App, f: &mut Frame) {
    current_screen(app.state).render(app, f);
}
