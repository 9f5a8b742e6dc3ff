use ratatui::Frame;

use crate::{
    ui::{analytics::render_analytics, leaderboard::render_leaderboard},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Menu, playing and game over screens all draw through the App widget
pub struct QuizScreen;

impl Screen for QuizScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_leaderboard(app, f);
    }
}

pub struct AnalyticsScreen;

impl Screen for AnalyticsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_analytics(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu | AppState::Playing | AppState::GameOver => Box::new(QuizScreen),
        AppState::Leaderboard => Box::new(LeaderboardScreen),
        AppState::Analytics => Box::new(AnalyticsScreen),
    }
}
