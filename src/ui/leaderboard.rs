use binsort::{stats::LeaderboardEntry, util::format_clock};
use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::App;

/// Medal for the podium places, plain rank number below
pub fn rank_label(rank: usize) -> String {
    match rank {
        1 => String::from("🥇"),
        2 => String::from("🥈"),
        3 => String::from("🥉"),
        n => format!("{n}."),
    }
}

/// "3 hours ago" style age of a record
pub fn relative_time(created_at: DateTime<Local>, now: DateTime<Local>) -> String {
    let secs = (now - created_at).num_seconds().max(0) as u64;
    HumanTime::from(std::time::Duration::from_secs(secs)).to_text_en(Accuracy::Rough, Tense::Past)
}

/// Pure presenter for a single leaderboard row
pub fn present_row(rank: usize, entry: &LeaderboardEntry, now: DateTime<Local>) -> Row<'static> {
    let score_style = if entry.score < 0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    // question rounds have no clock, so only the time played is shown
    let time = if entry.allotted_secs > 0 {
        format!(
            "{} / {}",
            format_clock(entry.duration_secs),
            format_clock(entry.allotted_secs)
        )
    } else {
        format_clock(entry.duration_secs)
    };

    Row::new(vec![
        Cell::from(rank_label(rank)),
        Cell::from(entry.name.clone()),
        Cell::from(entry.score.to_string()).style(score_style),
        Cell::from(time),
        Cell::from(entry.difficulty.to_string()),
        Cell::from(relative_time(entry.created_at, now)),
    ])
}

/// Render the Leaderboard screen
pub fn render_leaderboard(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(format!("Leaderboard (top {})", app.leaderboard.len()))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    if app.leaderboard.is_empty() {
        let empty = Paragraph::new("No scores yet. Finish a game and press enter to save it.")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, chunks[1]);
    } else {
        let now = Local::now();
        let header = Row::new(vec!["#", "Name", "Score", "Time", "Level", "When"])
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .bottom_margin(1);

        let rows = app
            .leaderboard
            .iter()
            .enumerate()
            .map(|(idx, entry)| present_row(idx + 1, entry, now));

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(12),
                Constraint::Length(7),
                Constraint::Length(13),
                Constraint::Length(7),
                Constraint::Length(16),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .column_spacing(1);
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("(esc) back / (a)nalytics / (q)uit")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}
