use binsort::{stats::HistoryEntry, util::mean};
use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{ui::bin_color, App};

fn overview_lines(app: &App) -> Vec<Line<'static>> {
    let overview = &app.overview;
    let recent_scores = app.recent.iter().map(|e| e.score as f64).collect_vec();
    let recent_avg = mean(&recent_scores)
        .map(|avg| format!("{avg:.1}"))
        .unwrap_or_else(|| String::from("-"));

    vec![
        Line::from(format!(
            "games {}   best {}   average {:.1}   last {} average {recent_avg}",
            overview.games,
            overview.best_score,
            overview.avg_score,
            app.recent.len()
        )),
        Line::from(format!(
            "{} correct   {} wrong   {}% overall accuracy",
            overview.total_correct, overview.total_wrong, overview.overall_accuracy
        )),
        Line::from(format!(
            "clock speed-ups in the last session: {}",
            app.engine.state().speedups
        )),
    ]
}

/// Pure presenter for one game of the recent history
pub fn present_history_row(entry: &HistoryEntry) -> Row<'static> {
    let score_style = if entry.score < 0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    Row::new(vec![
        Cell::from(entry.created_at.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(entry.score.to_string()).style(score_style),
        Cell::from(format!("{}/{}", entry.correct, entry.correct + entry.wrong)),
        Cell::from(format!("{}%", entry.accuracy)),
        Cell::from(entry.max_streak.to_string()),
        Cell::from(entry.difficulty.to_string()),
    ])
}

fn weak_bin_lines(app: &App) -> Vec<Line<'static>> {
    if app.weak_bins.is_empty() {
        return vec![Line::from(Span::styled(
            "no mistakes recorded",
            Style::default().fg(Color::Gray),
        ))];
    }

    app.weak_bins
        .iter()
        .map(|(bin, mistakes)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<18}", bin.description()),
                    Style::default()
                        .fg(bin_color(*bin))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "{mistakes} {}",
                    if *mistakes == 1 { "mistake" } else { "mistakes" }
                )),
            ])
        })
        .collect()
}

/// Render the Analytics screen
pub fn render_analytics(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(5), // Overview
            Constraint::Min(4),    // Recent games
            Constraint::Length(app.weak_bins.len().max(1) as u16 + 2),
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    let overview = Paragraph::new(overview_lines(app))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Analytics"));
    f.render_widget(overview, chunks[0]);

    let header = Row::new(vec!["Played", "Score", "Right", "Acc", "Streak", "Level"])
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let table = Table::new(
        app.recent.iter().map(present_history_row),
        [
            Constraint::Length(16),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("recent games"))
    .column_spacing(1);
    f.render_widget(table, chunks[1]);

    let weak = Paragraph::new(weak_bin_lines(app))
        .block(Block::default().borders(Borders::ALL).title("mistakes by bin"));
    f.render_widget(weak, chunks[2]);

    let instructions = Paragraph::new("(esc) back / (l)eaderboard / (q)uit")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[3]);
}
