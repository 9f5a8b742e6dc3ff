pub mod analytics;
pub mod leaderboard;
pub mod screen;

use binsort::{
    catalog::BinLabel,
    session::{Difficulty, RoundBudget},
    sink::SaveStatus,
    util::{format_clock, time_ratio},
};
use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Terminal colour for a bin
pub fn bin_color(bin: BinLabel) -> Color {
    match bin {
        BinLabel::Yellow => Color::Yellow,
        BinLabel::Red => Color::Red,
        BinLabel::White => Color::White,
        BinLabel::Blue => Color::Blue,
        BinLabel::Green => Color::Green,
    }
}

fn budget_label(budget: &RoundBudget) -> String {
    match budget {
        RoundBudget::Timed { secs } => format_clock(*secs),
        RoundBudget::Questions { count } => format!("{count} questions"),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Menu => render_menu(self, area, buf),
            AppState::Playing => render_playing(self, area, buf),
            _ => render_game_over(self, area, buf),
        }
    }
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(3), // instructions
            Constraint::Length(Difficulty::ALL.len() as u16 + 2),
            Constraint::Length(3), // name
            Constraint::Min(0),
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("binsort", bold_style.fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(format!(
        "Sort each item into the right bin before the clock runs out. {}",
        BinLabel::ALL
            .iter()
            .enumerate()
            .map(|(i, bin)| format!("({}) {bin}", i + 1))
            .join("  ")
    ))
    .style(dim_style)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[1], buf);

    let table = &app.engine.config().difficulties;
    let lines = Difficulty::ALL
        .iter()
        .map(|difficulty| {
            let selected = *difficulty == app.difficulty;
            let budget = table
                .budget(*difficulty)
                .map(|b| budget_label(&b))
                .unwrap_or_else(|_| String::from("unavailable"));
            let text = format!(
                "{} {:<8} {budget}",
                if selected { ">" } else { " " },
                difficulty.to_string()
            );
            if selected {
                Line::from(Span::styled(text, bold_style.fg(Color::Green)))
            } else {
                Line::from(Span::raw(text))
            }
        })
        .collect::<Vec<Line>>();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("difficulty"))
        .render(chunks[2], buf);

    let name_style = if app.editing_name {
        bold_style.fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if app.editing_name { "_" } else { "" };
    Paragraph::new(Span::styled(
        format!("{}{cursor}", app.name_input),
        name_style,
    ))
    .block(Block::default().borders(Borders::ALL).title("player"))
    .render(chunks[3], buf);

    if let Some(ref notice) = app.notice {
        Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }

    Paragraph::new(Span::styled(
        "(enter) start / (tab) name / (e)asy (m)edium (h)ard / (l)eaderboard / (a)nalytics / (esc)ape",
        italic_style,
    ))
    .wrap(Wrap { trim: true })
    .render(chunks[6], buf);
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let state = app.engine.state();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // score line
            Constraint::Length(1), // clock
            Constraint::Length(1), // progress
            Constraint::Min(1),
            Constraint::Length(1), // item
            Constraint::Length(1), // image ref
            Constraint::Min(1),
            Constraint::Length(3), // bins
            Constraint::Length(1), // feedback
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!(
            "score {}   streak {}   {}% acc   {}",
            state.score,
            state.streak,
            state.accuracy_percent(),
            state.difficulty
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let (clock, ratio) = match state.questions_remaining {
        None => (
            format_clock(state.time_remaining_secs()),
            time_ratio(state.time_remaining_ms, state.total_time_ms),
        ),
        Some(left) => {
            let total = state.answers() + left;
            let ratio = if total == 0 {
                0.0
            } else {
                left as f64 / total as f64
            };
            (format!("{left} left"), ratio)
        }
    };

    Paragraph::new(Span::styled(clock, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let gauge_color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio)
        .label("")
        .render(chunks[2], buf);

    if let Some(round) = app.engine.round() {
        Paragraph::new(Span::styled(
            round.item.name.as_str(),
            bold_style.fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        Paragraph::new(Span::styled(round.item.image_ref.as_str(), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }

    render_bins(chunks[7], buf);

    if let Some(ref feedback) = app.feedback {
        let color = if feedback.correct {
            Color::Green
        } else {
            Color::Red
        };
        Paragraph::new(Span::styled(
            feedback.text.as_str(),
            Style::default().fg(color),
        ))
        .alignment(Alignment::Center)
        .render(chunks[8], buf);
    }

    Paragraph::new(Span::styled(
        "(1-5) or bin initial to answer / (esc) end",
        italic_style,
    ))
    .render(chunks[9], buf);
}

fn render_bins(area: Rect, buf: &mut Buffer) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            BinLabel::ALL
                .iter()
                .map(|_| Constraint::Ratio(1, BinLabel::ALL.len() as u32))
                .collect::<Vec<_>>(),
        )
        .split(area);

    for (idx, bin) in BinLabel::ALL.iter().enumerate() {
        let label = format!("{} {bin}", idx + 1);
        // keep the label readable in narrow terminals
        let inner_width = columns[idx].width.saturating_sub(2) as usize;
        let label = if label.width() > inner_width {
            (idx + 1).to_string()
        } else {
            label
        };

        Paragraph::new(Span::styled(
            label,
            Style::default()
                .fg(bin_color(*bin))
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(bin_color(*bin))),
        )
        .render(columns[idx], buf);
    }
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(7), // summary
            Constraint::Min(0),
            Constraint::Length(1), // save status
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("Game over", bold_style.fg(Color::Magenta)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if let Ok(summary) = app.engine.summary() {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{}  {} pts", summary.player_name, summary.final_score),
                bold_style,
            )),
            Line::from(format!(
                "{} correct   {} wrong   {}% acc",
                summary.correct_count, summary.wrong_count, summary.accuracy_percent
            )),
            Line::from(format!(
                "best streak {}   played {}   {}",
                summary.max_streak,
                format_clock(summary.duration_secs),
                summary.difficulty
            )),
        ];
        let speedups = app.engine.state().speedups;
        if speedups > 0 {
            lines.push(Line::from(Span::styled(
                format!("clock sped up {speedups} times"),
                italic_style,
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[1], buf);
    }

    let (status, color) = match app.engine.save_status() {
        SaveStatus::NotRequested => ("press enter to save your score".to_string(), Color::Gray),
        SaveStatus::Pending => ("saving...".to_string(), Color::Yellow),
        SaveStatus::Saved => ("saved to the leaderboard".to_string(), Color::Green),
        SaveStatus::NotSaved(reason) => (format!("not saved: {reason}"), Color::Red),
    };
    Paragraph::new(Span::styled(status, Style::default().fg(color)))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if let Some(ref notice) = app.notice {
        Paragraph::new(Span::styled(notice.as_str(), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    let legend = Paragraph::new(Span::styled(
        String::from(if Browser::is_available() {
            "(enter) save / (r)eplay / (m)enu / (l)eaderboard / (a)nalytics / (s)hare / (q)uit"
        } else {
            "(enter) save / (r)eplay / (m)enu / (l)eaderboard / (a)nalytics / (q)uit"
        }),
        italic_style,
    ))
    .wrap(Wrap { trim: true });

    legend.render(chunks[5], buf);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use binsort::{
        catalog::{Catalog, CatalogItem},
        config::Config,
        stats::StatsDb,
    };
    use ratatui::{buffer::Buffer, layout::Rect};

    pub(crate) fn create_test_app() -> App {
        let catalog = Catalog::new(vec![
            CatalogItem::new("Syringe with needle", "images/Syringe.webp", BinLabel::White),
            CatalogItem::new("Urine bag", "images/Urine bag.webp", BinLabel::Red),
        ])
        .unwrap();
        let config = Config {
            player_name: String::from("Asha"),
            ..Config::default()
        };
        App::new(catalog, &config, StatsDb::open_in_memory().ok(), None)
    }

    pub(crate) fn rendered(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_menu_shows_budgets_and_name() {
        let app = create_test_app();
        let text = rendered(&app, Rect::new(0, 0, 100, 30));

        assert!(text.contains("binsort"));
        assert!(text.contains("01:30"));
        assert!(text.contains("00:30"));
        assert!(text.contains("Asha"));
        assert!(text.contains("> medium"));
    }

    #[test]
    fn test_playing_shows_clock_and_item() {
        let mut app = create_test_app();
        app.start_session();
        for _ in 0..5 {
            app.on_tick();
        }

        let text = rendered(&app, Rect::new(0, 0, 100, 30));
        assert!(text.contains("00:55"));
        assert!(text.contains("Syringe with needle") || text.contains("Urine bag"));
        assert!(text.contains("score 0"));
    }

    #[test]
    fn test_playing_shows_feedback() {
        let mut app = create_test_app();
        app.start_session();
        let bin = app.engine.round().unwrap().item.correct_bin;
        app.answer(bin);

        let text = rendered(&app, Rect::new(0, 0, 120, 30));
        assert!(text.contains("Correct!"));
        assert!(text.contains("score 10"));
    }

    #[test]
    fn test_game_over_shows_summary_and_status() {
        let mut app = create_test_app();
        app.start_session();
        let bin = app.engine.round().unwrap().item.correct_bin;
        app.answer(bin);
        app.engine.end_early();
        app.state = AppState::GameOver;

        let text = rendered(&app, Rect::new(0, 0, 100, 30));
        assert!(text.contains("Game over"));
        assert!(text.contains("Asha  10 pts"));
        assert!(text.contains("100% acc"));
        assert!(text.contains("press enter to save"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let mut app = create_test_app();
        let area = Rect::new(0, 0, 20, 5);
        rendered(&app, area);
        app.start_session();
        rendered(&app, area);
    }

    #[test]
    fn test_bin_colors_are_distinct() {
        let colors = BinLabel::ALL.iter().map(|b| bin_color(*b)).unique().count();
        assert_eq!(colors, BinLabel::ALL.len());
    }

    #[test]
    fn test_budget_label() {
        assert_eq!(budget_label(&RoundBudget::Timed { secs: 90 }), "01:30");
        assert_eq!(
            budget_label(&RoundBudget::Questions { count: 12 }),
            "12 questions"
        );
    }

    #[test]
    fn test_ui_constants() {
        assert_eq!(HORIZONTAL_MARGIN, 5);
        assert_eq!(VERTICAL_MARGIN, 2);
    }
}
