mod ui;

use binsort::{
    app_dirs::AppDirs,
    catalog::{BinLabel, Catalog, CatalogSource, EmbeddedCatalog, FileCatalog},
    config::{Config, ConfigStore, FileConfigStore},
    engine::SessionEngine,
    events::SessionEvent,
    logging,
    policy::PerformanceDrain,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner, TICK_RATE},
    session::{Difficulty, SessionSummary},
    sink::{SaveOutcome, SaveStatus, Submission},
    stats::{HistoryEntry, LeaderboardEntry, StatsDb, StatsOverview, LEADERBOARD_SIZE},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
};
use tracing::{debug, info, warn};
use webbrowser::Browser;

const SHARE_URL: &str = "https://wa.me/?text=";
const RECENT_GAMES: usize = 10;

/// terminal quiz for sorting biomedical waste into the right bin
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Cli {
    /// difficulty to preselect in the menu
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// player name recorded on the leaderboard
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// JSON item list to play with instead of the bundled one
    #[clap(short = 'c', long)]
    catalog: Option<PathBuf>,

    /// speed the clock up while you are well ahead
    #[clap(long)]
    adaptive: bool,

    /// let wrong answers push the score below zero
    #[clap(long, conflicts_with = "clamp_score")]
    allow_negative: bool,

    /// never let the score drop below zero
    #[clap(long)]
    clamp_score: bool,

    /// stats database location
    #[clap(long)]
    db: Option<PathBuf>,

    /// config file location
    #[clap(long)]
    config: Option<PathBuf>,

    /// print the leaderboard and exit
    #[clap(long)]
    leaderboard: bool,

    /// print local statistics and exit
    #[clap(long)]
    stats: bool,
}

impl Cli {
    /// Overlay command line flags on the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(ref name) = self.name {
            config.player_name = name.clone();
        }
        if let Some(ref path) = self.catalog {
            config.catalog_path = Some(path.clone());
        }
        if self.adaptive {
            config.adaptive = true;
        }
        if self.allow_negative {
            config.scoring.allow_negative_score = true;
        }
        if self.clamp_score {
            config.scoring.allow_negative_score = false;
        }
        config
    }

    fn db_path(&self) -> Option<PathBuf> {
        self.db.clone().or_else(AppDirs::db_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Menu,
    Playing,
    GameOver,
    Leaderboard,
    Analytics,
}

/// Result of the last answer, shown under the item
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub correct: bool,
    pub text: String,
}

/// What the event loop should do after handling a key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Continue,
    SessionStarted,
    Quit,
}

pub struct App {
    pub engine: SessionEngine,
    session_events: Receiver<SessionEvent>,
    pub state: AppState,
    pub return_to: AppState,
    pub difficulty: Difficulty,
    pub name_input: String,
    pub editing_name: bool,
    pub feedback: Option<Feedback>,
    pub notice: Option<String>,
    pub stats: Option<StatsDb>,
    pub db_path: Option<PathBuf>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub overview: StatsOverview,
    pub weak_bins: Vec<(BinLabel, u32)>,
    pub recent: Vec<HistoryEntry>,
}

impl App {
    pub fn new(
        catalog: Catalog,
        config: &Config,
        stats: Option<StatsDb>,
        db_path: Option<PathBuf>,
    ) -> Self {
        let mut engine = SessionEngine::new(catalog, config.session_config());
        if config.adaptive {
            engine = engine.with_tick_adjustment(Box::new(PerformanceDrain::default()));
        }
        engine.set_player_name(config.player_name.clone());

        let (tx, rx) = mpsc::channel();
        engine.subscribe(Box::new(tx));

        Self {
            engine,
            session_events: rx,
            state: AppState::Menu,
            return_to: AppState::Menu,
            difficulty: config.difficulty,
            name_input: config.player_name.clone(),
            editing_name: false,
            feedback: None,
            notice: None,
            stats,
            db_path,
            leaderboard: Vec::new(),
            overview: StatsOverview::default(),
            weak_bins: Vec::new(),
            recent: Vec::new(),
        }
    }

    pub fn start_session(&mut self) -> Flow {
        self.engine.set_player_name(self.name_input.clone());
        match self.engine.start(self.difficulty).map(|_| ()) {
            Ok(_) => {
                self.feedback = None;
                self.notice = None;
                self.state = AppState::Playing;
                self.drain_session_events();
                Flow::SessionStarted
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                Flow::Continue
            }
        }
    }

    pub fn on_tick(&mut self) {
        if self.engine.tick().is_some() {
            self.drain_session_events();
        }
    }

    pub fn answer(&mut self, bin: BinLabel) {
        if self.engine.submit_answer(bin).is_some() {
            self.drain_session_events();
        }
    }

    /// Hand the summary to a worker that saves it; the reply comes back as a QuizEvent
    pub fn request_save(&mut self, tx: &Sender<QuizEvent>) {
        if matches!(
            self.engine.save_status(),
            SaveStatus::Pending | SaveStatus::Saved
        ) {
            return;
        }

        let Some(db_path) = self.db_path.clone() else {
            self.notice = Some(String::from("no leaderboard location available"));
            return;
        };

        match self.engine.take_submission() {
            Ok(submission) => spawn_save(submission, db_path, tx.clone()),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    pub fn on_save_finished(&mut self, session_id: u64, result: binsort::Result<bool>) {
        match self.engine.record_save_result(session_id, result) {
            SaveOutcome::Saved => {
                self.notice = Some(String::from("Score saved to the leaderboard"));
                self.refresh_stats();
            }
            SaveOutcome::NotSaved => {
                self.notice = Some(String::from("Score not saved - press enter to try again"));
            }
            SaveOutcome::Stale => {}
        }
    }

    pub fn show(&mut self, screen: AppState) {
        if !matches!(screen, AppState::Leaderboard | AppState::Analytics) {
            self.state = screen;
            return;
        }
        if !matches!(self.state, AppState::Leaderboard | AppState::Analytics) {
            self.return_to = self.state;
        }
        self.refresh_stats();
        self.state = screen;
    }

    pub fn refresh_stats(&mut self) {
        let Some(ref db) = self.stats else {
            return;
        };
        match (
            db.top_scores(LEADERBOARD_SIZE),
            db.overview(),
            db.weak_bins(),
            db.score_history(RECENT_GAMES),
        ) {
            (Ok(top), Ok(overview), Ok(weak), Ok(recent)) => {
                self.leaderboard = top;
                self.overview = overview;
                self.weak_bins = weak;
                self.recent = recent;
            }
            _ => warn!("could not refresh statistics"),
        }
    }

    fn drain_session_events(&mut self) {
        while let Ok(event) = self.session_events.try_recv() {
            match event {
                SessionEvent::RoundChanged { .. } => {}
                SessionEvent::AnswerResult {
                    correct,
                    correct_bin,
                    item_name,
                    points_delta,
                    ..
                } => {
                    let text = if correct {
                        format!(
                            "Correct! {item_name} goes in {} ({points_delta:+})",
                            correct_bin.description()
                        )
                    } else {
                        format!(
                            "Wrong! {item_name} belongs in {} ({points_delta:+})",
                            correct_bin.description()
                        )
                    };
                    self.feedback = Some(Feedback { correct, text });
                }
                SessionEvent::SessionTerminated { summary, .. } => {
                    self.on_session_terminated(&summary);
                }
            }
        }
    }

    fn on_session_terminated(&mut self, summary: &SessionSummary) {
        self.state = AppState::GameOver;
        let mistakes = self.engine.state().bin_mistakes.clone();
        if let Some(ref mut db) = self.stats {
            if let Err(e) = db.record_session(summary, &mistakes) {
                warn!(error = %e, "could not record session locally");
            }
        }
        self.refresh_stats();
    }

    pub fn share_text(&self) -> Option<String> {
        let summary = self.engine.summary().ok()?;
        Some(format!(
            "I scored {} ({}% accuracy) sorting biomedical waste in binsort on {}!",
            summary.final_score, summary.accuracy_percent, summary.difficulty
        ))
    }

    pub fn on_key(&mut self, key: KeyEvent, tx: &Sender<QuizEvent>) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Menu => self.on_menu_key(key),
            AppState::Playing => {
                match key.code {
                    KeyCode::Esc => {
                        self.engine.end_early();
                        self.drain_session_events();
                    }
                    KeyCode::Char(c) => {
                        if let Some(bin) = bin_for_key(c) {
                            self.answer(bin);
                        }
                    }
                    _ => {}
                }
                Flow::Continue
            }
            AppState::GameOver => match key.code {
                KeyCode::Enter => {
                    self.request_save(tx);
                    Flow::Continue
                }
                KeyCode::Char('r') => self.start_session(),
                KeyCode::Esc | KeyCode::Char('m') => {
                    self.show(AppState::Menu);
                    Flow::Continue
                }
                KeyCode::Char('l') => {
                    self.show(AppState::Leaderboard);
                    Flow::Continue
                }
                KeyCode::Char('a') => {
                    self.show(AppState::Analytics);
                    Flow::Continue
                }
                KeyCode::Char('s') => {
                    if let Some(text) = self.share_text() {
                        if Browser::is_available() {
                            webbrowser::open(&share_url(&text)).unwrap_or_default();
                        }
                    }
                    Flow::Continue
                }
                KeyCode::Char('q') => Flow::Quit,
                _ => Flow::Continue,
            },
            AppState::Leaderboard | AppState::Analytics => match key.code {
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                    self.state = self.return_to;
                    Flow::Continue
                }
                KeyCode::Char('l') => {
                    self.show(AppState::Leaderboard);
                    Flow::Continue
                }
                KeyCode::Char('a') => {
                    self.show(AppState::Analytics);
                    Flow::Continue
                }
                KeyCode::Char('q') => Flow::Quit,
                _ => Flow::Continue,
            },
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) -> Flow {
        if self.editing_name {
            match key.code {
                KeyCode::Enter | KeyCode::Tab | KeyCode::Esc => self.editing_name = false,
                KeyCode::Backspace => {
                    self.name_input.pop();
                }
                KeyCode::Char(c) if self.name_input.chars().count() < 24 => {
                    self.name_input.push(c)
                }
                _ => {}
            }
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Tab => self.editing_name = true,
            KeyCode::Up => self.difficulty = cycle_difficulty(self.difficulty, -1),
            KeyCode::Down => self.difficulty = cycle_difficulty(self.difficulty, 1),
            KeyCode::Char('e') => self.difficulty = Difficulty::Easy,
            KeyCode::Char('m') => self.difficulty = Difficulty::Medium,
            KeyCode::Char('h') => self.difficulty = Difficulty::Hard,
            KeyCode::Char('l') => self.show(AppState::Leaderboard),
            KeyCode::Char('a') => self.show(AppState::Analytics),
            KeyCode::Enter => return self.start_session(),
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            _ => {}
        }
        Flow::Continue
    }
}

/// Number keys follow the bin order on screen, letters are the colour initials
fn bin_for_key(c: char) -> Option<BinLabel> {
    match c.to_ascii_lowercase() {
        '1' | 'y' => Some(BinLabel::Yellow),
        '2' | 'r' => Some(BinLabel::Red),
        '3' | 'w' | 't' => Some(BinLabel::White),
        '4' | 'b' => Some(BinLabel::Blue),
        '5' | 'g' => Some(BinLabel::Green),
        _ => None,
    }
}

fn cycle_difficulty(current: Difficulty, step: isize) -> Difficulty {
    let all = Difficulty::ALL;
    let idx = all.iter().position(|d| *d == current).unwrap_or(0) as isize;
    let next = (idx + step).rem_euclid(all.len() as isize) as usize;
    all[next]
}

fn share_url(text: &str) -> String {
    format!("{SHARE_URL}{}", utf8_percent_encode(text, NON_ALPHANUMERIC))
}

fn spawn_save(submission: Submission, db_path: PathBuf, tx: Sender<QuizEvent>) {
    thread::spawn(move || {
        let (session_id, result) = match StatsDb::open(&db_path) {
            Ok(mut db) => submission.send_to(&mut db),
            Err(e) => (submission.session_id, Err(e)),
        };
        let _ = tx.send(QuizEvent::SaveFinished { session_id, result });
    });
}

fn load_catalog(config: &Config) -> binsort::Result<Catalog> {
    match config.catalog_path {
        Some(ref path) => FileCatalog::new(path).load(),
        None => EmbeddedCatalog.load(),
    }
}

fn print_leaderboard(db: &StatsDb) -> Result<(), Box<dyn Error>> {
    let entries = db.top_scores(LEADERBOARD_SIZE)?;
    if entries.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}. {:<24} {:>6} pts  {:>3}s  {}",
            rank + 1,
            entry.name,
            entry.score,
            entry.duration_secs,
            entry.difficulty
        );
    }
    Ok(())
}

fn print_stats(db: &StatsDb) -> Result<(), Box<dyn Error>> {
    let overview = db.overview()?;
    println!("games played:     {}", overview.games);
    println!("best score:       {}", overview.best_score);
    println!("average score:    {:.1}", overview.avg_score);
    println!("total correct:    {}", overview.total_correct);
    println!("total wrong:      {}", overview.total_wrong);
    println!("overall accuracy: {}%", overview.overall_accuracy);

    let weak = db.weak_bins()?;
    if !weak.is_empty() {
        println!(
            "weak bins:        {}",
            weak.iter()
                .map(|(bin, n)| format!("{} ({n})", bin.description()))
                .join(", ")
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    logging::init(AppDirs::log_path().as_deref());

    let store = match cli.config {
        Some(ref path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = cli.apply_to(store.load());
    debug!(path = %store.path().display(), "config loaded");
    let db_path = cli.db_path();

    if cli.leaderboard || cli.stats {
        let path = db_path.ok_or("no stats database location available")?;
        let db = StatsDb::open(path)?;
        if cli.leaderboard {
            print_leaderboard(&db)?;
        }
        if cli.stats {
            print_stats(&db)?;
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let catalog = load_catalog(&config)?;
    let stats = match db_path {
        Some(ref path) => StatsDb::open(path)
            .map_err(|e| warn!(error = %e, "local statistics disabled"))
            .ok(),
        None => None,
    };
    info!(items = catalog.len(), difficulty = %config.difficulty, "starting binsort");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(catalog, &config, stats, db_path);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    // remember the last name and difficulty for next time
    let mut saved = store.load();
    saved.player_name = app.name_input.clone();
    saved.difficulty = app.difficulty;
    if let Err(e) = store.save(&saved) {
        warn!(error = %e, "could not save config");
    }

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let event_source = CrosstermEventSource::new();
    let tx = event_source.sender();
    let runner = Runner::new(event_source, FixedTicker::new(TICK_RATE));

    loop {
        terminal.draw(|f| ui::screen::current_screen(&app.state).render(app, f))?;

        match runner.step() {
            QuizEvent::Tick => app.on_tick(),
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => match app.on_key(key, &tx) {
                Flow::Quit => break,
                Flow::SessionStarted => runner.reset_clock(),
                Flow::Continue => {}
            },
            QuizEvent::SaveFinished { session_id, result } => {
                app.on_save_finished(session_id, result)
            }
        }
    }

    Ok(())
}
