use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::catalog::BinLabel;
use crate::error::{QuizError, Result};
use crate::policy::accuracy_percent;
use crate::session::{Difficulty, SessionSummary};
use crate::sink::ResultSink;

/// Default number of rows shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 50;

/// One saved leaderboard record
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i64,
    pub duration_secs: u64,
    pub allotted_secs: u64,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Local>,
}

/// One finished session in the local history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub score: i64,
    pub correct: u32,
    pub wrong: u32,
    pub accuracy: u32,
    pub difficulty: Difficulty,
    pub max_streak: u32,
    pub created_at: DateTime<Local>,
}

/// Aggregates over every recorded session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsOverview {
    pub games: u64,
    pub best_score: i64,
    pub avg_score: f64,
    pub total_correct: u64,
    pub total_wrong: u64,
    pub overall_accuracy: u32,
}

/// SQLite store for the leaderboard and local play history
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    QuizError::SinkUnavailable(format!("failed to create {}: {e}", parent.display()))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened stats database");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS leaderboard (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                duration_secs INTEGER NOT NULL,
                allotted_secs INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_leaderboard_score ON leaderboard(score);

            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                score INTEGER NOT NULL,
                correct INTEGER NOT NULL,
                wrong INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                max_streak INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bin_mistakes (
                bin TEXT PRIMARY KEY,
                mistakes INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )?;

        Ok(StatsDb { conn })
    }

    /// Add a finished session to the local history and bump the per-bin mistake counts
    pub fn record_session(
        &mut self,
        summary: &SessionSummary,
        bin_mistakes: &BTreeMap<BinLabel, u32>,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO history
            (score, correct, wrong, accuracy, difficulty, max_streak, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                summary.final_score,
                summary.correct_count,
                summary.wrong_count,
                summary.accuracy_percent,
                summary.difficulty.to_string(),
                summary.max_streak,
                Local::now().to_rfc3339(),
            ],
        )?;

        for (bin, count) in bin_mistakes.iter().filter(|(_, c)| **c > 0) {
            tx.execute(
                r#"
                INSERT INTO bin_mistakes (bin, mistakes) VALUES (?1, ?2)
                ON CONFLICT(bin) DO UPDATE SET mistakes = mistakes + excluded.mistakes
                "#,
                params![bin.to_string(), count],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn overview(&self) -> Result<StatsOverview> {
        let (games, best, total_score, correct, wrong): (i64, Option<i64>, Option<i64>, Option<i64>, Option<i64>) =
            self.conn.query_row(
                "SELECT COUNT(*), MAX(score), SUM(score), SUM(correct), SUM(wrong) FROM history",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;

        if games == 0 {
            return Ok(StatsOverview::default());
        }

        let total_correct = correct.unwrap_or(0).max(0) as u64;
        let total_wrong = wrong.unwrap_or(0).max(0) as u64;

        Ok(StatsOverview {
            games: games as u64,
            best_score: best.unwrap_or(0),
            avg_score: total_score.unwrap_or(0) as f64 / games as f64,
            total_correct,
            total_wrong,
            overall_accuracy: accuracy_percent(
                total_correct.min(u64::from(u32::MAX)) as u32,
                total_wrong.min(u64::from(u32::MAX)) as u32,
            ),
        })
    }

    /// Most recent sessions first
    pub fn score_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT score, correct, wrong, accuracy, difficulty, max_streak, created_at
            FROM history
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok(HistoryEntry {
                score: row.get(0)?,
                correct: row.get(1)?,
                wrong: row.get(2)?,
                accuracy: row.get(3)?,
                difficulty: parse_difficulty(row.get::<_, String>(4)?),
                max_streak: row.get(5)?,
                created_at: parse_timestamp(6, row.get::<_, String>(6)?)?,
            })
        })?;

        let mut history = Vec::new();
        for entry in rows {
            history.push(entry?);
        }
        Ok(history)
    }

    /// Highest scores first; ties keep the earlier record on top
    pub fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, score, duration_secs, allotted_secs, difficulty, created_at
            FROM leaderboard
            ORDER BY score DESC, id ASC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok(LeaderboardEntry {
                name: row.get(0)?,
                score: row.get(1)?,
                duration_secs: row.get(2)?,
                allotted_secs: row.get(3)?,
                difficulty: parse_difficulty(row.get::<_, String>(4)?),
                created_at: parse_timestamp(5, row.get::<_, String>(5)?)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    /// Bins with at least one mistake, worst first
    pub fn weak_bins(&self) -> Result<Vec<(BinLabel, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT bin, mistakes FROM bin_mistakes WHERE mistakes > 0 ORDER BY mistakes DESC, bin ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut bins = Vec::new();
        for row in rows {
            let (bin, mistakes) = row?;
            // rows written by other tools may carry labels we do not know
            if let Ok(label) = bin.parse::<BinLabel>() {
                bins.push((label, mistakes));
            }
        }
        Ok(bins)
    }

    /// Clear everything (for testing or reset purposes)
    pub fn clear_all(&self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM leaderboard; DELETE FROM history; DELETE FROM bin_mistakes;")?;
        Ok(())
    }
}

impl ResultSink for StatsDb {
    fn submit(&mut self, summary: &SessionSummary) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT INTO leaderboard
            (name, score, duration_secs, allotted_secs, difficulty, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                summary.player_name,
                summary.final_score,
                summary.duration_secs,
                summary.allotted_secs,
                summary.difficulty.to_string(),
                Local::now().to_rfc3339(),
            ],
        )?;
        Ok(inserted == 1)
    }
}

fn parse_difficulty(raw: String) -> Difficulty {
    raw.parse().unwrap_or_default()
}

fn parse_timestamp(col: usize, raw: String) -> rusqlite::Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(col, "created_at".to_string(), rusqlite::types::Type::Text)
        })
}
