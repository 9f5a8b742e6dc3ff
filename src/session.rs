use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::catalog::{BinLabel, CatalogItem};
use crate::error::{QuizError, Result};
use crate::policy::ScoringPolicy;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(QuizError::InvalidDifficulty(raw.trim().to_string())),
        }
    }
}

/// How a session ends: when the clock runs out, or after a number of answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundBudget {
    Timed { secs: u64 },
    Questions { count: u32 },
}

impl RoundBudget {
    /// Seconds on the clock at start; 0 for question budgets
    pub fn total_secs(&self) -> u64 {
        match self {
            RoundBudget::Timed { secs } => *secs,
            RoundBudget::Questions { .. } => 0,
        }
    }
}

/// Difficulty to budget mapping. A missing entry makes that difficulty unplayable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: Option<RoundBudget>,
    pub medium: Option<RoundBudget>,
    pub hard: Option<RoundBudget>,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: Some(RoundBudget::Timed { secs: 90 }),
            medium: Some(RoundBudget::Timed { secs: 60 }),
            hard: Some(RoundBudget::Timed { secs: 30 }),
        }
    }
}

impl DifficultyTable {
    pub fn budget(&self, difficulty: Difficulty) -> Result<RoundBudget> {
        let entry = match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        };
        match entry {
            // an empty budget could never be played
            None
            | Some(RoundBudget::Timed { secs: 0 })
            | Some(RoundBudget::Questions { count: 0 }) => {
                Err(QuizError::InvalidDifficulty(difficulty.to_string()))
            }
            Some(budget) => Ok(budget),
        }
    }

    pub fn set(&mut self, difficulty: Difficulty, budget: Option<RoundBudget>) {
        match difficulty {
            Difficulty::Easy => self.easy = budget,
            Difficulty::Medium => self.medium = budget,
            Difficulty::Hard => self.hard = budget,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    pub difficulties: DifficultyTable,
    pub scoring: ScoringPolicy,
}

/// The item on screen and whether it has been answered
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub item: CatalogItem,
    pub index: usize,
    pub answered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub score: i64,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub time_remaining_ms: u64,
    pub total_time_ms: u64,
    pub elapsed_secs: u64,
    pub questions_remaining: Option<u32>,
    pub difficulty: Difficulty,
    pub running: bool,
    // Per correct-bin count of wrong answers
    pub bin_mistakes: BTreeMap<BinLabel, u32>,
    pub speedups: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            correct_count: 0,
            wrong_count: 0,
            streak: 0,
            max_streak: 0,
            time_remaining_ms: 0,
            total_time_ms: 0,
            elapsed_secs: 0,
            questions_remaining: None,
            difficulty: Difficulty::default(),
            running: false,
            bin_mistakes: BTreeMap::new(),
            speedups: 0,
        }
    }
}

impl SessionState {
    pub fn new(difficulty: Difficulty, budget: RoundBudget) -> Self {
        let total_time_ms = budget.total_secs() * 1000;
        Self {
            time_remaining_ms: total_time_ms,
            total_time_ms,
            questions_remaining: match budget {
                RoundBudget::Questions { count } => Some(count),
                RoundBudget::Timed { .. } => None,
            },
            difficulty,
            ..Self::default()
        }
    }

    /// Whole seconds left, rounded up so it reads 0 only once the clock is out
    pub fn time_remaining_secs(&self) -> u64 {
        self.time_remaining_ms.div_ceil(1000)
    }

    pub fn total_time_secs(&self) -> u64 {
        self.total_time_ms / 1000
    }

    pub fn answers(&self) -> u32 {
        self.correct_count + self.wrong_count
    }

    pub fn accuracy_percent(&self) -> u32 {
        crate::policy::accuracy_percent(self.correct_count, self.wrong_count)
    }

    pub fn is_timed(&self) -> bool {
        self.questions_remaining.is_none()
    }
}

/// Snapshot handed to the result sink once a session ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub player_name: String,
    pub final_score: i64,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub accuracy_percent: u32,
    pub duration_secs: u64,
    pub difficulty: Difficulty,
    pub max_streak: u32,
    pub allotted_secs: u64,
}

impl SessionSummary {
    pub fn from_state(player_name: &str, state: &SessionState) -> Self {
        Self {
            player_name: player_name.to_string(),
            final_score: state.score,
            correct_count: state.correct_count,
            wrong_count: state.wrong_count,
            accuracy_percent: state.accuracy_percent(),
            duration_secs: state.elapsed_secs,
            difficulty: state.difficulty,
            max_streak: state.max_streak,
            allotted_secs: state.total_time_secs(),
        }
    }
}
