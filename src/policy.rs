use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Point rules applied to each answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub base_points: i64,
    pub penalty_points: i64,
    /// 0 disables the streak bonus
    pub streak_threshold: u32,
    pub streak_bonus: i64,
    pub allow_negative_score: bool,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_points: 10,
            penalty_points: 5,
            streak_threshold: 3,
            streak_bonus: 5,
            allow_negative_score: true,
        }
    }
}

impl ScoringPolicy {
    /// Points for a correct answer that brought the streak to `streak`
    pub fn reward(&self, streak: u32) -> i64 {
        let bonus = if self.streak_threshold > 0 && streak > 0 && streak % self.streak_threshold == 0
        {
            self.streak_bonus
        } else {
            0
        };
        self.base_points.saturating_add(bonus)
    }

    /// Score after a wrong answer
    pub fn penalize(&self, score: i64) -> i64 {
        let next = score.saturating_sub(self.penalty_points);
        if self.allow_negative_score {
            next
        } else {
            next.max(0)
        }
    }
}

/// round(100 * correct / (correct + wrong)), half rounding up; 0 with no answers
pub fn accuracy_percent(correct: u32, wrong: u32) -> u32 {
    let total = u64::from(correct) + u64::from(wrong);
    if total == 0 {
        return 0;
    }
    ((200 * u64::from(correct) + total) / (2 * total)) as u32
}

/// Optional hook that can drain extra time from the clock on each tick
pub trait TickAdjustment {
    /// Milliseconds to remove on top of the regular one-second tick
    fn extra_drain_ms(&self, state: &SessionState) -> u64;
}

/// Speeds the clock up while the player is comfortably ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceDrain {
    /// correct answers must exceed wrong answers by more than this
    pub lead: u32,
    pub drain_ms: u64,
    /// no drain once the clock is at or below this many seconds
    pub floor_secs: u64,
}

impl Default for PerformanceDrain {
    fn default() -> Self {
        Self {
            lead: 3,
            drain_ms: 50,
            floor_secs: 10,
        }
    }
}

impl TickAdjustment for PerformanceDrain {
    fn extra_drain_ms(&self, state: &SessionState) -> u64 {
        let ahead = state.correct_count > state.wrong_count.saturating_add(self.lead);
        if ahead && state.time_remaining_ms > self.floor_secs * 1000 {
            self.drain_ms
        } else {
            0
        }
    }
}
