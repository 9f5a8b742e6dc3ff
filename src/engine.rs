use std::fmt;
use tracing::{debug, info, warn};

use crate::catalog::{BinLabel, Catalog, NoRepeatPicker, RoundPicker};
use crate::error::{QuizError, Result};
use crate::events::{notify, SessionEvent, SessionObserver};
use crate::policy::TickAdjustment;
use crate::session::{Difficulty, RoundState, SessionConfig, SessionState, SessionSummary};
use crate::sink::{SaveOutcome, SaveStatus, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Terminated,
}

/// Result of an accepted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_bin: BinLabel,
    pub points_delta: i64,
    pub terminated: bool,
}

/// Owns one quiz session from start to termination.
///
/// All mutation goes through the methods below; nothing here performs I/O.
/// Saving a summary is done by the caller with a [`Submission`] and the reply
/// is fed back through [`SessionEngine::record_save_result`].
pub struct SessionEngine {
    catalog: Catalog,
    config: SessionConfig,
    picker: Box<dyn RoundPicker>,
    adjustment: Option<Box<dyn TickAdjustment>>,
    observers: Vec<Box<dyn SessionObserver>>,
    phase: Phase,
    state: SessionState,
    round: Option<RoundState>,
    summary: Option<SessionSummary>,
    session_id: u64,
    save_status: SaveStatus,
    player_name: String,
}

impl SessionEngine {
    pub fn new(catalog: Catalog, config: SessionConfig) -> Self {
        Self {
            catalog,
            config,
            picker: Box::new(NoRepeatPicker::new()),
            adjustment: None,
            observers: Vec::new(),
            phase: Phase::Idle,
            state: SessionState::default(),
            round: None,
            summary: None,
            session_id: 0,
            save_status: SaveStatus::NotRequested,
            player_name: String::from("anonymous"),
        }
    }

    pub fn with_picker(mut self, picker: Box<dyn RoundPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_tick_adjustment(mut self, adjustment: Box<dyn TickAdjustment>) -> Self {
        self.adjustment = Some(adjustment);
        self
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Name recorded in the summary of the next session to terminate
    pub fn set_player_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        let trimmed = name.trim();
        self.player_name = if trimmed.is_empty() {
            String::from("anonymous")
        } else {
            trimmed.to_string()
        };
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Reset all counters and begin a new session.
    ///
    /// Any save still pending for the previous session is abandoned; its reply
    /// will be reported as [`SaveOutcome::Stale`].
    pub fn start(&mut self, difficulty: Difficulty) -> Result<&RoundState> {
        let budget = self.config.difficulties.budget(difficulty)?;

        if self.save_status == SaveStatus::Pending {
            debug!(session_id = self.session_id, "abandoning pending save");
        }

        self.session_id += 1;
        self.save_status = SaveStatus::NotRequested;
        self.summary = None;
        self.state = SessionState::new(difficulty, budget);
        self.state.running = true;
        self.phase = Phase::Running;

        info!(
            session_id = self.session_id,
            %difficulty,
            ?budget,
            "session started"
        );

        Ok(self.load_round(None))
    }

    /// Like [`SessionEngine::start`] with the difficulty given by name
    pub fn start_named(&mut self, difficulty: &str) -> Result<&RoundState> {
        let difficulty: Difficulty = difficulty.parse()?;
        self.start(difficulty)
    }

    /// Advance the clock by one second. Returns the summary on the tick that ends the session.
    pub fn tick(&mut self) -> Option<&SessionSummary> {
        if self.phase != Phase::Running {
            return None;
        }

        self.state.elapsed_secs += 1;

        if !self.state.is_timed() {
            return None;
        }

        self.state.time_remaining_ms = self.state.time_remaining_ms.saturating_sub(1000);

        let extra = self
            .adjustment
            .as_ref()
            .map_or(0, |a| a.extra_drain_ms(&self.state));
        if extra > 0 && self.state.time_remaining_ms > 0 {
            self.state.time_remaining_ms = self.state.time_remaining_ms.saturating_sub(extra);
            self.state.speedups += 1;
            debug!(
                session_id = self.session_id,
                extra_ms = extra,
                remaining_ms = self.state.time_remaining_ms,
                "clock sped up for strong performance"
            );
        }

        if self.state.time_remaining_ms == 0 {
            self.terminate();
            return self.summary.as_ref();
        }

        None
    }

    /// Score an answer for the live round.
    ///
    /// Outside a running session, or when the round was already answered, this
    /// does nothing and returns `None`. Double submissions from the UI land here.
    pub fn submit_answer(&mut self, chosen: BinLabel) -> Option<AnswerOutcome> {
        if self.phase != Phase::Running {
            return None;
        }

        let round = match self.round.as_mut() {
            Some(round) if !round.answered => round,
            _ => return None,
        };
        round.answered = true;

        let correct_bin = round.item.correct_bin;
        let item_name = round.item.name.clone();
        let index = round.index;
        let correct = chosen == correct_bin;
        let scoring = self.config.scoring;
        let before = self.state.score;

        if correct {
            self.state.correct_count += 1;
            self.state.streak += 1;
            self.state.max_streak = self.state.max_streak.max(self.state.streak);
            self.state.score = self.state.score.saturating_add(scoring.reward(self.state.streak));
        } else {
            self.state.wrong_count += 1;
            self.state.streak = 0;
            self.state.score = scoring.penalize(self.state.score);
            *self.state.bin_mistakes.entry(correct_bin).or_insert(0) += 1;
        }

        let points_delta = self.state.score.saturating_sub(before);

        debug!(
            session_id = self.session_id,
            item = %item_name,
            %chosen,
            %correct_bin,
            correct,
            score = self.state.score,
            "answer scored"
        );

        self.emit(SessionEvent::AnswerResult {
            session_id: self.session_id,
            correct,
            chosen,
            correct_bin,
            item_name,
            points_delta,
        });

        let mut terminated = false;
        if let Some(remaining) = self.state.questions_remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            terminated = *remaining == 0;
        }

        if terminated {
            self.terminate();
        } else {
            self.load_round(Some(index));
        }

        Some(AnswerOutcome {
            correct,
            correct_bin,
            points_delta,
            terminated,
        })
    }

    /// Parse a raw bin label at the boundary, then answer with it
    pub fn submit_answer_str(&mut self, chosen: &str) -> Result<Option<AnswerOutcome>> {
        let chosen: BinLabel = chosen.parse()?;
        Ok(self.submit_answer(chosen))
    }

    /// Stop a running session now, e.g. when the player quits mid-game
    pub fn end_early(&mut self) -> Option<&SessionSummary> {
        if self.phase != Phase::Running {
            return None;
        }
        self.terminate();
        self.summary.as_ref()
    }

    pub fn summary(&self) -> Result<&SessionSummary> {
        match (self.phase, self.summary.as_ref()) {
            (Phase::Terminated, Some(summary)) => Ok(summary),
            _ => Err(QuizError::NotTerminated),
        }
    }

    /// Hand out the summary for saving and mark the save as pending.
    /// Can be called again after a failed save to retry by hand.
    pub fn take_submission(&mut self) -> Result<Submission> {
        let summary = self.summary()?.clone();
        self.save_status = SaveStatus::Pending;
        Ok(Submission {
            session_id: self.session_id,
            summary,
        })
    }

    /// Apply the sink's reply for `session_id`. Replies for older sessions are ignored.
    pub fn record_save_result(&mut self, session_id: u64, result: Result<bool>) -> SaveOutcome {
        if session_id != self.session_id {
            debug!(
                stale = session_id,
                current = self.session_id,
                "ignoring save result for replaced session"
            );
            return SaveOutcome::Stale;
        }

        match result {
            Ok(true) => {
                info!(session_id, "session saved");
                self.save_status = SaveStatus::Saved;
                SaveOutcome::Saved
            }
            Ok(false) => {
                warn!(session_id, "result store rejected session");
                self.save_status = SaveStatus::NotSaved(String::from("rejected by store"));
                SaveOutcome::NotSaved
            }
            Err(err) => {
                warn!(session_id, error = %err, "session not saved");
                self.save_status = SaveStatus::NotSaved(err.to_string());
                SaveOutcome::NotSaved
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Terminated
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn load_round(&mut self, previous: Option<usize>) -> &RoundState {
        let index = self.picker.pick(&self.catalog, previous);
        // out of range picks land on the last item
        let index = index.min(self.catalog.len() - 1);
        let item = self.catalog.items()[index].clone();

        self.emit(SessionEvent::RoundChanged {
            session_id: self.session_id,
            item: item.clone(),
        });

        self.round.insert(RoundState {
            item,
            index,
            answered: false,
        })
    }

    fn terminate(&mut self) {
        self.phase = Phase::Terminated;
        self.state.running = false;
        self.round = None;

        let summary = SessionSummary::from_state(&self.player_name, &self.state);
        info!(
            session_id = self.session_id,
            score = summary.final_score,
            correct = summary.correct_count,
            wrong = summary.wrong_count,
            accuracy = summary.accuracy_percent,
            "session terminated"
        );

        self.emit(SessionEvent::SessionTerminated {
            session_id: self.session_id,
            summary: summary.clone(),
        });
        self.summary = Some(summary);
    }

    fn emit(&mut self, event: SessionEvent) {
        for observer in self.observers.iter_mut() {
            notify(observer.as_mut(), &event);
        }
    }
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("phase", &self.phase)
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("round", &self.round)
            .field("save_status", &self.save_status)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogItem, SequencePicker};
    use crate::policy::{PerformanceDrain, ScoringPolicy};
    use crate::session::{DifficultyTable, RoundBudget};
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    fn create_test_catalog() -> Catalog {
        Catalog::new(vec![
            CatalogItem::new("Blood Bag", "images/Blood Bag.avif", BinLabel::Yellow),
            CatalogItem::new("Vial", "images/Vial.jpg", BinLabel::Blue),
            CatalogItem::new("Catheter", "images/Catheter.jpg", BinLabel::Red),
            CatalogItem::new("Needles", "images/Needles.jpg", BinLabel::White),
        ])
        .unwrap()
    }

    // Rounds cycle Blood Bag, Vial, Catheter, Needles
    fn create_test_engine(config: SessionConfig) -> SessionEngine {
        SessionEngine::new(create_test_catalog(), config)
            .with_picker(Box::new(SequencePicker::new(vec![0, 1, 2, 3])))
    }

    fn answer_current(engine: &mut SessionEngine, correct: bool) -> Option<AnswerOutcome> {
        let bin = engine.round().map(|r| r.item.correct_bin)?;
        let chosen = if correct {
            bin
        } else if bin == BinLabel::Green {
            BinLabel::Red
        } else {
            BinLabel::Green
        };
        engine.submit_answer(chosen)
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = create_test_engine(SessionConfig::default());

        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.round().is_none());
        assert_matches!(engine.summary(), Err(QuizError::NotTerminated));
    }

    #[test]
    fn test_start_sets_budget_from_table() {
        let mut engine = create_test_engine(SessionConfig::default());

        engine.start(Difficulty::Hard).unwrap();
        assert_eq!(engine.state().total_time_secs(), 30);
        assert_eq!(engine.state().time_remaining_secs(), 30);

        engine.start(Difficulty::Easy).unwrap();
        assert_eq!(engine.state().total_time_secs(), 90);
        assert!(engine.is_running());
        assert!(engine.round().is_some());
    }

    #[test]
    fn test_start_rejects_missing_difficulty() {
        let mut difficulties = DifficultyTable::default();
        difficulties.set(Difficulty::Medium, None);
        let mut engine = create_test_engine(SessionConfig {
            difficulties,
            ..SessionConfig::default()
        });

        assert_matches!(
            engine.start(Difficulty::Medium),
            Err(QuizError::InvalidDifficulty(_))
        );
        assert_eq!(engine.phase(), Phase::Idle);
        assert_matches!(
            engine.start_named("impossible"),
            Err(QuizError::InvalidDifficulty(_))
        );
    }

    #[test]
    fn test_start_rejects_zero_budgets() {
        let mut difficulties = DifficultyTable::default();
        difficulties.set(Difficulty::Easy, Some(RoundBudget::Questions { count: 0 }));
        difficulties.set(Difficulty::Hard, Some(RoundBudget::Timed { secs: 0 }));
        let mut engine = create_test_engine(SessionConfig {
            difficulties,
            ..SessionConfig::default()
        });

        assert_matches!(
            engine.start(Difficulty::Easy),
            Err(QuizError::InvalidDifficulty(_))
        );
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.submit_answer(BinLabel::Yellow).is_none());
        assert_eq!(engine.state().answers(), 0);

        assert_matches!(
            engine.start(Difficulty::Hard),
            Err(QuizError::InvalidDifficulty(_))
        );
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.tick().is_none());
        assert_eq!(engine.session_id(), 0);
    }

    #[test]
    fn test_huge_configured_points_saturate_score() {
        let mut engine = create_test_engine(SessionConfig {
            scoring: ScoringPolicy {
                base_points: i64::MAX,
                penalty_points: i64::MAX,
                ..ScoringPolicy::default()
            },
            ..SessionConfig::default()
        });
        engine.start(Difficulty::Easy).unwrap();

        answer_current(&mut engine, true);
        answer_current(&mut engine, true);
        assert_eq!(engine.state().score, i64::MAX);

        answer_current(&mut engine, false);
        answer_current(&mut engine, false);
        answer_current(&mut engine, false);
        assert_eq!(engine.state().score, i64::MIN);
    }

    #[test]
    fn test_medium_scenario() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start_named("medium").unwrap();
        assert_eq!(engine.state().total_time_secs(), 60);

        // Blood Bag belongs in yellow
        let outcome = engine.submit_answer_str("Yellow").unwrap().unwrap();
        assert!(outcome.correct);
        assert_eq!(engine.state().score, 10);
        assert_eq!(engine.state().correct_count, 1);
        assert_eq!(engine.state().streak, 1);

        // Vial belongs in blue; red is wrong
        let outcome = engine.submit_answer_str("Red").unwrap().unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.correct_bin, BinLabel::Blue);
        assert_eq!(engine.state().score, 5);
        assert_eq!(engine.state().wrong_count, 1);
        assert_eq!(engine.state().streak, 0);

        for _ in 0..59 {
            assert!(engine.tick().is_none());
        }
        assert!(engine.tick().is_some());
        assert_eq!(engine.phase(), Phase::Terminated);

        let summary = engine.summary().unwrap();
        assert_eq!(summary.accuracy_percent, 50);
        assert_eq!(summary.final_score, 5);
        assert_eq!(summary.duration_secs, 60);
        assert_eq!(summary.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_tick_after_termination_is_noop() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start(Difficulty::Hard).unwrap();

        let mut terminations = 0;
        for _ in 0..30 {
            if engine.tick().is_some() {
                terminations += 1;
            }
        }
        assert_eq!(terminations, 1);

        let before = engine.state().clone();
        for _ in 0..5 {
            assert!(engine.tick().is_none());
        }
        assert_eq!(engine.state(), &before);
        assert_eq!(engine.state().time_remaining_secs(), 0);
    }

    #[test]
    fn test_tick_while_idle_is_noop() {
        let mut engine = create_test_engine(SessionConfig::default());
        assert!(engine.tick().is_none());
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_answer_outside_running_is_ignored() {
        let mut engine = create_test_engine(SessionConfig::default());
        assert!(engine.submit_answer(BinLabel::Yellow).is_none());

        engine.start(Difficulty::Hard).unwrap();
        for _ in 0..30 {
            engine.tick();
        }
        assert!(engine.submit_answer(BinLabel::Blue).is_none());
        assert_eq!(engine.state().answers(), 0);
    }

    #[test]
    fn test_streak_bonus_and_max_streak() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start(Difficulty::Easy).unwrap();

        answer_current(&mut engine, true);
        answer_current(&mut engine, true);
        let third = answer_current(&mut engine, true).unwrap();
        assert_eq!(third.points_delta, 15);
        assert_eq!(engine.state().score, 35);
        assert_eq!(engine.state().max_streak, 3);

        answer_current(&mut engine, false);
        assert_eq!(engine.state().streak, 0);
        assert_eq!(engine.state().max_streak, 3);

        answer_current(&mut engine, true);
        assert_eq!(engine.state().streak, 1);
        assert_eq!(engine.state().max_streak, 3);
    }

    #[test]
    fn test_negative_score_policy() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start(Difficulty::Easy).unwrap();
        answer_current(&mut engine, false);
        assert_eq!(engine.state().score, -5);

        let mut clamped = create_test_engine(SessionConfig {
            scoring: ScoringPolicy {
                allow_negative_score: false,
                ..ScoringPolicy::default()
            },
            ..SessionConfig::default()
        });
        clamped.start(Difficulty::Easy).unwrap();
        let outcome = answer_current(&mut clamped, false).unwrap();
        assert_eq!(clamped.state().score, 0);
        assert_eq!(outcome.points_delta, 0);
    }

    #[test]
    fn test_mistakes_tallied_by_correct_bin() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start(Difficulty::Easy).unwrap();

        // Blood Bag (yellow), Vial (blue)
        answer_current(&mut engine, false);
        answer_current(&mut engine, false);

        assert_eq!(engine.state().bin_mistakes.get(&BinLabel::Yellow), Some(&1));
        assert_eq!(engine.state().bin_mistakes.get(&BinLabel::Blue), Some(&1));
        assert_eq!(engine.state().bin_mistakes.get(&BinLabel::Red), None);
    }

    #[test]
    fn test_question_budget_terminates_after_count() {
        let mut difficulties = DifficultyTable::default();
        difficulties.set(Difficulty::Easy, Some(RoundBudget::Questions { count: 3 }));
        let mut engine = create_test_engine(SessionConfig {
            difficulties,
            ..SessionConfig::default()
        });
        engine.start(Difficulty::Easy).unwrap();

        // Ticks count elapsed time without ending the session
        for _ in 0..200 {
            assert!(engine.tick().is_none());
        }

        assert!(!answer_current(&mut engine, true).unwrap().terminated);
        assert!(!answer_current(&mut engine, false).unwrap().terminated);
        assert!(answer_current(&mut engine, true).unwrap().terminated);
        assert_eq!(engine.phase(), Phase::Terminated);
        assert!(engine.submit_answer(BinLabel::Red).is_none());

        let summary = engine.summary().unwrap();
        assert_eq!(summary.correct_count + summary.wrong_count, 3);
        assert_eq!(summary.duration_secs, 200);
        assert_eq!(summary.allotted_secs, 0);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start(Difficulty::Hard).unwrap();
        answer_current(&mut engine, true);
        answer_current(&mut engine, false);
        engine.end_early();

        engine.start(Difficulty::Medium).unwrap();
        let state = engine.state();
        assert_eq!(state.score, 0);
        assert_eq!(state.answers(), 0);
        assert_eq!(state.max_streak, 0);
        assert!(state.bin_mistakes.is_empty());
        assert_eq!(state.time_remaining_secs(), 60);
        assert_eq!(engine.session_id(), 2);
        assert_matches!(engine.summary(), Err(QuizError::NotTerminated));
    }

    #[test]
    fn test_end_early_records_elapsed_time() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start(Difficulty::Medium).unwrap();
        for _ in 0..12 {
            engine.tick();
        }

        let summary = engine.end_early().unwrap();
        assert_eq!(summary.duration_secs, 12);
        assert!(engine.end_early().is_none());
    }

    #[test]
    fn test_adaptive_drain_shortens_session() {
        let mut engine = create_test_engine(SessionConfig::default())
            .with_tick_adjustment(Box::new(PerformanceDrain::default()));
        engine.start(Difficulty::Medium).unwrap();

        for _ in 0..5 {
            answer_current(&mut engine, true);
        }

        let mut ticks = 0;
        while engine.tick().is_none() {
            ticks += 1;
            assert!(ticks < 60, "clock should run out before 60 ticks");
        }
        assert!(engine.state().speedups > 0);
        assert_eq!(engine.state().time_remaining_ms, 0);
    }

    #[test]
    fn test_observers_receive_events() {
        let (tx, rx) = mpsc::channel();
        let mut engine = create_test_engine(SessionConfig::default());
        engine.subscribe(Box::new(tx));

        engine.start(Difficulty::Hard).unwrap();
        answer_current(&mut engine, true);
        engine.end_early();

        let events: Vec<SessionEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 4);
        assert_matches!(&events[0], SessionEvent::RoundChanged { item, .. } if item.name == "Blood Bag");
        assert_matches!(
            &events[1],
            SessionEvent::AnswerResult { correct: true, correct_bin: BinLabel::Yellow, .. }
        );
        assert_matches!(&events[2], SessionEvent::RoundChanged { item, .. } if item.name == "Vial");
        assert_matches!(&events[3], SessionEvent::SessionTerminated { summary, .. } if summary.correct_count == 1);
    }

    #[test]
    fn test_player_name_in_summary() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.set_player_name("  Dr. Rao ");
        engine.start(Difficulty::Hard).unwrap();
        engine.end_early();
        assert_eq!(engine.summary().unwrap().player_name, "Dr. Rao");

        engine.set_player_name("   ");
        assert_eq!(engine.player_name(), "anonymous");
    }

    #[test]
    fn test_save_flow_and_stale_results() {
        let mut engine = create_test_engine(SessionConfig::default());
        engine.start(Difficulty::Hard).unwrap();
        assert_matches!(engine.take_submission(), Err(QuizError::NotTerminated));

        engine.end_early();
        let first = engine.take_submission().unwrap();
        assert_eq!(engine.save_status(), &SaveStatus::Pending);

        let outcome = engine.record_save_result(
            first.session_id,
            Err(QuizError::SinkUnavailable("offline".into())),
        );
        assert_eq!(outcome, SaveOutcome::NotSaved);
        assert_matches!(engine.save_status(), SaveStatus::NotSaved(_));

        // manual retry, then a new session replaces this one before the reply lands
        let retry = engine.take_submission().unwrap();
        engine.start(Difficulty::Hard).unwrap();
        assert_eq!(
            engine.record_save_result(retry.session_id, Ok(true)),
            SaveOutcome::Stale
        );
        assert_eq!(engine.save_status(), &SaveStatus::NotRequested);

        engine.end_early();
        let current = engine.take_submission().unwrap();
        assert_eq!(
            engine.record_save_result(current.session_id, Ok(true)),
            SaveOutcome::Saved
        );
        assert_eq!(engine.save_status(), &SaveStatus::Saved);
    }
}
