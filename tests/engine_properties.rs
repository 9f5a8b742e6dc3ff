// Property style checks of the session engine over many seeded random plays.

use assert_matches::assert_matches;
use binsort::catalog::{BinLabel, CatalogSource, EmbeddedCatalog, SequencePicker};
use binsort::policy::PerformanceDrain;
use binsort::session::{Difficulty, DifficultyTable, RoundBudget, SessionConfig};
use binsort::{Phase, QuizError, SessionEngine};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn engine() -> SessionEngine {
    let catalog = EmbeddedCatalog.load().unwrap();
    SessionEngine::new(catalog, SessionConfig::default())
}

fn random_bin(rng: &mut StdRng) -> BinLabel {
    BinLabel::ALL[rng.gen_range(0..BinLabel::ALL.len())]
}

#[test]
fn answer_count_matches_accepted_calls() {
    for seed in 0..50u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut engine = engine();

        // calls before start are not counted
        assert!(engine.submit_answer(BinLabel::Red).is_none());

        engine.start(Difficulty::Medium).unwrap();
        let mut accepted = 0u32;
        for _ in 0..rng.gen_range(0..200) {
            if rng.gen_bool(0.3) {
                engine.tick();
            } else if engine.submit_answer(random_bin(&mut rng)).is_some() {
                accepted += 1;
            }
        }

        let state = engine.state();
        assert_eq!(state.correct_count + state.wrong_count, accepted, "seed {seed}");
    }
}

#[test]
fn accuracy_stays_in_range() {
    let mut engine = engine();
    engine.start(Difficulty::Easy).unwrap();
    assert_eq!(engine.state().accuracy_percent(), 0);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..60 {
        engine.submit_answer(random_bin(&mut rng));
        let accuracy = engine.state().accuracy_percent();
        assert!(accuracy <= 100);
    }

    engine.end_early();
    assert!(engine.summary().unwrap().accuracy_percent <= 100);
}

#[test]
fn default_table_budgets() {
    let mut engine = engine();
    engine.start(Difficulty::Hard).unwrap();
    assert_eq!(engine.state().total_time_secs(), 30);
    engine.start(Difficulty::Medium).unwrap();
    assert_eq!(engine.state().total_time_secs(), 60);
    engine.start(Difficulty::Easy).unwrap();
    assert_eq!(engine.state().total_time_secs(), 90);
}

#[test]
fn unknown_difficulty_name_is_rejected() {
    let mut engine = engine();
    assert_matches!(
        engine.start_named("impossible"),
        Err(QuizError::InvalidDifficulty(_))
    );
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn ticking_total_time_terminates_exactly_once() {
    for difficulty in Difficulty::ALL {
        let mut engine = engine();
        engine.start(difficulty).unwrap();
        let total = engine.state().total_time_secs();

        let mut terminations = 0;
        for _ in 0..total {
            if engine.tick().is_some() {
                terminations += 1;
            }
        }
        assert_eq!(terminations, 1);
        assert_eq!(engine.phase(), Phase::Terminated);

        let frozen = engine.state().clone();
        for _ in 0..10 {
            assert!(engine.tick().is_none());
        }
        assert_eq!(engine.state(), &frozen);
    }
}

#[test]
fn streak_rules_hold_for_random_plays() {
    for seed in 0..30u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut engine = engine();
        engine.start(Difficulty::Easy).unwrap();

        let mut last_max = 0;
        for _ in 0..80 {
            let before = engine.state().streak;
            let correct_bin = engine.round().unwrap().item.correct_bin;
            let chosen = if rng.gen_bool(0.6) {
                correct_bin
            } else {
                random_bin(&mut rng)
            };

            let outcome = engine.submit_answer(chosen).unwrap();
            let state = engine.state();
            if outcome.correct {
                assert_eq!(state.streak, before + 1);
            } else {
                assert_eq!(state.streak, 0);
            }
            assert!(state.max_streak >= last_max);
            assert!(state.max_streak >= state.streak);
            last_max = state.max_streak;
        }
    }
}

#[test]
fn medium_example_scenario() {
    let catalog = EmbeddedCatalog.load().unwrap();
    let first_yellow = catalog
        .items()
        .iter()
        .position(|item| item.correct_bin == BinLabel::Yellow)
        .unwrap();
    let first_not_blue = catalog
        .items()
        .iter()
        .position(|item| item.correct_bin != BinLabel::Blue)
        .unwrap();

    let mut engine = SessionEngine::new(catalog, SessionConfig::default())
        .with_picker(Box::new(SequencePicker::new(vec![first_yellow, first_not_blue])));
    engine.start_named("medium").unwrap();
    assert_eq!(engine.state().total_time_secs(), 60);

    engine.submit_answer_str("Yellow").unwrap();
    assert_eq!(engine.state().score, 10);
    assert_eq!(engine.state().correct_count, 1);
    assert_eq!(engine.state().streak, 1);

    engine.submit_answer_str("blue").unwrap();
    assert_eq!(engine.state().score, 5);
    assert_eq!(engine.state().wrong_count, 1);
    assert_eq!(engine.state().streak, 0);

    for _ in 0..60 {
        engine.tick();
    }
    assert_eq!(engine.phase(), Phase::Terminated);
    assert_eq!(engine.summary().unwrap().accuracy_percent, 50);
}

#[test]
fn question_budget_ends_after_count_answers() {
    let mut table = DifficultyTable::default();
    table.set(Difficulty::Easy, Some(RoundBudget::Questions { count: 5 }));
    let config = SessionConfig {
        difficulties: table,
        ..SessionConfig::default()
    };
    let mut engine = SessionEngine::new(EmbeddedCatalog.load().unwrap(), config);
    engine.start(Difficulty::Easy).unwrap();

    // the clock never ends a question round
    for _ in 0..500 {
        assert!(engine.tick().is_none());
    }

    for n in 1..=5 {
        let outcome = engine.submit_answer(BinLabel::Green).unwrap();
        assert_eq!(outcome.terminated, n == 5);
    }
    assert_eq!(engine.phase(), Phase::Terminated);
    assert!(engine.submit_answer(BinLabel::Green).is_none());
    assert_eq!(engine.summary().unwrap().duration_secs, 500);
}

#[test]
fn adaptive_drain_never_goes_below_zero() {
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut engine =
            engine().with_tick_adjustment(Box::new(PerformanceDrain::default()));
        engine.start(Difficulty::Hard).unwrap();

        while engine.is_running() {
            let correct_bin = engine.round().unwrap().item.correct_bin;
            for _ in 0..rng.gen_range(0..4) {
                let chosen = if rng.gen_bool(0.9) {
                    correct_bin
                } else {
                    random_bin(&mut rng)
                };
                engine.submit_answer(chosen);
            }
            let before = engine.state().time_remaining_ms;
            engine.tick();
            let after = engine.state().time_remaining_ms;
            assert!(after <= before);
        }

        let state = engine.state();
        assert_eq!(state.time_remaining_ms, 0);
        assert!(state.elapsed_secs <= 30);
    }
}
