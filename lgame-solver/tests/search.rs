//! End-to-end tests for the search engine and agent.

use lgame_core::{evaluate, GameState, Score, Symmetry};
use lgame_solver::{Agent, DecisionSource, SearchConfig, SearchEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_positions(count: usize, seed: u64) -> Vec<GameState> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let mut state = GameState::opening();
        for _ in 0..rng.random_range(0..16) {
            let successors = state.successors();
            if successors.is_empty() {
                break;
            }
            state = successors[rng.random_range(0..successors.len())].1;
        }
        out.push(state);
    }
    out
}

fn full_window(engine: &mut SearchEngine, state: &GameState, depth: u32) -> Score {
    engine.reset();
    engine
        .search(state, depth, Score::NegInfinity, Score::Infinity, true)
        .0
}

// =============================================================================
// Search values
// =============================================================================

#[test]
fn depth_one_is_best_child_evaluation() {
    let mut engine = SearchEngine::new();
    for state in random_positions(20, 1) {
        let expected = state
            .successors()
            .iter()
            .map(|(_, child)| -evaluate(child))
            .max()
            .unwrap_or(Score::NegInfinity);
        assert_eq!(full_window(&mut engine, &state, 1), expected, "{}", state.notation());
    }
}

#[test]
fn symmetric_positions_search_alike() {
    let mut engine = SearchEngine::new();
    for state in random_positions(4, 2) {
        let score = full_window(&mut engine, &state, 2);
        for sym in Symmetry::ALL {
            let image = state.transformed(sym).unwrap();
            assert_eq!(full_window(&mut engine, &image, 2), score);
        }
    }
}

#[test]
fn returned_action_achieves_score() {
    let mut engine = SearchEngine::new();
    for state in random_positions(6, 3) {
        engine.reset();
        let (score, action) =
            engine.search(&state, 2, Score::NegInfinity, Score::Infinity, true);
        let Some(action) = action else {
            assert!(score == Score::NegInfinity);
            continue;
        };
        let child = state.play(&action).unwrap();
        let (child_score, _) =
            engine.search(&child, 1, Score::NegInfinity, Score::Infinity, false);
        assert_eq!(child_score, score);
    }
}

// =============================================================================
// Agent
// =============================================================================

#[test]
fn selfplay_moves_are_legal_and_reproducible() {
    let play = |seed: u64| {
        let mut agent = Agent::new(SearchConfig::seeded(1, seed)).unwrap();
        let mut state = GameState::opening();
        let mut history = Vec::new();
        for _ in 0..30 {
            let Some(decision) = agent.choose(&state) else {
                assert!(state.is_terminal());
                break;
            };
            state = state.play(&decision.action).unwrap();
            history.push(decision.action);
        }
        history
    };

    let first = play(17);
    assert!(!first.is_empty());
    assert_eq!(play(17), first);
}

#[test]
fn deterministic_agent_matches_engine() {
    for state in random_positions(6, 4) {
        let mut agent = Agent::new(SearchConfig::deterministic(2)).unwrap();
        let mut engine = SearchEngine::new();
        let (score, action) =
            engine.search(&state, 2, Score::NegInfinity, Score::Infinity, true);

        match agent.choose(&state) {
            None => assert!(state.is_terminal()),
            Some(decision) if decision.source == DecisionSource::Fallback => {
                assert_eq!(action, None);
                assert_eq!(score, Score::NegInfinity);
            }
            Some(decision) => {
                assert_eq!(Some(decision.action), action);
                assert_eq!(decision.score, score);
            }
        }
    }
}

#[test]
fn tie_breaking_stays_within_best_set() {
    let state = GameState::opening();
    let mut engine = SearchEngine::new();
    let scores: Vec<_> = state
        .successors()
        .into_iter()
        .map(|(action, child)| {
            engine.reset();
            let score = engine
                .search(&child, 1, Score::NegInfinity, Score::Infinity, false)
                .0;
            (action, score)
        })
        .collect();
    let best = scores.iter().map(|&(_, s)| s).max().unwrap();

    for seed in 0..8 {
        let mut agent = Agent::new(SearchConfig::seeded(2, seed)).unwrap();
        let decision = agent.choose(&state).unwrap();
        assert_eq!(decision.score, best);
        assert!(scores.contains(&(decision.action, best)));
        let tied = scores.iter().filter(|&&(_, s)| s == best).count();
        assert_eq!(decision.tied, tied);
    }
}

#[test]
fn invalid_depth_is_reported() {
    assert!(Agent::new(SearchConfig::seeded(0, 1)).is_err());
}
