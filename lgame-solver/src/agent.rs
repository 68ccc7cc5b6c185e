//! Move selection on top of the search engine.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use lgame_core::{evaluate, Action, GameState, Result, Score};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::SearchConfig;
use crate::search::SearchEngine;

/// Where a chosen action came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum DecisionSource {
    /// The unique best action found by search.
    Search,
    /// Drawn at random from several equally scored best actions.
    TieBreak,
    /// Search saw only losses; picked by one-ply mobility instead.
    Fallback,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Decision {
    pub action: Action,
    /// Search score, or the one-ply evaluation for a fallback.
    pub score: Score,
    pub source: DecisionSource,
    /// How many root actions shared the best score.
    pub tied: usize,
}

/// A searching player.
pub struct Agent {
    config: SearchConfig,
    engine: SearchEngine,
    rng: StdRng,
}

impl Agent {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut engine = SearchEngine::new();
        if let Some(secs) = config.log_interval_secs {
            engine = engine.with_log_interval(secs);
        }
        Ok(Self { config, engine, rng })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Engine of the most recent decision, for statistics.
    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Pick an action for the side to move, or `None` if it has lost.
    ///
    /// The table is cleared first so each decision is independent.
    pub fn choose(&mut self, state: &GameState) -> Option<Decision> {
        self.engine.reset();
        let successors = state.successors();
        if successors.is_empty() {
            return None;
        }

        let searched = if self.config.randomize_ties {
            self.search_with_ties(&successors)
        } else {
            let (score, action) = self.engine.search(
                state,
                self.config.depth,
                Score::NegInfinity,
                Score::Infinity,
                true,
            );
            action.map(|action| Decision {
                action,
                score,
                source: DecisionSource::Search,
                tied: 1,
            })
        };

        searched.or_else(|| {
            self.engine.stats.fallbacks += 1;
            heuristic_pick(&successors)
        })
    }

    /// Score every root action with a full window and draw among the best.
    fn search_with_ties(&mut self, successors: &[(Action, GameState)]) -> Option<Decision> {
        let depth = self.config.depth - 1;
        let scores: Vec<Score> = successors
            .iter()
            .map(|(_, child)| {
                self.engine
                    .search(child, depth, Score::NegInfinity, Score::Infinity, false)
                    .0
            })
            .collect();

        let best = scores.iter().copied().max()?;
        if best == Score::NegInfinity {
            return None;
        }
        let tied: Vec<usize> = (0..scores.len()).filter(|&i| scores[i] == best).collect();
        let pick = tied[self.rng.random_range(0..tied.len())];

        Some(Decision {
            action: successors[pick].0,
            score: best,
            source: if tied.len() > 1 {
                DecisionSource::TieBreak
            } else {
                DecisionSource::Search
            },
            tied: tied.len(),
        })
    }
}

/// Rank actions by the mover's one-ply outlook and take the best.
///
/// Each child is scored from the mover's side. Ties go to the action
/// generated first.
pub fn heuristic_pick(successors: &[(Action, GameState)]) -> Option<Decision> {
    let mut queue: BinaryHeap<(Score, Reverse<usize>)> = successors
        .iter()
        .enumerate()
        .map(|(i, (_, child))| (-evaluate(child), Reverse(i)))
        .collect();

    queue.pop().map(|(score, Reverse(i))| Decision {
        action: successors[i].0,
        score,
        source: DecisionSource::Fallback,
        tied: 1,
    })
}
