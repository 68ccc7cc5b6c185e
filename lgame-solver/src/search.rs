//! Depth-limited minimax with alpha-beta pruning and a transposition table.
//!
//! Scores at the leaves come from the mobility evaluator, negated at
//! minimizing nodes so every value is seen from the root player's side.
//! The table is keyed on the canonical board, so positions that differ
//! only by a rotation or reflection share one entry. Stored actions are
//! kept in the canonical frame and mapped back on a hit.

use std::collections::{HashMap, HashSet};

use lgame_core::{evaluate, Action, Board, GameState, Player, Score};

use crate::stats::SearchStats;

/// Nodes between checks of the progress timer.
const LOG_CHECK_MASK: u64 = 0xFFF;

/// How a stored score relates to the true minimax value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bound {
    Exact,
    /// True value is at least the stored score (search failed high).
    Lower,
    /// True value is at most the stored score (search failed low).
    Upper,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct TableKey {
    board: Board,
    turn: Player,
    depth: u32,
    maximizing: bool,
}

#[derive(Clone, Copy, Debug)]
struct TableEntry {
    score: Score,
    bound: Bound,
    /// Best action in the canonical frame.
    action: Option<Action>,
}

impl TableEntry {
    #[inline]
    fn usable(&self, alpha: Score, beta: Score) -> bool {
        match self.bound {
            Bound::Exact => true,
            Bound::Lower => self.score >= beta,
            Bound::Upper => self.score <= alpha,
        }
    }
}

/// Alpha-beta searcher with a symmetry-merged transposition table.
pub struct SearchEngine {
    table: HashMap<TableKey, TableEntry>,
    /// Canonical boards seen since the last reset.
    visited: HashSet<Board>,
    pub stats: SearchStats,
    log_interval_secs: Option<u64>,
    ply: u64,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            visited: HashSet::new(),
            stats: SearchStats::new(),
            log_interval_secs: None,
            ply: 0,
        }
    }

    /// Print progress at most every `secs` seconds while searching.
    pub fn with_log_interval(mut self, secs: u64) -> Self {
        self.log_interval_secs = Some(secs);
        self
    }

    /// Forget every cached entry and start fresh statistics.
    pub fn reset(&mut self) {
        self.table.clear();
        self.visited.clear();
        self.stats = SearchStats::new();
        self.ply = 0;
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    pub fn unique_positions(&self) -> usize {
        self.visited.len()
    }

    /// Search `depth` plies below `state` within the window `(alpha, beta)`.
    ///
    /// Returns the backed-up score and the best action at this node.
    /// The action is `None` at depth 0, at terminal positions, and when
    /// no action beats the initial bound (every child loses for the
    /// maximizer, or wins for the minimizer).
    pub fn search(
        &mut self,
        state: &GameState,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> (Score, Option<Action>) {
        self.stats.nodes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.ply);
        self.maybe_log();

        if depth == 0 {
            return (self.leaf(state, maximizing), None);
        }

        let (canonical, sym) = state.board().canonical_with_symmetry();
        self.visited.insert(canonical);
        let key = TableKey {
            board: canonical,
            turn: state.turn(),
            depth,
            maximizing,
        };

        if let Some(entry) = self.table.get(&key) {
            if entry.usable(alpha, beta) {
                self.stats.cache_hits += 1;
                let action = entry.action.and_then(|a| a.transformed(sym.inverse()));
                return (entry.score, action);
            }
        }

        let successors = state.successors();
        if successors.is_empty() {
            self.stats.terminal_positions += 1;
            let score = self.leaf(state, maximizing);
            self.store(key, score, Bound::Exact, None);
            return (score, None);
        }

        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut best = if maximizing {
            Score::NegInfinity
        } else {
            Score::Infinity
        };
        let mut best_action = None;
        let total = successors.len();

        for (i, (action, child)) in successors.into_iter().enumerate() {
            self.ply += 1;
            let (score, _) = self.search(&child, depth - 1, alpha, beta, !maximizing);
            self.ply -= 1;

            if maximizing {
                if score > best {
                    best = score;
                    best_action = Some(action);
                }
                alpha = alpha.max(score);
            } else {
                if score < best {
                    best = score;
                    best_action = Some(action);
                }
                beta = beta.min(score);
            }

            if beta <= alpha {
                self.stats.cutoffs += 1;
                self.stats.branches_pruned += (total - i - 1) as u64;
                break;
            }
        }

        let bound = if best <= alpha_orig {
            Bound::Upper
        } else if best >= beta_orig {
            Bound::Lower
        } else {
            Bound::Exact
        };
        let stored = best_action.and_then(|a| a.transformed(sym));
        self.store(key, best, bound, stored);

        (best, best_action)
    }

    /// Leaf value from the root player's side.
    #[inline]
    fn leaf(&mut self, state: &GameState, maximizing: bool) -> Score {
        self.stats.leaf_evaluations += 1;
        let score = evaluate(state);
        if maximizing {
            score
        } else {
            -score
        }
    }

    #[inline]
    fn store(&mut self, key: TableKey, score: Score, bound: Bound, action: Option<Action>) {
        self.stats.cache_stores += 1;
        self.table.insert(
            key,
            TableEntry {
                score,
                bound,
                action,
            },
        );
    }

    fn maybe_log(&mut self) {
        let Some(interval) = self.log_interval_secs else {
            return;
        };
        if self.stats.nodes & LOG_CHECK_MASK == 0 && self.stats.should_log(interval) {
            self.stats.log_progress(self.table.len(), self.visited.len());
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}
