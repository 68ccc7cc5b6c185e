//! L-Game search engine.
//!
//! Alpha-beta minimax over the rules in `lgame-core`, with a transposition
//! table merged across board symmetries and an agent that turns search
//! results into moves.

pub mod agent;
pub mod config;
pub mod search;
pub mod stats;

pub use agent::{heuristic_pick, Agent, Decision, DecisionSource};
pub use config::SearchConfig;
pub use search::{Bound, SearchEngine};
pub use stats::SearchStats;
