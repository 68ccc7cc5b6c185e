//! Search configuration.

use lgame_core::{LGameError, Result};
use serde::Serialize;

/// Default lookahead in plies.
pub const DEFAULT_DEPTH: u32 = 2;

/// Options controlling how an agent searches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// Plies to look ahead. Must be at least 1.
    pub depth: u32,
    /// Seed for tie-breaking. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Pick uniformly among equally scored root actions instead of the
    /// first one generated.
    pub randomize_ties: bool,
    /// Print progress every N seconds while searching.
    pub log_interval_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            seed: None,
            randomize_ties: true,
            log_interval_secs: None,
        }
    }
}

impl SearchConfig {
    /// First-best search with no randomness.
    pub fn deterministic(depth: u32) -> Self {
        Self {
            depth,
            randomize_ties: false,
            ..Self::default()
        }
    }

    /// Random tie-breaking from a fixed seed.
    pub fn seeded(depth: u32, seed: u64) -> Self {
        Self {
            depth,
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_log_interval(mut self, secs: u64) -> Self {
        self.log_interval_secs = Some(secs);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(LGameError::InvalidDepth(self.depth));
        }
        Ok(())
    }
}
