//! Mobility evaluation and terminal detection.

use std::fmt;
use std::ops::Neg;

use serde::Serialize;

use crate::GameState;

/// Position score from the perspective of the player to move.
///
/// Ordered `NegInfinity < Finite(_) < Infinity`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub enum Score {
    /// The side this score belongs to has lost.
    NegInfinity,
    Finite(i32),
    /// The side this score belongs to has won.
    Infinity,
}

impl Score {
    /// True for either infinity.
    #[inline]
    pub fn is_decisive(self) -> bool {
        !matches!(self, Score::Finite(_))
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        match self {
            Score::NegInfinity => Score::Infinity,
            Score::Finite(v) => Score::Finite(-v),
            Score::Infinity => Score::NegInfinity,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::NegInfinity => write!(f, "-inf"),
            Score::Finite(v) => write!(f, "{}", v),
            Score::Infinity => write!(f, "+inf"),
        }
    }
}

/// Score a state by mobility difference.
///
/// Returns `NegInfinity` if the mover has no legal action, `Infinity` if
/// the opponent would have none, otherwise mover count minus opponent count.
/// The mover check comes first: a trapped mover has lost regardless of the
/// opponent's mobility.
pub fn evaluate(state: &GameState) -> Score {
    let mover = state.legal_action_count();
    if mover == 0 {
        return Score::NegInfinity;
    }
    let opponent = state.with_turn(state.turn().opponent()).legal_action_count();
    if opponent == 0 {
        return Score::Infinity;
    }
    Score::Finite(mover as i32 - opponent as i32)
}
