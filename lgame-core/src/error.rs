use thiserror::Error;

use crate::Action;

/// Errors raised by the L-Game rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LGameError {
    /// A piece footprint leaves the board or lands on an occupied cell.
    /// Coordinates are 0-indexed and may be out of range.
    #[error("cannot place {piece} at ({x}, {y}): cell is off the board or occupied")]
    InvalidPlacement { piece: &'static str, x: i8, y: i8 },

    #[error("illegal move: {0}")]
    IllegalMove(Action),

    #[error("invalid notation: {0}")]
    InvalidNotation(String),

    #[error("search depth must be at least 1, got {0}")]
    InvalidDepth(u32),
}

/// Convenience Result type for L-Game operations.
pub type Result<T> = std::result::Result<T, LGameError>;
