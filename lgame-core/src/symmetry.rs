//! D4 symmetries of the 4x4 board and canonicalization.
//!
//! Two positions related by a rotation or reflection have isomorphic game
//! trees, so the minimum encoding over all 8 images serves as a cache key
//! that merges them. Labels move rigidly with their cells.

use crate::{Action, Board, GameState, NeutralMove, PlayerPiece, Pos, BOARD_SIZE, NUM_CELLS};

const MAX: u8 = BOARD_SIZE - 1;

/// One of the 8 rigid symmetries of the square.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Symmetry {
    Identity,
    /// Rotate 90° clockwise.
    Rotate90,
    Rotate180,
    /// Rotate 270° clockwise.
    Rotate270,
    /// Flip left-right.
    FlipHorizontal,
    /// Flip top-bottom.
    FlipVertical,
    /// Reflect across the main diagonal.
    Transpose,
    /// Reflect across the anti-diagonal.
    AntiTranspose,
}

impl Symmetry {
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::FlipHorizontal,
        Symmetry::FlipVertical,
        Symmetry::Transpose,
        Symmetry::AntiTranspose,
    ];

    /// Where the cell at `pos` lands under this symmetry.
    #[inline]
    pub fn apply(self, pos: Pos) -> Pos {
        let (x, y) = (pos.x(), pos.y());
        let (nx, ny) = match self {
            Symmetry::Identity => (x, y),
            Symmetry::Rotate90 => (MAX - y, x),
            Symmetry::Rotate180 => (MAX - x, MAX - y),
            Symmetry::Rotate270 => (y, MAX - x),
            Symmetry::FlipHorizontal => (MAX - x, y),
            Symmetry::FlipVertical => (x, MAX - y),
            Symmetry::Transpose => (y, x),
            Symmetry::AntiTranspose => (MAX - y, MAX - x),
        };
        Pos::at(nx, ny)
    }

    /// The symmetry that undoes this one.
    #[inline]
    pub fn inverse(self) -> Symmetry {
        match self {
            Symmetry::Rotate90 => Symmetry::Rotate270,
            Symmetry::Rotate270 => Symmetry::Rotate90,
            other => other,
        }
    }
}

impl Board {
    /// Apply a symmetry to every cell.
    pub fn transform(&self, sym: Symmetry) -> Board {
        let mut result = Board::empty();
        for idx in 0..NUM_CELLS {
            let pos = Pos::from_index(idx);
            result.set_cell(sym.apply(pos), self.cell(pos));
        }
        result
    }

    /// Get all 8 symmetric images, in `Symmetry::ALL` order.
    pub fn all_symmetries(&self) -> [Board; 8] {
        Symmetry::ALL.map(|sym| self.transform(sym))
    }

    /// The lexicographically smallest symmetric image.
    pub fn canonical(&self) -> Board {
        self.canonical_with_symmetry().0
    }

    /// The smallest image together with a symmetry that produces it.
    pub fn canonical_with_symmetry(&self) -> (Board, Symmetry) {
        let mut best = (*self, Symmetry::Identity);
        for sym in &Symmetry::ALL[1..] {
            let image = self.transform(*sym);
            if image < best.0 {
                best = (image, *sym);
            }
        }
        best
    }
}

impl PlayerPiece {
    /// The placement covering the transformed footprint.
    pub fn transformed(self, sym: Symmetry) -> Option<PlayerPiece> {
        let cells = self.footprint().ok()?.map(|p| sym.apply(p));
        PlayerPiece::from_cells(&cells)
    }
}

impl Action {
    /// Map an action into the frame of a transformed board.
    pub fn transformed(self, sym: Symmetry) -> Option<Action> {
        Some(Action {
            piece: self.piece.transformed(sym)?,
            neutral: self.neutral.map(|NeutralMove { from, to }| NeutralMove {
                from: sym.apply(from),
                to: sym.apply(to),
            }),
        })
    }
}

impl GameState {
    /// Map the whole position through a symmetry. The side to move is kept.
    pub fn transformed(&self, sym: Symmetry) -> Option<GameState> {
        Some(GameState {
            player1: self.player1.transformed(sym)?,
            player2: self.player2.transformed(sym)?,
            neutral: self.neutral.map(|p| sym.apply(p)),
            turn: self.turn,
        })
    }
}
