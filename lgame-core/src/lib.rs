//! L-Game rules engine with a bit-packed 4x4 board.
//!
//! # Board Encoding (32-bit)
//!
//! ```text
//! 16 cells × 2 bits. Cell 0 lives in the two most significant bits, so the
//! numeric order of encodings equals the row-major lexicographic order of the
//! cell labels.
//!
//! Cell labels: 0 = empty, 1 = player one, 2 = player two, 3 = neutral
//!
//! Cell indices (row-major, index = y * 4 + x):
//!    0  1  2  3
//!    4  5  6  7
//!    8  9 10 11
//!   12 13 14 15
//! ```
//!
//! # L-piece Geometry
//!
//! An L-piece is placed by an anchor cell and a primary orientation. The
//! secondary orientation is derived from which half of the board the anchor
//! lies in, and the (primary, secondary) pair selects four cell offsets.
//! Every one of the 48 physical L placements on a 4x4 board corresponds to
//! exactly one in-bounds (anchor, primary) pair.

use std::fmt;

use serde::Serialize;

pub mod error;
pub mod eval;
pub mod notation;
pub mod symmetry;

pub use error::{LGameError, Result};
pub use eval::{evaluate, Score};
pub use symmetry::Symmetry;

/// Board side length.
pub const BOARD_SIZE: u8 = 4;
/// Number of cells on the board.
pub const NUM_CELLS: usize = 16;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Board label for this player's L-piece.
    #[inline]
    pub fn cell(self) -> Cell {
        match self {
            Player::One => Cell::One,
            Player::Two => Cell::Two,
        }
    }

    fn piece_name(self) -> &'static str {
        match self {
            Player::One => "player 1",
            Player::Two => "player 2",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Heading of an L-piece's long axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize)]
pub enum Orientation {
    N,
    E,
    S,
    W,
}

impl Orientation {
    /// All orientations in generation order.
    pub const ALL: [Orientation; 4] = [Orientation::N, Orientation::E, Orientation::S, Orientation::W];

    /// Single-letter name.
    pub fn letter(self) -> char {
        match self {
            Orientation::N => 'N',
            Orientation::E => 'E',
            Orientation::S => 'S',
            Orientation::W => 'W',
        }
    }

    /// Parse a letter, case-insensitive.
    pub fn from_letter(c: char) -> Option<Orientation> {
        match c.to_ascii_uppercase() {
            'N' => Some(Orientation::N),
            'E' => Some(Orientation::E),
            'S' => Some(Orientation::S),
            'W' => Some(Orientation::W),
            _ => None,
        }
    }

    /// True for a north/south heading.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Orientation::N | Orientation::S)
    }

    /// Check whether two orientations are at right angles.
    #[inline]
    pub fn is_perpendicular(self, other: Orientation) -> bool {
        self.is_vertical() != other.is_vertical()
    }

    /// Secondary orientation for an anchor at `pos`.
    ///
    /// E/W pieces get N in the top half (rows 0-1) and S otherwise.
    /// N/S pieces get W in the left half (columns 0-1) and E otherwise.
    #[inline]
    pub fn secondary(self, pos: Pos) -> Orientation {
        if self.is_vertical() {
            if pos.x() < BOARD_SIZE / 2 {
                Orientation::W
            } else {
                Orientation::E
            }
        } else if pos.y() < BOARD_SIZE / 2 {
            Orientation::N
        } else {
            Orientation::S
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ========== Geometry Table ==========

/// Cell offsets `(dx, dy)` relative to the anchor for a (primary, secondary)
/// orientation pair. Returns None for non-perpendicular pairs.
pub const fn geometry(primary: Orientation, secondary: Orientation) -> Option<[(i8, i8); 4]> {
    use Orientation::*;
    match (primary, secondary) {
        (N, E) => Some([(0, 0), (-1, 0), (-2, 0), (0, -1)]),
        (N, W) => Some([(0, 0), (1, 0), (2, 0), (0, -1)]),
        (E, N) => Some([(0, 0), (0, 1), (0, 2), (1, 0)]),
        (E, S) => Some([(0, 0), (0, -1), (0, -2), (1, 0)]),
        (S, E) => Some([(0, 0), (-1, 0), (-2, 0), (0, 1)]),
        (S, W) => Some([(0, 0), (1, 0), (2, 0), (0, 1)]),
        (W, N) => Some([(0, 0), (0, 1), (0, 2), (-1, 0)]),
        (W, S) => Some([(0, 0), (0, -1), (0, -2), (-1, 0)]),
        _ => None,
    }
}

/// Position on the 4x4 board. Always in bounds.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize)]
pub struct Pos {
    x: u8,
    y: u8,
}

impl Pos {
    /// Create a position from column `x` and row `y` (0-3 each).
    #[inline]
    pub const fn new(x: u8, y: u8) -> Option<Pos> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Pos { x, y })
        } else {
            None
        }
    }

    #[inline]
    pub(crate) const fn at(x: u8, y: u8) -> Pos {
        Pos { x, y }
    }

    /// Column (0-3).
    #[inline]
    pub const fn x(self) -> u8 {
        self.x
    }

    /// Row (0-3).
    #[inline]
    pub const fn y(self) -> u8 {
        self.y
    }

    /// Row-major cell index (0-15).
    #[inline]
    pub const fn index(self) -> usize {
        (self.y * BOARD_SIZE + self.x) as usize
    }

    /// Inverse of `index`.
    #[inline]
    pub const fn from_index(idx: usize) -> Pos {
        Pos::at(idx as u8 % BOARD_SIZE, idx as u8 / BOARD_SIZE)
    }

    /// Shift by a relative offset. Err carries the off-board coordinate.
    #[inline]
    pub fn offset(self, dx: i8, dy: i8) -> std::result::Result<Pos, (i8, i8)> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        if (0..BOARD_SIZE as i8).contains(&x) && (0..BOARD_SIZE as i8).contains(&y) {
            Ok(Pos::at(x as u8, y as u8))
        } else {
            Err((x, y))
        }
    }

    /// Iterate over all 16 positions, column by column (x outer, y inner).
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..BOARD_SIZE).flat_map(|x| (0..BOARD_SIZE).map(move |y| Pos::at(x, y)))
    }
}

/// An L-piece placement: anchor cell plus primary orientation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct PlayerPiece {
    pub position: Pos,
    pub orientation: Orientation,
}

impl PlayerPiece {
    #[inline]
    pub const fn new(position: Pos, orientation: Orientation) -> PlayerPiece {
        PlayerPiece { position, orientation }
    }

    /// Secondary orientation derived from the anchor's board half.
    #[inline]
    pub fn secondary(self) -> Orientation {
        self.orientation.secondary(self.position)
    }

    /// Absolute cells covered by this piece.
    /// Err carries the first coordinate that falls off the board.
    pub fn footprint(self) -> std::result::Result<[Pos; 4], (i8, i8)> {
        let secondary = self.secondary();
        // The secondary orientation is perpendicular by construction.
        let offsets = geometry(self.orientation, secondary).unwrap_or([(0, 0); 4]);
        let mut cells = [self.position; 4];
        for (cell, (dx, dy)) in cells.iter_mut().zip(offsets) {
            *cell = self.position.offset(dx, dy)?;
        }
        Ok(cells)
    }

    /// Footprint as a cell bitmask (bit = cell index), if in bounds.
    pub fn mask(self) -> Option<u16> {
        self.footprint()
            .ok()
            .map(|cells| cells.iter().fold(0u16, |m, p| m | (1 << p.index())))
    }

    /// Every (anchor, orientation) pair in generation order, including
    /// off-board ones.
    pub fn candidates() -> impl Iterator<Item = PlayerPiece> {
        Pos::all().flat_map(|pos| Orientation::ALL.into_iter().map(move |o| PlayerPiece::new(pos, o)))
    }

    /// Find the placement covering exactly these cells.
    pub fn from_cells(cells: &[Pos; 4]) -> Option<PlayerPiece> {
        let target = cells.iter().fold(0u16, |m, p| m | (1 << p.index()));
        PlayerPiece::candidates().find(|piece| piece.mask() == Some(target))
    }
}

/// Relocation of one neutral piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct NeutralMove {
    pub from: Pos,
    pub to: Pos,
}

/// One ply: the mover's new L placement plus an optional neutral relocation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct Action {
    pub piece: PlayerPiece,
    pub neutral: Option<NeutralMove>,
}

impl Action {
    /// L move without touching a neutral piece.
    #[inline]
    pub const fn slide(piece: PlayerPiece) -> Action {
        Action { piece, neutral: None }
    }

    /// L move followed by moving the neutral at `from` to `to`.
    #[inline]
    pub const fn with_neutral(piece: PlayerPiece, from: Pos, to: Pos) -> Action {
        Action {
            piece,
            neutral: Some(NeutralMove { from, to }),
        }
    }
}

/// Board cell label.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Cell {
    Empty = 0,
    One = 1,
    Two = 2,
    Neutral = 3,
}

impl Cell {
    #[inline]
    fn from_bits(bits: u32) -> Cell {
        match bits & 0b11 {
            0 => Cell::Empty,
            1 => Cell::One,
            2 => Cell::Two,
            _ => Cell::Neutral,
        }
    }

    /// Character used by the plain-text board.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::One => '1',
            Cell::Two => '2',
            Cell::Neutral => 'N',
        }
    }
}

/// Occupancy grid derived from a `GameState`.
///
/// See module documentation for encoding details.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Default)]
pub struct Board(pub u32);

impl Board {
    /// Bits per cell.
    const CELL_BITS: u32 = 2;
    /// Mask for a single cell.
    const CELL_MASK: u32 = 0b11;

    /// Create an empty board.
    #[inline]
    pub const fn empty() -> Board {
        Board(0)
    }

    #[inline]
    const fn shift(idx: usize) -> u32 {
        (NUM_CELLS as u32 - 1 - idx as u32) * Self::CELL_BITS
    }

    /// Label at a position.
    #[inline]
    pub fn cell(&self, pos: Pos) -> Cell {
        Cell::from_bits(self.0 >> Self::shift(pos.index()))
    }

    /// Overwrite the label at a position.
    #[inline]
    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        let shift = Self::shift(pos.index());
        self.0 = (self.0 & !(Self::CELL_MASK << shift)) | ((cell as u32) << shift);
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.cell(pos) == Cell::Empty
    }

    /// Labels in row-major order.
    pub fn cells(&self) -> [Cell; NUM_CELLS] {
        let mut cells = [Cell::Empty; NUM_CELLS];
        for (idx, cell) in cells.iter_mut().enumerate() {
            *cell = self.cell(Pos::from_index(idx));
        }
        cells
    }

    /// Number of cells carrying the given label.
    pub fn count(&self, label: Cell) -> usize {
        self.cells().iter().filter(|&&c| c == label).count()
    }

    /// Check that every cell of the placement is on the board and empty.
    pub fn fits(&self, piece: PlayerPiece) -> bool {
        match piece.footprint() {
            Ok(cells) => cells.iter().all(|&p| self.is_empty(p)),
            Err(_) => false,
        }
    }

    // ========== Board Builder ==========

    /// Render a state into an occupancy grid, optionally leaving one
    /// player's L-piece off the board.
    ///
    /// Fails with `InvalidPlacement` if any footprint leaves the board or
    /// overlaps another piece.
    pub fn render(state: &GameState, exclude: Option<Player>) -> Result<Board> {
        let mut board = Board::empty();
        for player in [Player::One, Player::Two] {
            if exclude == Some(player) {
                continue;
            }
            board.stamp_piece(state.piece(player), player)?;
        }
        for &pos in &state.neutral {
            board.stamp(pos, Cell::Neutral, "neutral piece")?;
        }
        Ok(board)
    }

    /// Render a state that already satisfies the placement invariants.
    fn build(state: &GameState, exclude: Option<Player>) -> Board {
        let board = Board::render(state, exclude);
        debug_assert!(board.is_ok(), "GameState invariant broken: {:?}", board);
        board.unwrap_or_default()
    }

    fn stamp_piece(&mut self, piece: PlayerPiece, player: Player) -> Result<()> {
        let name = player.piece_name();
        let cells = piece
            .footprint()
            .map_err(|(x, y)| LGameError::InvalidPlacement { piece: name, x, y })?;
        for pos in cells {
            self.stamp(pos, player.cell(), name)?;
        }
        Ok(())
    }

    fn stamp(&mut self, pos: Pos, cell: Cell, name: &'static str) -> Result<()> {
        if !self.is_empty(pos) {
            return Err(LGameError::InvalidPlacement {
                piece: name,
                x: pos.x() as i8,
                y: pos.y() as i8,
            });
        }
        self.set_cell(pos, cell);
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    1 2 3 4")?;
        writeln!(f, "  +---------+")?;
        for y in 0..BOARD_SIZE {
            write!(f, "{} |", y + 1)?;
            for x in 0..BOARD_SIZE {
                write!(f, " {}", self.cell(Pos::at(x, y)).symbol())?;
            }
            writeln!(f, " |")?;
        }
        write!(f, "  +---------+")
    }
}

/// Complete game position. Immutable: every transition returns a new state.
///
/// Construction validates placements, so every `GameState` renders cleanly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GameState {
    player1: PlayerPiece,
    player2: PlayerPiece,
    neutral: [Pos; 2],
    turn: Player,
}

impl GameState {
    /// Build a state, rejecting off-board or overlapping placements.
    pub fn new(
        player1: PlayerPiece,
        player2: PlayerPiece,
        neutral: [Pos; 2],
        turn: Player,
    ) -> Result<GameState> {
        let state = GameState {
            player1,
            player2,
            neutral,
            turn,
        };
        Board::render(&state, None)?;
        Ok(state)
    }

    /// Standard opening: player 1 at (2,0)/W, player 2 at (1,3)/E,
    /// neutrals in the (0,0) and (3,3) corners, player 1 to move.
    pub const fn opening() -> GameState {
        GameState {
            player1: PlayerPiece::new(Pos::at(2, 0), Orientation::W),
            player2: PlayerPiece::new(Pos::at(1, 3), Orientation::E),
            neutral: [Pos::at(0, 0), Pos::at(3, 3)],
            turn: Player::One,
        }
    }

    #[inline]
    pub fn player1(&self) -> PlayerPiece {
        self.player1
    }

    #[inline]
    pub fn player2(&self) -> PlayerPiece {
        self.player2
    }

    /// L-piece owned by `player`.
    #[inline]
    pub fn piece(&self, player: Player) -> PlayerPiece {
        match player {
            Player::One => self.player1,
            Player::Two => self.player2,
        }
    }

    #[inline]
    pub fn neutrals(&self) -> [Pos; 2] {
        self.neutral
    }

    /// Player whose L-piece moves this ply.
    #[inline]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Same position with a different side to move.
    #[inline]
    pub fn with_turn(&self, turn: Player) -> GameState {
        GameState { turn, ..*self }
    }

    fn with_piece(&self, player: Player, piece: PlayerPiece) -> GameState {
        let mut next = *self;
        match player {
            Player::One => next.player1 = piece,
            Player::Two => next.player2 = piece,
        }
        next
    }

    /// Full occupancy grid.
    pub fn board(&self) -> Board {
        Board::build(self, None)
    }

    // ========== Move Generation ==========

    /// L placements open to the mover, excluding the current one.
    /// Returns the placements together with the board the mover was lifted from.
    fn placements(&self) -> (Board, impl Iterator<Item = PlayerPiece>) {
        let current = self.piece(self.turn);
        let lifted = Board::build(self, Some(self.turn));
        let iter = PlayerPiece::candidates().filter(move |&piece| piece != current && lifted.fits(piece));
        (lifted, iter)
    }

    /// Generate all legal actions for the player to move.
    ///
    /// For each valid L placement this yields one action without a neutral
    /// move, then one per (neutral piece, empty destination). Leaving a
    /// neutral where it is collapses into the no-neutral action, so the
    /// result never contains duplicates. Empty exactly when the mover is
    /// trapped.
    pub fn legal_actions(&self) -> Vec<Action> {
        let (_, placements) = self.placements();
        let mut actions = Vec::with_capacity(128);

        for piece in placements {
            let placed = Board::build(&self.with_piece(self.turn, piece), None);
            actions.push(Action::slide(piece));
            for &from in &self.neutral {
                for to in Pos::all() {
                    if placed.is_empty(to) {
                        actions.push(Action::with_neutral(piece, from, to));
                    }
                }
            }
        }

        actions
    }

    /// Count legal actions without materialising them.
    pub fn legal_action_count(&self) -> usize {
        let (lifted, placements) = self.placements();
        // Each placement covers four previously empty cells.
        let empty_after = lifted.count(Cell::Empty).saturating_sub(4);
        let per_placement = 1 + self.neutral.len() * empty_after;
        placements.count() * per_placement
    }

    /// Legal actions paired with the states they lead to.
    pub fn successors(&self) -> Vec<(Action, GameState)> {
        self.legal_actions()
            .into_iter()
            .map(|action| (action, self.apply(&action)))
            .collect()
    }

    /// Apply a generated action. Callers must only pass members of
    /// `legal_actions()`; use `play` for untrusted input.
    fn apply(&self, action: &Action) -> GameState {
        let mut next = self.with_piece(self.turn, action.piece);
        if let Some(NeutralMove { from, to }) = action.neutral {
            if let Some(slot) = next.neutral.iter_mut().find(|n| **n == from) {
                *slot = to;
            }
        }
        next.turn = self.turn.opponent();
        next
    }

    /// Apply an action after checking it is legal here.
    pub fn play(&self, action: &Action) -> Result<GameState> {
        if !self.legal_actions().contains(action) {
            return Err(LGameError::IllegalMove(*action));
        }
        Ok(self.apply(action))
    }

    /// True if the player to move has no legal action.
    pub fn is_terminal(&self) -> bool {
        self.legal_action_count() == 0
    }

    /// Winner of a terminal position (the player not to move).
    pub fn winner(&self) -> Option<Player> {
        if self.is_terminal() {
            Some(self.turn.opponent())
        } else {
            None
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::opening()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pos(x: u8, y: u8) -> Pos {
        Pos::new(x, y).unwrap()
    }

    fn piece(x: u8, y: u8, o: Orientation) -> PlayerPiece {
        PlayerPiece::new(pos(x, y), o)
    }

    fn state(p1: PlayerPiece, p2: PlayerPiece, n1: Pos, n2: Pos, turn: Player) -> GameState {
        GameState::new(p1, p2, [n1, n2], turn).unwrap()
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
        assert_eq!(Player::from_bits(2), Some(Player::Two));
        assert_eq!(Player::from_bits(3), None);
    }

    #[test]
    fn test_pos_bounds() {
        assert!(Pos::new(3, 3).is_some());
        assert!(Pos::new(4, 0).is_none());
        assert!(Pos::new(0, 4).is_none());
        for idx in 0..NUM_CELLS {
            assert_eq!(Pos::from_index(idx).index(), idx);
        }
        assert_eq!(Pos::all().count(), 16);
    }

    #[test]
    fn test_pos_offset() {
        assert_eq!(pos(1, 1).offset(1, -1), Ok(pos(2, 0)));
        assert_eq!(pos(0, 0).offset(-1, 0), Err((-1, 0)));
        assert_eq!(pos(3, 2).offset(0, 2), Err((3, 4)));
    }

    // ========== Geometry Tests ==========

    #[test]
    fn test_secondary_orientation_cases() {
        use Orientation::*;
        let cases = [
            (N, (0, 1), W),
            (N, (0, 2), W),
            (N, (0, 3), W),
            (N, (2, 3), E),
            (N, (3, 2), E),
            (N, (3, 1), E),
            (N, (1, 3), W),
            (N, (3, 3), E),
            (N, (1, 1), W),
            (N, (3, 0), E),
            (N, (2, 1), E),
            (E, (0, 0), N),
            (E, (3, 1), N),
            (W, (0, 2), S),
            (W, (2, 3), S),
            (S, (1, 0), W),
            (S, (2, 3), E),
        ];
        for (o, (x, y), expected) in cases {
            assert_eq!(o.secondary(pos(x, y)), expected, "{:?} at ({}, {})", o, x, y);
        }
    }

    #[test]
    fn test_secondary_is_perpendicular_and_stable() {
        for p in Pos::all() {
            for o in Orientation::ALL {
                let s = o.secondary(p);
                assert!(o.is_perpendicular(s));
                assert_eq!(s, o.secondary(p));
                assert!(geometry(o, s).is_some());
            }
        }
    }

    #[test]
    fn test_geometry_rejects_parallel_pairs() {
        for a in Orientation::ALL {
            for b in Orientation::ALL {
                assert_eq!(geometry(a, b).is_some(), a.is_perpendicular(b));
            }
        }
    }

    #[test]
    fn test_placements_cover_all_48_l_shapes() {
        let masks: HashSet<u16> = PlayerPiece::candidates().filter_map(|p| p.mask()).collect();
        let in_bounds = PlayerPiece::candidates().filter(|p| p.mask().is_some()).count();
        assert_eq!(in_bounds, 48);
        assert_eq!(masks.len(), 48);
    }

    #[test]
    fn test_footprint_distinct_cells() {
        for p in PlayerPiece::candidates() {
            if let Ok(cells) = p.footprint() {
                let set: HashSet<Pos> = cells.iter().copied().collect();
                assert_eq!(set.len(), 4);
                assert_eq!(cells[0], p.position);
            }
        }
    }

    #[test]
    fn test_from_cells_roundtrip() {
        for p in PlayerPiece::candidates() {
            if let Ok(cells) = p.footprint() {
                assert_eq!(PlayerPiece::from_cells(&cells), Some(p));
            }
        }
        let line = [pos(0, 0), pos(1, 0), pos(2, 0), pos(3, 0)];
        assert_eq!(PlayerPiece::from_cells(&line), None);
    }

    // ========== Board Builder Tests ==========

    #[test]
    fn test_board_cell_roundtrip() {
        let mut board = Board::empty();
        board.set_cell(pos(2, 1), Cell::Two);
        assert_eq!(board.cell(pos(2, 1)), Cell::Two);
        assert!(board.is_empty(pos(0, 0)));
        board.set_cell(pos(2, 1), Cell::Empty);
        assert_eq!(board, Board::empty());
    }

    #[test]
    fn test_board_order_is_row_major() {
        let mut first = Board::empty();
        first.set_cell(pos(0, 0), Cell::One);
        let mut last = Board::empty();
        last.set_cell(pos(3, 3), Cell::Neutral);
        assert!(first > last);
        assert!(first.cells() > last.cells());
    }

    #[test]
    fn test_render_opening() {
        let board = GameState::opening().board();
        let expected = "N11.\
                        .21.\
                        .21.\
                        .22N";
        let rendered: String = board.cells().iter().map(|c| c.symbol()).collect();
        assert_eq!(rendered, expected);
        assert_eq!(board.count(Cell::Empty), 6);
    }

    #[test]
    fn test_render_excluding_player() {
        let state = GameState::opening();
        let board = Board::render(&state, Some(Player::One)).unwrap();
        assert_eq!(board.count(Cell::One), 0);
        assert_eq!(board.count(Cell::Two), 4);
        assert_eq!(board.count(Cell::Neutral), 2);
    }

    #[test]
    fn test_render_rejects_off_board() {
        // N at (2,0) needs the row above.
        let result = GameState::new(
            piece(2, 0, Orientation::N),
            piece(1, 3, Orientation::E),
            [pos(0, 0), pos(3, 3)],
            Player::One,
        );
        assert!(matches!(
            result,
            Err(LGameError::InvalidPlacement { piece: "player 1", .. })
        ));
    }

    #[test]
    fn test_render_rejects_overlap() {
        let result = GameState::new(
            piece(2, 0, Orientation::W),
            piece(1, 3, Orientation::E),
            [pos(2, 1), pos(3, 3)],
            Player::One,
        );
        assert_eq!(
            result,
            Err(LGameError::InvalidPlacement { piece: "neutral piece", x: 2, y: 1 })
        );

        let result = GameState::new(
            piece(2, 0, Orientation::W),
            piece(2, 0, Orientation::W),
            [pos(0, 0), pos(3, 3)],
            Player::Two,
        );
        assert!(matches!(
            result,
            Err(LGameError::InvalidPlacement { piece: "player 2", .. })
        ));
    }

    #[test]
    fn test_display_board() {
        let text = GameState::opening().board().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    1 2 3 4");
        assert_eq!(lines[2], "1 | N 1 1 . |");
        assert_eq!(lines[5], "4 | . 2 2 N |");
        assert_eq!(lines.len(), 7);
    }

    // ========== Move Generation Tests ==========

    #[test]
    fn test_opening_move_counts() {
        let state = GameState::opening();
        assert_eq!(state.legal_actions().len(), 65);
        assert_eq!(state.with_turn(Player::Two).legal_actions().len(), 65);
    }

    #[test]
    fn test_no_null_move() {
        let state = GameState::opening();
        let current = state.piece(Player::One);
        assert!(state.legal_actions().iter().all(|a| a.piece != current));
    }

    #[test]
    fn test_actions_unique() {
        let state = GameState::opening();
        let actions = state.legal_actions();
        let set: HashSet<Action> = actions.iter().copied().collect();
        assert_eq!(set.len(), actions.len());
    }

    #[test]
    fn test_neutral_destinations_are_empty() {
        let state = GameState::opening();
        for (action, next) in state.successors() {
            if let Some(mv) = action.neutral {
                assert_ne!(mv.from, mv.to);
                assert!(state.neutrals().contains(&mv.from));
                assert!(next.neutrals().contains(&mv.to));
            }
            assert!(Board::render(&next, None).is_ok());
            assert_eq!(next.turn(), Player::Two);
        }
    }

    #[test]
    fn test_count_matches_generation() {
        let mut current = GameState::opening();
        for _ in 0..6 {
            assert_eq!(current.legal_action_count(), current.legal_actions().len());
            let next = current.successors().last().map(|(_, s)| *s);
            match next {
                Some(s) => current = s,
                None => break,
            }
        }
    }

    #[test]
    fn test_trapped_mover_has_no_actions() {
        let trapped = state(
            piece(0, 3, Orientation::N),
            piece(2, 1, Orientation::S),
            pos(2, 0),
            pos(3, 3),
            Player::One,
        );
        assert!(trapped.legal_actions().is_empty());
        assert_eq!(trapped.legal_action_count(), 0);
        assert!(trapped.is_terminal());
        assert_eq!(trapped.winner(), Some(Player::Two));
        assert_eq!(GameState::opening().winner(), None);
    }

    #[test]
    fn test_play_checks_legality() {
        let state = GameState::opening();
        let legal = state.legal_actions()[0];
        let next = state.play(&legal).unwrap();
        assert_eq!(next.turn(), Player::Two);
        assert_eq!(next.player1(), legal.piece);
        assert_eq!(next.player2(), state.player2());

        // Unchanged placement is the forbidden null move.
        let null = Action::slide(state.player1());
        assert_eq!(state.play(&null), Err(LGameError::IllegalMove(null)));

        // Neutral destination on an occupied cell.
        let bad = Action::with_neutral(legal.piece, pos(0, 0), pos(1, 3));
        assert!(matches!(state.play(&bad), Err(LGameError::IllegalMove(_))));
    }

    #[test]
    fn test_play_moves_neutral() {
        let state = GameState::opening();
        let action = state
            .legal_actions()
            .into_iter()
            .find(|a| a.neutral.map(|n| n.from) == Some(pos(3, 3)))
            .unwrap();
        let next = state.play(&action).unwrap();
        let mv = action.neutral.unwrap();
        assert_eq!(next.neutrals(), [pos(0, 0), mv.to]);
    }

    #[test]
    fn test_state_is_a_value() {
        let state = GameState::opening();
        let before = state;
        let _ = state.successors();
        assert_eq!(state, before);
        assert_eq!(state.with_turn(Player::Two).with_turn(Player::One), state);
    }

    // ========== Fuzz Tests ==========

    #[test]
    fn test_fuzz_random_games() {
        use rand::prelude::*;

        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..50 {
            let mut state = GameState::opening();
            for _ in 0..40 {
                let actions = state.legal_actions();
                assert_eq!(actions.len(), state.legal_action_count());
                if actions.is_empty() {
                    assert_eq!(state.winner(), Some(state.turn().opponent()));
                    break;
                }
                let action = actions[rng.random_range(0..actions.len())];
                let next = state.play(&action).unwrap();
                assert!(Board::render(&next, None).is_ok());
                assert_eq!(next.board().count(Cell::Empty), 6);
                assert_eq!(next.turn(), state.turn().opponent());
                state = next;
            }
        }
    }
}
