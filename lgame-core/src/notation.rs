//! Text notation for moves and positions (1-indexed coordinates).
//!
//! ```text
//! Move:   "x y O"            L move only
//!         "x y O a b c d"    also move the neutral at (a,b) to (c,d)
//! State:  "x1 y1 O1 a b c d x2 y2 O2"
//! ```
//!
//! Orientation letters are case-insensitive on input and written uppercase.

use std::fmt;
use std::str::FromStr;

use crate::{Action, GameState, LGameError, NeutralMove, Orientation, Player, PlayerPiece, Pos, Result};

fn invalid(msg: impl Into<String>) -> LGameError {
    LGameError::InvalidNotation(msg.into())
}

fn parse_coord(token: &str) -> Result<u8> {
    let value: u8 = token
        .parse()
        .map_err(|_| invalid(format!("coordinate '{}' is not an integer", token)))?;
    if !(1..=4).contains(&value) {
        return Err(invalid(format!("coordinate {} is not between 1 and 4", value)));
    }
    Ok(value - 1)
}

fn parse_pos(x: &str, y: &str) -> Result<Pos> {
    let (x, y) = (parse_coord(x)?, parse_coord(y)?);
    Pos::new(x, y).ok_or_else(|| invalid("position out of range"))
}

fn parse_orientation(token: &str) -> Result<Orientation> {
    let mut chars = token.chars();
    let orientation = match (chars.next(), chars.next()) {
        (Some(c), None) => Orientation::from_letter(c),
        _ => None,
    };
    orientation.ok_or_else(|| invalid(format!("orientation '{}' is not one of N, E, S, W", token)))
}

fn parse_piece(tokens: &[&str]) -> Result<PlayerPiece> {
    Ok(PlayerPiece::new(parse_pos(tokens[0], tokens[1])?, parse_orientation(tokens[2])?))
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x() + 1, self.y() + 1)
    }
}

impl fmt::Display for PlayerPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.position, self.orientation)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.piece)?;
        if let Some(NeutralMove { from, to }) = self.neutral {
            write!(f, " {} {}", from, to)?;
        }
        Ok(())
    }
}

impl FromStr for Action {
    type Err = LGameError;

    /// Parse a move. A neutral move onto its own square is read as no
    /// neutral move.
    fn from_str(s: &str) -> Result<Action> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.len() {
            3 => Ok(Action::slide(parse_piece(&tokens)?)),
            7 => {
                let piece = parse_piece(&tokens[..3])?;
                let from = parse_pos(tokens[3], tokens[4])?;
                let to = parse_pos(tokens[5], tokens[6])?;
                if from == to {
                    Ok(Action::slide(piece))
                } else {
                    Ok(Action::with_neutral(piece, from, to))
                }
            }
            n => Err(invalid(format!(
                "expected 3 or 7 tokens ('x y O' or 'x y O a b c d'), got {}",
                n
            ))),
        }
    }
}

impl GameState {
    /// Parse a 10-token state description and validate its placements.
    pub fn from_notation(text: &str, turn: Player) -> Result<GameState> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 10 {
            return Err(invalid(format!(
                "expected 10 tokens 'x1 y1 O1 a b c d x2 y2 O2', got {}",
                tokens.len()
            )));
        }
        let player1 = parse_piece(&tokens[0..3])?;
        let neutral = [parse_pos(tokens[3], tokens[4])?, parse_pos(tokens[5], tokens[6])?];
        let player2 = parse_piece(&tokens[7..10])?;
        GameState::new(player1, player2, neutral, turn)
    }

    /// Write the 10-token state description. The side to move is not included.
    pub fn notation(&self) -> String {
        let [n1, n2] = self.neutrals();
        format!("{} {} {} {}", self.player1(), n1, n2, self.player2())
    }
}
