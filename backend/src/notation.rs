//! Move-string resolution.
//!
//! Clients send either coordinate notation (drag-and-drop UIs) or
//! algebraic notation (text input), so resolution is two-stage:
//! coordinate syntax first, then algebraic relative to the position.

use shakmaty::Move;

use crate::rules::{BoardState, CoordinateMoveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotationError {
    /// Neither notation form matched the string.
    Unparseable,
    /// Well-formed coordinate notation naming a move that cannot be
    /// played from this position.
    Unplayable,
}

/// Resolve a raw move string against a position.
///
/// The algebraic fallback only runs when the string is not coordinate
/// syntax at all; a well-formed coordinate move that does not fit the
/// board is reported as unplayable, not re-interpreted.
pub fn resolve(raw: &str, position: &BoardState) -> Result<Move, NotationError> {
    match position.parse_coordinate(raw) {
        Ok(m) => Ok(m),
        Err(CoordinateMoveError::Unplayable) => Err(NotationError::Unplayable),
        Err(CoordinateMoveError::Syntax) => position
            .parse_algebraic(raw)
            .ok_or(NotationError::Unparseable),
    }
}
