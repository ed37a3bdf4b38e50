//! Crate-level error type for malformed input reaching the engine from the
//! outside: FEN strings, long-algebraic move notation, and moves proposed
//! to [`crate::board::Board::do_move`] that are not legal in the position.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A FEN string did not parse: `reason` describes what was wrong, `fen`
    /// carries the original input for diagnostics.
    InvalidFen { fen: String, reason: String },
    /// A long-algebraic move string (e.g. "e2e4", "e7e8q") did not parse.
    InvalidMoveNotation { notation: String },
    /// A move was legal in form but not legal in the given position.
    IllegalMove { notation: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidFen { fen, reason } => {
                write!(f, "invalid FEN `{fen}`: {reason}")
            }
            EngineError::InvalidMoveNotation { notation } => {
                write!(f, "invalid move notation `{notation}`")
            }
            EngineError::IllegalMove { notation } => {
                write!(f, "illegal move `{notation}`")
            }
        }
    }
}

impl std::error::Error for EngineError {}
