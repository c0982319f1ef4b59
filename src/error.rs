//! Error types for the board layer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("square {index} is out of range (expected 0..9)")]
    OutOfRange { index: usize },

    #[error("row {row}, column {col} is off the board (expected 0..3 for each)")]
    OutOfGrid { row: usize, col: usize },

    #[error("invalid move: square {index} is already occupied")]
    Occupied { index: usize },

    #[error("game already over")]
    GameOver,

    #[error("utility is undefined on a board that is still in play")]
    NotTerminal,

    #[error("board string has {got} cells, expected 9 in '{context}'")]
    InvalidBoardLength { got: usize, context: String },

    #[error("invalid character '{character}' in board '{context}'")]
    InvalidCellCharacter { character: char, context: String },

    #[error("invalid player '{0}' (expected 'X' or 'O')")]
    InvalidPlayer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
