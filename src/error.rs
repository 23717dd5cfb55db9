use thiserror::Error;

use crate::grid::Pos;

/// Errors surfaced by maze construction, environment control and decay schedules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An action code outside of the four defined moves
    #[error("invalid action code {0}, expected a value in 0..4")]
    InvalidAction(usize),

    #[error("position {pos:?} is outside of the {height}x{width} grid")]
    OutOfBounds {
        pos: Pos,
        height: usize,
        width: usize,
    },

    #[error("invalid grid dimensions {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },

    /// A map character other than `#` or `.`
    #[error("unexpected map character {0:?}")]
    InvalidMapChar(char),

    /// Start and goal must be distinct cells inside the grid
    #[error("start {start:?} and goal {goal:?} must be distinct cells inside the grid")]
    InvalidEndpoints { start: Pos, goal: Pos },

    #[error("maze unsolvable after {attempts} attempts")]
    Unsolvable { attempts: u32 },

    /// The agent cannot be placed on a wall
    #[error("cell {0:?} is a wall")]
    BlockedCell(Pos),

    /// Walls were toggled after the layout was committed for training
    #[error("grid layout is committed and can no longer be edited")]
    GridLocked,

    #[error("invalid decay parameters: {0}")]
    InvalidDecay(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
