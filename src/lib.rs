/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Occupancy grids and grid coordinates
pub mod grid;

/// Environments
pub mod gym;

/// Maze generation
pub mod maze;

mod util;

pub use error::{Error, Result};
