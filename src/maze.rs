use log::{debug, warn};
use rand::Rng;

use crate::{
    error::{Error, Result},
    grid::{Cell, Grid, Pos},
};

/// Default cap on regeneration attempts for [`Generator::Prim`]
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Strategy used to build the initial grid of an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// Randomized Prim's algorithm with the one-passage rule
    ///
    /// Grids whose goal is not reachable from the start are discarded and regenerated,
    /// giving up with [`Error::Unsolvable`] after `max_attempts` tries.
    Prim { max_attempts: u32 },
    /// An all-open grid meant to be edited with wall toggles before training.
    /// Solvability is left to whoever edits it.
    Empty,
}

impl Default for Generator {
    fn default() -> Self {
        Self::Prim {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Generator {
    /// Build a `height` x `width` grid in which `start` and `goal` are open
    ///
    /// For [`Generator::Prim`], every open cell is reachable from `start`, including `goal`.
    ///
    /// **Errors** on zero dimensions, out-of-bounds or identical endpoints, and when no
    /// connected maze was found within the attempt budget
    pub fn generate<R>(
        &self,
        width: usize,
        height: usize,
        start: Pos,
        goal: Pos,
        rng: &mut R,
    ) -> Result<Grid>
    where
        R: Rng + ?Sized,
    {
        let open = Grid::filled(width, height, Cell::Open)?;
        if start == goal || !open.contains(start) || !open.contains(goal) {
            return Err(Error::InvalidEndpoints { start, goal });
        }

        match *self {
            Generator::Empty => Ok(open),
            Generator::Prim { max_attempts } => {
                for attempt in 1..=max_attempts {
                    let grid = prim(width, height, start, rng)?;
                    if grid.is_reachable(start, goal) {
                        debug!("generated {height}x{width} maze in {attempt} attempt(s)");
                        return Ok(grid);
                    }
                    debug!("maze attempt {attempt} left {goal:?} disconnected, regenerating");
                }

                warn!("no connected {height}x{width} maze after {max_attempts} attempts");
                Err(Error::Unsolvable {
                    attempts: max_attempts,
                })
            }
        }
    }
}

/// One pass of randomized Prim's algorithm from `start`
///
/// A wall candidate is opened only if it has exactly one open neighbor, so the open
/// cells always form a tree rooted at `start`. Candidates are drawn uniformly at
/// random without replacement.
fn prim<R>(width: usize, height: usize, start: Pos, rng: &mut R) -> Result<Grid>
where
    R: Rng + ?Sized,
{
    let mut grid = Grid::filled(width, height, Cell::Wall)?;
    grid[start] = Cell::Open;

    let mut frontier: Vec<Pos> = grid.neighbors(start).collect();
    while !frontier.is_empty() {
        let candidate = frontier.swap_remove(rng.gen_range(0..frontier.len()));
        if grid[candidate] == Cell::Wall && grid.open_neighbors(candidate) == 1 {
            grid[candidate] = Cell::Open;
            frontier.extend(
                grid.neighbors(candidate)
                    .filter(|&n| grid[n] == Cell::Wall),
            );
        }
    }

    Ok(grid)
}
