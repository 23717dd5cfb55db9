use std::collections::HashSet;

use log::{debug, trace};
use rand::Rng;
use strum::{FromRepr, VariantArray};

use crate::{
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, Transition},
    error::{Error, Result},
    grid::{Cell, Grid, Pos, OFFSETS},
    maze::Generator,
};

/// A move to an orthogonally adjacent cell, encoded as `0..4`
#[derive(VariantArray, FromRepr, Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[repr(usize)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// Unit offset as `(row, col)`
    pub fn delta(self) -> (isize, isize) {
        OFFSETS[self as usize]
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(code: usize) -> Result<Self> {
        Action::from_repr(code).ok_or(Error::InvalidAction(code))
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> Self {
        action as usize
    }
}

/// Reward magnitudes for the three kinds of transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    /// Reaching the goal, which ends the episode
    ///
    /// **Default**: `10.0`
    pub goal: f32,
    /// Any other move that changes the agent's position
    ///
    /// **Default**: `-0.1`
    pub step: f32,
    /// A move blocked by a wall or the grid edge
    ///
    /// **Default**: `-0.5`
    pub wall: f32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            goal: 10.0,
            step: -0.1,
            wall: -0.5,
        }
    }
}

/// Configuration for a [`GridWorld`]
#[derive(Debug, Clone, PartialEq)]
pub struct GridWorldConfig {
    pub width: usize,
    pub height: usize,
    pub start: Pos,
    pub goal: Pos,
    pub rewards: Rewards,
    pub generator: Generator,
}

impl GridWorldConfig {
    /// A `height` x `width` maze from the top-left corner to the bottom-right corner
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            start: (0, 0),
            goal: (height.saturating_sub(1), width.saturating_sub(1)),
            rewards: Rewards::default(),
            generator: Generator::default(),
        }
    }
}

impl Default for GridWorldConfig {
    /// A 10x10 randomly generated maze
    fn default() -> Self {
        Self::new(10, 10)
    }
}

/// A maze navigation task on a grid of open and wall cells
///
/// The agent starts at `start` and must reach `goal` using the four [`Action`]s. Moves off
/// the grid or into a wall leave the agent in place. States are indexed `row * width + col`.
///
/// Walls may be toggled until the layout is [committed](Environment::commit), which
/// happens at the latest when training or a rollout begins.
#[derive(Debug, Clone)]
pub struct GridWorld {
    grid: Grid,
    start: Pos,
    goal: Pos,
    agent: Pos,
    visited: HashSet<Pos>,
    rewards: Rewards,
    committed: bool,
}

impl GridWorld {
    /// Build the grid with the configured [`Generator`] and place the agent at `start`
    pub fn new<R>(config: GridWorldConfig, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let GridWorldConfig {
            width,
            height,
            start,
            goal,
            rewards,
            generator,
        } = config;
        let grid = generator.generate(width, height, start, goal, rng)?;
        Self::from_grid(grid, start, goal, rewards)
    }

    /// Wrap an existing grid
    ///
    /// **Errors** if `start` and `goal` are not distinct open cells of `grid`
    pub fn from_grid(grid: Grid, start: Pos, goal: Pos, rewards: Rewards) -> Result<Self> {
        if start == goal || !grid.contains(start) || !grid.contains(goal) {
            return Err(Error::InvalidEndpoints { start, goal });
        }
        for pos in [start, goal] {
            if grid[pos] == Cell::Wall {
                return Err(Error::BlockedCell(pos));
            }
        }

        Ok(Self {
            grid,
            start,
            goal,
            agent: start,
            visited: HashSet::from([start]),
            rewards,
            committed: false,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    /// Current agent position
    pub fn agent(&self) -> Pos {
        self.agent
    }

    /// Positions reached since the last reset
    pub fn visited(&self) -> &HashSet<Pos> {
        &self.visited
    }

    pub fn rewards(&self) -> Rewards {
        self.rewards
    }

    /// Whether the layout is frozen
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// State index of the agent's position
    pub fn state(&self) -> usize {
        self.grid.state_index(self.agent)
    }

    /// Flip a cell between open and wall
    ///
    /// Toggles of the start, the goal or the agent's current cell are ignored.
    ///
    /// **Errors** if the layout is committed or `pos` is outside the grid
    pub fn toggle_wall(&mut self, pos: Pos) -> Result<()> {
        if self.committed {
            return Err(Error::GridLocked);
        }
        self.grid.check_bounds(pos)?;
        if pos == self.start || pos == self.goal || pos == self.agent {
            trace!("ignoring wall toggle on protected cell {pos:?}");
            return Ok(());
        }
        self.grid.toggle(pos);
        Ok(())
    }

    /// [`step`](Environment::step) with a raw action code
    ///
    /// **Errors** if `code` is not one of the four action codes
    pub fn step_code(&mut self, code: usize) -> Result<Transition<usize>> {
        let action = Action::try_from(code)?;
        Ok(self.step(action))
    }

    /// Move the agent directly to `pos`, recording it as visited
    ///
    /// Used to replay a known path for an observer, bypassing rewards.
    ///
    /// **Errors** if `pos` is outside the grid or a wall
    pub fn place_agent(&mut self, pos: Pos) -> Result<()> {
        self.grid.check_bounds(pos)?;
        if self.grid[pos] == Cell::Wall {
            return Err(Error::BlockedCell(pos));
        }
        self.agent = pos;
        self.visited.insert(pos);
        Ok(())
    }

    /// Text rendering of the grid with `S` start, `G` goal, `A` agent, `*` path and `+` visited
    pub fn render(&self, path: &[Pos]) -> String {
        let path: HashSet<&Pos> = path.iter().collect();
        let mut out = String::with_capacity(self.grid.len() + self.grid.height());
        for row in 0..self.grid.height() {
            for col in 0..self.grid.width() {
                let pos = (row, col);
                out.push(if pos == self.agent {
                    'A'
                } else if pos == self.goal {
                    'G'
                } else if pos == self.start {
                    'S'
                } else if path.contains(&pos) {
                    '*'
                } else if self.visited.contains(&pos) {
                    '+'
                } else if self.grid[pos] == Cell::Wall {
                    '#'
                } else {
                    '.'
                });
            }
            out.push('\n');
        }
        out
    }

    fn target(&self, action: Action) -> Pos {
        let (dr, dc) = action.delta();
        (
            self.agent
                .0
                .saturating_add_signed(dr)
                .min(self.grid.height() - 1),
            self.agent
                .1
                .saturating_add_signed(dc)
                .min(self.grid.width() - 1),
        )
    }
}

impl Environment for GridWorld {
    type State = usize;
    type Action = Action;

    fn is_active(&self) -> bool {
        self.agent != self.goal
    }

    /// Reaching the goal pays `rewards.goal` and ends the episode, any other move pays
    /// `rewards.step`, and a blocked move pays `rewards.wall`. Stepping from the goal
    /// is a no-op that reports `done` with zero reward.
    fn step(&mut self, action: Self::Action) -> Transition<Self::State> {
        if !self.is_active() {
            return Transition {
                next_state: self.state(),
                reward: 0.0,
                done: true,
            };
        }

        let prev = self.agent;
        let target = self.target(action);
        if self.grid[target] == Cell::Open {
            self.agent = target;
            self.visited.insert(target);
        }

        let (reward, done) = if self.agent == self.goal {
            (self.rewards.goal, true)
        } else if self.agent != prev {
            (self.rewards.step, false)
        } else {
            (self.rewards.wall, false)
        };
        trace!("{prev:?} --{action:?}--> {:?} (reward {reward})", self.agent);

        Transition {
            next_state: self.state(),
            reward,
            done,
        }
    }

    fn reset(&mut self) -> Self::State {
        self.agent = self.start;
        self.visited.clear();
        self.visited.insert(self.start);
        self.state()
    }

    fn commit(&mut self) {
        if !self.committed {
            debug!("committing {}x{} grid layout", self.grid.height(), self.grid.width());
            self.committed = true;
        }
    }
}

impl DiscreteActionSpace for GridWorld {
    fn actions(&self) -> Vec<Self::Action> {
        Action::VARIANTS.to_vec()
    }
}

impl DiscreteStateSpace for GridWorld {
    fn num_states(&self) -> usize {
        self.grid.len()
    }
}
