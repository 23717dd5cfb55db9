use std::collections::HashSet;

use log::trace;

use crate::{
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, Transition},
    error::Result,
    grid::Pos,
    gym::GridWorld,
};

use super::QTable;

/// Default step ceiling for [`greedy_rollout`]
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Why a greedy rollout stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutEnd {
    /// The agent reached the goal
    Goal,
    /// The policy led back to a state already on the path
    Revisit,
    /// The step ceiling was hit
    StepLimit,
}

/// The path followed by a greedy policy, starting at the start position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollout {
    pub path: Vec<Pos>,
    pub end: RolloutEnd,
}

impl Rollout {
    pub fn reached_goal(&self) -> bool {
        self.end == RolloutEnd::Goal
    }

    /// Number of moves along the path
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Walk the agent along the path, calling `observe` after every placement
    ///
    /// The environment is reset first, so `observe` sees the start position, then each
    /// following position in order.
    pub fn replay<F>(&self, env: &mut GridWorld, mut observe: F) -> Result<()>
    where
        F: FnMut(&GridWorld),
    {
        env.commit();
        env.reset();
        for &pos in &self.path {
            env.place_agent(pos)?;
            observe(env);
        }
        Ok(())
    }
}

/// Follow the highest-valued action from the start until the goal, a revisited state,
/// or `max_steps` moves
///
/// A path that does not end at the goal is not an error; check [`Rollout::reached_goal`].
/// The environment's layout is committed first.
///
/// **Panics** if the table's shape does not match `env`
pub fn greedy_rollout(q_table: &QTable, env: &mut GridWorld, max_steps: usize) -> Rollout {
    let actions = env.actions();
    assert_eq!(
        q_table.shape(),
        (env.num_states(), actions.len()),
        "Q table shape does not match the environment"
    );

    env.commit();
    let mut state = env.reset();
    let mut path = vec![env.agent()];
    let mut seen = HashSet::from([state]);

    for _ in 0..max_steps {
        let action = actions[q_table.best_action(state)];
        let Transition {
            next_state, done, ..
        } = env.step(action);

        if !seen.insert(next_state) {
            trace!("greedy rollout revisited {:?}", env.agent());
            return Rollout {
                path,
                end: RolloutEnd::Revisit,
            };
        }
        path.push(env.agent());
        if done {
            return Rollout {
                path,
                end: RolloutEnd::Goal,
            };
        }
        state = next_state;
    }

    trace!("greedy rollout hit the {max_steps} step ceiling");
    Rollout {
        path,
        end: RolloutEnd::StepLimit,
    }
}
