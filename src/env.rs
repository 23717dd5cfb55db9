/// The outcome of a single step taken in an [`Environment`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<S> {
    /// The state reached after the action
    pub next_state: S,
    /// The reward received for the action
    pub reward: f32,
    /// Whether `next_state` is terminal
    pub done: bool,
}

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent.
/// Once a step reports `done`, no further transitions happen until [`reset`](Environment::reset).
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Clone;

    /// Determine if the state is active or terminal
    fn is_active(&self) -> bool;

    /// Update the environment in response to an action taken by an agent
    fn step(&mut self, action: Self::Action) -> Transition<Self::State>;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;

    /// Freeze setup-time configuration such as the layout of a grid
    ///
    /// Agents call this before their first episode. Repeated calls have no further effect.
    fn commit(&mut self) {}
}

/// An environment with a finite, fixed set of actions
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions
    ///
    /// The order is stable and an action's position in the returned vector is its column in a value table.
    /// The returned vector should never be empty.
    fn actions(&self) -> Vec<Self::Action>;
}

/// An environment whose states are indices in `0..num_states()`
pub trait DiscreteStateSpace: Environment<State = usize> {
    fn num_states(&self) -> usize;
}
