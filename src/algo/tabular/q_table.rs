use log::{debug, info, trace};
use rand::Rng;

use crate::{
    assert_interval,
    decay::{self, Decay},
    ds::RingBuffer,
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, Transition},
    exploration::{Choice, EpsilonGreedy},
    util::argmax,
};

/// A dense, zero-initialized table of action values with one row per state
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<f32>,
    num_actions: usize,
}

impl QTable {
    /// **Panics** if `num_actions` is zero
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        assert!(num_actions > 0, "a Q table needs at least one action");
        Self {
            values: vec![0.0; num_states * num_actions],
            num_actions,
        }
    }

    /// `(num_states, num_actions)`
    pub fn shape(&self) -> (usize, usize) {
        (self.values.len() / self.num_actions, self.num_actions)
    }

    /// Action values for `state`, indexed by action
    pub fn row(&self, state: usize) -> &[f32] {
        let start = state * self.num_actions;
        &self.values[start..start + self.num_actions]
    }

    pub fn get(&self, state: usize, action: usize) -> f32 {
        self.row(state)[action]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f32) {
        assert!(action < self.num_actions, "action {action} out of range");
        self.values[state * self.num_actions + action] = value;
    }

    /// Greedy action for `state`, ties going to the lowest action index
    pub fn best_action(&self, state: usize) -> usize {
        argmax(self.row(state))
    }

    /// Largest action value for `state`
    pub fn max_value(&self, state: usize) -> f32 {
        self.row(state)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// How the temporal-difference target treats transitions into a terminal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Bootstrap {
    /// `r` alone on terminal transitions, the standard Q-learning target
    #[default]
    ZeroOnTerminal,
    /// `r + γ max Q(s', ·)` on every transition, including terminal ones
    Always,
}

/// Stop training when the mean reward over consecutive windows of episodes stops improving
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyStop {
    /// Episodes per window
    ///
    /// **Default**: `50`
    pub window: usize,
    /// Amount by which a window's mean reward must exceed the previous window's to keep training
    ///
    /// **Default**: `0.0`
    pub min_improvement: f32,
}

impl Default for EarlyStop {
    fn default() -> Self {
        Self {
            window: 50,
            min_improvement: 0.0,
        }
    }
}

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone)]
pub struct QTableAgentConfig<D: Decay = decay::Multiplicative> {
    /// Exploration policy and its epsilon schedule over episodes
    ///
    /// **Default**: epsilon starts at `0.2`, multiplied by `0.995` each episode, floored at `0.01`
    pub exploration: EpsilonGreedy<D>,
    /// Learning rate in `[0, 1]`
    ///
    /// **Default**: `0.1`
    pub alpha: f32,
    /// Discount factor in `[0, 1]`
    ///
    /// **Default**: `0.95`
    pub gamma: f32,
    /// Episode budget for [`QTableAgent::train`]
    ///
    /// **Default**: `1000`
    pub episodes: u32,
    /// Steps after which an episode is cut off even if it has not terminated
    ///
    /// **Default**: `10_000`
    pub max_steps_per_episode: usize,
    /// **Default**: [`Bootstrap::ZeroOnTerminal`]
    pub bootstrap: Bootstrap,
    /// **Default**: `None`, always run the full episode budget
    pub early_stop: Option<EarlyStop>,
    /// Log progress every this many episodes, `0` to disable
    ///
    /// **Default**: `100`
    pub log_interval: u32,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::default(),
            alpha: 0.1,
            gamma: 0.95,
            episodes: 1000,
            max_steps_per_episode: 10_000,
            bootstrap: Bootstrap::default(),
            early_stop: None,
            log_interval: 100,
        }
    }
}

/// Summary of one training episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub episode: u32,
    pub total_reward: f32,
    /// Exploration rate used during the episode
    pub epsilon: f32,
    pub steps: usize,
    /// Whether the episode ended in a terminal state rather than at the step limit
    pub terminated: bool,
}

/// A single transition with actions referred to by their column in the table
struct Exp {
    state: usize,
    action: usize,
    reward: f32,
    next_state: usize,
    done: bool,
}

/// A Q-learning agent that learns a dense [`QTable`] over an environment with discrete
/// states and actions
///
/// Actions are chosen epsilon-greedily and the table is updated off-policy toward
/// `r + γ max Q(s', ·)` after every step.
pub struct QTableAgent<D: Decay = decay::Multiplicative> {
    q_table: QTable,
    exploration: EpsilonGreedy<D>,
    alpha: f32,   // learning rate
    gamma: f32,   // discount factor
    episode: u32, // current episode
    episodes: u32,
    max_steps_per_episode: usize,
    bootstrap: Bootstrap,
    early_stop: Option<EarlyStop>,
    log_interval: u32,
}

impl<D: Decay> QTableAgent<D> {
    /// Initialize an agent with a zeroed table shaped for `env`
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`, or if an early stop
    /// window is empty
    pub fn new<E>(env: &E, config: QTableAgentConfig<D>) -> Self
    where
        E: DiscreteStateSpace + DiscreteActionSpace,
    {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        if let Some(rule) = &config.early_stop {
            assert!(rule.window > 0, "Early stop window must not be empty.");
        }

        Self {
            q_table: QTable::new(env.num_states(), env.actions().len()),
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            episode: 0,
            episodes: config.episodes,
            max_steps_per_episode: config.max_steps_per_episode,
            bootstrap: config.bootstrap,
            early_stop: config.early_stop,
            log_interval: config.log_interval,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn into_q_table(self) -> QTable {
        self.q_table
    }

    /// Number of completed episodes
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Exploration rate for the next episode
    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon(self.episode)
    }

    fn act<R>(&self, state: usize, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        match self.exploration.choose(self.episode, rng) {
            Choice::Explore => rng.gen_range(0..self.q_table.num_actions),
            Choice::Exploit => self.q_table.best_action(state),
        }
    }

    fn learn(&mut self, exp: Exp) {
        let Exp {
            state,
            action,
            reward,
            next_state,
            done,
        } = exp;

        let max_next_q = match (self.bootstrap, done) {
            (Bootstrap::ZeroOnTerminal, true) => 0.0,
            _ => self.q_table.max_value(next_state),
        };
        let q_value = self.q_table.get(state, action);
        let update = q_value + self.alpha * (reward + self.gamma * max_next_q - q_value);
        self.q_table.set(state, action, update);
    }

    /// Run a single training episode
    pub fn go<E, R>(&mut self, env: &mut E, rng: &mut R) -> EpisodeStats
    where
        E: DiscreteStateSpace + DiscreteActionSpace,
        R: Rng + ?Sized,
    {
        let actions = env.actions();
        debug_assert_eq!(
            self.q_table.shape(),
            (env.num_states(), actions.len()),
            "environment does not match the table shape"
        );

        env.commit();
        let epsilon = self.epsilon();
        let mut state = env.reset();
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut terminated = false;

        while steps < self.max_steps_per_episode {
            let action = self.act(state, rng);
            let Transition {
                next_state,
                reward,
                done,
            } = env.step(actions[action].clone());
            self.learn(Exp {
                state,
                action,
                reward,
                next_state,
                done,
            });

            total_reward += reward;
            steps += 1;
            state = next_state;
            if done {
                terminated = true;
                break;
            }
        }

        if !terminated {
            trace!(
                "episode {} cut off after {steps} steps",
                self.episode
            );
        }

        let stats = EpisodeStats {
            episode: self.episode,
            total_reward,
            epsilon,
            steps,
            terminated,
        };
        self.episode += 1;
        stats
    }

    /// Train for the configured number of episodes, collecting per-episode statistics
    pub fn train<E, R>(&mut self, env: &mut E, rng: &mut R) -> Vec<EpisodeStats>
    where
        E: DiscreteStateSpace + DiscreteActionSpace,
        R: Rng + ?Sized,
    {
        self.train_with(env, rng, |_| {})
    }

    /// Like [`train`](Self::train), also handing each episode's statistics to `sink` as it completes
    pub fn train_with<E, R, F>(&mut self, env: &mut E, rng: &mut R, mut sink: F) -> Vec<EpisodeStats>
    where
        E: DiscreteStateSpace + DiscreteActionSpace,
        R: Rng + ?Sized,
        F: FnMut(&EpisodeStats),
    {
        let mut history = Vec::with_capacity(self.episodes as usize);
        let mut window = self
            .early_stop
            .map(|rule| (rule, RingBuffer::<f32>::new(rule.window)));
        let mut prev_mean: Option<f32> = None;

        for _ in 0..self.episodes {
            let stats = self.go(env, rng);
            if self.log_interval > 0 && stats.episode % self.log_interval == 0 {
                info!(
                    "Episode {}, Reward: {:.1}, Epsilon: {:.2}",
                    stats.episode, stats.total_reward, stats.epsilon
                );
            }
            sink(&stats);
            history.push(stats);

            let Some((rule, rewards)) = window.as_mut() else {
                continue;
            };
            if rewards.push(stats.total_reward) + 1 < rewards.capacity() {
                continue;
            }
            let mean = rewards.mean().unwrap_or_default();
            if let Some(prev) = prev_mean {
                if mean - prev <= rule.min_improvement {
                    info!(
                        "stopping early at episode {}: mean reward {mean:.2} vs {prev:.2} over the previous {} episodes",
                        stats.episode, rule.window
                    );
                    break;
                }
            }
            debug!("mean reward {mean:.2} over episodes ending at {}", stats.episode);
            prev_mean = Some(mean);
        }

        history
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::env::tests::MockEnv;

    fn greedy_config() -> QTableAgentConfig<decay::Constant> {
        QTableAgentConfig {
            exploration: EpsilonGreedy::new(decay::Constant::new(0.0)),
            alpha: 0.5,
            gamma: 0.9,
            episodes: 1,
            max_steps_per_episode: 100,
            bootstrap: Bootstrap::ZeroOnTerminal,
            early_stop: None,
            log_interval: 0,
        }
    }

    #[test]
    fn table_ties_go_to_first_action() {
        let mut table = QTable::new(3, 4);
        assert_eq!(table.shape(), (3, 4));
        assert_eq!(table.best_action(1), 0, "all zero picks first");

        table.set(1, 2, 1.0);
        table.set(1, 3, 1.0);
        assert_eq!(table.best_action(1), 2, "tie picks lower index");
        assert_eq!(table.max_value(1), 1.0);
        assert_eq!(table.row(1), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(table.row(0), [0.0; 4], "other rows untouched");
    }

    #[test]
    fn bellman_update_zero_bootstrap_on_terminal() {
        let env = MockEnv::new(3);
        let mut agent = QTableAgent::new(&env, greedy_config());
        agent.q_table.set(2, 0, 4.0);
        agent.q_table.set(1, 1, 2.0);

        agent.learn(Exp {
            state: 1,
            action: 1,
            reward: 1.0,
            next_state: 2,
            done: true,
        });
        assert_eq!(agent.q_table.get(1, 1), 2.0 + 0.5 * (1.0 - 2.0), "terminal ignores Q(s')");

        agent.learn(Exp {
            state: 0,
            action: 1,
            reward: -0.1,
            next_state: 1,
            done: false,
        });
        let expected = 0.5 * (-0.1 + 0.9 * 1.5);
        assert_eq!(agent.q_table.get(0, 1), expected, "bootstraps through max Q(s')");
    }

    #[test]
    fn bellman_update_always_bootstrap() {
        let env = MockEnv::new(3);
        let config = QTableAgentConfig {
            bootstrap: Bootstrap::Always,
            ..greedy_config()
        };
        let mut agent = QTableAgent::new(&env, config);
        agent.q_table.set(2, 0, 4.0);

        agent.learn(Exp {
            state: 1,
            action: 1,
            reward: 1.0,
            next_state: 2,
            done: true,
        });
        assert_eq!(agent.q_table.get(1, 1), 0.5 * (1.0 + 0.9 * 4.0));
    }

    #[test]
    fn greedy_episode() {
        let mut env = MockEnv::new(3);
        let mut rng = StdRng::seed_from_u64(0);
        let mut agent = QTableAgent::new(&env, greedy_config());

        let stats = agent.go(&mut env, &mut rng);
        // Untried actions keep value 0 and win ties on the lowest index:
        // bump left, right, back left, right, right
        assert_eq!(stats.steps, 5);
        assert!(stats.terminated);
        assert!((stats.total_reward - 0.2).abs() < 1e-5, "bump, three moves, goal");
        assert_eq!(stats.epsilon, 0.0);
        assert_eq!(agent.episode(), 1);
        assert_eq!(agent.q_table().best_action(0), 1, "right preferred at start");
    }

    #[test]
    fn long_episode_guard() {
        let mut env = MockEnv::new(50);
        let mut rng = StdRng::seed_from_u64(0);
        let config = QTableAgentConfig {
            max_steps_per_episode: 5,
            ..greedy_config()
        };
        let mut agent = QTableAgent::new(&env, config);

        let stats = agent.go(&mut env, &mut rng);
        assert_eq!(stats.steps, 5, "cut off at the guard");
        assert!(!stats.terminated);
    }

    #[test]
    fn train_reports_decayed_epsilon() {
        let mut env = MockEnv::new(4);
        let mut rng = StdRng::seed_from_u64(1);
        let config: QTableAgentConfig = QTableAgentConfig {
            episodes: 20,
            log_interval: 0,
            ..Default::default()
        };
        let mut agent = QTableAgent::new(&env, config);

        let mut seen = Vec::new();
        let history = agent.train_with(&mut env, &mut rng, |s| seen.push(s.episode));
        assert_eq!(history.len(), 20);
        assert_eq!(seen, (0..20).collect::<Vec<_>>(), "sink sees every episode in order");
        for stats in &history {
            let k = stats.episode as f32;
            assert_eq!(stats.epsilon, (0.2 * 0.995f32.powf(k)).max(0.01));
        }
        assert_eq!(agent.epsilon(), (0.2 * 0.995f32.powf(20.0)).max(0.01));
    }

    #[test]
    fn early_stop_on_plateau() {
        let mut env = MockEnv::new(3);
        let mut rng = StdRng::seed_from_u64(0);
        let config = QTableAgentConfig {
            episodes: 100,
            early_stop: Some(EarlyStop {
                window: 5,
                min_improvement: 0.0,
            }),
            ..greedy_config()
        };
        let mut agent = QTableAgent::new(&env, config);

        let history = agent.train(&mut env, &mut rng);
        // The greedy policy settles on right, right after the first episode, so the
        // third window ties the second
        assert_eq!(history.len(), 15, "stopped after the third window");
        assert!(history.iter().skip(1).all(|s| s.total_reward == 0.9));
    }

    #[test]
    #[should_panic]
    fn alpha_out_of_range() {
        let env = MockEnv::new(3);
        let config = QTableAgentConfig {
            alpha: 1.5,
            ..greedy_config()
        };
        QTableAgent::new(&env, config);
    }
}
