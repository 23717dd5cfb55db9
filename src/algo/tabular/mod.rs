pub mod greedy;
pub mod q_table;

pub use greedy::{greedy_rollout, Rollout, RolloutEnd};
pub use q_table::{Bootstrap, EarlyStop, EpisodeStats, QTable, QTableAgent, QTableAgentConfig};
