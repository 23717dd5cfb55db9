use rand::Rng;

use crate::decay::{self, Decay};

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with an episode-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Exploration rate in effect during `episode`
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Invoke epsilon greedy policy for `episode`, exploring with probability epsilon
    pub fn choose<R>(&self, episode: u32, rng: &mut R) -> Choice
    where
        R: Rng + ?Sized,
    {
        if rng.gen::<f32>() < self.epsilon(episode) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

impl Default for EpsilonGreedy<decay::Multiplicative> {
    /// Starts at `0.2` and decays by a factor of `0.995` per episode down to `0.01`
    fn default() -> Self {
        Self::new(decay::Multiplicative::new(0.995, 0.2, 0.01).expect("valid default decay"))
    }
}
