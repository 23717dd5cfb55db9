use crate::error::{Error, Result};

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

/// A constant value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f32) -> f32 {
        self.value
    }
}

/// v(t) = max(v<sub>i</sub> * r<sup>floor(t)</sup>, v<sub>f</sub>)
///
/// Equivalent to multiplying by `r` once per elapsed step and clamping at the floor `v`<sub>f</sub>.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multiplicative {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl Multiplicative {
    /// **Errors** unless `0 < rate <= 1` and `vi >= vf >= 0`
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self> {
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(Error::InvalidDecay("`rate` must be in the interval (0, 1]"));
        }
        if !(vi >= vf && vf >= 0.0) {
            return Err(Error::InvalidDecay("`vi` must be at least `vf`, and `vf` non-negative"));
        }
        Ok(Self { rate, vi, vf })
    }
}

impl Decay for Multiplicative {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        (vi * rate.powf(t.floor())).max(vf)
    }
}
