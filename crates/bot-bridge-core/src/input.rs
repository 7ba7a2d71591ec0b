//! Input vectors handed to the bridge by the host

use serde::{Deserialize, Serialize};

/// Pair of state vectors produced by the game engine each tick.
///
/// The contents are opaque to the bridge and forwarded as-is. Serialized as a
/// two-element JSON array of number arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputVectorPair(pub Vec<f64>, pub Vec<f64>);

impl InputVectorPair {
    /// Create a pair from any two numeric sequences
    pub fn new(first: impl Into<Vec<f64>>, second: impl Into<Vec<f64>>) -> Self {
        Self(first.into(), second.into())
    }

    /// First state vector
    pub fn first(&self) -> &[f64] {
        &self.0
    }

    /// Second state vector
    pub fn second(&self) -> &[f64] {
        &self.1
    }
}

impl From<(Vec<f64>, Vec<f64>)> for InputVectorPair {
    fn from((first, second): (Vec<f64>, Vec<f64>)) -> Self {
        Self(first, second)
    }
}
