//! Team designators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

/// Which side of the match a bridge instance controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// First side
    Blue,
    /// Second side
    Orange,
}

impl Team {
    /// Wire name of the team
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Orange => "orange",
        }
    }

    /// Team index as used by the host (0 = blue, 1 = orange)
    pub fn index(self) -> usize {
        match self {
            Team::Blue => 0,
            Team::Orange => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" | "0" => Ok(Team::Blue),
            "orange" | "1" => Ok(Team::Orange),
            other => Err(BridgeError::Config(format!("Unknown team: {}", other))),
        }
    }
}
