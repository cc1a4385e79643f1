use std::fmt;

use crate::foundation::error::{ReplayError, ReplayResult};

/// Grid coordinate as written by the planner: `x` is the row, `y` the column.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The two planning strategies being compared. Track A is always [`Algorithm::Dfs`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Algorithm {
    #[serde(rename = "DFSAlgorithm")]
    Dfs,
    #[serde(rename = "SpiralCleaningAlgorithm")]
    Spiral,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Dfs, Algorithm::Spiral];

    /// Name used in the step log's `algorithmName` field.
    pub fn log_name(self) -> &'static str {
        match self {
            Self::Dfs => "DFSAlgorithm",
            Self::Spiral => "SpiralCleaningAlgorithm",
        }
    }

    pub fn from_log_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.log_name() == name)
    }

    /// Short human label ("DFS", "Spiral").
    pub fn label(self) -> &'static str {
        match self {
            Self::Dfs => "DFS",
            Self::Spiral => "Spiral",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.log_name())
    }
}

/// Playback tick rate as a rational number of ticks per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ReplayResult<Self> {
        if den == 0 {
            return Err(ReplayError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReplayError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frame_duration(self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.frame_duration_secs())
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 8, den: 1 }
    }
}
