use crate::foundation::{
    core::{Algorithm, Position},
    error::{ReplayError, ReplayResult},
};

/// Cell value marking a wall in a house matrix.
pub const WALL: i32 = -1;
/// Highest dirt level a cell may start with.
pub const MAX_DIRT: i32 = 9;

/// Top-level shape of `initial_house.json`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HouseLog {
    pub houses: Vec<HouseTask>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseTask {
    pub house_name: String,
    pub house: Vec<Vec<i32>>, // row-major, -1 = wall, 0..=9 = dirt
    pub max_steps: i64,
    pub max_battery: f64,
}

/// One entry of `steps_history.json`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub algorithm_name: String,
    pub house_name: String,
    #[serde(flatten)]
    pub trajectory: Trajectory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docking_station: Option<Position>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trajectory {
    pub steps: Vec<Position>,
    pub score: f64,
}

impl HouseTask {
    pub fn rows(&self) -> usize {
        self.house.len()
    }

    pub fn cols(&self) -> usize {
        self.house.first().map_or(0, Vec::len)
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.rows() && (p.y as usize) < self.cols()
    }

    pub fn validate(&self) -> ReplayResult<()> {
        if self.house_name.trim().is_empty() {
            return Err(ReplayError::validation("houseName must be non-empty"));
        }
        if self.max_steps <= 0 {
            return Err(ReplayError::validation(format!(
                "house '{}' maxSteps must be > 0 (got {})",
                self.house_name, self.max_steps
            )));
        }
        if !(self.max_battery.is_finite() && self.max_battery > 0.0) {
            return Err(ReplayError::validation(format!(
                "house '{}' maxBattery must be > 0 (got {})",
                self.house_name, self.max_battery
            )));
        }
        if self.rows() == 0 || self.cols() == 0 {
            return Err(ReplayError::validation(format!(
                "house '{}' matrix must be non-empty",
                self.house_name
            )));
        }

        let cols = self.cols();
        for (r, row) in self.house.iter().enumerate() {
            if row.len() != cols {
                return Err(ReplayError::validation(format!(
                    "house '{}' matrix is not rectangular (row {r} has {} cells, expected {cols})",
                    self.house_name,
                    row.len()
                )));
            }
            if let Some((c, v)) = row
                .iter()
                .enumerate()
                .find(|&(_, &v)| !(WALL..=MAX_DIRT).contains(&v))
            {
                return Err(ReplayError::validation(format!(
                    "house '{}' cell ({r}, {c}) has value {v}, expected -1..=9",
                    self.house_name
                )));
            }
        }

        Ok(())
    }
}

impl StepRecord {
    /// `None` for algorithms this replay does not compare.
    pub fn algorithm(&self) -> Option<Algorithm> {
        Algorithm::from_log_name(&self.algorithm_name)
    }

    pub fn validate(&self) -> ReplayResult<()> {
        let first = self
            .trajectory
            .validate(format_args!("{} on '{}'", self.algorithm_name, self.house_name))?;
        if let Some(dock) = self.docking_station
            && dock != first
        {
            return Err(ReplayError::invalid_trajectory(format!(
                "{} on '{}': dockingStation {dock} differs from first step {first}",
                self.algorithm_name, self.house_name
            )));
        }
        Ok(())
    }
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The first step, which by convention is the docking station.
    pub fn dock(&self) -> Option<Position> {
        self.steps.first().copied()
    }

    /// Checks the trajectory is replayable and returns its docking station. `context` prefixes
    /// error messages.
    pub fn validate(&self, context: impl std::fmt::Display) -> ReplayResult<Position> {
        if !self.score.is_finite() {
            return Err(ReplayError::invalid_trajectory(format!(
                "{context}: score must be finite (got {})",
                self.score
            )));
        }
        self.dock().ok_or_else(|| {
            ReplayError::invalid_trajectory(format!("{context}: trajectory has no steps"))
        })
    }
}
