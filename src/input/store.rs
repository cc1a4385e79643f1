use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::{
        core::Algorithm,
        error::{ReplayError, ReplayResult},
    },
    input::model::{HouseLog, HouseTask, StepRecord, Trajectory},
};

/// Read-only index over the house log and the step log.
///
/// Nothing is validated at load time beyond JSON shape: house limits and trajectories are
/// checked when a session is built from them, so one bad entry does not poison the rest.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryStore {
    houses: Vec<HouseTask>,
    records: Vec<StepRecord>,
}

impl TrajectoryStore {
    pub fn new(houses: Vec<HouseTask>, records: Vec<StepRecord>) -> Self {
        Self { houses, records }
    }

    /// Load both artifacts from disk (`initial_house.json`, `steps_history.json`).
    #[tracing::instrument(skip_all)]
    pub fn load(houses_path: impl AsRef<Path>, steps_path: impl AsRef<Path>) -> ReplayResult<Self> {
        let (houses_path, steps_path) = (houses_path.as_ref(), steps_path.as_ref());
        let houses: HouseLog = read_json(houses_path, "house log")?;
        let records: Vec<StepRecord> = read_json(steps_path, "step log")?;
        tracing::info!(
            houses_path = %houses_path.display(),
            steps_path = %steps_path.display(),
            houses = houses.houses.len(),
            records = records.len(),
            "loaded replay inputs"
        );
        Ok(Self::new(houses.houses, records))
    }

    pub fn from_json_str(houses_json: &str, steps_json: &str) -> ReplayResult<Self> {
        let houses: HouseLog = serde_json::from_str(houses_json)
            .map_err(|e| ReplayError::serde(format!("parse house log JSON: {e}")))?;
        let records: Vec<StepRecord> = serde_json::from_str(steps_json)
            .map_err(|e| ReplayError::serde(format!("parse step log JSON: {e}")))?;
        Ok(Self::new(houses.houses, records))
    }

    pub fn houses(&self) -> &[HouseTask] {
        &self.houses
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// First step-log entry matching `house_name` and `algorithm` exactly.
    pub fn record(&self, house_name: &str, algorithm: Algorithm) -> ReplayResult<&StepRecord> {
        self.records
            .iter()
            .find(|r| r.house_name == house_name && r.algorithm() == Some(algorithm))
            .ok_or_else(|| ReplayError::not_found(house_name, algorithm))
    }

    pub fn trajectory(&self, house_name: &str, algorithm: Algorithm) -> ReplayResult<&Trajectory> {
        self.record(house_name, algorithm).map(|r| &r.trajectory)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> ReplayResult<T> {
    let f = File::open(path)
        .map_err(|e| ReplayError::io(format!("open {what} '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| ReplayError::serde(format!("parse {what} '{}': {e}", path.display())))
}
