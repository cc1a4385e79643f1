use crate::{
    foundation::{
        core::{Algorithm, Position},
        error::{ReplayError, ReplayResult},
    },
    input::model::{HouseTask, Trajectory},
    playback::grid::{Cell, DirtGrid},
};

/// Fraction of `maxBattery` restored per tick spent on the docking station.
pub const CHARGE_DIVISOR: f64 = 20.0;
/// Battery spent per tick away from the docking station.
pub const MOVE_COST: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TrackState {
    Running,
    Finished,
}

/// What one tick of a track produced, in the state the robot was in during that tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Observation {
    pub position: Position,
    pub step_index: usize,
    pub battery: f64,
    pub charging: bool,
    pub cleaned: bool,
    pub finished: bool,
    /// Sticky: set once the log drove the battery below zero.
    pub battery_depleted: bool,
}

/// Replays one algorithm's trajectory over its own copy of the house.
#[derive(Clone, Debug)]
pub struct PlaybackTrack {
    algorithm: Algorithm,
    trajectory: Trajectory,
    dock: Position,
    grid: DirtGrid,
    max_battery: f64,
    max_steps: u64,
    step_index: usize,
    battery: f64,
    state: TrackState,
    battery_depleted: bool,
    ticks: u64,
    last: Option<Observation>,
}

impl PlaybackTrack {
    /// Build a track in `Running` with a full battery.
    ///
    /// Rejects invalid house limits (`Validation`), an empty trajectory or any step outside
    /// the house or onto a wall (`InvalidTrajectory`). Nothing is deferred to the first tick.
    pub fn new(
        algorithm: Algorithm,
        trajectory: Trajectory,
        dock: Position,
        house: &HouseTask,
    ) -> ReplayResult<Self> {
        let grid = DirtGrid::from_house(house)?;
        trajectory.validate(format_args!("{algorithm} on '{}'", house.house_name))?;
        for (i, &p) in trajectory.steps.iter().enumerate() {
            match grid.cell(p) {
                Some(Cell::Dirt(_)) => {}
                Some(Cell::Wall) => {
                    return Err(ReplayError::invalid_trajectory(format!(
                        "{algorithm} on '{}': step {i} at {p} is a wall",
                        house.house_name
                    )));
                }
                None => {
                    return Err(ReplayError::invalid_trajectory(format!(
                        "{algorithm} on '{}': step {i} at {p} is outside the {}x{} house",
                        house.house_name,
                        house.rows(),
                        house.cols()
                    )));
                }
            }
        }

        Ok(Self {
            algorithm,
            trajectory,
            dock,
            grid,
            max_battery: house.max_battery,
            max_steps: house.max_steps as u64,
            step_index: 0,
            battery: house.max_battery,
            state: TrackState::Running,
            battery_depleted: false,
            ticks: 0,
            last: None,
        })
    }

    /// Advance one tick.
    ///
    /// Battery and charging are derived from the cell occupied during this tick, then that
    /// cell is cleaned, then the cursor moves on (or the track finishes on the last step).
    /// Once finished, this only re-emits the final observation.
    pub fn tick(&mut self) -> ReplayResult<Observation> {
        if self.state == TrackState::Finished {
            return self.last.ok_or_else(|| {
                ReplayError::precondition(format!("{} finished without a tick", self.algorithm))
            });
        }

        let position = self.trajectory.steps[self.step_index];
        let cleaned = self.grid.apply(position)?;
        let charging = position == self.dock;

        if charging {
            self.battery = (self.battery + self.max_battery / CHARGE_DIVISOR).min(self.max_battery);
        } else {
            self.battery -= MOVE_COST;
            if self.battery < 0.0 {
                if !self.battery_depleted {
                    tracing::warn!(
                        algorithm = %self.algorithm,
                        step = self.step_index,
                        "battery ran below zero; holding at 0"
                    );
                }
                self.battery_depleted = true;
                self.battery = 0.0;
            }
        }

        let observed_index = self.step_index;
        if self.step_index + 1 < self.trajectory.len() {
            self.step_index += 1;
        } else {
            self.state = TrackState::Finished;
            tracing::debug!(algorithm = %self.algorithm, ticks = self.ticks + 1, "track finished");
        }
        self.ticks += 1;

        let obs = Observation {
            position,
            step_index: observed_index,
            battery: self.battery,
            charging,
            cleaned,
            finished: self.is_finished(),
            battery_depleted: self.battery_depleted,
        };
        tracing::trace!(algorithm = %self.algorithm, ?obs, "tick");
        self.last = Some(obs);
        Ok(obs)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == TrackState::Finished
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn max_battery(&self) -> f64 {
        self.max_battery
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    pub fn dock(&self) -> Position {
        self.dock
    }

    pub fn score(&self) -> f64 {
        self.trajectory.score
    }

    pub fn grid(&self) -> &DirtGrid {
        &self.grid
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_observation(&self) -> Option<Observation> {
        self.last
    }
}
