//! Side-by-side replay of two precomputed cleaning-robot trajectories.
//!
//! A planner runs a depth-first-search strategy and a spiral strategy over the same houses and
//! logs every position each robot visited. This crate replays both logs in lockstep, one tick
//! per frame, deriving battery, charging and cleaning state from the raw positions, and
//! declares the strategy with the lower recorded score the winner.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `initial_house.json` + `steps_history.json` -> [`TrajectoryStore`]
//! 2. **Queue**: [`HouseQueue`] walks the house log (stride 2 by default)
//! 3. **Replay**: [`ComparisonSession`] steps two [`PlaybackTrack`]s, each over its own
//!    [`DirtGrid`], and fixes an [`Outcome`] once both are finished
//! 4. **Render**: every step is handed to a [`Renderer`] as a read-only [`SessionFrame`]
//!
//! [`Replay`] ties 2 and 3 together behind the controls a UI needs (`tick`,
//! `continue_to_next`, `force_skip`, `stop`) and [`run`] drives it from a [`ControlSource`].
//!
//! Replays are deterministic: the same inputs always produce the same frame stream.
#![forbid(unsafe_code)]

mod driver;
mod foundation;
mod input;
mod playback;

/// Frame consumers.
pub mod render;

pub use driver::context::{ContinuePolicy, SessionContext};
pub use driver::control::{
    AutoContinue, ControlSource, ScriptedControl, Signal, StdinControl, parse_command,
};
pub use driver::replay::{HouseReport, HouseStatus, Replay, RunReport};
pub use driver::runner::{Pacer, run};
pub use foundation::core::{Algorithm, Fps, Position};
pub use foundation::error::{ReplayError, ReplayResult};
pub use input::model::{HouseLog, HouseTask, MAX_DIRT, StepRecord, Trajectory, WALL};
pub use input::store::TrajectoryStore;
pub use input::summary::{ScoreSummary, SummaryRow};
pub use playback::grid::{Cell, DirtGrid};
pub use playback::queue::HouseQueue;
pub use playback::session::{ComparisonSession, Outcome, SessionFrame, TieBreak, TrackSnapshot};
pub use playback::track::{CHARGE_DIVISOR, MOVE_COST, Observation, PlaybackTrack, TrackState};
pub use render::{
    FrameRecord, JsonLinesRenderer, NullRenderer, RecordingRenderer, Renderer, TextRenderer,
};
