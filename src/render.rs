//! Renderer seam.
//!
//! The replay core never draws. Each frame it hands a read-only [`SessionFrame`] to a
//! [`Renderer`], which owns all presentation. The built-in renderers cover terminals
//! ([`TextRenderer`]), machine consumers ([`JsonLinesRenderer`]) and tests
//! ([`RecordingRenderer`]).

pub mod json;
pub mod text;

use crate::{
    driver::replay::RunReport,
    foundation::{core::Algorithm, error::ReplayResult},
    input::model::HouseTask,
    playback::{session::SessionFrame, track::Observation},
};

pub use json::JsonLinesRenderer;
pub use text::TextRenderer;

/// Consumer of replay frames.
///
/// Ordering contract: `begin_session` precedes the frames of that house, frames arrive in
/// increasing `step` order, and `end_run` is called once after the last house.
pub trait Renderer {
    fn begin_session(&mut self, _house: &HouseTask) -> ReplayResult<()> {
        Ok(())
    }

    fn render(&mut self, frame: &SessionFrame<'_>) -> ReplayResult<()>;

    fn end_run(&mut self, _report: &RunReport) -> ReplayResult<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &SessionFrame<'_>) -> ReplayResult<()> {
        Ok(())
    }
}

/// Owned copy of the per-frame state, without grids.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameRecord {
    pub house_name: String,
    pub step: u64,
    pub observations: [Observation; 2],
    pub session_finished: bool,
    pub winner: Option<Algorithm>,
}

impl From<&SessionFrame<'_>> for FrameRecord {
    fn from(f: &SessionFrame<'_>) -> Self {
        Self {
            house_name: f.house_name.to_string(),
            step: f.step,
            observations: [f.track_a.observation, f.track_b.observation],
            session_finished: f.session_finished,
            winner: f.winner,
        }
    }
}

/// In-memory renderer for tests and debugging.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub sessions: Vec<String>,
    pub frames: Vec<FrameRecord>,
    pub ended: bool,
}

impl Renderer for RecordingRenderer {
    fn begin_session(&mut self, house: &HouseTask) -> ReplayResult<()> {
        self.sessions.push(house.house_name.clone());
        Ok(())
    }

    fn render(&mut self, frame: &SessionFrame<'_>) -> ReplayResult<()> {
        self.frames.push(frame.into());
        Ok(())
    }

    fn end_run(&mut self, _report: &RunReport) -> ReplayResult<()> {
        self.ended = true;
        Ok(())
    }
}
