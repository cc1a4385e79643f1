use crate::{
    foundation::{
        core::Fps,
        error::{ReplayError, ReplayResult},
    },
    playback::{queue::HouseQueue, session::TieBreak},
};

/// When `continue_to_next` may end a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ContinuePolicy {
    /// Ignore continue until both tracks have finished.
    #[default]
    AfterFinish,
    /// Continue mid-session behaves like a skip.
    Anytime,
}

/// Options owned by the top-level driver and handed to every session it builds.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    /// Tick rate used when `realtime` is set.
    pub fps: Fps,
    /// Sleep between frames to hold `fps`. Off for headless runs.
    pub realtime: bool,
    /// House log entries consumed per comparison.
    pub stride: usize,
    pub continue_policy: ContinuePolicy,
    pub tie_break: TieBreak,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            realtime: false,
            stride: HouseQueue::DEFAULT_STRIDE,
            continue_policy: ContinuePolicy::default(),
            tie_break: TieBreak::default(),
        }
    }
}

impl SessionContext {
    pub fn validate(&self) -> ReplayResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.stride == 0 {
            return Err(ReplayError::validation("stride must be > 0"));
        }
        Ok(())
    }
}
