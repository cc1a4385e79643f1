use crate::{
    driver::context::{ContinuePolicy, SessionContext},
    foundation::error::{ReplayError, ReplayResult},
    input::store::TrajectoryStore,
    playback::{
        queue::HouseQueue,
        session::{ComparisonSession, Outcome, SessionFrame},
    },
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum HouseStatus {
    /// Both tracks finished and the winner was acknowledged.
    Finished,
    /// Ended early by `force_skip`.
    Skipped,
    /// Not replayed: a trajectory was missing from the step log.
    Missing { reason: String },
    /// In progress when the run was stopped.
    Stopped,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HouseReport {
    pub house_name: String,
    pub status: HouseStatus,
    pub outcome: Option<Outcome>,
    pub steps: u64,
    /// Dirt left on track A's and track B's grid; `None` when no session was built.
    pub dirt_left: Option<[u64; 2]>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RunReport {
    pub houses: Vec<HouseReport>,
    pub stopped: bool,
}

impl RunReport {
    pub fn finished(&self) -> impl Iterator<Item = &HouseReport> {
        self.houses
            .iter()
            .filter(|h| h.status == HouseStatus::Finished)
    }
}

/// Sequences comparison sessions over the house log.
///
/// This is the surface the UI drives: `tick` once per frame, `continue_to_next` /
/// `force_skip` to move between houses, `stop` to abandon the run.
pub struct Replay<'s> {
    store: &'s TrajectoryStore,
    ctx: SessionContext,
    queue: HouseQueue<'s>,
    current: Option<ComparisonSession>,
    sessions_started: u64,
    report: RunReport,
}

impl<'s> Replay<'s> {
    /// Validate `ctx` and open the first replayable house.
    pub fn new(store: &'s TrajectoryStore, ctx: SessionContext) -> ReplayResult<Self> {
        ctx.validate()?;
        let queue = HouseQueue::new(store.houses(), ctx.stride)?;
        let mut replay = Self {
            store,
            ctx,
            queue,
            current: None,
            sessions_started: 0,
            report: RunReport::default(),
        };
        replay.open_next()?;
        Ok(replay)
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn current(&self) -> Option<&ComparisonSession> {
        self.current.as_ref()
    }

    /// Increments each time a new session is opened.
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    pub fn is_done(&self) -> bool {
        self.current.is_none()
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Advance the current session one step.
    pub fn tick(&mut self) -> ReplayResult<SessionFrame<'_>> {
        self.current
            .as_mut()
            .ok_or_else(|| ReplayError::precondition("tick with no session open"))?
            .step()
    }

    /// Move to the next house once the current session has finished. Returns whether the
    /// request was honoured.
    pub fn continue_to_next(&mut self) -> ReplayResult<bool> {
        let Some(session) = &self.current else {
            return Ok(false);
        };
        if !session.is_finished() {
            if self.ctx.continue_policy == ContinuePolicy::Anytime {
                return self.force_skip();
            }
            tracing::debug!(
                house = %session.house().house_name,
                "continue ignored while session is running"
            );
            return Ok(false);
        }
        self.close_current(HouseStatus::Finished);
        self.open_next()?;
        Ok(true)
    }

    /// End the current session immediately and move on.
    pub fn force_skip(&mut self) -> ReplayResult<bool> {
        let Some(session) = &self.current else {
            return Ok(false);
        };
        let status = if session.is_finished() {
            HouseStatus::Finished
        } else {
            tracing::info!(house = %session.house().house_name, "session skipped");
            HouseStatus::Skipped
        };
        self.close_current(status);
        self.open_next()?;
        Ok(true)
    }

    /// Abandon the run, discarding the in-progress session.
    pub fn stop(mut self) -> RunReport {
        if self.current.is_some() {
            self.close_current(HouseStatus::Stopped);
        }
        self.report.stopped = true;
        self.report
    }

    /// Consume the replay once every house has been handled.
    pub fn finish(mut self) -> RunReport {
        if self.current.is_some() {
            self.close_current(HouseStatus::Stopped);
            self.report.stopped = true;
        }
        self.report
    }

    fn close_current(&mut self, status: HouseStatus) {
        let Some(session) = self.current.take() else {
            return;
        };
        let [a, b] = session.tracks();
        self.report.houses.push(HouseReport {
            house_name: session.house().house_name.clone(),
            status,
            outcome: session.outcome().cloned(),
            steps: session.steps(),
            dirt_left: Some([a.grid().total_dirt(), b.grid().total_dirt()]),
        });
    }

    fn open_next(&mut self) -> ReplayResult<()> {
        for house in self.queue.by_ref() {
            match ComparisonSession::new(self.store, house, self.ctx.tie_break) {
                Ok(session) => {
                    self.current = Some(session);
                    self.sessions_started += 1;
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(house = %house.house_name, "skipping house: {e}");
                    self.report.houses.push(HouseReport {
                        house_name: house.house_name.clone(),
                        status: HouseStatus::Missing {
                            reason: e.to_string(),
                        },
                        outcome: None,
                        steps: 0,
                        dirt_left: None,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Algorithm;

    const HOUSES: &str = r#"{"houses": [
        {"houseName": "one", "maxSteps": 10, "maxBattery": 10, "house": [[1, 1]]},
        {"houseName": "one", "maxSteps": 10, "maxBattery": 10, "house": [[1, 1]]},
        {"houseName": "ghost", "maxSteps": 10, "maxBattery": 10, "house": [[0]]},
        {"houseName": "ghost", "maxSteps": 10, "maxBattery": 10, "house": [[0]]},
        {"houseName": "two", "maxSteps": 10, "maxBattery": 10, "house": [[0, 2]]},
        {"houseName": "two", "maxSteps": 10, "maxBattery": 10, "house": [[0, 2]]}
    ]}"#;

    const STEPS: &str = r#"[
        {"houseName": "one", "algorithmName": "DFSAlgorithm",
         "steps": [{"x": 0, "y": 0}, {"x": 0, "y": 1}], "score": 9},
        {"houseName": "one", "algorithmName": "SpiralCleaningAlgorithm",
         "steps": [{"x": 0, "y": 0}], "score": 4},
        {"houseName": "ghost", "algorithmName": "DFSAlgorithm",
         "steps": [{"x": 0, "y": 0}], "score": 1},
        {"houseName": "two", "algorithmName": "DFSAlgorithm",
         "steps": [{"x": 0, "y": 0}, {"x": 0, "y": 1}, {"x": 0, "y": 1}], "score": 3},
        {"houseName": "two", "algorithmName": "SpiralCleaningAlgorithm",
         "steps": [{"x": 0, "y": 0}, {"x": 0, "y": 1}], "score": 8}
    ]"#;

    fn store() -> TrajectoryStore {
        TrajectoryStore::from_json_str(HOUSES, STEPS).unwrap()
    }

    #[test]
    fn continue_is_ignored_until_finished() {
        let store = store();
        let mut r = Replay::new(&store, SessionContext::default()).unwrap();
        assert_eq!(r.current().unwrap().house().house_name, "one");

        r.tick().unwrap();
        assert!(!r.continue_to_next().unwrap());
        assert_eq!(r.current().unwrap().house().house_name, "one");

        let f = r.tick().unwrap();
        assert!(f.session_finished);
        assert_eq!(f.winner, Some(Algorithm::Spiral));
        assert!(r.tick().is_err());

        assert!(r.continue_to_next().unwrap());
        assert_eq!(r.current().unwrap().house().house_name, "two");
        assert_eq!(r.sessions_started(), 2);

        let missing = &r.report().houses[1];
        assert_eq!(missing.house_name, "ghost");
        assert!(matches!(missing.status, HouseStatus::Missing { .. }));
    }

    #[test]
    fn anytime_policy_turns_continue_into_skip() {
        let store = store();
        let ctx = SessionContext {
            continue_policy: ContinuePolicy::Anytime,
            ..SessionContext::default()
        };
        let mut r = Replay::new(&store, ctx).unwrap();
        r.tick().unwrap();
        assert!(r.continue_to_next().unwrap());
        assert_eq!(r.report().houses[0].status, HouseStatus::Skipped);
        assert_eq!(r.current().unwrap().house().house_name, "two");
    }

    #[test]
    fn full_run_reports_every_house() {
        let store = store();
        let mut r = Replay::new(&store, SessionContext::default()).unwrap();
        while !r.is_done() {
            if r.current().unwrap().is_finished() {
                r.continue_to_next().unwrap();
            } else {
                r.tick().unwrap();
            }
        }
        let report = r.finish();
        assert!(!report.stopped);
        assert_eq!(report.houses.len(), 3);
        assert_eq!(report.finished().count(), 2);

        let two = &report.houses[2];
        assert_eq!(two.outcome.as_ref().unwrap().winner, Algorithm::Dfs);
        assert_eq!(two.steps, 3);
        assert_eq!(two.dirt_left, Some([0, 1]));
    }

    #[test]
    fn stop_discards_the_running_session() {
        let store = store();
        let mut r = Replay::new(&store, SessionContext::default()).unwrap();
        r.tick().unwrap();
        let report = r.stop();
        assert!(report.stopped);
        assert_eq!(report.houses.len(), 1);
        assert_eq!(report.houses[0].status, HouseStatus::Stopped);
        assert!(report.houses[0].outcome.is_none());
    }

    #[test]
    fn tick_without_session_is_a_precondition_violation() {
        let store = TrajectoryStore::from_json_str(r#"{"houses": []}"#, "[]").unwrap();
        let mut r = Replay::new(&store, SessionContext::default()).unwrap();
        assert!(r.is_done());
        assert!(matches!(
            r.tick(),
            Err(ReplayError::PreconditionViolation(_))
        ));
        assert!(!r.continue_to_next().unwrap());
    }
}
