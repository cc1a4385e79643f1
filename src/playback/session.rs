use std::fmt;

use crate::{
    foundation::{
        core::{Algorithm, Position},
        error::{ReplayError, ReplayResult},
    },
    input::{
        model::{HouseTask, Trajectory},
        store::TrajectoryStore,
    },
    playback::{
        grid::DirtGrid,
        track::{Observation, PlaybackTrack},
    },
};

/// Which track wins when both recorded scores are equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TieBreak {
    /// Track A (DFS) wins ties.
    #[default]
    PreferFirst,
    /// Track B (Spiral) wins ties.
    PreferSecond,
}

/// Final result of a session. Lower recorded score wins.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Outcome {
    pub house_name: String,
    pub winner: Algorithm,
    pub winning_score: f64,
    pub scores: [(Algorithm, f64); 2],
    /// The scores were equal and `TieBreak` decided.
    pub tied: bool,
}

impl Outcome {
    pub fn decide(
        house_name: impl Into<String>,
        a: (Algorithm, f64),
        b: (Algorithm, f64),
        tie_break: TieBreak,
    ) -> Self {
        let tied = a.1.total_cmp(&b.1).is_eq();
        let a_wins = if tied {
            tie_break == TieBreak::PreferFirst
        } else {
            a.1 < b.1
        };
        let (winner, winning_score) = if a_wins { a } else { b };
        Self {
            house_name: house_name.into(),
            winner,
            winning_score,
            scores: [a, b],
            tied,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Algorithm wins cleaning the house {} with score: {}",
            self.winner.label(),
            self.house_name,
            self.winning_score
        )
    }
}

/// Read-only view of one track for a renderer.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct TrackSnapshot<'a> {
    pub algorithm: Algorithm,
    pub observation: Observation,
    pub grid: &'a DirtGrid,
    pub dock: Position,
    pub ticks: u64,
    pub max_steps: u64,
    pub max_battery: f64,
    /// Revealed once this track has finished.
    pub score: Option<f64>,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct SessionFrame<'a> {
    pub house_name: &'a str,
    pub step: u64,
    pub track_a: TrackSnapshot<'a>,
    pub track_b: TrackSnapshot<'a>,
    pub session_finished: bool,
    pub winner: Option<Algorithm>,
    pub outcome: Option<&'a Outcome>,
}

/// Two tracks over the same house advanced in lockstep.
#[derive(Clone, Debug)]
pub struct ComparisonSession {
    house: HouseTask,
    tracks: [PlaybackTrack; 2],
    tie_break: TieBreak,
    steps: u64,
    outcome: Option<Outcome>,
}

impl ComparisonSession {
    /// Look up both trajectories for `house` and build the session.
    ///
    /// Fails with `NotFound` when either algorithm has no entry, which callers may skip.
    #[tracing::instrument(skip_all, fields(house = %house.house_name))]
    pub fn new(
        store: &TrajectoryStore,
        house: &HouseTask,
        tie_break: TieBreak,
    ) -> ReplayResult<Self> {
        let [a, b] = Algorithm::ALL;
        let rec_a = store.record(&house.house_name, a)?;
        let rec_b = store.record(&house.house_name, b)?;
        rec_a.validate()?;
        rec_b.validate()?;
        Self::from_trajectories(
            house,
            rec_a.trajectory.clone(),
            rec_b.trajectory.clone(),
            tie_break,
        )
    }

    /// Build from explicit trajectories for track A (DFS) and track B (Spiral).
    ///
    /// The docking station is track A's first step and is shared by both tracks.
    pub fn from_trajectories(
        house: &HouseTask,
        track_a: Trajectory,
        track_b: Trajectory,
        tie_break: TieBreak,
    ) -> ReplayResult<Self> {
        let [a, b] = Algorithm::ALL;
        let dock = track_a.validate(format_args!("{a} on '{}'", house.house_name))?;
        if let Some(other) = track_b.dock()
            && other != dock
        {
            tracing::warn!(
                house = %house.house_name,
                dock = %dock,
                first_step = %other,
                "{b} does not start on the shared docking station"
            );
        }

        let tracks = [
            PlaybackTrack::new(a, track_a, dock, house)?,
            PlaybackTrack::new(b, track_b, dock, house)?,
        ];
        tracing::info!(
            house = %house.house_name,
            rows = house.rows(),
            cols = house.cols(),
            "session started"
        );

        Ok(Self {
            house: house.clone(),
            tracks,
            tie_break,
            steps: 0,
            outcome: None,
        })
    }

    /// Advance both tracks one tick. A finished track holds its last frame while the other
    /// keeps going. On error neither track moves. Calling this once the session is finished
    /// is a precondition violation.
    pub fn step(&mut self) -> ReplayResult<SessionFrame<'_>> {
        if self.is_finished() {
            return Err(ReplayError::precondition(format!(
                "session for '{}' is already finished",
                self.house.house_name
            )));
        }

        // Both tracks advance or neither does.
        let mut next = self.tracks.clone();
        for track in &mut next {
            track.tick()?;
        }
        self.tracks = next;
        self.steps += 1;

        if self.is_finished() && self.outcome.is_none() {
            let [a, b] = &self.tracks;
            let outcome = Outcome::decide(
                self.house.house_name.clone(),
                (a.algorithm(), a.score()),
                (b.algorithm(), b.score()),
                self.tie_break,
            );
            tracing::info!(steps = self.steps, tied = outcome.tied, "{outcome}");
            self.outcome = Some(outcome);
        }

        self.frame()
            .ok_or_else(|| ReplayError::precondition("stepped tracks produced no observation"))
    }

    /// The most recent frame, or `None` before the first step.
    pub fn frame(&self) -> Option<SessionFrame<'_>> {
        let [a, b] = &self.tracks;
        Some(SessionFrame {
            house_name: &self.house.house_name,
            step: self.steps,
            track_a: snapshot(a)?,
            track_b: snapshot(b)?,
            session_finished: self.is_finished(),
            winner: self.winner(),
            outcome: self.outcome.as_ref(),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.tracks.iter().all(PlaybackTrack::is_finished)
    }

    pub fn winner(&self) -> Option<Algorithm> {
        self.outcome.as_ref().map(|o| o.winner)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn house(&self) -> &HouseTask {
        &self.house
    }

    pub fn tracks(&self) -> &[PlaybackTrack; 2] {
        &self.tracks
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

fn snapshot(track: &PlaybackTrack) -> Option<TrackSnapshot<'_>> {
    Some(TrackSnapshot {
        algorithm: track.algorithm(),
        observation: track.last_observation()?,
        grid: track.grid(),
        dock: track.dock(),
        ticks: track.ticks(),
        max_steps: track.max_steps(),
        max_battery: track.max_battery(),
        score: track.is_finished().then(|| track.score()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house(name: &str) -> HouseTask {
        HouseTask {
            house_name: name.to_string(),
            house: vec![vec![0, 2, 1], vec![0, -1, 0]],
            max_steps: 50,
            max_battery: 10.0,
        }
    }

    fn traj(steps: &[(i64, i64)], score: f64) -> Trajectory {
        Trajectory {
            steps: steps.iter().map(|&(x, y)| Position::new(x, y)).collect(),
            score,
        }
    }

    #[test]
    fn shorter_track_finishes_first() {
        let mut s = ComparisonSession::from_trajectories(
            &house("h"),
            traj(&[(0, 0), (0, 1)], 10.0),
            traj(&[(0, 0), (1, 0), (1, 0), (0, 0)], 20.0),
            TieBreak::default(),
        )
        .unwrap();

        assert!(s.frame().is_none());

        let f1 = s.step().unwrap();
        assert!(!f1.session_finished);
        assert!(f1.winner.is_none());

        let f2 = s.step().unwrap();
        assert!(f2.track_a.observation.finished);
        assert_eq!(f2.track_a.score, Some(10.0));
        assert!(!f2.track_b.observation.finished);
        assert_eq!(f2.track_b.score, None);
        assert!(!f2.session_finished);
        assert!(f2.winner.is_none());

        let f3 = s.step().unwrap();
        assert_eq!(f3.track_a.observation.position, Position::new(0, 1));
        assert!(!f3.session_finished);

        let f4 = s.step().unwrap();
        assert!(f4.session_finished);
        assert_eq!(f4.winner, Some(Algorithm::Dfs));
        assert_eq!(f4.step, 4);
        assert_eq!(s.tracks()[0].ticks(), 2);
        assert_eq!(s.tracks()[1].ticks(), 4);
    }

    #[test]
    fn tracks_clean_independent_grids() {
        let mut s = ComparisonSession::from_trajectories(
            &house("h"),
            traj(&[(0, 0), (0, 1)], 1.0),
            traj(&[(0, 0), (0, 2)], 2.0),
            TieBreak::default(),
        )
        .unwrap();
        s.step().unwrap();
        let f = s.step().unwrap();
        assert_eq!(f.track_a.grid.level_at(Position::new(0, 1)), Some(1));
        assert_eq!(f.track_b.grid.level_at(Position::new(0, 1)), Some(2));
        assert_eq!(f.track_b.grid.level_at(Position::new(0, 2)), Some(0));
    }

    #[test]
    fn lower_score_wins_and_stays_fixed() {
        let mut s = ComparisonSession::from_trajectories(
            &house("h"),
            traj(&[(0, 0)], 300.0),
            traj(&[(0, 0)], 120.0),
            TieBreak::default(),
        )
        .unwrap();
        let f = s.step().unwrap();
        assert_eq!(f.winner, Some(Algorithm::Spiral));
        let o = s.outcome().unwrap();
        assert!(!o.tied);
        assert_eq!(o.winning_score, 120.0);
        assert_eq!(
            o.to_string(),
            "Spiral Algorithm wins cleaning the house h with score: 120"
        );
        assert!(matches!(
            s.step(),
            Err(ReplayError::PreconditionViolation(_))
        ));
        assert_eq!(s.winner(), Some(Algorithm::Spiral));
    }

    #[test]
    fn ties_follow_tie_break() {
        let first = Outcome::decide(
            "h",
            (Algorithm::Dfs, 5.0),
            (Algorithm::Spiral, 5.0),
            TieBreak::PreferFirst,
        );
        assert_eq!(first.winner, Algorithm::Dfs);
        assert!(first.tied);

        let second = Outcome::decide(
            "h",
            (Algorithm::Dfs, 5.0),
            (Algorithm::Spiral, 5.0),
            TieBreak::PreferSecond,
        );
        assert_eq!(second.winner, Algorithm::Spiral);
    }

    #[test]
    fn both_tracks_charge_on_track_a_dock() {
        let mut s = ComparisonSession::from_trajectories(
            &house("h"),
            traj(&[(0, 0), (1, 0)], 1.0),
            traj(&[(1, 0), (0, 0)], 2.0),
            TieBreak::default(),
        )
        .unwrap();
        let f1 = s.step().unwrap();
        assert!(f1.track_a.observation.charging);
        assert!(!f1.track_b.observation.charging);
        let f2 = s.step().unwrap();
        assert!(!f2.track_a.observation.charging);
        assert!(f2.track_b.observation.charging);
        assert_eq!(f2.track_b.dock, Position::new(0, 0));
    }

    #[test]
    fn wall_step_fails_construction_not_a_later_step() {
        let walled = HouseTask {
            house_name: "w".to_string(),
            house: vec![vec![0, -1, 0]],
            max_steps: 10,
            max_battery: 10.0,
        };
        let err = ComparisonSession::from_trajectories(
            &walled,
            traj(&[(0, 0), (0, 2)], 1.0),
            traj(&[(0, 0), (0, 1)], 2.0),
            TieBreak::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::InvalidTrajectory(_)));
    }

    #[test]
    fn tracks_stay_in_lockstep() {
        let mut s = ComparisonSession::from_trajectories(
            &house("h"),
            traj(&[(0, 0), (0, 1), (0, 2)], 1.0),
            traj(&[(0, 0), (1, 0), (1, 0)], 2.0),
            TieBreak::default(),
        )
        .unwrap();
        while !s.is_finished() {
            s.step().unwrap();
            let [a, b] = s.tracks();
            assert_eq!(a.ticks(), s.steps());
            assert_eq!(b.ticks(), s.steps());
        }
        assert_eq!(s.steps(), 3);
    }

    #[test]
    fn lookup_through_store_reports_not_found() {
        let steps = r#"[{"houseName": "h", "algorithmName": "DFSAlgorithm",
            "steps": [{"x": 0, "y": 0}], "score": 3}]"#;
        let store = TrajectoryStore::from_json_str(r#"{"houses": []}"#, steps).unwrap();
        let err = ComparisonSession::new(&store, &house("h"), TieBreak::default()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn empty_trajectory_from_store_is_invalid() {
        let steps = r#"[
            {"houseName": "h", "algorithmName": "DFSAlgorithm", "steps": [], "score": 3},
            {"houseName": "h", "algorithmName": "SpiralCleaningAlgorithm",
             "steps": [{"x": 0, "y": 0}], "score": 4}
        ]"#;
        let store = TrajectoryStore::from_json_str(r#"{"houses": []}"#, steps).unwrap();
        let err = ComparisonSession::new(&store, &house("h"), TieBreak::default()).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidTrajectory(_)));
    }
}
