use std::io::Write;

use crate::{
    driver::replay::{HouseStatus, RunReport},
    foundation::error::{ReplayError, ReplayResult},
    input::model::{HouseTask, WALL},
    playback::session::{SessionFrame, TrackSnapshot},
    render::Renderer,
};

/// Plain-text status lines, optionally with both grids drawn side by side.
///
/// Grid legend: `#` wall, `.` clean floor, `1`-`9` dirt, `R` robot, `+` docking station.
pub struct TextRenderer<W: Write> {
    out: W,
    show_grid: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, show_grid: bool) -> Self {
        Self { out, show_grid }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn status_line(&mut self, t: &TrackSnapshot<'_>) -> std::io::Result<()> {
        let o = &t.observation;
        write!(
            self.out,
            "  {:<7} pos {:<8} battery {}/{} steps {}/{}",
            t.algorithm.label(),
            o.position.to_string(),
            o.battery,
            t.max_battery,
            o.step_index,
            t.max_steps
        )?;
        if o.charging {
            write!(self.out, " [charging]")?;
        }
        if o.battery_depleted {
            write!(self.out, " [depleted]")?;
        }
        if let Some(score) = t.score {
            write!(self.out, " [finished, score {score}]")?;
        }
        writeln!(self.out)
    }

    fn grids(&mut self, f: &SessionFrame<'_>) -> std::io::Result<()> {
        let a = grid_lines(&f.track_a);
        let b = grid_lines(&f.track_b);
        for (la, lb) in a.iter().zip(&b) {
            writeln!(self.out, "  {la}  |  {lb}")?;
        }
        Ok(())
    }
}

fn grid_lines(t: &TrackSnapshot<'_>) -> Vec<String> {
    let robot = t.observation.position;
    t.grid
        .rows_iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, &v)| {
                    let here = (r as i64, c as i64);
                    if here == (robot.x, robot.y) {
                        'R'
                    } else if here == (t.dock.x, t.dock.y) {
                        '+'
                    } else if v == WALL {
                        '#'
                    } else if v > 0 {
                        char::from_digit(v as u32, 10).unwrap_or('?')
                    } else {
                        '.'
                    }
                })
                .collect()
        })
        .collect()
}

fn io(e: std::io::Error) -> ReplayError {
    ReplayError::io(format!("write text frame: {e}"))
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn begin_session(&mut self, house: &HouseTask) -> ReplayResult<()> {
        writeln!(
            self.out,
            "== {} ({}x{}, maxSteps {}, maxBattery {}) ==",
            house.house_name,
            house.rows(),
            house.cols(),
            house.max_steps,
            house.max_battery
        )
        .map_err(io)
    }

    fn render(&mut self, f: &SessionFrame<'_>) -> ReplayResult<()> {
        writeln!(self.out, "[step {}]", f.step).map_err(io)?;
        self.status_line(&f.track_a).map_err(io)?;
        self.status_line(&f.track_b).map_err(io)?;
        if self.show_grid {
            self.grids(f).map_err(io)?;
        }
        if let Some(outcome) = f.outcome {
            writeln!(self.out, "{outcome}").map_err(io)?;
        }
        Ok(())
    }

    fn end_run(&mut self, report: &RunReport) -> ReplayResult<()> {
        writeln!(self.out, "== summary ==").map_err(io)?;
        for h in &report.houses {
            let status = match &h.status {
                HouseStatus::Finished => "finished".to_string(),
                HouseStatus::Skipped => "skipped".to_string(),
                HouseStatus::Stopped => "stopped".to_string(),
                HouseStatus::Missing { reason } => format!("missing ({reason})"),
            };
            let line = match &h.outcome {
                Some(o) => writeln!(
                    self.out,
                    "  {}: {status}, winner {} ({}), {} steps",
                    h.house_name,
                    o.winner.label(),
                    o.winning_score,
                    h.steps
                ),
                None => writeln!(self.out, "  {}: {status}", h.house_name),
            };
            line.map_err(io)?;
        }
        self.out.flush().map_err(io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::Position,
        input::model::Trajectory,
        playback::session::{ComparisonSession, TieBreak},
    };

    #[test]
    fn draws_status_grid_and_winner() {
        let house = HouseTask {
            house_name: "tiny".to_string(),
            house: vec![vec![0, 2, -1]],
            max_steps: 9,
            max_battery: 10.0,
        };
        let t = |steps: &[(i64, i64)], score| Trajectory {
            steps: steps.iter().map(|&(x, y)| Position::new(x, y)).collect(),
            score,
        };
        let mut s = ComparisonSession::from_trajectories(
            &house,
            t(&[(0, 0), (0, 1)], 4.0),
            t(&[(0, 0)], 6.0),
            TieBreak::default(),
        )
        .unwrap();

        let mut r = TextRenderer::new(Vec::new(), true);
        r.begin_session(&house).unwrap();
        s.step().unwrap();
        let f = s.step().unwrap();
        r.render(&f).unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();

        assert!(text.starts_with("== tiny (1x3, maxSteps 9, maxBattery 10) =="));
        assert!(text.contains("[step 2]"));
        assert!(text.contains("DFS     pos (0, 1)"));
        assert!(text.contains("battery 9/10"));
        assert!(text.contains("[finished, score 4]"));
        assert!(text.contains("  +R#  |  R2#"));
        assert!(text.contains("DFS Algorithm wins cleaning the house tiny with score: 4"));
    }
}
