use std::time::{Duration, Instant};

use crate::{
    driver::{
        context::SessionContext,
        control::{ControlSource, Signal},
        replay::{Replay, RunReport},
    },
    foundation::error::ReplayResult,
    render::Renderer,
};

/// Holds the loop to a fixed frame period when real-time pacing is on.
#[derive(Clone, Debug)]
pub struct Pacer {
    period: Option<Duration>,
    next: Instant,
}

impl Pacer {
    pub fn new(ctx: &SessionContext) -> Self {
        Self {
            period: ctx.realtime.then(|| ctx.fps.frame_duration()),
            next: Instant::now(),
        }
    }

    pub fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        self.next += period;
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
        } else {
            // Fell behind; don't try to catch up with a burst of frames.
            self.next = now;
        }
    }
}

/// Drive `replay` to completion: one control poll and at most one session step per frame.
///
/// Frames reach the renderer only when the state advanced, so a paused or finished session
/// waiting for `Continue` produces no output. While idle like that the control source is
/// asked to [`wait`](ControlSource::wait) instead of being polled.
pub fn run(
    mut replay: Replay<'_>,
    renderer: &mut dyn Renderer,
    control: &mut dyn ControlSource,
) -> ReplayResult<RunReport> {
    let mut pacer = Pacer::new(replay.context());
    let mut paused = false;
    let mut announced = 0u64;

    while let Some(session) = replay.current() {
        if announced != replay.sessions_started() {
            announced = replay.sessions_started();
            paused = false;
            renderer.begin_session(session.house())?;
        }

        let finished = session.is_finished();
        let signal = if paused || finished {
            control.wait(finished)
        } else {
            control.poll(finished)
        };
        match signal {
            Signal::Stop => {
                tracing::info!("stop requested");
                let report = replay.stop();
                renderer.end_run(&report)?;
                return Ok(report);
            }
            Signal::Skip => {
                replay.force_skip()?;
                continue;
            }
            Signal::Continue => {
                if replay.continue_to_next()? {
                    continue;
                }
            }
            Signal::Pause => {
                paused = !paused;
                tracing::debug!(paused, "pause toggled");
            }
            Signal::None => {}
        }

        if !paused && !finished {
            let frame = replay.tick()?;
            renderer.render(&frame)?;
        }
        pacer.wait();
    }

    let report = replay.finish();
    renderer.end_run(&report)?;
    Ok(report)
}
