use std::{
    collections::VecDeque,
    io::BufRead,
    sync::mpsc::{self, Receiver, TryRecvError},
};

/// One input from the UI collaborator, checked once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    None,
    /// Advance to the next house (honoured per `ContinuePolicy`).
    Continue,
    /// End the current house now.
    Skip,
    /// Toggle pause.
    Pause,
    /// Close request: abandon the run.
    Stop,
}

pub trait ControlSource {
    /// Called once per frame. `session_finished` lets headless sources decide when to move on.
    fn poll(&mut self, session_finished: bool) -> Signal;

    /// Called instead of [`poll`](Self::poll) while nothing would advance (paused, or finished
    /// and waiting for a continue). Sources backed by a user may block here.
    fn wait(&mut self, session_finished: bool) -> Signal {
        self.poll(session_finished)
    }
}

/// Headless control: continue as soon as a session finishes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoContinue;

impl ControlSource for AutoContinue {
    fn poll(&mut self, session_finished: bool) -> Signal {
        if session_finished {
            Signal::Continue
        } else {
            Signal::None
        }
    }
}

/// Replays a fixed list of signals, one per frame, then falls back to [`AutoContinue`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedControl {
    script: VecDeque<Signal>,
}

impl ScriptedControl {
    pub fn new(script: impl IntoIterator<Item = Signal>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl ControlSource for ScriptedControl {
    fn poll(&mut self, session_finished: bool) -> Signal {
        self.script
            .pop_front()
            .unwrap_or_else(|| AutoContinue.poll(session_finished))
    }
}

/// Line-oriented keyboard control read on a background thread.
///
/// `c` (or an empty line) continues, `s` skips, `p` pauses, `q` stops. End of input is
/// treated as a close request.
pub struct StdinControl {
    rx: Receiver<Signal>,
}

impl StdinControl {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let Some(signal) = parse_command(&line) else {
                    tracing::warn!(input = %line.trim(), "unrecognised command");
                    continue;
                };
                if tx.send(signal).is_err() {
                    return;
                }
            }
            let _ = tx.send(Signal::Stop);
        });
        Self { rx }
    }
}

impl ControlSource for StdinControl {
    fn poll(&mut self, _session_finished: bool) -> Signal {
        match self.rx.try_recv() {
            Ok(signal) => signal,
            Err(TryRecvError::Empty) => Signal::None,
            Err(TryRecvError::Disconnected) => Signal::Stop,
        }
    }

    fn wait(&mut self, _session_finished: bool) -> Signal {
        self.rx.recv().unwrap_or(Signal::Stop)
    }
}

pub fn parse_command(line: &str) -> Option<Signal> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "c" | "continue" => Some(Signal::Continue),
        "s" | "skip" => Some(Signal::Skip),
        "p" | "pause" => Some(Signal::Pause),
        "q" | "quit" | "stop" => Some(Signal::Stop),
        _ => None,
    }
}
