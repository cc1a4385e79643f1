use std::io::Write;

use crate::{
    driver::replay::RunReport,
    foundation::error::{ReplayError, ReplayResult},
    input::model::HouseTask,
    playback::session::SessionFrame,
    render::Renderer,
};

#[derive(serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Line<'a> {
    Session { house: &'a HouseTask },
    Frame { frame: &'a SessionFrame<'a> },
    Report { report: &'a RunReport },
}

/// One JSON object per line: a `session` event per house, a `frame` event per step and a
/// final `report`.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &Line<'_>) -> ReplayResult<()> {
        serde_json::to_writer(&mut self.out, line)
            .map_err(|e| ReplayError::serde(format!("encode frame: {e}")))?;
        writeln!(self.out).map_err(|e| ReplayError::io(format!("write frame: {e}")))
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn begin_session(&mut self, house: &HouseTask) -> ReplayResult<()> {
        self.emit(&Line::Session { house })
    }

    fn render(&mut self, frame: &SessionFrame<'_>) -> ReplayResult<()> {
        self.emit(&Line::Frame { frame })
    }

    fn end_run(&mut self, report: &RunReport) -> ReplayResult<()> {
        self.emit(&Line::Report { report })?;
        self.out
            .flush()
            .map_err(|e| ReplayError::io(format!("flush frames: {e}")))
    }
}
