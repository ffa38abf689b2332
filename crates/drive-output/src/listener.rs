//! `TraceListener<W>` — bridges `PositionListener` to a `PositionWriter`.

use drive_sim::{ListenerError, ListenerResult, PositionEvent, PositionListener};

use crate::writer::PositionWriter;
use crate::{OutputError, OutputResult};

/// A [`PositionListener`] that writes every event it receives to `W`.
///
/// A failed write is reported to the simulator as a listener failure (so
/// it is counted and logged) and the first such error is also kept here.
/// After the run, check it with [`take_error`][Self::take_error].
pub struct TraceListener<W: PositionWriter> {
    writer:     W,
    written:    u64,
    last_error: Option<OutputError>,
}

impl<W: PositionWriter> TraceListener<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0, last_error: None }
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Events written successfully.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Finish the writer, storing any error.
    pub fn finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Finish and unwrap the inner writer.
    pub fn into_writer(mut self) -> W {
        self.finish();
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) -> Option<String> {
        let e = result.err()?;
        let msg = e.to_string();
        // Keep only the first error.
        if self.last_error.is_none() {
            self.last_error = Some(e);
        }
        Some(msg)
    }
}

impl<W: PositionWriter + Send> PositionListener for TraceListener<W> {
    fn on_position(&mut self, event: &PositionEvent) -> ListenerResult {
        let result = self.writer.write_event(event);
        match self.store_err(result) {
            None => {
                self.written += 1;
                Ok(())
            }
            Some(msg) => Err(ListenerError::Failed(msg)),
        }
    }
}
