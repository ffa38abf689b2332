//! The `PositionWriter` trait implemented by trace backends.

use drive_sim::PositionEvent;

use crate::OutputResult;

/// A sink for [`PositionEvent`]s.
pub trait PositionWriter {
    /// Append one event.
    fn write_event(&mut self, event: &PositionEvent) -> OutputResult<()>;

    /// Flush and close the underlying handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

impl<W: PositionWriter + ?Sized> PositionWriter for Box<W> {
    fn write_event(&mut self, event: &PositionEvent) -> OutputResult<()> {
        (**self).write_event(event)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}
