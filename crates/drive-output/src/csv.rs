//! CSV trace backend.
//!
//! Creates `trace.csv` in the configured output directory.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::Writer;
use drive_sim::PositionEvent;
use tracing::debug;

use crate::writer::PositionWriter;
use crate::{OutputError, OutputResult};

pub const TRACE_FILE: &str = "trace.csv";

pub const TRACE_HEADER: [&str; 8] = [
    "tick",
    "elapsed_secs",
    "lon",
    "lat",
    "nearest_index",
    "bearing",
    "traveled_distance",
    "fraction_complete",
];

/// Writes one CSV row per [`PositionEvent`].
pub struct CsvTraceWriter<T: Write = File> {
    out:      Writer<T>,
    path:     Option<PathBuf>,
    rows:     u64,
    finished: bool,
}

impl CsvTraceWriter<File> {
    /// Create (or truncate) `dir/trace.csv` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let path = dir.join(TRACE_FILE);
        let mut writer = Self::from_writer(File::create(&path)?)?;
        writer.path = Some(path);
        Ok(writer)
    }
}

impl<T: Write> CsvTraceWriter<T> {
    /// Write the trace into any byte sink (stdout, a buffer, ...).
    pub fn from_writer(sink: T) -> OutputResult<Self> {
        let mut out = Writer::from_writer(sink);
        out.write_record(TRACE_HEADER)?;
        Ok(Self { out, path: None, rows: 0, finished: false })
    }

    /// Data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// File backing the trace, if it was opened with [`CsvTraceWriter::new`].
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl<T: Write> PositionWriter for CsvTraceWriter<T> {
    fn write_event(&mut self, event: &PositionEvent) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        self.out.write_record(&[
            event.tick.0.to_string(),
            format!("{:.3}", event.elapsed.as_secs_f64()),
            format!("{:.6}", event.coordinate.lon),
            format!("{:.6}", event.coordinate.lat),
            event.nearest_index.to_string(),
            format!("{:.2}", event.bearing),
            format!("{:.6}", event.traveled_distance),
            format!("{:.4}", event.fraction_complete),
        ])?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        debug!(rows = self.rows, path = ?self.path, "trace finished");
        Ok(())
    }
}
