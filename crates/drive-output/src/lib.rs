//! `drive-output` — persists the positions a simulator emits.
//!
//! | Type               | Role                                                  |
//! |--------------------|-------------------------------------------------------|
//! | [`PositionWriter`] | backend trait: `write_event`, idempotent `finish`     |
//! | [`CsvTraceWriter`] | writes `trace.csv`, one row per delivered event       |
//! | [`TraceListener`]  | adapts any writer into a `drive_sim::PositionListener`|
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use drive_output::{CsvTraceWriter, TraceListener};
//!
//! let trace = Arc::new(Mutex::new(TraceListener::new(CsvTraceWriter::new(dir)?)));
//! sim.add_weak_listener(&trace);
//! sim.start();
//! // ...
//! let mut trace = trace.lock();
//! trace.finish();
//! if let Some(e) = trace.take_error() { eprintln!("output error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod listener;
pub mod writer;


pub use csv::{CsvTraceWriter, TRACE_FILE, TRACE_HEADER};
pub use error::{OutputError, OutputResult};
pub use listener::TraceListener;
pub use writer::PositionWriter;
