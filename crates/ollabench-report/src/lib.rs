//! ollabench-report: Summary rows, transcripts, and run output.
//!
//! Turns a finished `RunReport` into the spreadsheet-facing CSV files and the
//! human-readable transcript, and writes them to a run directory.

pub mod csv;
pub mod scorecard;
pub mod sink;
pub mod summary;

pub use scorecard::{scorecard, ModelScore};
pub use sink::{DirectorySink, ReportSink};
pub use summary::{render, SummaryRow};
