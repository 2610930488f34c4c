//! Progress sink interface for download rendering.
//!
//! The orchestrator owns exactly one sink per run and routes every update
//! through it, so there is no shared mutable rendering state. The CLI
//! implements the sink with indicatif; tests use a recording sink.

use crate::fetch::ProgressSample;

/// Handle for one registered progress row.
pub type RowId = usize;

/// Terminal state of a progress row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// The file downloaded completely.
    Completed,
    /// The transfer failed mid-stream.
    Failed,
    /// The transfer was cancelled, or never started because an earlier one
    /// was.
    Cancelled,
}

/// Consumer of per-file download progress.
///
/// Rows move `Pending → InProgress → {Completed | Failed | Cancelled}`:
/// `register` creates a pending row, `start` marks it in progress, `update`
/// feeds it samples, and `finish` moves it to a terminal state exactly once.
pub trait ProgressSink: Send {
    /// Register a pending row before its transfer begins.
    fn register(&mut self, label: &str, total: u64) -> RowId;

    /// Mark a row as in progress.
    fn start(&mut self, row: RowId);

    /// Update a row with the latest progress sample.
    fn update(&mut self, row: RowId, sample: ProgressSample);

    /// Move a row to its terminal state.
    fn finish(&mut self, row: RowId, outcome: RowOutcome);
}

/// Format a byte count in human-readable units.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
