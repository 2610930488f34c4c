//! Sequential download orchestration across a set of transfer units.
//!
//! The orchestrator registers a progress row for every unit up front, then
//! drives the fetcher one unit at a time in the order given, draining each
//! transfer's progress channel into the sink. The first failure or
//! cancellation stops the run; files already downloaded stay on disk.

use std::path::Path;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::catalog::TransferUnit;
use crate::fetch::{FetchError, FileFetcher};
use crate::progress::{ProgressSink, RowId, RowOutcome};

/// Errors that end a download run early.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// A transfer failed; units after it were never started.
    #[error(transparent)]
    Transfer(#[from] FetchError),

    /// The run was cancelled.
    #[error("download was cancelled")]
    Cancelled,
}

/// Result of a fully successful download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Number of files downloaded.
    pub files: usize,
    /// Total bytes transferred.
    pub bytes: u64,
}

/// Drives a fetcher across an ordered set of transfer units.
pub struct DownloadOrchestrator<F> {
    fetcher: F,
}

impl<F: FileFetcher> DownloadOrchestrator<F> {
    /// Create an orchestrator over the given fetcher.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Download every unit into `dest_dir`, in order.
    ///
    /// All progress rows are registered before the first transfer starts so
    /// the pending work is visible up front. Units complete strictly in the
    /// order supplied; there are no speculative starts.
    pub async fn run(
        &self,
        units: &[TransferUnit],
        dest_dir: &Path,
        sink: &mut dyn ProgressSink,
        token: &CancellationToken,
    ) -> Result<DownloadSummary, DownloadError> {
        let rows: Vec<RowId> = units
            .iter()
            .map(|unit| sink.register(&unit.label, unit.size))
            .collect();

        let mut total_bytes = 0u64;

        for (index, (unit, row)) in units.iter().zip(rows.iter()).enumerate() {
            let row = *row;

            if token.is_cancelled() {
                cancel_rows(sink, &rows[index..]);
                return Err(DownloadError::Cancelled);
            }

            sink.start(row);
            info!(label = %unit.label, "downloading");

            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut fetch = self.fetcher.fetch(unit, dest_dir, tx, token.clone());

            // Poll the transfer and its progress channel together; the
            // channel closes once the fetch future has finished and every
            // sample has been drained.
            let mut result = None;
            let mut last_bytes = 0u64;
            loop {
                tokio::select! {
                    res = &mut fetch, if result.is_none() => result = Some(res),
                    sample = rx.recv() => match sample {
                        Some(sample) => {
                            last_bytes = sample.bytes;
                            sink.update(row, sample);
                        }
                        None => break,
                    }
                }
            }
            let result = match result {
                Some(result) => result,
                None => fetch.await,
            };

            match result {
                Ok(()) => {
                    total_bytes += last_bytes;
                    sink.finish(row, RowOutcome::Completed);
                    info!(label = %unit.label, bytes = last_bytes, "download complete");
                }
                Err(FetchError::Cancelled) => {
                    cancel_rows(sink, &rows[index..]);
                    return Err(DownloadError::Cancelled);
                }
                Err(e) => {
                    sink.finish(row, RowOutcome::Failed);
                    warn!(label = %unit.label, error = %e, "download failed, stopping run");
                    return Err(DownloadError::Transfer(e));
                }
            }
        }

        info!(files = units.len(), bytes = total_bytes, "all downloads complete");
        Ok(DownloadSummary {
            files: units.len(),
            bytes: total_bytes,
        })
    }
}

/// Mark the in-flight row and every row after it as cancelled.
fn cancel_rows(sink: &mut dyn ProgressSink, rows: &[RowId]) {
    for &row in rows {
        sink.finish(row, RowOutcome::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::{FetchScript, ScriptedFetcher};
    use crate::progress::tests::{RecordingSink, SinkEvent};

    fn unit(name: &str, size: u64) -> TransferUnit {
        TransferUnit::new(format!("https://example.com/{}", name), size)
    }

    #[tokio::test]
    async fn test_all_rows_registered_before_first_transfer() {
        let fetcher = ScriptedFetcher::new(vec![
            FetchScript::success(vec![(10, 10)]),
            FetchScript::success(vec![(20, 20)]),
        ]);
        let orchestrator = DownloadOrchestrator::new(fetcher);
        let mut sink = RecordingSink::new();
        let temp = tempfile::tempdir().unwrap();

        orchestrator
            .run(
                &[unit("a.7z", 10), unit("b.7z", 20)],
                temp.path(),
                &mut sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let first_start = sink
            .events
            .iter()
            .position(|e| matches!(e, SinkEvent::Started { .. }))
            .unwrap();
        let registrations_before = sink.events[..first_start]
            .iter()
            .filter(|e| matches!(e, SinkEvent::Registered { .. }))
            .count();
        assert_eq!(registrations_before, 2);
    }

    #[tokio::test]
    async fn test_units_fetched_sequentially_in_order() {
        let fetcher = ScriptedFetcher::new(vec![
            FetchScript::success(vec![(10, 10)]),
            FetchScript::success(vec![(20, 20)]),
            FetchScript::success(vec![(30, 30)]),
        ]);
        let orchestrator = DownloadOrchestrator::new(fetcher);
        let mut sink = RecordingSink::new();
        let temp = tempfile::tempdir().unwrap();

        let summary = orchestrator
            .run(
                &[unit("a.7z", 10), unit("b.7z", 20), unit("c.7z", 30)],
                temp.path(),
                &mut sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            orchestrator.fetcher.call_labels(),
            vec!["a.7z", "b.7z", "c.7z"]
        );
        assert_eq!(summary, DownloadSummary { files: 3, bytes: 60 });
        for row in 0..3 {
            assert_eq!(sink.outcome_of(row), Some(RowOutcome::Completed));
        }
    }

    #[tokio::test]
    async fn test_progress_updates_reach_the_right_row() {
        let fetcher = ScriptedFetcher::new(vec![FetchScript::success(vec![
            (100, 1000),
            (400, 1000),
            (1000, 1000),
        ])]);
        let orchestrator = DownloadOrchestrator::new(fetcher);
        let mut sink = RecordingSink::new();
        let temp = tempfile::tempdir().unwrap();

        orchestrator
            .run(
                &[unit("a.7z", 1000)],
                temp.path(),
                &mut sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let updates = sink.updates_for(0);
        assert_eq!(updates, vec![100, 400, 1000]);
        // Monotonically non-decreasing within the transfer.
        assert!(updates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_failure_stops_the_run() {
        let fetcher = ScriptedFetcher::new(vec![
            FetchScript::success(vec![(10, 10)]),
            FetchScript::failing(vec![(5, 20)], "connection reset"),
        ]);
        let orchestrator = DownloadOrchestrator::new(fetcher);
        let mut sink = RecordingSink::new();
        let temp = tempfile::tempdir().unwrap();

        let err = orchestrator
            .run(
                &[unit("a.7z", 10), unit("b.7z", 20), unit("c.7z", 30)],
                temp.path(),
                &mut sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            DownloadError::Transfer(FetchError::TransferFailed { label, .. }) => {
                assert_eq!(label, "b.7z");
            }
            other => panic!("expected Transfer, got {:?}", other),
        }

        // The third unit was never started.
        assert_eq!(orchestrator.fetcher.call_labels(), vec!["a.7z", "b.7z"]);
        assert_eq!(sink.outcome_of(0), Some(RowOutcome::Completed));
        assert_eq!(sink.outcome_of(1), Some(RowOutcome::Failed));
        assert_eq!(sink.outcome_of(2), None);
    }

    #[tokio::test]
    async fn test_cancellation_mid_unit_skips_the_rest() {
        let fetcher = ScriptedFetcher::new(vec![
            FetchScript::success(vec![(10, 10)]),
            FetchScript::cancelling(vec![(5, 20)]),
        ]);
        let orchestrator = DownloadOrchestrator::new(fetcher);
        let mut sink = RecordingSink::new();
        let temp = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();

        let err = orchestrator
            .run(
                &[unit("a.7z", 10), unit("b.7z", 20), unit("c.7z", 30)],
                temp.path(),
                &mut sink,
                &token,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Cancelled));
        assert_eq!(orchestrator.fetcher.call_labels(), vec!["a.7z", "b.7z"]);
        assert_eq!(sink.outcome_of(0), Some(RowOutcome::Completed));
        assert_eq!(sink.outcome_of(1), Some(RowOutcome::Cancelled));
        assert_eq!(sink.outcome_of(2), Some(RowOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_token_starts_nothing() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let orchestrator = DownloadOrchestrator::new(fetcher);
        let mut sink = RecordingSink::new();
        let temp = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let err = orchestrator
            .run(&[unit("a.7z", 10)], temp.path(), &mut sink, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Cancelled));
        assert!(orchestrator.fetcher.call_labels().is_empty());
        assert_eq!(sink.outcome_of(0), Some(RowOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_empty_unit_list_succeeds() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let orchestrator = DownloadOrchestrator::new(fetcher);
        let mut sink = RecordingSink::new();
        let temp = tempfile::tempdir().unwrap();

        let summary = orchestrator
            .run(&[], temp.path(), &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary, DownloadSummary { files: 0, bytes: 0 });
        assert!(sink.events.is_empty());
    }
}
