//! indicatif-backed progress sink.
//!
//! One bar per transfer unit, registered up front so the whole set of
//! pending files is visible before the first byte arrives.

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use sedump::progress::format_bytes;
use sedump::{ProgressSample, ProgressSink, RowId, RowOutcome};

/// Multi-row terminal progress display.
pub struct IndicatifSink {
    multi: MultiProgress,
    bars: Vec<ProgressBar>,
    labels: Vec<String>,
}

impl IndicatifSink {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Vec::new(),
            labels: Vec::new(),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
            .expect("progress template is valid")
            .progress_chars("━━╌")
    }
}

impl Default for IndicatifSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for IndicatifSink {
    fn register(&mut self, label: &str, total: u64) -> RowId {
        let bar = self.multi.add(ProgressBar::new(total.max(1)));
        bar.set_style(Self::style());
        bar.set_message(format!("{} - pending", label));
        self.bars.push(bar);
        self.labels.push(label.to_string());
        self.bars.len() - 1
    }

    fn start(&mut self, row: RowId) {
        if let Some(bar) = self.bars.get(row) {
            bar.enable_steady_tick(Duration::from_millis(100));
            bar.set_message(self.labels[row].clone());
        }
    }

    fn update(&mut self, row: RowId, sample: ProgressSample) {
        if let Some(bar) = self.bars.get(row) {
            // The declared total is advisory; never let the bar overflow.
            bar.set_length(sample.total.max(sample.bytes).max(1));
            bar.set_position(sample.bytes);
            bar.set_message(format!(
                "{} - {}/{}",
                self.labels[row],
                format_bytes(sample.bytes),
                format_bytes(sample.total)
            ));
        }
    }

    fn finish(&mut self, row: RowId, outcome: RowOutcome) {
        if let Some(bar) = self.bars.get(row) {
            match outcome {
                RowOutcome::Completed => {
                    bar.finish_with_message(format!("{} - done", self.labels[row]));
                }
                RowOutcome::Failed => {
                    bar.abandon_with_message(format!("{} - failed", self.labels[row]));
                }
                RowOutcome::Cancelled => {
                    bar.abandon_with_message(format!("{} - cancelled", self.labels[row]));
                }
            }
        }
    }
}
