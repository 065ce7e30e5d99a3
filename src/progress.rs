//! Per-job progress reporting.
//!
//! The orchestrator and pipeline emit status events through a sink trait so
//! the console UI stays out of the core. The indicatif implementation shows
//! one bar per job; the null implementation backs tests and quiet mode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::job::{JobResult, JobStatus, Stage};

/// Receives per-job status transitions as jobs start, advance, and finish.
pub trait ProgressSink: Send + Sync {
    fn job_started(&self, source: &Path);
    fn stage_started(&self, source: &Path, stage: Stage);
    fn job_finished(&self, result: &JobResult);
}

/// Sink that discards all events.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn job_started(&self, _source: &Path) {}
    fn stage_started(&self, _source: &Path, _stage: Stage) {}
    fn job_finished(&self, _result: &JobResult) {}
}

/// Console progress display: one bar per job, ticking through the five
/// pipeline stages.
pub struct ConsoleProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<PathBuf, ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:30!} [{bar:25}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }

    fn display_name(source: &Path) -> String {
        source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string())
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn job_started(&self, source: &Path) {
        let bar = self.multi.add(ProgressBar::new(Stage::COUNT as u64));
        bar.set_style(Self::bar_style());
        bar.set_prefix(Self::display_name(source));
        bar.set_message("queued");

        let mut bars = self.bars.lock().expect("progress bar map poisoned");
        bars.insert(source.to_path_buf(), bar);
    }

    fn stage_started(&self, source: &Path, stage: Stage) {
        let bars = self.bars.lock().expect("progress bar map poisoned");
        if let Some(bar) = bars.get(source) {
            bar.set_message(stage.label());
            bar.set_position(stage as u64);
        }
    }

    fn job_finished(&self, result: &JobResult) {
        let bars = self.bars.lock().expect("progress bar map poisoned");
        if let Some(bar) = bars.get(&result.source) {
            match &result.status {
                JobStatus::Success { .. } => {
                    bar.set_position(Stage::COUNT as u64);
                    bar.finish_with_message("done");
                }
                JobStatus::Skipped => bar.finish_with_message("skipped (output exists)"),
                JobStatus::Failed { stage, .. } => {
                    bar.abandon_with_message(format!("failed at {}", stage));
                }
            }
        }
    }
}
