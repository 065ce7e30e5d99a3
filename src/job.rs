//! Batch job bookkeeping: jobs, per-job results, and the batch report.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One input video awaiting processing. Immutable after creation and owned
/// exclusively by the worker that processes it.
#[derive(Debug, Clone)]
pub struct VideoJob {
    /// Source video file.
    pub source: PathBuf,
    /// Directory the output artifacts for this job go into. Already includes
    /// the source's relative subdirectory under the input root.
    pub output_dir: PathBuf,
    /// Source language code; `None` means auto-detect.
    pub source_lang: Option<String>,
    /// Target language code.
    pub target_lang: String,
}

impl VideoJob {
    /// Stem of the source filename, used for deterministic artifact naming.
    pub fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string())
    }

    /// Extension of the source file, carried over to the muxed output.
    pub fn extension(&self) -> String {
        self.source
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mp4".to_string())
    }

    /// Subtitle file path for a given language code.
    pub fn subtitle_path(&self, lang: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}.srt", self.stem(), lang))
    }

    /// Muxed output video path. Its existence marks the job as already
    /// processed on a re-run.
    pub fn output_video_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.subtitled.{}", self.stem(), self.extension()))
    }
}

/// Pipeline stage, in execution order. Used for progress reporting and to
/// name the failing stage in a job result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Extract,
    Transcribe,
    Translate,
    WriteSubtitles,
    Mux,
}

impl Stage {
    pub const COUNT: usize = 5;

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extract => "Extracting audio",
            Stage::Transcribe => "Transcribing",
            Stage::Translate => "Translating",
            Stage::WriteSubtitles => "Writing subtitles",
            Stage::Mux => "Embedding subtitles",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Transcribe => "transcribe",
            Stage::Translate => "translate",
            Stage::WriteSubtitles => "write-subtitles",
            Stage::Mux => "mux",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Success { outputs: Vec<PathBuf> },
    Skipped,
    Failed { stage: Stage, error: String },
}

/// Result of processing one video. Created by a worker on completion and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub source: PathBuf,
    pub status: JobStatus,
}

impl JobResult {
    pub fn success(source: PathBuf, outputs: Vec<PathBuf>) -> Self {
        Self {
            source,
            status: JobStatus::Success { outputs },
        }
    }

    pub fn skipped(source: PathBuf) -> Self {
        Self {
            source,
            status: JobStatus::Skipped,
        }
    }

    pub fn failed(source: PathBuf, stage: Stage, error: String) -> Self {
        Self {
            source,
            status: JobStatus::Failed { stage, error },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Success { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, JobStatus::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, JobStatus::Failed { .. })
    }
}

/// Aggregate of all job results for one invocation. Built incrementally as
/// workers report and finalized once every job has completed.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<JobResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Finalize a report: completion order is nondeterministic under a
    /// worker pool, so results are sorted by source path for presentation.
    pub fn new(mut results: Vec<JobResult>, started_at: DateTime<Utc>) -> Self {
        results.sort_by(|a, b| a.source.cmp(&b.source));
        Self {
            results,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_naming() {
        let job = VideoJob {
            source: PathBuf::from("/videos/talk.mp4"),
            output_dir: PathBuf::from("/out"),
            source_lang: None,
            target_lang: "es".to_string(),
        };

        assert_eq!(job.subtitle_path("en"), PathBuf::from("/out/talk.en.srt"));
        assert_eq!(job.subtitle_path("es"), PathBuf::from("/out/talk.es.srt"));
        assert_eq!(
            job.output_video_path(),
            PathBuf::from("/out/talk.subtitled.mp4")
        );
    }

    #[test]
    fn test_report_sorted_and_counted() {
        let started = Utc::now();
        let results = vec![
            JobResult::success(PathBuf::from("/in/b.mp4"), vec![]),
            JobResult::failed(
                PathBuf::from("/in/c.mp4"),
                Stage::Transcribe,
                "boom".into(),
            ),
            JobResult::skipped(PathBuf::from("/in/a.mp4")),
        ];

        let report = BatchReport::new(results, started);
        assert_eq!(report.results[0].source, PathBuf::from("/in/a.mp4"));
        assert_eq!(report.results[2].source, PathBuf::from("/in/c.mp4"));
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());
    }
}
