//! Batch orchestration: discovers input videos, dispatches one pipeline run
//! per file across a bounded worker pool, and aggregates the results.
//!
//! Workers pull from a shared queue and report through a channel; a failed
//! job is recorded and the pool moves on. Batch-level problems (missing
//! directory, nothing to process, bad worker count) abort before any work
//! is dispatched.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, SubbatchError};
use crate::job::{BatchReport, JobResult, VideoJob};
use crate::pipeline::Pipeline;
use crate::progress::ProgressSink;

/// Parameters for one batch invocation.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub target_lang: String,
    pub source_lang: Option<String>,
    pub workers: usize,
}

pub struct Orchestrator {
    pipeline: Arc<Pipeline>,
    progress: Arc<dyn ProgressSink>,
    video_extensions: Vec<String>,
}

impl Orchestrator {
    pub fn new(
        pipeline: Arc<Pipeline>,
        progress: Arc<dyn ProgressSink>,
        video_extensions: Vec<String>,
    ) -> Self {
        Self {
            pipeline,
            progress,
            video_extensions: video_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Run a full batch. Returns one result per discovered video.
    pub async fn run(&self, request: &BatchRequest) -> Result<BatchReport> {
        let started_at = Utc::now();

        if request.workers < 1 {
            return Err(SubbatchError::Config(
                "There must be at least one worker".to_string(),
            ));
        }

        if !request.input_dir.is_dir() {
            return Err(SubbatchError::NoInput(format!(
                "Input directory '{}' does not exist or is not a directory",
                request.input_dir.display()
            )));
        }

        let videos = self.find_videos(&request.input_dir);
        if videos.is_empty() {
            return Err(SubbatchError::NoInput(format!(
                "No videos found in '{}'",
                request.input_dir.display()
            )));
        }

        info!("Found {} video(s) to process", videos.len());

        // Build jobs, mirroring each source's relative subdirectory under
        // the output root. Jobs whose output already exists are recorded as
        // Skipped without dispatch, which makes batch re-runs idempotent.
        let mut results = Vec::with_capacity(videos.len());
        let mut pending = VecDeque::new();

        for video in videos {
            let job = self.build_job(&video, request)?;

            if job.output_video_path().exists() {
                debug!(
                    "Skipping {} (output already exists)",
                    job.source.display()
                );
                self.progress.job_started(&job.source);
                let result = JobResult::skipped(job.source.clone());
                self.progress.job_finished(&result);
                results.push(result);
            } else {
                self.progress.job_started(&job.source);
                pending.push_back(job);
            }
        }

        let pending_count = pending.len();
        if pending_count > 0 {
            let worker_count = request.workers.min(pending_count);
            info!(
                "Dispatching {} job(s) across {} worker(s)",
                pending_count, worker_count
            );

            let queue = Arc::new(Mutex::new(pending));
            let (tx, mut rx) = mpsc::unbounded_channel::<JobResult>();

            let mut handles = Vec::with_capacity(worker_count);
            for _ in 0..worker_count {
                let queue = Arc::clone(&queue);
                let tx = tx.clone();
                let pipeline = Arc::clone(&self.pipeline);
                let progress = Arc::clone(&self.progress);

                handles.push(tokio::spawn(async move {
                    loop {
                        // Scope the lock so it is released before awaiting
                        let job = {
                            let mut queue = queue.lock().expect("job queue poisoned");
                            queue.pop_front()
                        };

                        let Some(job) = job else { break };

                        let result = pipeline.run(&job, progress.as_ref()).await;
                        progress.job_finished(&result);

                        if tx.send(result).is_err() {
                            break;
                        }
                    }
                }));
            }
            drop(tx);

            while let Some(result) = rx.recv().await {
                results.push(result);
            }

            for handle in handles {
                handle
                    .await
                    .map_err(|e| SubbatchError::Config(format!("Worker task panicked: {}", e)))?;
            }
        }

        Ok(BatchReport::new(results, started_at))
    }

    /// Recursively enumerate video files under the input directory by
    /// extension allow-list, sorted for deterministic job construction.
    fn find_videos(&self, input_dir: &Path) -> Vec<PathBuf> {
        let mut videos: Vec<PathBuf> = WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| self.video_extensions.iter().any(|v| v == &ext.to_lowercase()))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        videos.sort();
        videos
    }

    fn build_job(&self, video: &Path, request: &BatchRequest) -> Result<VideoJob> {
        let relative_dir = video
            .parent()
            .and_then(|parent| pathdiff::diff_paths(parent, &request.input_dir))
            .unwrap_or_default();

        let output_dir = request.output_dir.join(relative_dir);
        std::fs::create_dir_all(&output_dir)?;

        Ok(VideoJob {
            source: video.to_path_buf(),
            output_dir,
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::media::MediaProcessorFactory;
    use crate::progress::NullProgress;
    use crate::transcribe::TranscriberFactory;
    use crate::translate::TranslatorFactory;
    use tempfile::tempdir;

    fn orchestrator() -> Orchestrator {
        let config = Config::default();
        let pipeline = Arc::new(Pipeline::new(
            Arc::from(TranscriberFactory::create_default(config.transcriber)),
            Arc::from(TranslatorFactory::create_translator(
                config.translate,
                "test-key".to_string(),
            )),
            Arc::from(MediaProcessorFactory::create_processor(config.media)),
        ));
        Orchestrator::new(
            pipeline,
            Arc::new(NullProgress),
            Config::default().batch.video_extensions,
        )
    }

    fn request(input: &Path, output: &Path, workers: usize) -> BatchRequest {
        BatchRequest {
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            target_lang: "es".to_string(),
            source_lang: None,
            workers,
        }
    }

    #[test]
    fn test_find_videos_filters_and_sorts() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("a.MKV"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/c.mov"), b"x").unwrap();

        let videos = orchestrator().find_videos(dir.path());
        let names: Vec<String> = videos
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(names, vec!["a.MKV", "b.mp4", "sub/c.mov"]);
    }

    #[tokio::test]
    async fn test_missing_input_dir_is_no_input() {
        let out = tempdir().unwrap();
        let result = orchestrator()
            .run(&request(Path::new("/definitely/not/here"), out.path(), 1))
            .await;
        assert!(matches!(result, Err(SubbatchError::NoInput(_))));
    }

    #[tokio::test]
    async fn test_empty_input_dir_is_no_input() {
        let input = tempdir().unwrap();
        let out = tempdir().unwrap();
        let result = orchestrator()
            .run(&request(input.path(), out.path(), 1))
            .await;
        assert!(matches!(result, Err(SubbatchError::NoInput(_))));
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let input = tempdir().unwrap();
        std::fs::write(input.path().join("a.mp4"), b"x").unwrap();
        let out = tempdir().unwrap();
        let result = orchestrator()
            .run(&request(input.path(), out.path(), 0))
            .await;
        assert!(matches!(result, Err(SubbatchError::Config(_))));
    }

    #[test]
    fn test_build_job_mirrors_relative_dir() {
        let input = tempdir().unwrap();
        std::fs::create_dir_all(input.path().join("season1")).unwrap();
        let video = input.path().join("season1/ep1.mp4");
        std::fs::write(&video, b"x").unwrap();
        let out = tempdir().unwrap();

        let job = orchestrator()
            .build_job(&video, &request(input.path(), out.path(), 1))
            .unwrap();

        assert_eq!(job.output_dir, out.path().join("season1"));
        assert!(job.output_dir.is_dir());
        assert_eq!(
            job.output_video_path(),
            out.path().join("season1/ep1.subtitled.mp4")
        );
    }
}
