//! The single-video workflow: extract audio, transcribe, translate, write
//! subtitle files, and mux them back into the video.
//!
//! Stages run strictly in order, each attempted exactly once. Any stage
//! error turns into a Failed result naming the stage; it never escapes the
//! pipeline, so one video cannot take down the batch.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::SubbatchError;
use crate::job::{JobResult, Stage, VideoJob};
use crate::media::{MediaProcessor, SubtitleTrack};
use crate::progress::ProgressSink;
use crate::subtitle::write_srt;
use crate::transcribe::Transcriber;
use crate::transcript::TranslatedTranscript;
use crate::translate::Translator;

pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    media: Arc<dyn MediaProcessor>,
}

impl Pipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        media: Arc<dyn MediaProcessor>,
    ) -> Self {
        Self {
            transcriber,
            translator,
            media,
        }
    }

    /// Run all stages for one job. Always returns a result; stage errors are
    /// captured rather than propagated.
    pub async fn run(&self, job: &VideoJob, progress: &dyn ProgressSink) -> JobResult {
        info!("Processing: {}", job.source.display());

        match self.run_stages(job, progress).await {
            Ok(outputs) => {
                info!("Completed: {}", job.source.display());
                JobResult::success(job.source.clone(), outputs)
            }
            Err((stage, error)) => {
                warn!(
                    "Failed {} at stage {}: {}",
                    job.source.display(),
                    stage,
                    error
                );
                JobResult::failed(job.source.clone(), stage, error.to_string())
            }
        }
    }

    async fn run_stages(
        &self,
        job: &VideoJob,
        progress: &dyn ProgressSink,
    ) -> std::result::Result<Vec<PathBuf>, (Stage, SubbatchError)> {
        // Stage 1: extract audio into a scoped temp dir. The directory is
        // removed when this function returns, success or failure.
        progress.stage_started(&job.source, Stage::Extract);
        let temp_dir = tempfile::tempdir()
            .map_err(|e| {
                (
                    Stage::Extract,
                    SubbatchError::Extraction(format!("Failed to create temp directory: {}", e)),
                )
            })?;
        let audio_path = temp_dir.path().join("audio.wav");

        self.media
            .extract_audio(&job.source, &audio_path)
            .await
            .map_err(|e| (Stage::Extract, e))?;

        // Stage 2: transcribe, auto-detecting the language unless declared
        progress.stage_started(&job.source, Stage::Transcribe);
        let transcript = self
            .transcriber
            .transcribe(&audio_path, job.source_lang.as_deref())
            .await
            .map_err(|e| (Stage::Transcribe, e))?;

        // Stage 3: translate, unless source and target already match
        progress.stage_started(&job.source, Stage::Translate);
        let translated = if transcript.language == job.target_lang {
            info!(
                "Source language already '{}', skipping translation for {}",
                job.target_lang,
                job.source.display()
            );
            TranslatedTranscript::verbatim(&transcript)
        } else {
            let translated = self
                .translator
                .translate(&transcript, &job.target_lang)
                .await
                .map_err(|e| (Stage::Translate, e))?;

            // The translator contract says timing is preserved; verify it
            // here instead of trusting the implementation.
            if !translated.is_aligned_with(&transcript) {
                return Err((
                    Stage::Translate,
                    SubbatchError::Translation(
                        "Translation altered segment count or timing".to_string(),
                    ),
                ));
            }
            translated
        };

        // Stage 4: write source and target subtitle files
        progress.stage_started(&job.source, Stage::WriteSubtitles);
        let source_srt = job.subtitle_path(&transcript.language);
        let target_srt = job.subtitle_path(&translated.language);

        write_srt(&transcript.segments, &source_srt)
            .await
            .map_err(|e| (Stage::WriteSubtitles, e))?;

        if target_srt != source_srt {
            write_srt(&translated.segments, &target_srt)
                .await
                .map_err(|e| (Stage::WriteSubtitles, e))?;
        }

        // Stage 5: embed both subtitle tracks into a copy of the video
        progress.stage_started(&job.source, Stage::Mux);
        let output_video = job.output_video_path();

        let mut tracks = vec![SubtitleTrack {
            path: source_srt.clone(),
            language: transcript.language.clone(),
        }];
        if target_srt != source_srt {
            tracks.push(SubtitleTrack {
                path: target_srt.clone(),
                language: translated.language.clone(),
            });
        }

        self.media
            .embed_subtitles(&job.source, &tracks, &output_video)
            .await
            .map_err(|e| (Stage::Mux, e))?;

        let mut outputs = vec![source_srt];
        if target_srt != outputs[0] {
            outputs.push(target_srt);
        }
        outputs.push(output_video);

        Ok(outputs)
    }
}
