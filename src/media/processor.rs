use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::info;

use crate::config::MediaConfig;
use crate::error::{Result, SubbatchError};
use super::{MediaCommandBuilder, MediaProcessor, SubtitleTrack};

/// Concrete implementation of media processor (ffmpeg-based)
pub struct FfmpegProcessor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!(
            "Extracting audio from {} to {}",
            video_path.display(),
            audio_path.display()
        );

        let command = self.command_builder.extract_audio(video_path, audio_path);
        command.execute(SubbatchError::Extraction).await?;

        Ok(())
    }

    async fn embed_subtitles(
        &self,
        video_path: &Path,
        tracks: &[SubtitleTrack],
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Embedding {} subtitle track(s) into {} -> {}",
            tracks.len(),
            video_path.display(),
            output_path.display()
        );

        let command = self.command_builder.embed_subtitles(
            video_path,
            tracks,
            output_path,
            &self.config.subtitle_options,
        );

        command.execute(SubbatchError::Mux).await?;

        info!("Subtitle embedding completed");
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| SubbatchError::Mux(format!("Media tool not found: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SubbatchError::Mux(
                "Media tool version check failed".to_string(),
            ))
        }
    }
}
