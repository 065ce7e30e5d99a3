// Media processing abstraction
//
// Narrow contract over the external muxing tool (ffmpeg):
// - Commands: command builder for the operations the pipeline needs
// - Processor: ffmpeg-backed implementation

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// A subtitle file paired with its language code, for track metadata.
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    pub path: std::path::PathBuf,
    pub language: String,
}

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Extract the audio track from a video into a mono 16 kHz WAV file
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Embed one or more subtitle tracks into a copy of the video
    async fn embed_subtitles(
        &self,
        video_path: &Path,
        tracks: &[SubtitleTrack],
        output_path: &Path,
    ) -> Result<()>;

    /// Check if the media tool is available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (ffmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessor> {
        Box::new(processor::FfmpegProcessor::new(config))
    }
}
