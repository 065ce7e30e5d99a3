// Transcription abstraction
//
// Narrow contract over the speech-recognition tool. The whisper CLI is the
// only implementation today; adding another service means implementing the
// trait and extending the factory.

pub mod whisper_cli;

use async_trait::async_trait;
use std::path::Path;

use crate::config::TranscriberConfig;
use crate::error::Result;
use crate::transcript::Transcript;

/// Main trait for transcription operations
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file to a timed transcript. When `language` is
    /// `None` the implementation auto-detects, and the detected language
    /// ends up in the returned transcript.
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the default transcriber implementation (whisper CLI)
    pub fn create_default(config: TranscriberConfig) -> Box<dyn Transcriber> {
        Box::new(whisper_cli::WhisperCliTranscriber::new(config))
    }
}
