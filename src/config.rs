use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SubbatchError};

fn default_translation_batch_size() -> usize {
    150
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to the whisper CLI binary
    pub binary_path: String,
    /// Model to use for transcription
    pub model: String,
    /// Fallback language when detection reports nothing usable
    pub fallback_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation API base endpoint
    pub endpoint: String,
    /// Model to use for translation
    pub model: String,
    /// Maximum segments per translation request
    #[serde(default = "default_translation_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Additional options appended to the subtitle embedding command
    pub subtitle_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Video file extensions considered for processing
    pub video_extensions: Vec<String>,
    /// Default number of concurrent workers
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcriber: TranscriberConfig {
                binary_path: "whisper".to_string(),
                model: "medium".to_string(),
                fallback_language: "en".to_string(),
            },
            translate: TranslateConfig {
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-2.0-flash".to_string(),
                batch_size: default_translation_batch_size(),
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                subtitle_options: vec![],
            },
            batch: BatchConfig {
                video_extensions: vec![
                    "mp4".to_string(),
                    "avi".to_string(),
                    "mkv".to_string(),
                    "mov".to_string(),
                    "wmv".to_string(),
                    "flv".to_string(),
                    "webm".to_string(),
                ],
                workers: 1,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubbatchError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubbatchError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubbatchError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubbatchError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.transcriber.model, config.transcriber.model);
        assert_eq!(parsed.batch.workers, 1);
        assert_eq!(parsed.translate.batch_size, 150);
    }

    #[test]
    fn test_batch_size_defaults_when_absent() {
        let toml_str = r#"
            [transcriber]
            binary_path = "whisper"
            model = "base"
            fallback_language = "en"

            [translate]
            endpoint = "http://localhost"
            model = "gemini-2.0-flash"

            [media]
            binary_path = "ffmpeg"
            subtitle_options = []

            [batch]
            video_extensions = ["mp4"]
            workers = 4
        "#;
        let parsed: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.translate.batch_size, 150);
        assert_eq!(parsed.batch.workers, 4);
    }
}
