use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, SubbatchError};
use crate::transcript::{Transcript, TranscriptSegment};
use super::Transcriber;

/// Whisper CLI JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperOutput {
    pub text: String,
    pub segments: Vec<WhisperSegment>,
    pub language: Option<String>,
}

/// Whisper CLI segment format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperSegment {
    pub id: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub avg_logprob: Option<f64>,
    pub no_speech_prob: Option<f64>,
}

/// Whisper CLI implementation, shelling out to the whisper binary
pub struct WhisperCliTranscriber {
    config: TranscriberConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Convert whisper's JSON output into the validated transcript type.
    /// Whisper occasionally emits segments whose start nudges slightly
    /// before the previous end; those are clamped rather than rejected.
    fn to_transcript(&self, output: WhisperOutput) -> Result<Transcript> {
        let language = output
            .language
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.config.fallback_language.clone());

        let mut segments = Vec::with_capacity(output.segments.len());
        let mut previous_end = 0.0_f64;

        for (index, seg) in output.segments.into_iter().enumerate() {
            let start = seg.start.max(previous_end);
            let end = seg.end.max(start);
            previous_end = end;

            segments.push(TranscriptSegment::new(
                index,
                start,
                end,
                seg.text.trim().to_string(),
            )?);
        }

        Transcript::new(segments, language)
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        info!("Transcribing: {}", audio_path.display());

        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubbatchError::Transcription(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_dir").arg(output_dir)
            .arg("--output_format").arg("json");

        if let Some(lang) = language {
            cmd.arg("--language").arg(lang);
        }

        let output = cmd
            .output()
            .map_err(|e| SubbatchError::Transcription(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubbatchError::Transcription(format!(
                "Whisper failed: {}",
                stderr
            )));
        }

        let audio_filename = audio_path
            .file_stem()
            .ok_or_else(|| SubbatchError::Transcription("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_filename.to_string_lossy()));

        let json_content = std::fs::read_to_string(&json_file)
            .map_err(|e| SubbatchError::Transcription(format!("Failed to read whisper output: {}", e)))?;

        let whisper_output: WhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| SubbatchError::Transcription(format!("Failed to parse whisper JSON: {}", e)))?;

        let transcript = self.to_transcript(whisper_output)?;
        info!(
            "Transcription completed: {} segments, detected language '{}'",
            transcript.len(),
            transcript.language
        );

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcriber() -> WhisperCliTranscriber {
        WhisperCliTranscriber::new(TranscriberConfig {
            binary_path: "whisper".to_string(),
            model: "base".to_string(),
            fallback_language: "en".to_string(),
        })
    }

    fn whisper_seg(id: u64, start: f64, end: f64, text: &str) -> WhisperSegment {
        WhisperSegment {
            id,
            start,
            end,
            text: text.to_string(),
            avg_logprob: None,
            no_speech_prob: None,
        }
    }

    #[test]
    fn test_to_transcript_maps_segments() {
        let output = WhisperOutput {
            text: "hello world".to_string(),
            segments: vec![
                whisper_seg(0, 0.0, 1.2, " hello "),
                whisper_seg(1, 1.5, 2.4, " world "),
            ],
            language: Some("en".to_string()),
        };

        let transcript = transcriber().to_transcript(output).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.language, "en");
        assert_eq!(transcript.segments[0].text, "hello");
        assert_eq!(transcript.segments[1].start, 1.5);
    }

    #[test]
    fn test_to_transcript_clamps_slight_overlap() {
        let output = WhisperOutput {
            text: String::new(),
            segments: vec![
                whisper_seg(0, 0.0, 2.0, "a"),
                whisper_seg(1, 1.96, 3.0, "b"),
            ],
            language: Some("en".to_string()),
        };

        let transcript = transcriber().to_transcript(output).unwrap();
        assert_eq!(transcript.segments[1].start, 2.0);
    }

    #[test]
    fn test_to_transcript_falls_back_on_missing_language() {
        let output = WhisperOutput {
            text: String::new(),
            segments: vec![],
            language: None,
        };

        let transcript = transcriber().to_transcript(output).unwrap();
        assert_eq!(transcript.language, "en");
    }

    #[test]
    fn test_parse_whisper_json() {
        let json = r#"{
            "text": "hi",
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.0, "text": "hi",
                 "avg_logprob": -0.3, "no_speech_prob": 0.01,
                 "tokens": [1, 2], "temperature": 0.0}
            ],
            "language": "en"
        }"#;

        let parsed: WhisperOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.segments[0].avg_logprob, Some(-0.3));
    }
}
