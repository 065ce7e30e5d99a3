use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{Result, SubbatchError};
use crate::lang;
use crate::transcript::{TranslatedTranscript, Transcript};
use super::Translator;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Expected model output: a JSON object with one translation per segment
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranslationBatch {
    translation: Vec<String>,
}

/// Gemini-backed translator. Segments are sent in batches and the model is
/// prompted to return a parallel JSON array, which keeps segment count and
/// ordering stable across the call.
pub struct GeminiTranslator {
    client: Client,
    config: TranslateConfig,
    api_key: String,
}

impl GeminiTranslator {
    pub fn new(config: TranslateConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            config,
            api_key,
        }
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>> {
        let prompt = build_translation_prompt(texts, source_language, target_language);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.3,
                "topP": 1,
                "topK": 1,
                "responseMimeType": "application/json"
            }
        });

        debug!("Sending translation request for {} segments", texts.len());

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SubbatchError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubbatchError::Translation(format!(
                "Translation API error {}: {}",
                status, error_text
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SubbatchError::Translation(format!("Failed to parse response: {}", e)))?;

        let raw_text = generate_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| SubbatchError::Translation("Empty translation response".to_string()))?;

        let batch = parse_translation_batch(raw_text)?;

        if batch.translation.len() != texts.len() {
            return Err(SubbatchError::Translation(format!(
                "Translation API returned {} segments, expected {}",
                batch.translation.len(),
                texts.len()
            )));
        }

        Ok(batch.translation)
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate(
        &self,
        transcript: &Transcript,
        target_language: &str,
    ) -> Result<TranslatedTranscript> {
        info!(
            "Translating {} segments from '{}' to '{}'",
            transcript.len(),
            transcript.language,
            target_language
        );

        let texts: Vec<String> = transcript
            .segments
            .iter()
            .map(|seg| seg.text.trim_start().to_string())
            .collect();

        let mut translated = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size.max(1)) {
            let batch = self
                .translate_batch(chunk, &transcript.language, target_language)
                .await?;
            translated.extend(batch);
        }

        TranslatedTranscript::from_texts(transcript, translated, target_language.to_string())
    }
}

/// Build the batch translation prompt. Full language names read better for
/// the model than ISO codes; unknown codes are passed through as-is.
fn build_translation_prompt(texts: &[String], source_language: &str, target_language: &str) -> String {
    let source_name = lang::language_name(source_language).unwrap_or(source_language);
    let target_name = lang::language_name(target_language).unwrap_or(target_language);

    let formatted =
        serde_json::to_string_pretty(texts).unwrap_or_else(|_| format!("{:?}", texts));

    format!(
        "Translate the following {count} {source} segments into {target}. \
         The JSON response must contain a \"translation\" array with exactly \
         {count} elements. Each element should be the {target} translation of \
         the corresponding {source} segment. Translate only up to the \
         punctuation mark; do not translate beyond it.\n\n\
         Segments: {segments}\n\n\
         Output format (MUST have {count} elements in the \"translation\" array):\n\
         {{\n  \"translation\": [\n    // ... {count} elements here\n  ]\n}}",
        count = texts.len(),
        source = source_name,
        target = target_name,
        segments = formatted,
    )
}

/// Pull the translation object out of the model response. Models sometimes
/// wrap the JSON in prose or code fences, so everything outside the
/// outermost braces is discarded.
fn parse_translation_batch(raw_text: &str) -> Result<TranslationBatch> {
    let start = raw_text.find('{');
    let end = raw_text.rfind('}');

    let json_str = match (start, end) {
        (Some(s), Some(e)) if e >= s => &raw_text[s..=e],
        _ => {
            return Err(SubbatchError::Translation(format!(
                "No JSON object in translation response: {}",
                raw_text
            )))
        }
    };

    serde_json::from_str(json_str)
        .map_err(|e| SubbatchError::Translation(format!("Malformed translation JSON: {}", e)))
}

/// Validate an API key with a cheap countTokens call before persisting it.
pub async fn validate_api_key(config: &TranslateConfig, api_key: &str) -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("HTTP client creation should not fail");

    let url = format!(
        "{}/models/{}:countTokens?key={}",
        config.endpoint, config.model, api_key
    );

    let body = json!({ "contents": [{ "parts": [{ "text": "test" }] }] });

    let response = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| SubbatchError::Credential(format!("Validation request failed: {}", e)))?;

    if response.status().is_success() {
        Ok(())
    } else if response.status() == reqwest::StatusCode::BAD_REQUEST
        || response.status() == reqwest::StatusCode::FORBIDDEN
        || response.status() == reqwest::StatusCode::UNAUTHORIZED
    {
        Err(SubbatchError::Credential("API key not valid".to_string()))
    } else {
        let status = response.status();
        Err(SubbatchError::Credential(format!(
            "Unexpected error while validating API key: {}",
            status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_languages_and_count() {
        let texts = vec!["Hello.".to_string(), "Bye.".to_string()];
        let prompt = build_translation_prompt(&texts, "en", "es");

        assert!(prompt.contains("2 English segments"));
        assert!(prompt.contains("Spanish Latin America"));
        assert!(prompt.contains("\"Hello.\""));
    }

    #[test]
    fn test_prompt_passes_unknown_code_through() {
        let texts = vec!["x".to_string()];
        let prompt = build_translation_prompt(&texts, "xx", "es");
        assert!(prompt.contains("1 xx segments"));
    }

    #[test]
    fn test_parse_translation_strips_code_fence() {
        let raw = "```json\n{\"translation\": [\"Hola.\", \"Adiós.\"]}\n```";
        let batch = parse_translation_batch(raw).unwrap();
        assert_eq!(batch.translation, vec!["Hola.", "Adiós."]);
    }

    #[test]
    fn test_parse_translation_rejects_missing_object() {
        assert!(parse_translation_batch("sorry, I cannot do that").is_err());
    }

    #[test]
    fn test_parse_generate_response_shape() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"translation\": [\"Hola\"]}"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let text = &parsed.candidates[0].content.parts[0].text;
        let batch = parse_translation_batch(text).unwrap();
        assert_eq!(batch.translation, vec!["Hola"]);
    }
}
