// Translation abstraction
//
// Narrow contract over the text-translation service. The Gemini HTTP API is
// the only implementation today.

pub mod gemini;

use async_trait::async_trait;

pub use gemini::validate_api_key;

use crate::config::TranslateConfig;
use crate::error::Result;
use crate::transcript::{TranslatedTranscript, Transcript};

/// Main trait for translation operations
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a transcript into the target language. The result is
    /// parallel to the source: same segment count, same timings.
    async fn translate(
        &self,
        transcript: &Transcript,
        target_language: &str,
    ) -> Result<TranslatedTranscript>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the default translator implementation (Gemini)
    pub fn create_translator(config: TranslateConfig, api_key: String) -> Box<dyn Translator> {
        Box::new(gemini::GeminiTranslator::new(config, api_key))
    }
}
