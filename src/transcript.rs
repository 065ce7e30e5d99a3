//! Timed transcript value types.
//!
//! Segments are validated at construction: timings must be non-negative,
//! well-ordered, and non-overlapping within one transcript. Everything
//! downstream (translation, SRT writing) can rely on those invariants.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubbatchError};

/// One timed span of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub index: usize,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(index: usize, start: f64, end: f64, text: String) -> Result<Self> {
        if start < 0.0 || !start.is_finite() || !end.is_finite() {
            return Err(SubbatchError::Transcription(format!(
                "invalid segment timing: start={} end={}",
                start, end
            )));
        }
        if end < start {
            return Err(SubbatchError::Transcription(format!(
                "segment {} ends before it starts: start={} end={}",
                index, start, end
            )));
        }
        Ok(Self {
            index,
            start,
            end,
            text,
        })
    }
}

/// Ordered sequence of segments in the recognized source language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    /// Detected or declared source language code.
    pub language: String,
}

impl Transcript {
    /// Build a transcript, enforcing segment ordering: start times must be
    /// monotonically non-decreasing and segments must not overlap.
    pub fn new(segments: Vec<TranscriptSegment>, language: String) -> Result<Self> {
        for pair in segments.windows(2) {
            if pair[1].start < pair[0].start {
                return Err(SubbatchError::Transcription(format!(
                    "segments out of order at index {}: {} < {}",
                    pair[1].index, pair[1].start, pair[0].start
                )));
            }
            if pair[1].start < pair[0].end {
                return Err(SubbatchError::Transcription(format!(
                    "overlapping segments at index {}: starts at {} before previous ends at {}",
                    pair[1].index, pair[1].start, pair[0].end
                )));
            }
        }
        Ok(Self { segments, language })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

/// Segments parallel to a [`Transcript`], carrying translated text with the
/// source timings untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedTranscript {
    pub segments: Vec<TranscriptSegment>,
    /// Target language code.
    pub language: String,
}

impl TranslatedTranscript {
    /// Pair a source transcript with translated texts. The text count must
    /// match the segment count; timings and ordering are carried over from
    /// the source, so translation cannot reorder, merge, or drop segments.
    pub fn from_texts(source: &Transcript, texts: Vec<String>, language: String) -> Result<Self> {
        if texts.len() != source.segments.len() {
            return Err(SubbatchError::Translation(format!(
                "translation returned {} segments for {} source segments",
                texts.len(),
                source.segments.len()
            )));
        }

        let segments = source
            .segments
            .iter()
            .zip(texts)
            .map(|(seg, text)| TranscriptSegment {
                index: seg.index,
                start: seg.start,
                end: seg.end,
                text,
            })
            .collect();

        Ok(Self { segments, language })
    }

    /// Reuse a transcript verbatim as its own translation. Used when the
    /// detected source language already equals the target language.
    pub fn verbatim(source: &Transcript) -> Self {
        Self {
            segments: source.segments.clone(),
            language: source.language.clone(),
        }
    }

    /// Check that this translation is timing-aligned with its source: same
    /// segment count, identical (start, end) pairs.
    pub fn is_aligned_with(&self, source: &Transcript) -> bool {
        self.segments.len() == source.segments.len()
            && self
                .segments
                .iter()
                .zip(&source.segments)
                .all(|(t, s)| t.start == s.start && t.end == s.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(index: usize, start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(index, start, end, text.to_string()).unwrap()
    }

    #[test]
    fn test_segment_rejects_negative_start() {
        assert!(TranscriptSegment::new(0, -1.0, 2.0, "x".into()).is_err());
    }

    #[test]
    fn test_segment_rejects_end_before_start() {
        assert!(TranscriptSegment::new(0, 5.0, 2.0, "x".into()).is_err());
    }

    #[test]
    fn test_transcript_rejects_overlap() {
        let segments = vec![seg(0, 0.0, 2.0, "a"), seg(1, 1.5, 3.0, "b")];
        assert!(Transcript::new(segments, "en".into()).is_err());
    }

    #[test]
    fn test_transcript_rejects_out_of_order() {
        let segments = vec![seg(0, 4.0, 5.0, "a"), seg(1, 1.0, 2.0, "b")];
        assert!(Transcript::new(segments, "en".into()).is_err());
    }

    #[test]
    fn test_transcript_accepts_touching_segments() {
        let segments = vec![seg(0, 0.0, 2.0, "a"), seg(1, 2.0, 4.0, "b")];
        assert!(Transcript::new(segments, "en".into()).is_ok());
    }

    #[test]
    fn test_from_texts_preserves_timing() {
        let source = Transcript::new(
            vec![seg(0, 0.0, 1.5, "hello"), seg(1, 2.0, 3.0, "world")],
            "en".into(),
        )
        .unwrap();

        let translated = TranslatedTranscript::from_texts(
            &source,
            vec!["hola".into(), "mundo".into()],
            "es".into(),
        )
        .unwrap();

        assert!(translated.is_aligned_with(&source));
        assert_eq!(translated.segments[0].text, "hola");
        assert_eq!(translated.segments[1].start, 2.0);
    }

    #[test]
    fn test_from_texts_rejects_count_mismatch() {
        let source = Transcript::new(vec![seg(0, 0.0, 1.0, "a")], "en".into()).unwrap();
        let result = TranslatedTranscript::from_texts(
            &source,
            vec!["x".into(), "y".into()],
            "es".into(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_verbatim_identity() {
        let source = Transcript::new(
            vec![seg(0, 0.0, 1.0, "same"), seg(1, 1.0, 2.0, "text")],
            "es".into(),
        )
        .unwrap();
        let translated = TranslatedTranscript::verbatim(&source);
        assert!(translated.is_aligned_with(&source));
        assert_eq!(translated.segments[0].text, "same");
        assert_eq!(translated.language, "es");
    }
}
