//! Supported translation languages.
//!
//! The translation prompt wants full language names rather than ISO codes,
//! so the allow-list doubles as a code-to-name table.

/// ISO 639-1 code to English language name.
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish Latin America"),
    ("pt", "Portuguese"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("ru", "Russian"),
    ("hi", "Hindi"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("it", "Italian"),
    ("tr", "Turkish"),
    ("vi", "Vietnamese"),
    ("nl", "Dutch"),
    ("tl", "Tagalog"),
    ("he", "Hebrew"),
    ("pl", "Polish"),
    ("sv", "Swedish"),
    ("id", "Indonesian"),
];

/// Look up the English name for a language code. Returns `None` when the
/// code is not in the supported set.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Whether a language code is in the supported set.
pub fn is_supported(code: &str) -> bool {
    language_name(code).is_some()
}
