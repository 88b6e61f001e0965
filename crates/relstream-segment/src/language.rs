//! Language code normalization and best-effort detection
//!
//! The extraction model wants its own language codes (`en_XX`, `zh_CN`, ...).
//! This module maps common BCP-47-ish tags onto that set and provides two
//! `LanguageDetector` implementations: a fixed code for callers that already
//! know the language, and a Unicode-script heuristic for everything else.
//! Detection is explicitly best-effort; anything unrecognized falls back to
//! English rather than failing.

use relstream_domain::LanguageDetector;
use tracing::debug;

/// Model code used when detection is ambiguous or the language unsupported.
pub const FALLBACK_LANGUAGE: &str = "en_XX";

/// How much of a document the detector samples.
const DETECTION_SAMPLE_CHARS: usize = 1000;

/// Languages the extraction model supports, keyed by normalized ISO 639-1.
const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "ar_AR"),
    ("cs", "cs_CZ"),
    ("de", "de_DE"),
    ("en", "en_XX"),
    ("es", "es_XX"),
    ("fr", "fr_XX"),
    ("hi", "hi_IN"),
    ("it", "it_IT"),
    ("ja", "ja_XX"),
    ("ko", "ko_KR"),
    ("nl", "nl_XX"),
    ("pl", "pl_PL"),
    ("pt", "pt_XX"),
    ("ru", "ru_RU"),
    ("tr", "tr_TR"),
    ("vi", "vi_VN"),
    ("zh", "zh_CN"),
];

/// Regional variants collapsed onto their base language.
const VARIANT_ALIASES: &[(&str, &str)] = &[
    ("zh-cn", "zh"),
    ("zh-tw", "zh"),
    ("zh_cn", "zh"),
    ("zh_tw", "zh"),
    ("zh-hans", "zh"),
    ("zh-hant", "zh"),
    ("en-us", "en"),
    ("en-gb", "en"),
    ("pt-br", "pt"),
    ("pt-pt", "pt"),
    ("es-es", "es"),
    ("es-mx", "es"),
    ("fr-fr", "fr"),
    ("fr-ca", "fr"),
    ("de-de", "de"),
    ("de-at", "de"),
    ("de-ch", "de"),
    ("ru-ru", "ru"),
    ("it-it", "it"),
    ("ja-jp", "ja"),
    ("ko-kr", "ko"),
    ("ar-sa", "ar"),
    ("ar-ae", "ar"),
    ("nl-nl", "nl"),
    ("nl-be", "nl"),
    ("pl-pl", "pl"),
    ("tr-tr", "tr"),
    ("vi-vn", "vi"),
];

/// Normalize a language tag to the model's code set.
///
/// Accepts ISO 639-1 codes, regional variants (`pt-BR`), and the model codes
/// themselves; anything unrecognized maps to [`FALLBACK_LANGUAGE`].
///
/// # Examples
///
/// ```
/// use relstream_segment::language::normalize;
///
/// assert_eq!(normalize("en"), "en_XX");
/// assert_eq!(normalize("zh-CN"), "zh_CN");
/// assert_eq!(normalize("pt-BR"), "pt_XX");
/// assert_eq!(normalize("tlh"), "en_XX");
/// ```
pub fn normalize(tag: &str) -> String {
    let lowered = tag.to_lowercase();

    // Already a model code
    if let Some((_, code)) = SUPPORTED_LANGUAGES
        .iter()
        .find(|(_, code)| code.to_lowercase() == lowered)
    {
        return (*code).to_string();
    }

    let base = VARIANT_ALIASES
        .iter()
        .find(|(variant, _)| *variant == lowered)
        .map(|(_, base)| *base)
        .unwrap_or_else(|| lowered.split(['-', '_']).next().unwrap_or(""));

    SUPPORTED_LANGUAGES
        .iter()
        .find(|(lang, _)| *lang == base)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}

/// Detector that always reports one pre-normalized language.
///
/// Used when the caller forces a language for a whole run.
#[derive(Debug, Clone)]
pub struct FixedLanguage(String);

impl FixedLanguage {
    /// Create a fixed detector; the tag is normalized once up front.
    pub fn new(tag: &str) -> Self {
        Self(normalize(tag))
    }

    /// The normalized code this detector reports.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl LanguageDetector for FixedLanguage {
    fn detect(&self, _text: &str) -> String {
        self.0.clone()
    }
}

/// Unicode-script language heuristic.
///
/// Samples the first portion of the text, buckets characters by script, and
/// maps the dominant script to a model code. Scripts shared by several
/// supported languages (Latin, Cyrillic) resolve to the most common member;
/// this is deliberately coarse - the detector seam exists so a real detector
/// can replace it without touching the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    fn bucket(c: char) -> Option<&'static str> {
        match c as u32 {
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => Some("zh"),
            0x3040..=0x309F | 0x30A0..=0x30FF => Some("ja"),
            0xAC00..=0xD7AF | 0x1100..=0x11FF => Some("ko"),
            0x0600..=0x06FF | 0x0750..=0x077F => Some("ar"),
            0x0400..=0x04FF => Some("ru"),
            0x0900..=0x097F => Some("hi"),
            _ if c.is_ascii_alphabetic() => Some("en"),
            _ => None,
        }
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> String {
        let mut counts: [(&str, usize); 7] = [
            ("zh", 0),
            ("ja", 0),
            ("ko", 0),
            ("ar", 0),
            ("ru", 0),
            ("hi", 0),
            ("en", 0),
        ];

        for c in text.chars().take(DETECTION_SAMPLE_CHARS) {
            if let Some(bucket) = Self::bucket(c) {
                if let Some(entry) = counts.iter_mut().find(|(lang, _)| *lang == bucket) {
                    entry.1 += 1;
                }
            }
        }

        // Kana outweighs Han for Japanese text, which mixes both
        let (ja, zh) = (counts[1].1, counts[0].1);
        let dominant = if ja > 0 && zh > 0 {
            "ja"
        } else {
            counts
                .iter()
                .max_by_key(|(_, n)| *n)
                .filter(|(_, n)| *n > 0)
                .map(|(lang, _)| *lang)
                .unwrap_or("en")
        };

        let code = normalize(dominant);
        debug!(language = %code, "detected document language");
        code
    }
}
