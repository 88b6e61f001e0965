//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the pipeline and the model
//! infrastructure. Implementations live in other crates (`relstream-model`,
//! `relstream-segment`); the pipeline itself is agnostic of model choice.

use crate::Triplet;

/// One extraction unit as seen by the model: segment text plus its language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionInput {
    /// Segment text
    pub text: String,

    /// Model language code (e.g. `en_XX`)
    pub language: String,
}

impl ExtractionInput {
    /// Create an extraction input.
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
        }
    }
}

/// The extraction model boundary.
///
/// `extract` takes an ordered batch of inputs and returns one triplet set per
/// input, aligned 1:1, or a batch-level error. The call is synchronous and
/// may block for the full model latency; the scheduler invokes it on a
/// blocking worker thread, so implementations are free to be internally
/// concurrent or GPU-bound.
pub trait RelationExtractor {
    /// Error type for extraction operations
    type Error: std::fmt::Display;

    /// Extract relation triplets from a batch of segments.
    ///
    /// The returned vector must have exactly one entry per input, in input
    /// order. An input with no discoverable relations maps to an empty set.
    fn extract(&self, batch: &[ExtractionInput]) -> Result<Vec<Vec<Triplet>>, Self::Error>;
}

/// The language-detection boundary.
///
/// Detection is best-effort: implementations must always return a usable
/// model language code, falling back to a default on ambiguous input rather
/// than failing.
pub trait LanguageDetector {
    /// Detect the language of `text` and return its model code.
    fn detect(&self, text: &str) -> String;
}

/// The tokenizer boundary, reduced to the one question the segmenter asks.
pub trait TokenCounter {
    /// Number of model tokens `text` occupies.
    fn count(&self, text: &str) -> usize;
}
