//! Segment engine
//!
//! Combines language detection and budget-aware splitting: one document in,
//! an ordered sequence of language-tagged segments out.

use crate::language::normalize;
use crate::segmenter::Segmenter;
use relstream_domain::{Document, LanguageDetector, Segment, TokenCounter};
use std::path::PathBuf;
use tracing::debug;

/// A document after segmentation, ready for scheduling.
#[derive(Debug, Clone)]
pub struct SegmentedDocument {
    /// Identifier carried over from the source document.
    pub id: String,
    /// Normalized language code stamped on every segment.
    pub language: String,
    /// Segments in document order; empty for empty or whitespace-only input.
    pub segments: Vec<Segment>,
    /// Source file, when the document came from one.
    pub source_path: Option<PathBuf>,
}

impl SegmentedDocument {
    /// Whether the document produced no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Turns documents into segment sequences.
///
/// Language is resolved once per document: a caller-forced code wins,
/// otherwise the detector runs on the raw text. All segments of a document
/// carry the same language.
///
/// # Examples
///
/// ```
/// use relstream_segment::{SegmentEngine, Segmenter, WhitespaceCounter};
/// use relstream_segment::language::ScriptDetector;
/// use relstream_domain::Document;
///
/// let engine = SegmentEngine::new(ScriptDetector, Segmenter::new(WhitespaceCounter, 1024));
/// let doc = Document::new("d1", "Apple Inc. is headquartered in Cupertino.");
///
/// let segmented = engine.segment_document(&doc, None);
/// assert_eq!(segmented.segments.len(), 1);
/// assert_eq!(segmented.segments[0].sequence_index, 0);
/// ```
#[derive(Debug, Clone)]
pub struct SegmentEngine<D: LanguageDetector, C: TokenCounter> {
    detector: D,
    segmenter: Segmenter<C>,
}

impl<D: LanguageDetector, C: TokenCounter> SegmentEngine<D, C> {
    /// Create an engine from a detector and a segmenter.
    pub fn new(detector: D, segmenter: Segmenter<C>) -> Self {
        Self {
            detector,
            segmenter,
        }
    }

    /// Segment a document, optionally forcing the language.
    ///
    /// A forced tag is normalized before use. Identical input always yields
    /// an identical segment sequence.
    pub fn segment_document(&self, doc: &Document, language: Option<&str>) -> SegmentedDocument {
        let language = match language {
            Some(tag) => normalize(tag),
            None => self.detector.detect(&doc.text),
        };

        let segments: Vec<Segment> = self
            .segmenter
            .split(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Segment::new(&doc.id, i, text, &language))
            .collect();

        debug!(
            doc_id = %doc.id,
            language = %language,
            num_segments = segments.len(),
            "segmented document"
        );

        SegmentedDocument {
            id: doc.id.clone(),
            language,
            segments,
            source_path: doc.source_path.clone(),
        }
    }
}
