//! Relstream Segment Engine
//!
//! Turns one document into an ordered, language-tagged segment sequence.
//!
//! # Overview
//!
//! The extraction model accepts a bounded number of tokens per call, so
//! documents are split into segments that respect that budget. Splitting
//! prefers sentence boundaries, falls back to word boundaries for oversized
//! sentences, and hard-truncates a single oversized word rather than drop
//! text. Segmentation is deterministic: the same text always yields the same
//! segment sequence.
//!
//! Language is detected once per document (or forced by the caller) and
//! stamped on every segment.
//!
//! # Example
//!
//! ```
//! use relstream_segment::{SegmentEngine, Segmenter, WhitespaceCounter};
//! use relstream_segment::language::ScriptDetector;
//! use relstream_domain::Document;
//!
//! let engine = SegmentEngine::new(ScriptDetector, Segmenter::new(WhitespaceCounter, 1024));
//! let doc = Document::new("d1", "Apple Inc. is headquartered in Cupertino.");
//!
//! let segmented = engine.segment_document(&doc, None);
//! assert_eq!(segmented.segments.len(), 1);
//! assert_eq!(segmented.language, "en_XX");
//! ```

#![warn(missing_docs)]

pub mod engine;
pub mod language;
pub mod segmenter;

pub use engine::{SegmentEngine, SegmentedDocument};
pub use language::{FixedLanguage, ScriptDetector, FALLBACK_LANGUAGE};
pub use segmenter::{Segmenter, WhitespaceCounter};
