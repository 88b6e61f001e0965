//! Relstream Domain Layer
//!
//! This crate contains the data model shared by every stage of the streaming
//! relation-extraction pipeline, plus the trait interfaces behind which the
//! heavyweight collaborators (extraction model, language detector, tokenizer)
//! live.
//!
//! ## Key Concepts
//!
//! - **Document**: one unit of input text, identified by a run-unique id
//! - **Segment**: a bounded-length slice of a document, the unit of extraction
//! - **Triplet**: one extracted relation (head, type, tail) with entity types
//! - **DocumentResult**: the terminal outcome for a document - emitted exactly
//!   once, after every segment has either produced triplets or recorded a
//!   failure
//!
//! ## Architecture
//!
//! The pipeline crates (segmenter, scheduler, watcher, orchestrator) depend
//! only on this crate and on each other. Model-backed implementations of the
//! traits defined here live in `relstream-model` and `relstream-segment`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod result;
pub mod segment;
pub mod traits;
pub mod triplet;

// Re-exports for convenience
pub use document::Document;
pub use result::{DocumentResult, SegmentFailure};
pub use segment::Segment;
pub use traits::{ExtractionInput, LanguageDetector, RelationExtractor, TokenCounter};
pub use triplet::Triplet;
