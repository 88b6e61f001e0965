//! Result module - the terminal outcome for one document

use crate::Triplet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A recorded failure for one segment of a document.
///
/// Segment failures never abort the run; they ride along in the document's
/// result so that every document still reaches exactly one terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentFailure {
    /// Position of the failed segment within the document
    pub sequence_index: usize,

    /// Human-readable failure reason
    pub reason: String,
}

/// The terminal, once-only outcome for a document.
///
/// Invariant: a `DocumentResult` is only assembled after every segment of the
/// document has either produced triplets or recorded a failure. Triplet order
/// follows segment `sequence_index`.
///
/// This is the persisted output record; its JSON shape
/// (`doc_id`, `language`, `triplets`, `num_segments`, `path`) is stable for
/// downstream tooling, with `failures` present only when non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Id of the document
    pub doc_id: String,

    /// Model language code used for extraction
    pub language: String,

    /// All triplets extracted from the document, in segment order
    pub triplets: Vec<Triplet>,

    /// Number of segments the document was split into
    pub num_segments: usize,

    /// Source file path, if the document came from a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Per-segment failure markers, empty on full success
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SegmentFailure>,
}

impl DocumentResult {
    /// An empty result for a document that produced no segments.
    pub fn empty(doc_id: impl Into<String>, language: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            doc_id: doc_id.into(),
            language: language.into(),
            triplets: Vec::new(),
            num_segments: 0,
            path,
            failures: Vec::new(),
        }
    }

    /// A result for a document that could not be read or decoded at all.
    pub fn failed(doc_id: impl Into<String>, path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            language: String::new(),
            triplets: Vec::new(),
            num_segments: 0,
            path,
            failures: vec![SegmentFailure {
                sequence_index: 0,
                reason: reason.into(),
            }],
        }
    }

    /// Whether every segment of the document resolved successfully.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}
