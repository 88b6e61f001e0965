//! Pending document ledger
//!
//! Tracks how many of a document's segments have resolved and assembles the
//! terminal `DocumentResult` once all of them have. The ledger is the
//! invariant-bearing structure of the scheduler: an entry is created exactly
//! once per document, mutated through a single lock, and removed exactly when
//! its result is emitted. Entries never leak and outcomes never double-count.

use relstream_domain::{DocumentResult, SegmentFailure, Triplet};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// How one segment resolved.
#[derive(Debug, Clone)]
pub enum SegmentOutcome {
    /// The model returned a (possibly empty) triplet set
    Extracted(Vec<Triplet>),

    /// The segment's batch failed; reason recorded in the result
    Failed(String),
}

#[derive(Debug)]
struct PendingEntry {
    language: String,
    source_path: Option<PathBuf>,
    // One slot per sequence_index; None until the segment resolves
    slots: Vec<Option<SegmentOutcome>>,
    resolved: usize,
}

impl PendingEntry {
    fn is_complete(&self) -> bool {
        self.resolved == self.slots.len()
    }

    fn into_result(self, doc_id: String) -> DocumentResult {
        let num_segments = self.slots.len();
        let mut triplets = Vec::new();
        let mut failures = Vec::new();

        for (sequence_index, slot) in self.slots.into_iter().enumerate() {
            match slot {
                Some(SegmentOutcome::Extracted(mut set)) => triplets.append(&mut set),
                Some(SegmentOutcome::Failed(reason)) => failures.push(SegmentFailure {
                    sequence_index,
                    reason,
                }),
                // Only reachable via drain, which pre-fills unresolved slots
                None => failures.push(SegmentFailure {
                    sequence_index,
                    reason: "segment never resolved".to_string(),
                }),
            }
        }

        DocumentResult {
            doc_id,
            language: self.language,
            triplets,
            num_segments,
            path: self.source_path,
            failures,
        }
    }
}

/// Shared bookkeeping of documents awaiting segment outcomes.
///
/// All mutation goes through one internal mutex; the lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct PendingLedger {
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document expecting `expected_segments` outcomes.
    ///
    /// Returns an immediate empty result when the document has no segments;
    /// such a document never enters the ledger. Re-registering an id that is
    /// still pending is ignored with a warning, preserving the original
    /// entry.
    pub fn register(
        &self,
        doc_id: &str,
        language: &str,
        expected_segments: usize,
        source_path: Option<PathBuf>,
    ) -> Option<DocumentResult> {
        if expected_segments == 0 {
            return Some(DocumentResult::empty(doc_id, language, source_path));
        }

        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(doc_id) {
            warn!(doc_id, "document already registered, keeping original entry");
            return None;
        }

        entries.insert(
            doc_id.to_string(),
            PendingEntry {
                language: language.to_string(),
                source_path,
                slots: vec![None; expected_segments],
                resolved: 0,
            },
        );
        None
    }

    /// Record the outcome of one segment.
    ///
    /// Returns the finished `DocumentResult` when this outcome completes the
    /// document; the entry is removed in the same critical section, so a
    /// result can never be produced twice. Outcomes for unknown documents,
    /// out-of-range indices, or already-resolved slots are dropped with a
    /// warning rather than corrupting the entry.
    pub fn record(
        &self,
        doc_id: &str,
        sequence_index: usize,
        outcome: SegmentOutcome,
    ) -> Option<DocumentResult> {
        let mut entries = self.entries.lock().unwrap();

        let Some(entry) = entries.get_mut(doc_id) else {
            warn!(doc_id, sequence_index, "outcome for unregistered document");
            return None;
        };

        match entry.slots.get_mut(sequence_index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(outcome);
                entry.resolved += 1;
            }
            Some(_) => {
                warn!(doc_id, sequence_index, "duplicate outcome ignored");
                return None;
            }
            None => {
                warn!(doc_id, sequence_index, "sequence index out of range");
                return None;
            }
        }

        if entry.is_complete() {
            let entry = entries.remove(doc_id).unwrap();
            return Some(entry.into_result(doc_id.to_string()));
        }
        None
    }

    /// Flush every still-pending entry with a failure marker.
    ///
    /// Used at shutdown so no document is left permanently awaiting
    /// segments. Unresolved slots get `reason`; already-resolved slots keep
    /// their outcome. The ledger is empty afterwards.
    pub fn drain(&self, reason: &str) -> Vec<DocumentResult> {
        let mut entries = self.entries.lock().unwrap();
        entries
            .drain()
            .map(|(doc_id, mut entry)| {
                for slot in entry.slots.iter_mut() {
                    if slot.is_none() {
                        *slot = Some(SegmentOutcome::Failed(reason.to_string()));
                    }
                }
                entry.into_result(doc_id)
            })
            .collect()
    }

    /// Number of documents still awaiting segments.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether no documents are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
