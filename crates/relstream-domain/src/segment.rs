//! Segment module - the unit of work submitted to the extraction model

/// A bounded-length chunk of one document's text.
///
/// Segments are produced by the segment engine and owned by the batch
/// scheduler until their extraction outcome is recorded. `sequence_index`
/// places the segment within its document; it is used only for result
/// reassembly, never to order extraction calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Id of the document this segment belongs to
    pub document_id: String,

    /// Zero-based position within the document's segment sequence
    pub sequence_index: usize,

    /// Segment text, within the configured token budget
    pub text: String,

    /// Model language code shared by all segments of the document
    pub language: String,
}

impl Segment {
    /// Create a segment.
    pub fn new(
        document_id: impl Into<String>,
        sequence_index: usize,
        text: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            sequence_index,
            text: text.into(),
            language: language.into(),
        }
    }
}
