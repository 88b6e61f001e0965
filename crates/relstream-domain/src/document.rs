//! Document module - the unit of input flowing into the pipeline

use std::path::{Path, PathBuf};

/// A document awaiting relation extraction.
///
/// Documents are immutable once created. Each is consumed exactly once by the
/// segment engine, which splits it into [`crate::Segment`]s.
///
/// The `id` must be unique within a run; it is derived from the source
/// filename when the document comes from the directory watcher, supplied by
/// the caller for programmatic use, or generated (UUIDv7) when neither is
/// available.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Run-unique identifier
    pub id: String,

    /// Full document text
    pub text: String,

    /// Path of the file this document was read from, if any
    pub source_path: Option<PathBuf>,
}

impl Document {
    /// Create a document with an explicit id.
    ///
    /// # Examples
    ///
    /// ```
    /// use relstream_domain::Document;
    ///
    /// let doc = Document::new("d1", "Apple Inc. is headquartered in Cupertino.");
    /// assert_eq!(doc.id, "d1");
    /// assert!(doc.source_path.is_none());
    /// ```
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source_path: None,
        }
    }

    /// Create a document with a generated UUIDv7 id.
    ///
    /// Used when a producer has no natural identifier for the text.
    pub fn anonymous(text: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::now_v7().to_string(), text)
    }

    /// Create a document read from a file.
    ///
    /// The id is the file stem (filename without extension), falling back to
    /// the full filename when there is no stem.
    pub fn from_file(path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .or_else(|| path.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());

        Self {
            id,
            text: text.into(),
            source_path: Some(path.to_path_buf()),
        }
    }

    /// Whether the document contains no extractable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new_document() {
        let doc = Document::new("d1", "some text");
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.text, "some text");
        assert!(doc.source_path.is_none());
    }

    #[test]
    fn test_anonymous_ids_are_unique() {
        let a = Document::anonymous("text");
        let b = Document::anonymous("text");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_from_file_derives_id_from_stem() {
        let doc = Document::from_file("/data/input/report-2024.txt", "contents");
        assert_eq!(doc.id, "report-2024");
        assert_eq!(doc.source_path, Some(PathBuf::from("/data/input/report-2024.txt")));
    }

    #[test]
    fn test_from_file_without_extension() {
        let doc = Document::from_file("/data/input/README", "contents");
        assert_eq!(doc.id, "README");
    }

    #[test]
    fn test_is_empty() {
        assert!(Document::new("d1", "").is_empty());
        assert!(Document::new("d2", "  \n\t ").is_empty());
        assert!(!Document::new("d3", "text").is_empty());
    }
}
