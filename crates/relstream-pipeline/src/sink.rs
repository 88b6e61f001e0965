//! JSON result sink
//!
//! Persists one pretty-printed JSON file per processed document, named
//! deterministically from the document id so downstream tooling can find it.

use crate::error::PipelineError;
use relstream_domain::DocumentResult;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Writes document results into an output directory.
///
/// # Examples
///
/// ```
/// use relstream_pipeline::ResultSink;
///
/// let sink = ResultSink::new("/data/output");
/// assert!(sink.output_path("d1").ends_with("d1_relations.json"));
/// ```
#[derive(Debug, Clone)]
pub struct ResultSink {
    output_dir: PathBuf,
}

impl ResultSink {
    /// Create a sink rooted at `output_dir`; the directory is created on
    /// first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Destination file for a document id.
    pub fn output_path(&self, doc_id: &str) -> PathBuf {
        self.output_dir.join(format!("{doc_id}_relations.json"))
    }

    /// Persist one result, returning the file it was written to.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or the file
    /// cannot be written.
    pub async fn write(&self, result: &DocumentResult) -> Result<PathBuf, PipelineError> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PipelineError::io(&self.output_dir, e))?;

        let path = self.output_path(&result.doc_id);
        let json = serde_json::to_string_pretty(result)?;
        fs::write(&path, json)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;

        debug!(doc_id = %result.doc_id, path = %path.display(), "result persisted");
        Ok(path)
    }
}
