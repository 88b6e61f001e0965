//! Relstream Model Layer
//!
//! Pluggable implementations of the `RelationExtractor` trait from
//! `relstream-domain`.
//!
//! # Extractors
//!
//! - `MockExtractor`: deterministic mock for testing
//! - `RemoteExtractor`: HTTP client for a translation-style relation
//!   extraction model served behind an inference endpoint
//!
//! # Examples
//!
//! ```
//! use relstream_model::MockExtractor;
//! use relstream_domain::{ExtractionInput, RelationExtractor, Triplet};
//!
//! let mut extractor = MockExtractor::default();
//! extractor.add_response(
//!     "Apple Inc. is headquartered in Cupertino.",
//!     vec![Triplet::new("Apple Inc.", "ORG", "headquarters location", "Cupertino", "LOC")],
//! );
//!
//! let batch = vec![ExtractionInput::new("Apple Inc. is headquartered in Cupertino.", "en_XX")];
//! let results = extractor.extract(&batch).unwrap();
//! assert_eq!(results[0].len(), 1);
//! ```

#![warn(missing_docs)]

pub mod decode;
pub mod remote;

use relstream_domain::{ExtractionInput, RelationExtractor, Triplet};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use remote::RemoteExtractor;

/// Errors that can occur during model operations
#[derive(Error, Debug)]
pub enum ModelError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the inference endpoint
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available on the endpoint
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Model error: {0}")]
    Other(String),
}

/// Mock extractor for deterministic testing
///
/// Returns pre-configured triplet sets keyed on segment text, with no model
/// or network involved. Batches can be scripted to fail, which is how the
/// scheduler's failure-isolation behavior is exercised in tests.
///
/// # Examples
///
/// ```
/// use relstream_model::MockExtractor;
/// use relstream_domain::{ExtractionInput, RelationExtractor};
///
/// // Unknown inputs resolve to an empty triplet set
/// let extractor = MockExtractor::default();
/// let batch = vec![ExtractionInput::new("anything", "en_XX")];
/// assert!(extractor.extract(&batch).unwrap()[0].is_empty());
/// assert_eq!(extractor.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    responses: Arc<Mutex<HashMap<String, Vec<Triplet>>>>,
    failing_calls: Arc<Mutex<HashSet<usize>>>,
    failing_texts: Arc<Mutex<HashSet<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockExtractor {
    /// Create a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the triplets returned for a specific segment text.
    pub fn add_response(&mut self, text: impl Into<String>, triplets: Vec<Triplet>) {
        self.responses.lock().unwrap().insert(text.into(), triplets);
    }

    /// Script the `n`-th call to `extract` (1-based) to fail at batch level.
    pub fn fail_on_call(&mut self, n: usize) {
        self.failing_calls.lock().unwrap().insert(n);
    }

    /// Script any batch containing this exact segment text to fail.
    pub fn fail_on_text(&mut self, text: impl Into<String>) {
        self.failing_texts.lock().unwrap().insert(text.into());
    }

    /// Number of times `extract` was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call counter.
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl RelationExtractor for MockExtractor {
    type Error = ModelError;

    fn extract(&self, batch: &[ExtractionInput]) -> Result<Vec<Vec<Triplet>>, Self::Error> {
        let call = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        if self.failing_calls.lock().unwrap().contains(&call) {
            return Err(ModelError::Other(format!("scripted failure on call {}", call)));
        }

        let failing_texts = self.failing_texts.lock().unwrap();
        if batch.iter().any(|input| failing_texts.contains(&input.text)) {
            return Err(ModelError::Other("scripted failure on batch text".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        Ok(batch
            .iter()
            .map(|input| responses.get(&input.text).cloned().unwrap_or_default())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> ExtractionInput {
        ExtractionInput::new(text, "en_XX")
    }

    #[test]
    fn test_mock_default_empty() {
        let extractor = MockExtractor::new();
        let results = extractor.extract(&[input("unknown")]).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_empty());
    }

    #[test]
    fn test_mock_scripted_responses() {
        let mut extractor = MockExtractor::new();
        extractor.add_response(
            "Tesla manufactures electric vehicles.",
            vec![Triplet::new("Tesla", "ORG", "product", "electric vehicles", "MISC")],
        );

        let results = extractor
            .extract(&[input("Tesla manufactures electric vehicles."), input("other")])
            .unwrap();

        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].head, "Tesla");
        assert!(results[1].is_empty());
    }

    #[test]
    fn test_mock_fail_on_call() {
        let mut extractor = MockExtractor::new();
        extractor.fail_on_call(2);

        assert!(extractor.extract(&[input("a")]).is_ok());
        assert!(extractor.extract(&[input("b")]).is_err());
        assert!(extractor.extract(&[input("c")]).is_ok());
        assert_eq!(extractor.call_count(), 3);
    }

    #[test]
    fn test_mock_fail_on_text() {
        let mut extractor = MockExtractor::new();
        extractor.fail_on_text("poison");

        assert!(extractor.extract(&[input("fine")]).is_ok());
        let result = extractor.extract(&[input("fine"), input("poison")]);
        assert!(matches!(result, Err(ModelError::Other(_))));
    }

    #[test]
    fn test_mock_clone_shares_counters() {
        let extractor = MockExtractor::new();
        let clone = extractor.clone();

        extractor.extract(&[input("a")]).unwrap();

        assert_eq!(extractor.call_count(), 1);
        assert_eq!(clone.call_count(), 1);
    }
}
