//! Remote Extractor Implementation
//!
//! HTTP client for a relation-extraction model served behind an inference
//! endpoint. The model is treated as a black box: segments and language
//! codes go in, generated relation markup comes out, and
//! [`crate::decode::decode_triplets`] turns the markup into triplets.
//!
//! # Features
//!
//! - Async HTTP communication with the inference API
//! - Configurable endpoint and compute device
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use relstream_model::RemoteExtractor;
//!
//! // Create an extractor against a local inference server
//! let extractor = RemoteExtractor::new("http://localhost:8900");
//!
//! // The extract_batch method is async; the RelationExtractor trait impl
//! // wraps it for the scheduler's blocking dispatch path
//! ```

use crate::decode::decode_triplets;
use crate::ModelError;
use relstream_domain::{ExtractionInput, RelationExtractor, Triplet};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default inference endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8900";

/// Default timeout for extraction requests (120 seconds; a cold GPU batch
/// can take a while)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default compute device selector (-1 = CPU)
pub const DEFAULT_DEVICE: i32 = -1;

/// HTTP-backed relation extractor.
///
/// Sends one request per batch; the `device` selector is passed through to
/// the server opaquely.
pub struct RemoteExtractor {
    endpoint: String,
    device: i32,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the batch extraction API
#[derive(Serialize)]
struct ExtractRequest {
    inputs: Vec<ExtractRequestItem>,
    device: i32,
}

#[derive(Serialize)]
struct ExtractRequestItem {
    text: String,
    src_lang: String,
}

/// Response from the batch extraction API
#[derive(Deserialize)]
struct ExtractResponse {
    outputs: Vec<ExtractResponseItem>,
}

#[derive(Deserialize)]
struct ExtractResponseItem {
    generated: String,
}

impl RemoteExtractor {
    /// Create a remote extractor for the given endpoint.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relstream_model::RemoteExtractor;
    ///
    /// let extractor = RemoteExtractor::new("http://localhost:8900");
    /// ```
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("default reqwest client");

        Self {
            endpoint: endpoint.into(),
            device: DEFAULT_DEVICE,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a remote extractor against the default local endpoint.
    pub fn default_endpoint() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }

    /// Set the compute device selector passed through to the server.
    pub fn with_device(mut self, device: i32) -> Self {
        self.device = device;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Extract triplets for a batch of segments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the inference server is unreachable
    /// - the model is not loaded on the server
    /// - the response is malformed or misaligned with the batch
    pub async fn extract_batch(
        &self,
        batch: &[ExtractionInput],
    ) -> Result<Vec<Vec<Triplet>>, ModelError> {
        let url = format!("{}/extract", self.endpoint);

        let request_body = ExtractRequest {
            inputs: batch
                .iter()
                .map(|input| ExtractRequestItem {
                    text: input.text.clone(),
                    src_lang: input.language.clone(),
                })
                .collect(),
            device: self.device,
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let parsed: ExtractResponse = response.json().await.map_err(|e| {
                            ModelError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;

                        if parsed.outputs.len() != batch.len() {
                            return Err(ModelError::InvalidResponse(format!(
                                "Endpoint returned {} outputs for {} inputs",
                                parsed.outputs.len(),
                                batch.len()
                            )));
                        }

                        return Ok(parsed
                            .outputs
                            .iter()
                            .map(|item| decode_triplets(&item.generated))
                            .collect());
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(ModelError::ModelNotAvailable(self.endpoint.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(ModelError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(ModelError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| ModelError::Communication("Max retries exceeded".to_string())))
    }
}

impl RelationExtractor for RemoteExtractor {
    type Error = ModelError;

    fn extract(&self, batch: &[ExtractionInput]) -> Result<Vec<Vec<Triplet>>, Self::Error> {
        // Blocking wrapper for the async client; the scheduler calls this on
        // a dedicated blocking thread, never inside the async runtime
        tokio::runtime::Runtime::new()
            .map_err(|e| ModelError::Other(format!("Runtime error: {}", e)))?
            .block_on(async { self.extract_batch(batch).await })
    }
}
