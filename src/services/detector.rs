use serde::{Deserialize, Serialize};

use crate::retry::{with_retry_if, RetryConfig};

use super::translator::is_retryable;
use super::{LanguageDetector, ServiceError};

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
}

/// One detection candidate; the service returns several, ranked by nothing
/// in particular.
#[derive(Debug, Deserialize)]
struct DetectionCandidate {
    language: String,
    #[serde(default)]
    confidence: f64,
}

/// HTTP client for the language-detection service.
///
/// `POST {base}/detect` with `q`, answered with a list of candidates; the
/// highest-confidence one wins. Detection is best-effort and the chosen
/// code is passed through without validation.
pub struct HttpDetector {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpDetector {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry: RetryConfig::api_call(),
        }
    }

    /// Override the retry schedule (tests use short delays).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, word: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .json(&DetectRequest { q: word })
            .send()
            .await
            .map_err(ServiceError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ServiceError::Api { status, body });
        }

        let candidates: Vec<DetectionCandidate> = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        candidates
            .into_iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|candidate| candidate.language)
            .ok_or_else(|| {
                ServiceError::MalformedResponse("detection returned no candidates".to_string())
            })
    }
}

#[async_trait::async_trait]
impl LanguageDetector for HttpDetector {
    async fn detect(&self, word: &str) -> Result<String, ServiceError> {
        with_retry_if(
            &self.retry,
            &format!("Language detection of '{}'", word),
            || self.request(word),
            is_retryable,
        )
        .await
    }
}
