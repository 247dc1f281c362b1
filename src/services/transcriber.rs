use serde::{Deserialize, Serialize};

use crate::retry::{with_retry_if, RetryConfig};

use super::translator::is_retryable;
use super::{ServiceError, Transcriber};

#[derive(Debug, Serialize)]
struct TranscribeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    ipa: String,
}

/// HTTP client for the phonetic transcription service.
///
/// `POST {base}/transcribe` with `text`, answered with the IPA form.
pub struct HttpTranscriber {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpTranscriber {
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
            .post(format!("{}/transcribe", self.base_url))
            .json(&TranscribeRequest { text: word })
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

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        Ok(parsed.ipa)
    }
}

#[async_trait::async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, word: &str) -> Result<String, ServiceError> {
        with_retry_if(
            &self.retry,
            &format!("Transcription of '{}'", word),
            || self.request(word),
            is_retryable,
        )
        .await
    }
}
