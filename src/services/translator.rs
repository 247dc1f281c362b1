use serde::{Deserialize, Serialize};

use crate::retry::{with_retry_if, RetryConfig};

use super::{ServiceError, Translator};

/// Request body for the translation endpoint
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP client for the translation service.
///
/// Speaks the LibreTranslate wire shape: `POST {base}/translate` with
/// `q`/`source`/`target`, answered with `translatedText`.
pub struct HttpTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl HttpTranslator {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            retry: RetryConfig::api_call(),
        }
    }

    /// Override the retry schedule (tests use short delays).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, word: &str, source: &str, target: &str) -> Result<String, ServiceError> {
        let request = TranslateRequest {
            q: word,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
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

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        Ok(parsed.translated_text)
    }
}

#[async_trait::async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        word: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ServiceError> {
        with_retry_if(
            &self.retry,
            &format!("Translation of '{}' into {}", word, target),
            || self.request(word, source, target),
            is_retryable,
        )
        .await
    }
}

/// Retry 429 (rate limit), 5xx, transport failures, and malformed bodies
/// (which may be transient); other 4xx client errors fail immediately.
pub(super) fn is_retryable(error: &ServiceError) -> bool {
    match error {
        ServiceError::Api { status, .. } => *status == 429 || *status >= 500,
        ServiceError::Network(_) | ServiceError::Timeout => true,
        ServiceError::MalformedResponse(_) => true,
    }
}
