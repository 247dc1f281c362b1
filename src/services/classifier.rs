use std::time::Duration;

use serde::Deserialize;

use super::{Classifier, ServiceError};

/// One entry from the dictionary endpoint; only the meanings matter here.
#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
    #[serde(rename = "partOfSpeech")]
    part_of_speech: String,
}

/// HTTP client for the grammar-class lookup service.
///
/// `GET {base}/api/v2/entries/{language}/{word}`, answered with a list of
/// entries whose meanings each carry a part of speech. The service only
/// understands one language (its working language) and is slow enough that
/// every request runs under a short explicit timeout and is attempted only
/// once — classification trades correctness for responsiveness.
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
    working_language: String,
    timeout: Duration,
}

impl HttpClassifier {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        working_language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            working_language: working_language.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Classifier for HttpClassifier {
    fn working_language(&self) -> &str {
        &self.working_language
    }

    async fn classify(&self, word: &str, language: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .get(format!(
                "{}/api/v2/entries/{}/{}",
                self.base_url, language, word
            ))
            .timeout(self.timeout)
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

        let entries: Vec<Entry> = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        let first = entries.first().ok_or_else(|| {
            ServiceError::MalformedResponse("lookup returned no entries".to_string())
        })?;

        Ok(first
            .meanings
            .iter()
            .map(|meaning| meaning.part_of_speech.as_str())
            .collect::<Vec<_>>()
            .join(", "))
    }
}
