use anyhow::{Context, Result};

use crate::services::FailurePolicy;

#[derive(Debug, Clone)]
pub struct Config {
    // Store
    pub store_path: String,

    // Translator
    pub translator_url: String,
    pub translator_api_key: Option<String>,

    // Detector
    pub detector_url: String,

    // Grammar-class lookup
    pub classifier_url: String,
    pub classifier_lang: String,
    pub classifier_timeout_ms: u64,
    pub classifier_on_failure: FailurePolicy,

    // Transcriber
    pub transcriber_url: String,
    pub transcriber_on_failure: FailurePolicy,

    // HTTP
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Store
            store_path: std::env::var("LEXIGAP_STORE")
                .unwrap_or_else(|_| "dictionary.json".to_string()),

            // Translator
            translator_url: std::env::var("LEXIGAP_TRANSLATOR_URL")
                .context("LEXIGAP_TRANSLATOR_URL not set")?,
            translator_api_key: std::env::var("LEXIGAP_TRANSLATOR_API_KEY").ok(),

            // Detector
            detector_url: std::env::var("LEXIGAP_DETECTOR_URL")
                .context("LEXIGAP_DETECTOR_URL not set")?,

            // Grammar-class lookup
            classifier_url: std::env::var("LEXIGAP_CLASSIFIER_URL")
                .context("LEXIGAP_CLASSIFIER_URL not set")?,
            classifier_lang: std::env::var("LEXIGAP_CLASSIFIER_LANG")
                .unwrap_or_else(|_| "en".to_string()),
            classifier_timeout_ms: std::env::var("LEXIGAP_CLASSIFIER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            classifier_on_failure: policy_var("LEXIGAP_CLASSIFIER_ON_FAILURE", FailurePolicy::Skip)?,

            // Transcriber
            transcriber_url: std::env::var("LEXIGAP_TRANSCRIBER_URL")
                .context("LEXIGAP_TRANSCRIBER_URL not set")?,
            transcriber_on_failure: policy_var(
                "LEXIGAP_TRANSCRIBER_ON_FAILURE",
                FailurePolicy::Propagate,
            )?,

            // HTTP
            request_timeout_secs: std::env::var("LEXIGAP_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }
}

/// Read a failure policy from the environment, falling back to the
/// collaborator's default when the variable is unset.
fn policy_var(name: &str, default: FailurePolicy) -> Result<FailurePolicy> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("{} must be 'skip' or 'propagate'", name)),
        Err(_) => Ok(default),
    }
}
