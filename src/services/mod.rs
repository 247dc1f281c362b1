//! External collaborator interfaces and their HTTP clients.
//!
//! The dictionary core never talks to the network directly: it goes through
//! the four traits defined here, so callers own the client lifecycles and
//! tests can substitute doubles.
//!
//! - `translator`: word translation between two language codes
//! - `detector`: best-effort language detection
//! - `classifier`: grammar-class lookup, short timeout, usually degraded
//!   rather than propagated (see [`FailurePolicy`])
//! - `transcriber`: phonetic (IPA) transcription

mod classifier;
mod detector;
mod transcriber;
mod translator;

pub use classifier::HttpClassifier;
pub use detector::HttpDetector;
pub use transcriber::HttpTranscriber;
pub use translator::HttpTranslator;

use async_trait::async_trait;

/// Error surface shared by every collaborator client.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Classify a transport-level reqwest error, separating timeouts from
    /// other network failures.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ServiceError::Timeout
        } else {
            ServiceError::Network(error)
        }
    }
}

/// What a failing collaborator does to the operation in flight.
///
/// The classifier defaults to `Skip` (classification is enrichment, the
/// service is slow and unreliable); everything whose output is essential to
/// record integrity defaults to `Propagate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Swallow the failure and degrade to an empty result.
    Skip,
    /// Surface the failure to the caller, aborting the operation.
    Propagate,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "propagate" => Ok(FailurePolicy::Propagate),
            other => Err(format!(
                "invalid failure policy '{}' (expected 'skip' or 'propagate')",
                other
            )),
        }
    }
}

/// Translate a single word from `source` into `target`.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        word: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ServiceError>;
}

/// Best-effort language detection. Output is trusted verbatim; the core
/// performs no validation on the returned code.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, word: &str) -> Result<String, ServiceError>;
}

/// Grammar-class lookup. Returns the word's parts of speech as a single
/// comma-joined string.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// The only language the lookup service understands. Words in any other
    /// language must be translated into this one before classification.
    fn working_language(&self) -> &str;

    async fn classify(&self, word: &str, language: &str) -> Result<String, ServiceError>;
}

/// Phonetic (IPA) transcription of a word.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, word: &str) -> Result<String, ServiceError>;
}

/// The full set of collaborators the builder and the convergence engine
/// need, with per-collaborator failure policies.
pub struct ServiceSet {
    pub translator: Box<dyn Translator>,
    pub detector: Box<dyn LanguageDetector>,
    pub classifier: Box<dyn Classifier>,
    pub transcriber: Box<dyn Transcriber>,

    /// Applied to the classify call only; the pre-translation into the
    /// classifier's working language fails like any translator call.
    pub classifier_failure: FailurePolicy,
    pub transcriber_failure: FailurePolicy,
}

impl ServiceSet {
    /// Bundle the four collaborators with the default failure policies:
    /// classifier failures are skipped, transcriber failures propagate.
    pub fn new(
        translator: Box<dyn Translator>,
        detector: Box<dyn LanguageDetector>,
        classifier: Box<dyn Classifier>,
        transcriber: Box<dyn Transcriber>,
    ) -> Self {
        Self {
            translator,
            detector,
            classifier,
            transcriber,
            classifier_failure: FailurePolicy::Skip,
            transcriber_failure: FailurePolicy::Propagate,
        }
    }
}
