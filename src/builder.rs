use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::services::{FailurePolicy, ServiceSet};
use crate::store::{normalize_word, WordRecord};

/// Source language for a word being added: an explicit code, or `auto` to
/// ask the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLanguage {
    Auto,
    Code(String),
}

impl SourceLanguage {
    pub fn parse(raw: &str) -> SourceLanguage {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("auto") {
            SourceLanguage::Auto
        } else {
            SourceLanguage::Code(raw.to_lowercase())
        }
    }
}

impl std::str::FromStr for SourceLanguage {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SourceLanguage::parse(s))
    }
}

/// Build a full record for one word: resolve its source language, look up
/// its grammar class and pronunciation, and translate it into every
/// requested target.
///
/// The record is returned, not stored — persistence and rank refresh are
/// the caller's responsibility, so bulk callers can batch them.
pub async fn build_record(
    services: &ServiceSet,
    word: &str,
    source: &SourceLanguage,
    targets: &[String],
) -> Result<WordRecord> {
    let word = normalize_word(word);
    if word.is_empty() {
        bail!("Cannot build a record for an empty word");
    }

    // Detector output is trusted verbatim; a wrong guess is still a usable
    // source language for the translator.
    let language = match source {
        SourceLanguage::Code(code) => code.clone(),
        SourceLanguage::Auto => services
            .detector
            .detect(&word)
            .await
            .with_context(|| format!("Failed to detect the language of '{}'", word))?,
    };
    debug!("Building record for '{}' ({})", word, language);

    let grammatical_class = lookup_class(services, &word, &language).await?;

    let pronunciation = match services.transcriber.transcribe(&word).await {
        Ok(ipa) => ipa,
        Err(e) if services.transcriber_failure == FailurePolicy::Skip => {
            warn!(
                "Transcription of '{}' failed ({}), leaving pronunciation empty",
                word, e
            );
            String::new()
        }
        Err(e) => {
            return Err(e).context(format!("Failed to transcribe '{}'", word));
        }
    };

    let mut translations = BTreeMap::new();
    for target in targets {
        let translated = services
            .translator
            .translate(&word, &language, target)
            .await
            .with_context(|| format!("Failed to translate '{}' into '{}'", word, target))?;
        translations.insert(target.clone(), normalize_word(&translated));
    }

    Ok(WordRecord {
        language,
        grammatical_class,
        pronunciation,
        translations,
    })
}

/// Grammar-class lookup. The classifier only understands its working
/// language, so words in any other language get translated first; that
/// pre-translation fails like any translator call. The classify call
/// itself degrades to an empty string under the Skip policy.
async fn lookup_class(services: &ServiceSet, word: &str, language: &str) -> Result<String> {
    let working = services.classifier.working_language();

    let lookup_word = if language == working {
        word.to_string()
    } else {
        services
            .translator
            .translate(word, language, working)
            .await
            .with_context(|| {
                format!(
                    "Failed to translate '{}' into '{}' for grammar-class lookup",
                    word, working
                )
            })?
    };

    match services.classifier.classify(&lookup_word, working).await {
        Ok(class) => Ok(class),
        Err(e) => match services.classifier_failure {
            FailurePolicy::Skip => {
                warn!(
                    "Grammar-class lookup for '{}' failed ({}), leaving class empty",
                    word, e
                );
                Ok(String::new())
            }
            FailurePolicy::Propagate => {
                Err(e).context(format!("Failed to look up the grammar class of '{}'", word))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::services::fake;

    use super::*;

    fn targets(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    // ==================== SourceLanguage Tests ====================

    #[test]
    fn test_source_language_parses_auto() {
        assert_eq!(SourceLanguage::parse("auto"), SourceLanguage::Auto);
        assert_eq!(SourceLanguage::parse(" AUTO "), SourceLanguage::Auto);
    }

    #[test]
    fn test_source_language_parses_code() {
        assert_eq!(
            SourceLanguage::parse("EN"),
            SourceLanguage::Code("en".to_string())
        );
        assert_eq!(
            "fr".parse::<SourceLanguage>().unwrap(),
            SourceLanguage::Code("fr".to_string())
        );
    }

    // ==================== Happy Path Tests ====================

    #[tokio::test]
    async fn test_build_record_with_explicit_source() {
        let services = fake::service_set();
        let source = SourceLanguage::Code("en".to_string());

        let record = build_record(&services, "hi", &source, &targets(&["fr", "sw"]))
            .await
            .unwrap();

        assert_eq!(record.language, "en");
        assert_eq!(record.grammatical_class, "noun, verb");
        assert_eq!(record.pronunciation, "ˈhi");
        assert_eq!(record.translations.get("fr").unwrap(), "hi-fr");
        assert_eq!(record.translations.get("sw").unwrap(), "hi-sw");
        assert_eq!(record.translations.len(), 2);
    }

    #[tokio::test]
    async fn test_build_record_auto_uses_detector() {
        let mut services = fake::service_set();
        services.detector = Box::new(fake::FixedDetector("it"));

        let record = build_record(&services, "ciao", &SourceLanguage::Auto, &targets(&["fr"]))
            .await
            .unwrap();

        assert_eq!(record.language, "it");
    }

    #[tokio::test]
    async fn test_build_record_normalizes_word_and_translations() {
        let services = fake::service_set();
        let source = SourceLanguage::Code("en".to_string());

        // The fake translator echoes the word back, so a normalized input
        // shows up in the translation value.
        let record = build_record(&services, "  Hello ", &source, &targets(&["fr"]))
            .await
            .unwrap();

        assert_eq!(record.translations.get("fr").unwrap(), "hello-fr");
        assert_eq!(record.pronunciation, "ˈhello");
    }

    #[tokio::test]
    async fn test_build_record_empty_targets_gives_empty_map() {
        let services = fake::service_set();
        let source = SourceLanguage::Code("en".to_string());

        let record = build_record(&services, "hi", &source, &[]).await.unwrap();

        assert!(record.translations.is_empty());
    }

    // ==================== Classification Tests ====================

    #[tokio::test]
    async fn test_classifier_gets_word_translated_into_working_language() {
        let classifier = fake::FixedClassifier::new("noun");
        let seen = classifier.seen.clone();
        let mut services = fake::service_set();
        services.classifier = Box::new(classifier);

        let source = SourceLanguage::Code("es".to_string());
        build_record(&services, "hola", &source, &targets(&["fr"]))
            .await
            .unwrap();

        // Working language is "en", source is "es": the classifier must see
        // the translated form, not the original word.
        assert_eq!(seen.lock().unwrap().as_slice(), ["hola-en"]);
    }

    #[tokio::test]
    async fn test_classifier_gets_original_word_in_working_language() {
        let classifier = fake::FixedClassifier::new("noun");
        let seen = classifier.seen.clone();
        let mut services = fake::service_set();
        services.classifier = Box::new(classifier);

        let source = SourceLanguage::Code("en".to_string());
        build_record(&services, "run", &source, &targets(&["fr"]))
            .await
            .unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), ["run"]);
    }

    #[tokio::test]
    async fn test_classifier_failure_skipped_by_default() {
        let mut services = fake::service_set();
        services.classifier = Box::new(fake::FailingClassifier);

        let source = SourceLanguage::Code("en".to_string());
        let record = build_record(&services, "hi", &source, &targets(&["fr"]))
            .await
            .unwrap();

        assert_eq!(record.grammatical_class, "");
        // The rest of the record is unaffected by the degraded lookup.
        assert_eq!(record.translations.get("fr").unwrap(), "hi-fr");
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates_when_configured() {
        let mut services = fake::service_set();
        services.classifier = Box::new(fake::FailingClassifier);
        services.classifier_failure = FailurePolicy::Propagate;

        let source = SourceLanguage::Code("en".to_string());
        let result = build_record(&services, "hi", &source, &targets(&["fr"])).await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("grammar class of 'hi'"));
    }

    #[tokio::test]
    async fn test_pre_translation_failure_propagates_even_under_skip() {
        let mut services = fake::service_set();
        services.translator = Box::new(fake::FailingTranslator);

        // Classifier policy is Skip, but the failure happens in the
        // translator while preparing the lookup word.
        let source = SourceLanguage::Code("es".to_string());
        let result = build_record(&services, "hola", &source, &targets(&["fr"])).await;

        assert!(result.is_err());
    }

    // ==================== Transcription Tests ====================

    #[tokio::test]
    async fn test_transcriber_failure_propagates_by_default() {
        let mut services = fake::service_set();
        services.transcriber = Box::new(fake::FailingTranscriber);

        let source = SourceLanguage::Code("en".to_string());
        let result = build_record(&services, "hi", &source, &targets(&["fr"])).await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to transcribe 'hi'"));
    }

    #[tokio::test]
    async fn test_transcriber_failure_skipped_when_configured() {
        let mut services = fake::service_set();
        services.transcriber = Box::new(fake::FailingTranscriber);
        services.transcriber_failure = FailurePolicy::Skip;

        let source = SourceLanguage::Code("en".to_string());
        let record = build_record(&services, "hi", &source, &targets(&["fr"]))
            .await
            .unwrap();

        assert_eq!(record.pronunciation, "");
    }

    // ==================== Failure Tests ====================

    #[tokio::test]
    async fn test_translation_failure_propagates() {
        let mut services = fake::service_set();
        services.translator = Box::new(fake::FailingTranslator);

        let source = SourceLanguage::Code("en".to_string());
        let result = build_record(&services, "hi", &source, &targets(&["fr"])).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("into 'fr'"));
    }

    #[tokio::test]
    async fn test_detection_failure_propagates() {
        let mut services = fake::service_set();
        services.detector = Box::new(fake::FailingDetector);

        let result = build_record(&services, "hi", &SourceLanguage::Auto, &targets(&["fr"])).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("detect"));
    }

    #[tokio::test]
    async fn test_empty_word_is_rejected() {
        let services = fake::service_set();
        let source = SourceLanguage::Code("en".to_string());

        let result = build_record(&services, "   ", &source, &targets(&["fr"])).await;

        assert!(result.is_err());
    }
}
