use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::builder::{build_record, SourceLanguage};
use crate::rank::rank_languages;
use crate::services::ServiceSet;
use crate::store::{normalize_word, Dictionary};

/// Whether a present-but-empty translation counts as a gap.
///
/// Under `RetryEmpty` an empty string is retried on every pass, which keeps
/// the engine honest against translators that briefly return nothing — but
/// a translator that always returns empty causes unbounded re-attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Empty strings are gaps and get retried every pass.
    #[default]
    RetryEmpty,
    /// Empty strings count as filled.
    KeepEmpty,
}

/// Drive every word's translation map toward covering the full language
/// rank, then persist the store. Returns the number of translations
/// written.
///
/// The rank is snapshotted once at the start of the pass: languages can
/// only enter the rank through ingestion, never mid-pass. A translator
/// failure aborts the whole pass; nothing is persisted and the previous
/// snapshot stays intact.
pub async fn fill_gaps(
    services: &ServiceSet,
    dictionary: &mut Dictionary,
    policy: GapPolicy,
) -> Result<usize> {
    let ranked = rank_languages(dictionary.words());
    let total = dictionary.len();
    let mut written = 0;

    let words: Vec<String> = dictionary.words().keys().cloned().collect();
    for (position, word) in words.iter().enumerate() {
        let Some(record) = dictionary.words().get(word) else {
            continue;
        };
        let language = record.language.clone();
        let missing: Vec<String> = ranked
            .iter()
            .filter(|lang| match record.translations.get(lang.as_str()) {
                None => true,
                Some(text) => policy == GapPolicy::RetryEmpty && text.trim().is_empty(),
            })
            .cloned()
            .collect();

        for lang in &missing {
            let translated = services
                .translator
                .translate(word, &language, lang)
                .await
                .with_context(|| format!("Failed to translate '{}' into '{}'", word, lang))?;

            if let Some(record) = dictionary.words_mut().get_mut(word) {
                record
                    .translations
                    .insert(lang.clone(), normalize_word(&translated));
                written += 1;
            }
        }

        debug!(
            "Gap-filled '{}' ({}/{}): {} translations added",
            word,
            position + 1,
            total,
            missing.len()
        );
    }

    dictionary
        .save()
        .context("Failed to persist dictionary after gap-filling")?;

    if written > 0 {
        info!("Gap-filling wrote {} missing translations", written);
    } else {
        debug!("No translation gaps to fill");
    }
    Ok(written)
}

/// Options for bulk ingestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Record failing words and keep going instead of aborting on the
    /// first failure. Off by default: the strict mode never commits a
    /// partial batch.
    pub keep_going: bool,
}

/// Outcome of a bulk ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub added: usize,
    /// Normalized words whose record build failed (keep-going mode only).
    pub failed: Vec<String>,
}

/// Feed a sequence of words through the record builder, overwriting any
/// existing record per word, then persist the store once at the end.
///
/// Blank entries are skipped. Re-ingesting a word replaces its whole
/// record: translations filled by earlier passes are gone until the next
/// `fill_gaps` restores them.
pub async fn ingest<I, S>(
    services: &ServiceSet,
    dictionary: &mut Dictionary,
    words: I,
    source: &SourceLanguage,
    targets: &[String],
    options: IngestOptions,
) -> Result<IngestReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = IngestReport::default();

    for raw in words {
        let key = normalize_word(raw.as_ref());
        if key.is_empty() {
            continue;
        }

        match build_record(services, &key, source, targets).await {
            Ok(record) => {
                dictionary.insert(&key, record);
                report.added += 1;
                debug!("Ingested '{}' ({} so far)", key, report.added);
            }
            Err(e) if options.keep_going => {
                warn!("Skipping '{}': {:#}", key, e);
                report.failed.push(key);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Bulk ingestion aborted at '{}'", key));
            }
        }
    }

    dictionary
        .save()
        .context("Failed to persist dictionary after bulk ingestion")?;

    info!(
        "Ingested {} words ({} failed)",
        report.added,
        report.failed.len()
    );
    Ok(report)
}

/// Add a single word. `persist` decides whether the store is flushed
/// immediately — always explicit, so bulk callers can batch the write.
pub async fn add_word(
    services: &ServiceSet,
    dictionary: &mut Dictionary,
    word: &str,
    source: &SourceLanguage,
    targets: &[String],
    persist: bool,
) -> Result<()> {
    let key = normalize_word(word);
    if key.is_empty() {
        bail!("Cannot add an empty word");
    }

    let record = build_record(services, &key, source, targets).await?;
    dictionary.insert(&key, record);

    if persist {
        dictionary
            .save()
            .with_context(|| format!("Failed to persist dictionary after adding '{}'", key))?;
    }
    Ok(())
}
