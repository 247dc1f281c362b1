use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persisted content shorter than this is treated as an empty store rather
/// than handed to the JSON parser.
const EMPTY_STORE_THRESHOLD: usize = 5;

/// The stored data for one dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    /// ISO-ish language code, supplied by the caller or detected.
    pub language: String,
    /// Comma-joined parts of speech; empty when the lookup degraded.
    #[serde(rename = "class")]
    pub grammatical_class: String,
    /// IPA transcription of the word itself (not of any translation).
    pub pronunciation: String,
    /// Target-language code -> translated word. Gaps are the normal
    /// transient state between convergence passes.
    pub translations: BTreeMap<String, String>,
}

/// Normalize a raw word to its store-key form: trimmed and lowercased.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The dictionary store: word -> record, persisted as one JSON snapshot.
///
/// Every key is lowercase, whitespace-trimmed, and non-empty. Iteration is
/// lexicographic. A word present in two source languages collides on its
/// spelling and the second write wins — a documented limitation of the
/// single-key model.
#[derive(Debug)]
pub struct Dictionary {
    path: PathBuf,
    words: BTreeMap<String, WordRecord>,
}

impl Dictionary {
    /// Load the store from `path`. A missing file or effectively-empty
    /// content yields an empty store; anything longer must parse.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let words = match fs::read_to_string(&path) {
            Ok(content) if content.len() < EMPTY_STORE_THRESHOLD => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).with_context(|| {
                format!("Failed to parse dictionary store at {}", path.display())
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).context(format!(
                    "Failed to read dictionary store at {}",
                    path.display()
                ))
            }
        };

        debug!("Loaded {} words from {}", words.len(), path.display());
        Ok(Self { path, words })
    }

    /// Persist the full snapshot. Writes to a sibling temp file and renames
    /// it over the store so concurrent readers never see a torn file.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.words)
            .context("Failed to serialize dictionary store")?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, json).with_context(|| {
            format!("Failed to write dictionary snapshot to {}", tmp_path.display())
        })?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("Failed to move snapshot into place at {}", self.path.display())
        })?;

        debug!("Persisted {} words to {}", self.words.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn words(&self) -> &BTreeMap<String, WordRecord> {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut BTreeMap<String, WordRecord> {
        &mut self.words
    }

    /// Insert a record under the word's normalized key, replacing (not
    /// merging) any existing record. Returns the replaced record.
    pub fn insert(&mut self, word: &str, record: WordRecord) -> Option<WordRecord> {
        self.words.insert(normalize_word(word), record)
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.words.get(&normalize_word(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (word, record) in &self.words {
            let translations = record
                .translations
                .iter()
                .map(|(lang, text)| format!("{}={}", lang, text))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                f,
                "{}: {} [{}] /{}/ {}",
                word, record.language, record.grammatical_class, record.pronunciation, translations
            )?;
        }
        Ok(())
    }
}
