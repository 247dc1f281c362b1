use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::rank::rank_languages;
use crate::store::{Dictionary, WordRecord};

/// Render the dictionary as a Markdown table.
///
/// Columns: `Word | Class | Pronunciation` followed by one column per
/// language in rank order. One row per word in lexicographic order; the
/// word cell reads `<language>: <word>`, and a missing translation is a
/// single blank cell.
pub fn to_markdown(words: &BTreeMap<String, WordRecord>) -> String {
    let languages = rank_languages(words);

    let mut lines = Vec::with_capacity(words.len() + 2);
    lines.push(format!(
        "| Word | Class | Pronunciation | {} |",
        languages.join(" | ")
    ));
    lines.push(format!("{}|", "|---".repeat(languages.len() + 3)));

    for (word, record) in words {
        let cells = languages
            .iter()
            .map(|lang| {
                record
                    .translations
                    .get(lang)
                    .map(String::as_str)
                    .unwrap_or(" ")
            })
            .collect::<Vec<_>>()
            .join(" | ");

        lines.push(format!(
            "| {}: {} | {} | {} | {} |",
            record.language, word, record.grammatical_class, record.pronunciation, cells
        ));
    }

    lines.join("\n")
}

/// Write the Markdown table to `dest`.
pub fn export_markdown(dictionary: &Dictionary, dest: &Path) -> Result<()> {
    let table = to_markdown(dictionary.words());
    std::fs::write(dest, table)
        .with_context(|| format!("Failed to write Markdown export to {}", dest.display()))?;

    info!(
        "Exported {} words to {}",
        dictionary.len(),
        dest.display()
    );
    Ok(())
}
