use std::collections::BTreeMap;

use crate::store::WordRecord;

/// Rank every target language seen across the store by how many words
/// already carry a translation into it, most frequent first.
///
/// Ties break by ascending language code so the order is stable across
/// runs. The result is always derived on demand — it is a projection of
/// the store, never a second source of truth.
pub fn rank_languages(words: &BTreeMap<String, WordRecord>) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in words.values() {
        for language in record.translations.keys() {
            *counts.entry(language).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked.into_iter().map(|(code, _)| code.to_string()).collect()
}
