#![allow(dead_code)]

//! Token normalization shared by ingestion and query execution. Query text
//! and stored keys must go through the same folding so they stay comparable.

use std::collections::{BTreeSet, HashMap};

/// Synonym map collapsing near-duplicate skill tokens into one canonical
/// token. Configurable: callers may extend the defaults before building.
#[derive(Debug, Clone)]
pub struct SkillSynonyms {
    map: HashMap<String, String>,
}

const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ts", "typescript"),
    ("golang", "go"),
    ("k8s", "kubernetes"),
    ("postgres", "postgresql"),
    ("py", "python"),
    ("ml", "machine learning"),
    ("tf", "terraform"),
    ("gcloud", "gcp"),
    ("node", "nodejs"),
    ("node.js", "nodejs"),
    ("c sharp", "c#"),
];

impl Default for SkillSynonyms {
    fn default() -> Self {
        let map = DEFAULT_SYNONYMS
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        Self { map }
    }
}

impl SkillSynonyms {
    pub fn with_extra(mut self, extra: &[(String, String)]) -> Self {
        for (alias, canonical) in extra {
            self.map
                .insert(alias.to_lowercase(), canonical.to_lowercase());
        }
        self
    }

    /// Lower-cases, trims, and folds a single skill token through the
    /// synonym map. Returns `None` for empty tokens.
    pub fn fold(&self, raw: &str) -> Option<String> {
        let token = raw.trim().to_lowercase();
        if token.is_empty() {
            return None;
        }
        Some(self.map.get(&token).cloned().unwrap_or(token))
    }

    /// Folds and deduplicates a batch of tokens, preserving set semantics.
    pub fn fold_all<'a, I: IntoIterator<Item = &'a str>>(&self, raw: I) -> BTreeSet<String> {
        raw.into_iter().filter_map(|t| self.fold(t)).collect()
    }
}

const LEGAL_SUFFIXES: &[&str] = &[
    "incorporated",
    "corporation",
    "limited",
    "inc",
    "llc",
    "ltd",
    "corp",
    "gmbh",
    "plc",
    "pvt",
    "co",
    "sa",
    "ag",
];

/// Canonical organization key: case-folded, punctuation-stripped,
/// whitespace-collapsed, trailing legal suffixes removed. "Acme, Inc." and
/// "acme" compare equal.
pub fn org_key(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut words: Vec<&str> = folded.split_whitespace().collect();
    while let Some(last) = words.last() {
        if words.len() > 1 && LEGAL_SUFFIXES.contains(last) {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}

/// Department/team labels get the same folding minus suffix stripping.
pub fn dept_key(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
