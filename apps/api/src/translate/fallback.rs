//! Deterministic keyword fallback translator. Used whenever the oracle is
//! unreachable or returns something unusable: substring rules against the
//! snapshot vocabulary (known organizations, departments, skills) plus a
//! small table of role words and date phrases.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::ingest::skills::dept_key;
use crate::models::candidate::SeniorityTier;
use crate::models::query::{QueryProvenance, StructuredQuery};
use crate::snapshot::PoolSnapshot;
use crate::translate::{QueryTranslator, TranslatedQuery};

/// Role words that are job descriptors rather than skills; matched loosely
/// so "engineers" still hits "engineer".
const ROLE_WORDS: &[&str] = &[
    "engineer",
    "developer",
    "programmer",
    "designer",
    "manager",
    "analyst",
    "scientist",
    "architect",
    "consultant",
    "recruiter",
    "sales",
    "marketing",
];

const FILLER_WORDS: &[&str] = &[
    "find", "show", "list", "give", "get", "me", "all", "any", "who", "worked", "working",
    "people", "candidates", "someone", "anyone", "with", "at", "in", "the", "a", "an", "and",
    "from", "of", "for", "that", "have", "has", "know", "knows",
];

#[derive(Debug, Default, Clone)]
pub struct KeywordTranslator;

impl KeywordTranslator {
    /// Builds a structured query from substring rules. Never fails; when no
    /// rule matches, the remaining content words become free-text terms so
    /// the executor always has something to run.
    pub fn translate_text(&self, free_text: &str, snapshot: &PoolSnapshot) -> StructuredQuery {
        let folded = dept_key(free_text); // lowercase, punctuation to spaces
        let padded = format!(" {folded} ");
        let words: Vec<&str> = folded.split_whitespace().collect();

        let mut query = StructuredQuery::default();

        // Longest matching known organization wins ("wayne enterprises"
        // over "wayne").
        query.organization = snapshot
            .vocabulary
            .org_keys
            .iter()
            .filter(|k| padded.contains(&format!(" {k} ")))
            .max_by_key(|k| k.len())
            .cloned();

        query.department = snapshot
            .vocabulary
            .dept_keys
            .iter()
            .filter(|k| padded.contains(&format!(" {k} ")))
            .max_by_key(|k| k.len())
            .cloned();

        for skill in &snapshot.vocabulary.skills {
            if padded.contains(&format!(" {skill} ")) {
                query.skills.push(skill.clone());
            }
        }
        query.skills_any = words.contains(&"or") || words.contains(&"either");

        for word in &words {
            let singular = word.strip_suffix('s').unwrap_or(word);
            if ROLE_WORDS.contains(&singular) && !query.terms.contains(&singular.to_string()) {
                query.terms.push(singular.to_string());
            }
        }

        query.seniority = words.iter().find_map(|w| SeniorityTier::parse(w));

        (query.date_from, query.date_to) = parse_date_phrases(&words);

        // Nothing recognized: degrade to the content words as terms.
        if query.is_empty() {
            query.terms = words
                .iter()
                .filter(|w| !FILLER_WORDS.contains(w) && w.len() > 1)
                .map(|w| w.to_string())
                .collect();
        }

        query
    }
}

/// Recognizes "since 2020", "before 2021", "between 2019 and 2021", and
/// "in 2020" over the folded word list.
fn parse_date_phrases(words: &[&str]) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let year_at = |i: usize| -> Option<i32> {
        words
            .get(i)
            .and_then(|w| (w.len() == 4).then(|| w.parse::<i32>().ok()).flatten())
    };
    let jan = |y: i32| NaiveDate::from_ymd_opt(y, 1, 1);

    for (i, word) in words.iter().enumerate() {
        match *word {
            "since" | "after" => {
                if let Some(y) = year_at(i + 1) {
                    return (jan(y), None);
                }
            }
            "before" | "until" => {
                if let Some(y) = year_at(i + 1) {
                    return (None, jan(y));
                }
            }
            "between" => {
                if let (Some(from), Some(to)) = (year_at(i + 1), year_at(i + 3)) {
                    return (jan(from), jan(to));
                }
            }
            "in" | "during" => {
                if let Some(y) = year_at(i + 1) {
                    return (jan(y), jan(y + 1));
                }
            }
            _ => {}
        }
    }
    (None, None)
}

#[async_trait]
impl QueryTranslator for KeywordTranslator {
    async fn translate(&self, free_text: &str, snapshot: &PoolSnapshot) -> TranslatedQuery {
        TranslatedQuery {
            query: self.translate_text(free_text, snapshot),
            provenance: QueryProvenance::Fallback,
        }
    }
}
