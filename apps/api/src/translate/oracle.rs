//! Oracle-backed translator. The oracle response is untrusted: it is parsed
//! against a strict schema, validated, and repaired before use. Any failure
//! along the way (HTTP, timeout, malformed JSON, failed validation)
//! degrades to the deterministic keyword fallback instead of erroring.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::ingest::dates;
use crate::models::candidate::SeniorityTier;
use crate::models::query::{QueryProvenance, StructuredQuery};
use crate::oracle::prompts::{TRANSLATE_PROMPT, TRANSLATE_SYSTEM};
use crate::oracle::OracleClient;
use crate::snapshot::PoolSnapshot;
use crate::translate::fallback::KeywordTranslator;
use crate::translate::{QueryTranslator, TranslatedQuery};

/// Strict oracle output schema: recognized fields only, dates as strings
/// to be validated by our own parser.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOracleQuery {
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    skills_any: bool,
    #[serde(default)]
    date_from: Option<String>,
    #[serde(default)]
    date_to: Option<String>,
    #[serde(default)]
    seniority: Option<String>,
    #[serde(default)]
    terms: Vec<String>,
}

pub struct OracleTranslator {
    client: OracleClient,
    fallback: KeywordTranslator,
}

impl OracleTranslator {
    pub fn new(client: OracleClient) -> Self {
        Self {
            client,
            fallback: KeywordTranslator,
        }
    }

    async fn try_oracle(&self, free_text: &str) -> Option<StructuredQuery> {
        let prompt = TRANSLATE_PROMPT.replace("{free_text}", free_text);
        let raw: RawOracleQuery = match self.client.call_json(&prompt, TRANSLATE_SYSTEM).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("oracle translation failed, using keyword fallback: {e}");
                return None;
            }
        };
        match validate_and_repair(raw) {
            Ok(query) => Some(query),
            Err(reason) => {
                warn!("oracle response failed validation ({reason}), using keyword fallback");
                None
            }
        }
    }
}

/// Validates the raw oracle output and repairs what is safely repairable:
/// skill tokens are trimmed and lowercased, empties dropped. Rejected
/// outright: unparseable date strings, unknown seniority labels, and a
/// query with no dimensions at all.
fn validate_and_repair(raw: RawOracleQuery) -> Result<StructuredQuery, String> {
    let parse = |label: &str, s: Option<String>| -> Result<Option<NaiveDate>, String> {
        match s {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .ok()
                .or_else(|| dates::parse_date(&s))
                .map(Some)
                .ok_or_else(|| format!("unparseable {label}: {s:?}")),
        }
    };

    let date_from = parse("date_from", raw.date_from)?;
    let date_to = parse("date_to", raw.date_to)?;
    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            return Err(format!("date_from {from} after date_to {to}"));
        }
    }

    let seniority = match raw.seniority {
        None => None,
        Some(s) => Some(
            SeniorityTier::parse(&s).ok_or_else(|| format!("unknown seniority {s:?}"))?,
        ),
    };

    let clean = |v: Vec<String>| -> Vec<String> {
        v.into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    };

    let query = StructuredQuery {
        organization: raw.organization.filter(|s| !s.trim().is_empty()),
        department: raw.department.filter(|s| !s.trim().is_empty()),
        skills: clean(raw.skills),
        skills_any: raw.skills_any,
        date_from,
        date_to,
        seniority,
        terms: clean(raw.terms),
    };

    if query.is_empty() {
        return Err("no filter dimensions".to_string());
    }
    Ok(query)
}

#[async_trait]
impl QueryTranslator for OracleTranslator {
    async fn translate(&self, free_text: &str, snapshot: &PoolSnapshot) -> TranslatedQuery {
        match self.try_oracle(free_text).await {
            Some(query) => TranslatedQuery {
                query,
                provenance: QueryProvenance::Oracle,
            },
            None => TranslatedQuery {
                query: self.fallback.translate_text(free_text, snapshot),
                provenance: QueryProvenance::Fallback,
            },
        }
    }
}
