use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::candidate::SeniorityTier;

/// Where a structured query came from. Surfaced to callers so the UX can
/// indicate confidence in NL-translated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryProvenance {
    /// Authored directly as a structured request.
    Direct,
    /// Produced by the NL oracle and validated.
    Oracle,
    /// Produced by the deterministic keyword fallback.
    Fallback,
}

/// Filter specification evaluated by the structured query executor.
///
/// All fields are optional; provided dimensions are AND-combined, except
/// that `skills_any = true` switches the skill set to OR semantics. The
/// same type is used whether the query was human-authored or produced by
/// the NL translator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    /// OR semantics for the skill set when true; AND otherwise.
    #[serde(default)]
    pub skills_any: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<SeniorityTier>,
    /// Free-text fallback terms matched against titles and skills.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<String>,
}

impl StructuredQuery {
    /// True when no filter dimension is present at all.
    pub fn is_empty(&self) -> bool {
        self.organization.is_none()
            && self.department.is_none()
            && self.skills.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.seniority.is_none()
            && self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_is_empty() {
        assert!(StructuredQuery::default().is_empty());
    }

    #[test]
    fn test_query_with_any_dimension_is_not_empty() {
        let q = StructuredQuery {
            skills: vec!["rust".to_string()],
            ..Default::default()
        };
        assert!(!q.is_empty());
    }

    #[test]
    fn test_query_deserializes_with_missing_fields() {
        let q: StructuredQuery =
            serde_json::from_str(r#"{"organization": "Acme"}"#).unwrap();
        assert_eq!(q.organization.as_deref(), Some("Acme"));
        assert!(q.skills.is_empty());
        assert!(!q.skills_any);
    }

    #[test]
    fn test_provenance_serde_round() {
        let p: QueryProvenance = serde_json::from_str(r#""fallback""#).unwrap();
        assert_eq!(p, QueryProvenance::Fallback);
        assert_eq!(serde_json::to_string(&QueryProvenance::Oracle).unwrap(), r#""oracle""#);
    }
}
