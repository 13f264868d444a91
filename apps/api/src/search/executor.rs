//! Structured Query Executor: evaluates a `StructuredQuery` against a pool
//! snapshot and returns paginated matches with a stable ordering.
//!
//! Organization and department comparisons run through the same
//! normalization as ingestion, so query text and stored keys are
//! comparable. Executing the same query against an unchanged snapshot twice
//! returns identical ordering and content.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ingest::skills::{dept_key, org_key, SkillSynonyms};
use crate::models::candidate::Candidate;
use crate::models::query::StructuredQuery;
use crate::snapshot::PoolSnapshot;

/// Pagination limits. Tunable; `page_size` requests above the cap are
/// clamped, not rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Malformed structured query, surfaced immediately to the caller with the
/// offending field.
#[derive(Debug, Error, PartialEq)]
pub enum QueryValidationError {
    #[error("query has no filter dimensions")]
    EmptyQuery,
    #[error("date_from {from} is after date_to {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    pub candidate_id: Uuid,
    pub display_name: String,
    /// How many provided filter dimensions this candidate matched.
    pub matched_dimensions: u32,
    /// How many of the query's skill tokens this candidate carries.
    pub skill_overlap: u32,
}

/// One page of results plus the total match count, so callers can compute
/// page counts without a second query. `total = 0` on a successful call
/// means "zero matches", never "query failed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<SearchMatch>,
}

/// Evaluates `query` against the snapshot. Provided dimensions are
/// AND-combined; `skills_any` switches the skill set to OR semantics.
/// Pages are zero-based and a page past the result set is an empty page.
pub fn execute(
    query: &StructuredQuery,
    snapshot: &PoolSnapshot,
    page: usize,
    page_size: Option<usize>,
    synonyms: &SkillSynonyms,
    limits: &PageLimits,
    today: NaiveDate,
) -> Result<SearchPage, QueryValidationError> {
    if query.is_empty() {
        return Err(QueryValidationError::EmptyQuery);
    }
    if let (Some(from), Some(to)) = (query.date_from, query.date_to) {
        if from > to {
            return Err(QueryValidationError::InvalidDateRange { from, to });
        }
    }

    // Normalize query text once, the same way ingestion does.
    let want_org = query.organization.as_deref().map(org_key).filter(|k| !k.is_empty());
    let want_dept = query.department.as_deref().map(dept_key).filter(|k| !k.is_empty());
    let want_skills: Vec<String> = query
        .skills
        .iter()
        .filter_map(|s| synonyms.fold(s))
        .collect();
    let terms: Vec<String> = query
        .terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut matches: Vec<SearchMatch> = snapshot
        .candidates
        .iter()
        .filter_map(|c| evaluate(c, query, &want_org, &want_dept, &want_skills, &terms, today))
        .collect();

    matches.sort_by(|x, y| {
        y.matched_dimensions
            .cmp(&x.matched_dimensions)
            .then_with(|| y.skill_overlap.cmp(&x.skill_overlap))
            .then_with(|| x.candidate_id.cmp(&y.candidate_id))
    });

    let page_size = page_size
        .unwrap_or(limits.default_page_size)
        .clamp(1, limits.max_page_size);
    let total = matches.len();
    let results = matches
        .into_iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .collect();

    Ok(SearchPage {
        total,
        page,
        page_size,
        results,
    })
}

fn evaluate(
    candidate: &Candidate,
    query: &StructuredQuery,
    want_org: &Option<String>,
    want_dept: &Option<String>,
    want_skills: &[String],
    terms: &[String],
    today: NaiveDate,
) -> Option<SearchMatch> {
    let mut matched_dimensions = 0u32;

    if let Some(org) = want_org {
        if !candidate.experiences.iter().any(|e| &e.org_key == org) {
            return None;
        }
        matched_dimensions += 1;
    }

    if let Some(dept) = want_dept {
        if !candidate
            .experiences
            .iter()
            .any(|e| e.dept_key.as_ref() == Some(dept))
        {
            return None;
        }
        matched_dimensions += 1;
    }

    let skill_overlap = want_skills
        .iter()
        .filter(|s| candidate.skills.contains(s.as_str()))
        .count() as u32;
    if !want_skills.is_empty() {
        let satisfied = if query.skills_any {
            skill_overlap > 0
        } else {
            skill_overlap as usize == want_skills.len()
        };
        if !satisfied {
            return None;
        }
        matched_dimensions += 1;
    }

    if query.date_from.is_some() || query.date_to.is_some() {
        let intersects = candidate.experiences.iter().any(|e| {
            let Some(start) = e.start else { return false };
            let end = e.end.unwrap_or(today);
            let q_start = query.date_from.unwrap_or(NaiveDate::MIN);
            let q_end = query.date_to.unwrap_or(NaiveDate::MAX);
            start.max(q_start) < end.min(q_end)
        });
        if !intersects {
            return None;
        }
        matched_dimensions += 1;
    }

    if let Some(tier) = query.seniority {
        if candidate.seniority != tier {
            return None;
        }
        matched_dimensions += 1;
    }

    if !terms.is_empty() {
        let haystacks: Vec<String> = candidate
            .experiences
            .iter()
            .flat_map(|e| {
                let dept = e.department.as_deref().unwrap_or_default().to_lowercase();
                [e.title.to_lowercase(), e.organization.to_lowercase(), dept]
            })
            .chain(candidate.skills.iter().cloned())
            .collect();
        let hit = terms
            .iter()
            .any(|t| haystacks.iter().any(|h| h.contains(t.as_str())));
        if !hit {
            return None;
        }
        matched_dimensions += 1;
    }

    Some(SearchMatch {
        candidate_id: candidate.id,
        display_name: candidate.display_name.clone(),
        matched_dimensions,
        skill_overlap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{Experience, SeniorityTier};

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2025, 6)
    }

    fn exp(org: &str, dept: &str, title: &str, start: (i32, u32), end: Option<(i32, u32)>) -> Experience {
        Experience {
            organization: org.to_string(),
            org_key: org_key(org),
            department: Some(dept.to_string()),
            dept_key: Some(dept_key(dept)),
            title: title.to_string(),
            start: Some(ymd(start.0, start.1)),
            end: end.map(|(y, m)| ymd(y, m)),
            skills: vec![],
        }
    }

    fn candidate(id: u128, skills: &[&str], tier: SeniorityTier, experiences: Vec<Experience>) -> Candidate {
        Candidate {
            id: Uuid::from_u128(id),
            display_name: format!("c{id}"),
            experiences,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            total_experience_months: 36,
            seniority: tier,
            unmatched_sections: vec![],
        }
    }

    fn pool() -> PoolSnapshot {
        PoolSnapshot::new(
            1,
            vec![
                candidate(1, &["python", "sql"], SeniorityTier::Mid,
                    vec![exp("Acme, Inc.", "Engineering", "Engineer", (2019, 1), Some((2021, 1)))]),
                candidate(2, &["python", "go"], SeniorityTier::Senior,
                    vec![exp("Acme", "Engineering", "Senior Engineer", (2020, 1), Some((2022, 1)))]),
                candidate(3, &["excel"], SeniorityTier::Mid,
                    vec![exp("Globex Corp", "Sales", "Account Manager", (2019, 1), None)]),
            ],
        )
    }

    fn run(query: &StructuredQuery, page: usize, page_size: Option<usize>) -> SearchPage {
        execute(
            query,
            &pool(),
            page,
            page_size,
            &SkillSynonyms::default(),
            &PageLimits::default(),
            today(),
        )
        .unwrap()
    }

    #[test]
    fn test_org_filter_uses_ingestion_normalization() {
        let q = StructuredQuery {
            organization: Some("ACME INC".to_string()),
            ..Default::default()
        };
        let page = run(&q, 0, None);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_and_semantics_across_dimensions() {
        let q = StructuredQuery {
            organization: Some("Acme".to_string()),
            seniority: Some(SeniorityTier::Senior),
            ..Default::default()
        };
        let page = run(&q, 0, None);
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].candidate_id, Uuid::from_u128(2));
    }

    #[test]
    fn test_skill_and_requires_all() {
        let q = StructuredQuery {
            skills: vec!["python".to_string(), "sql".to_string()],
            ..Default::default()
        };
        let page = run(&q, 0, None);
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].candidate_id, Uuid::from_u128(1));
    }

    #[test]
    fn test_skill_or_flag_widens_match() {
        let q = StructuredQuery {
            skills: vec!["python".to_string(), "sql".to_string()],
            skills_any: true,
            ..Default::default()
        };
        let page = run(&q, 0, None);
        assert_eq!(page.total, 2);
        // Higher skill overlap ranks first.
        assert_eq!(page.results[0].candidate_id, Uuid::from_u128(1));
        assert_eq!(page.results[0].skill_overlap, 2);
    }

    #[test]
    fn test_date_range_intersects_experience() {
        let q = StructuredQuery {
            date_from: Some(ymd(2021, 6)),
            date_to: Some(ymd(2023, 1)),
            ..Default::default()
        };
        let page = run(&q, 0, None);
        // Candidate 1 ended 2021-01; candidates 2 and 3 intersect.
        assert_eq!(page.total, 2);
        let ids: Vec<Uuid> = page.results.iter().map(|r| r.candidate_id).collect();
        assert!(ids.contains(&Uuid::from_u128(2)));
        assert!(ids.contains(&Uuid::from_u128(3)));
    }

    #[test]
    fn test_terms_match_titles_and_orgs() {
        let q = StructuredQuery {
            terms: vec!["manager".to_string()],
            ..Default::default()
        };
        let page = run(&q, 0, None);
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].candidate_id, Uuid::from_u128(3));
    }

    #[test]
    fn test_terms_match_department_labels() {
        // "sales" appears only as a department label in the pool.
        let q = StructuredQuery {
            terms: vec!["sales".to_string()],
            ..Default::default()
        };
        let page = run(&q, 0, None);
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].candidate_id, Uuid::from_u128(3));
    }

    #[test]
    fn test_empty_query_is_validation_error() {
        let err = execute(
            &StructuredQuery::default(),
            &pool(),
            0,
            None,
            &SkillSynonyms::default(),
            &PageLimits::default(),
            today(),
        )
        .unwrap_err();
        assert_eq!(err, QueryValidationError::EmptyQuery);
    }

    #[test]
    fn test_inverted_date_range_is_validation_error() {
        let q = StructuredQuery {
            date_from: Some(ymd(2022, 1)),
            date_to: Some(ymd(2020, 1)),
            ..Default::default()
        };
        let err = execute(
            &q,
            &pool(),
            0,
            None,
            &SkillSynonyms::default(),
            &PageLimits::default(),
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, QueryValidationError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_page_beyond_results_is_empty_not_error() {
        let q = StructuredQuery {
            organization: Some("Acme".to_string()),
            ..Default::default()
        };
        let page = run(&q, 7, None);
        assert_eq!(page.total, 2);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_page_size_clamped_to_max() {
        let q = StructuredQuery {
            organization: Some("Acme".to_string()),
            ..Default::default()
        };
        let page = run(&q, 0, Some(10_000));
        assert_eq!(page.page_size, PageLimits::default().max_page_size);
    }

    #[test]
    fn test_pagination_concatenation_is_complete_and_duplicate_free() {
        let q = StructuredQuery {
            skills: vec!["python".to_string()],
            skills_any: true,
            ..Default::default()
        };
        let full = run(&q, 0, Some(100));
        let mut paged: Vec<Uuid> = Vec::new();
        let mut page_idx = 0;
        loop {
            let page = run(&q, page_idx, Some(1));
            if page.results.is_empty() {
                break;
            }
            paged.extend(page.results.iter().map(|r| r.candidate_id));
            page_idx += 1;
        }
        let full_ids: Vec<Uuid> = full.results.iter().map(|r| r.candidate_id).collect();
        assert_eq!(paged, full_ids);
    }

    #[test]
    fn test_repeated_execution_is_idempotent() {
        let q = StructuredQuery {
            skills: vec!["python".to_string()],
            skills_any: true,
            ..Default::default()
        };
        let first = run(&q, 0, None);
        let second = run(&q, 0, None);
        let a: Vec<Uuid> = first.results.iter().map(|r| r.candidate_id).collect();
        let b: Vec<Uuid> = second.results.iter().map(|r| r.candidate_id).collect();
        assert_eq!(a, b);
        assert_eq!(first.total, second.total);
    }
}
