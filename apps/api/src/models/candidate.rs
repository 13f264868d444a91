use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Seniority tier derived from total experience duration plus role-title
/// keywords. Ordered so tier distance is meaningful for similarity scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityTier {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl SeniorityTier {
    pub fn index(self) -> u8 {
        match self {
            SeniorityTier::Junior => 0,
            SeniorityTier::Mid => 1,
            SeniorityTier::Senior => 2,
            SeniorityTier::Lead => 3,
        }
    }

    pub fn distance(self, other: SeniorityTier) -> u8 {
        self.index().abs_diff(other.index())
    }

    pub fn parse(s: &str) -> Option<SeniorityTier> {
        match s.trim().to_lowercase().as_str() {
            "junior" | "jr" | "entry" => Some(SeniorityTier::Junior),
            "mid" | "middle" | "intermediate" => Some(SeniorityTier::Mid),
            "senior" | "sr" => Some(SeniorityTier::Senior),
            "lead" | "principal" | "staff" => Some(SeniorityTier::Lead),
            _ => None,
        }
    }
}

/// Duration thresholds (in months) for tier assignment. Tunable; title
/// keywords can still promote or cap the duration-derived tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeniorityThresholds {
    pub mid_months: u32,
    pub senior_months: u32,
    pub lead_months: u32,
}

impl Default for SeniorityThresholds {
    fn default() -> Self {
        Self {
            mid_months: 24,
            senior_months: 72,
            lead_months: 120,
        }
    }
}

const LEAD_TITLE_WORDS: &[&str] = &["lead", "principal", "staff", "head", "director", "vp", "chief"];
const SENIOR_TITLE_WORDS: &[&str] = &["senior", "sr."];
const JUNIOR_TITLE_WORDS: &[&str] = &["intern", "junior", "jr.", "trainee", "apprentice"];

/// One role entry within a candidate's history.
///
/// `end = None` means the role is current. Dates that failed to parse are
/// `None` as well; the normalizer prefers partial data over dropping the
/// record. Overlapping or duplicate experiences for the same candidate are
/// permitted, resumes are not assumed internally consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub organization: String,
    /// Canonical comparison key: case-folded, punctuation-stripped,
    /// legal-suffix-stripped. Same normalization applied to query text.
    pub org_key: String,
    pub department: Option<String>,
    pub dept_key: Option<String>,
    pub title: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub skills: Vec<String>,
}

impl Experience {
    /// Months covered by this role, with an open end clamped to `today`.
    /// Returns 0 when the start date is unknown.
    pub fn duration_months(&self, today: NaiveDate) -> u32 {
        use chrono::Datelike;
        let start = match self.start {
            Some(d) => d,
            None => return 0,
        };
        let end = self.end.unwrap_or(today);
        if end <= start {
            return 0;
        }
        let months =
            (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
        months.max(0) as u32
    }
}

/// Normalized record for one resume/person. Built by the ingest normalizer;
/// replaced wholesale on re-parse, never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub display_name: String,
    pub experiences: Vec<Experience>,
    pub skills: BTreeSet<String>,
    pub total_experience_months: u32,
    pub seniority: SeniorityTier,
    /// Sections the normalizer could not classify, kept as opaque text and
    /// excluded from all structured fields.
    pub unmatched_sections: Vec<String>,
}

impl Candidate {
    /// Derives total duration and a seniority tier from the experiences.
    /// Title keywords promote (lead/senior words) or cap (intern/junior
    /// words) the duration-derived tier.
    pub fn derive_seniority(
        experiences: &[Experience],
        thresholds: &SeniorityThresholds,
        today: NaiveDate,
    ) -> (u32, SeniorityTier) {
        let total: u32 = experiences.iter().map(|e| e.duration_months(today)).sum();

        let duration_tier = if total >= thresholds.lead_months {
            SeniorityTier::Lead
        } else if total >= thresholds.senior_months {
            SeniorityTier::Senior
        } else if total >= thresholds.mid_months {
            SeniorityTier::Mid
        } else {
            SeniorityTier::Junior
        };

        // Title heuristics from the most recent role with a title.
        let latest_title = experiences
            .iter()
            .max_by_key(|e| (e.end.is_none(), e.start))
            .map(|e| e.title.to_lowercase());

        let tier = match latest_title {
            Some(title) => {
                if LEAD_TITLE_WORDS.iter().any(|w| title.contains(w)) {
                    SeniorityTier::Lead
                } else if SENIOR_TITLE_WORDS.iter().any(|w| title.contains(w)) {
                    if duration_tier.index() > SeniorityTier::Senior.index() {
                        duration_tier
                    } else {
                        SeniorityTier::Senior
                    }
                } else if JUNIOR_TITLE_WORDS.iter().any(|w| title.contains(w)) {
                    SeniorityTier::Junior
                } else {
                    duration_tier
                }
            }
            None => duration_tier,
        };

        (total, tier)
    }
}

/// Storage row for a candidate. Experiences and skills live in JSONB so the
/// core only ever needs "load the full pool" and "replace one record".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub display_name: String,
    pub record: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(start: (i32, u32), end: Option<(i32, u32)>, title: &str) -> Experience {
        Experience {
            organization: "Acme".to_string(),
            org_key: "acme".to_string(),
            department: None,
            dept_key: None,
            title: title.to_string(),
            start: NaiveDate::from_ymd_opt(start.0, start.1, 1),
            end: end.and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1)),
            skills: vec![],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_duration_months_closed_interval() {
        let e = exp((2020, 1), Some((2021, 1)), "Engineer");
        assert_eq!(e.duration_months(today()), 12);
    }

    #[test]
    fn test_duration_months_open_end_clamps_to_today() {
        let e = exp((2025, 1), None, "Engineer");
        assert_eq!(e.duration_months(today()), 5);
    }

    #[test]
    fn test_duration_months_missing_start_is_zero() {
        let mut e = exp((2020, 1), None, "Engineer");
        e.start = None;
        assert_eq!(e.duration_months(today()), 0);
    }

    #[test]
    fn test_tier_from_duration_thresholds() {
        let t = SeniorityThresholds::default();
        let experiences = vec![exp((2015, 1), Some((2022, 1)), "Engineer")]; // 84 months
        let (total, tier) = Candidate::derive_seniority(&experiences, &t, today());
        assert_eq!(total, 84);
        assert_eq!(tier, SeniorityTier::Senior);
    }

    #[test]
    fn test_lead_title_promotes_tier() {
        let t = SeniorityThresholds::default();
        let experiences = vec![exp((2023, 1), None, "Engineering Lead")];
        let (_, tier) = Candidate::derive_seniority(&experiences, &t, today());
        assert_eq!(tier, SeniorityTier::Lead);
    }

    #[test]
    fn test_intern_title_caps_tier() {
        let t = SeniorityThresholds::default();
        let experiences = vec![exp((2015, 1), None, "Engineering Intern")];
        let (_, tier) = Candidate::derive_seniority(&experiences, &t, today());
        assert_eq!(tier, SeniorityTier::Junior);
    }

    #[test]
    fn test_senior_title_does_not_demote_lead_duration() {
        let t = SeniorityThresholds::default();
        let experiences = vec![exp((2010, 1), None, "Senior Engineer")]; // > lead_months
        let (_, tier) = Candidate::derive_seniority(&experiences, &t, today());
        assert_eq!(tier, SeniorityTier::Lead);
    }

    #[test]
    fn test_tier_distance_symmetric() {
        assert_eq!(
            SeniorityTier::Junior.distance(SeniorityTier::Lead),
            SeniorityTier::Lead.distance(SeniorityTier::Junior)
        );
        assert_eq!(SeniorityTier::Mid.distance(SeniorityTier::Mid), 0);
    }

    #[test]
    fn test_tier_parse_accepts_aliases() {
        assert_eq!(SeniorityTier::parse("Sr"), Some(SeniorityTier::Senior));
        assert_eq!(SeniorityTier::parse("PRINCIPAL"), Some(SeniorityTier::Lead));
        assert_eq!(SeniorityTier::parse("wizard"), None);
    }
}
