//! Converts the raw bag-of-sections resume representation produced by the
//! upstream document parser into one canonical `Candidate`. All upstream
//! shapes are treated as untyped input validated here, once, at the
//! boundary; nothing deeper in the pipeline sees raw sections.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::ingest::dates;
use crate::ingest::sections::{classify, SectionKind};
use crate::ingest::skills::{dept_key, org_key, SkillSynonyms};
use crate::models::candidate::{Candidate, Experience, SeniorityThresholds};

/// Raw parsed resume as delivered by the document parser: an unordered bag
/// of sections with inconsistent keys and free text per section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResume {
    /// Upstream record id, present on re-parse so the candidate is replaced
    /// wholesale rather than duplicated.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub sections: Vec<RawSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSection {
    pub key: String,
    pub text: String,
}

/// Raised only when the input has no name AND no parseable experience;
/// every lesser defect degrades to partial data instead.
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("resume has no name and no parseable experience")]
    Unusable,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    synonyms: SkillSynonyms,
    thresholds: SeniorityThresholds,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            synonyms: SkillSynonyms::default(),
            thresholds: SeniorityThresholds::default(),
        }
    }
}

impl Normalizer {
    pub fn new(synonyms: SkillSynonyms, thresholds: SeniorityThresholds) -> Self {
        Self {
            synonyms,
            thresholds,
        }
    }

    /// The synonym map in use, shared with the query executor so stored
    /// skills and query skills fold identically.
    pub fn synonyms(&self) -> &SkillSynonyms {
        &self.synonyms
    }

    /// Normalizes one raw resume into a `Candidate`.
    pub fn normalize(
        &self,
        raw: &RawResume,
        today: NaiveDate,
    ) -> Result<Candidate, NormalizationError> {
        let mut display_name = String::new();
        let mut experiences: Vec<Experience> = Vec::new();
        let mut skills: BTreeSet<String> = BTreeSet::new();
        let mut unmatched: Vec<String> = Vec::new();

        for section in &raw.sections {
            match classify(&section.key) {
                SectionKind::Name => {
                    if display_name.is_empty() {
                        display_name = section
                            .text
                            .lines()
                            .map(str::trim)
                            .find(|l| !l.is_empty())
                            .unwrap_or("")
                            .to_string();
                    }
                }
                SectionKind::Experience => {
                    experiences.extend(self.parse_experiences(&section.text));
                }
                SectionKind::Skills => {
                    skills.extend(self.synonyms.fold_all(split_skill_list(&section.text)));
                }
                SectionKind::Unknown => unmatched.push(section.text.clone()),
            }
        }

        let has_usable_experience = experiences
            .iter()
            .any(|e| !e.org_key.is_empty() || e.start.is_some() || !e.title.is_empty());
        if display_name.is_empty() && !has_usable_experience {
            return Err(NormalizationError::Unusable);
        }

        // Role-level skills also contribute to the candidate's skill set.
        for exp in &experiences {
            skills.extend(exp.skills.iter().cloned());
        }

        let (total_months, seniority) =
            Candidate::derive_seniority(&experiences, &self.thresholds, today);

        Ok(Candidate {
            id: raw.id.unwrap_or_else(Uuid::new_v4),
            display_name,
            experiences,
            skills,
            total_experience_months: total_months,
            seniority,
            unmatched_sections: unmatched,
        })
    }

    /// Parses an experience section: entries are blank-line separated
    /// blocks. Block shape:
    ///   Title | Organization | Department       (department optional)
    ///   <date range line>                        (optional, any position)
    ///   description lines...
    /// A `Title at Organization` header is also accepted.
    fn parse_experiences(&self, text: &str) -> Vec<Experience> {
        text.split("\n\n")
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .filter_map(|block| self.parse_experience_block(block))
            .collect()
    }

    fn parse_experience_block(&self, block: &str) -> Option<Experience> {
        let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines.next()?;
        let (title, organization, department) = parse_header(header);

        let mut start = None;
        let mut end = None;
        let mut dated = false;
        let mut description = String::new();

        for line in lines {
            if !dated {
                let (s, e) = dates::parse_range(line);
                if s.is_some() {
                    start = s;
                    end = e;
                    dated = true;
                    continue;
                }
                // A lone "Present" still marks the role as current.
                if dates::is_open_end(line) {
                    dated = true;
                    continue;
                }
            }
            description.push_str(line);
            description.push('\n');
        }

        let skills: Vec<String> = extract_keywords(&description)
            .into_iter()
            .filter_map(|t| self.synonyms.fold(&t))
            .collect();

        Some(Experience {
            org_key: org_key(&organization),
            organization,
            dept_key: department.as_deref().map(dept_key).filter(|k| !k.is_empty()),
            department,
            title,
            start,
            end,
            skills,
        })
    }
}

fn parse_header(header: &str) -> (String, String, Option<String>) {
    if header.contains('|') {
        let mut fields = header.split('|').map(|f| f.trim().to_string());
        let title = fields.next().unwrap_or_default();
        let organization = fields.next().unwrap_or_default();
        let department = fields.next().filter(|d| !d.is_empty());
        return (title, organization, department);
    }
    if let Some((title, org)) = header.split_once(" at ") {
        return (title.trim().to_string(), org.trim().to_string(), None);
    }
    (header.trim().to_string(), String::new(), None)
}

/// Splits a skills section on commas, semicolons, bullets, and newlines.
fn split_skill_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| matches!(c, ',' | ';' | '\n' | '•' | '·'))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "over", "under", "using", "used", "use", "a",
    "an", "of", "in", "on", "to", "by", "as", "at", "via", "our", "their", "its", "this", "that",
    "was", "were", "is", "are", "be", "been", "or", "not", "we", "i",
];

/// Extracts deduplicated keyword tokens from a role description, preserving
/// first-seen order. Tokens keep `#`, `+`, and `.` so "c#" and "node.js"
/// survive intact.
fn extract_keywords(description: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for token in description
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '#' | '+' | '.')))
    {
        let token = token.trim_matches('.').to_lowercase();
        if token.len() < 2 || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        if seen.insert(token.clone()) {
            out.push(token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn resume(sections: &[(&str, &str)]) -> RawResume {
        RawResume {
            id: None,
            sections: sections
                .iter()
                .map(|(k, t)| RawSection {
                    key: k.to_string(),
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_normalizes_full_resume() {
        let raw = resume(&[
            ("Name", "Ada Lovelace"),
            (
                "Work History",
                "Senior Engineer | Acme, Inc. | Engineering\nJan 2020 – Present\nBuilt Rust services with PostgreSQL",
            ),
            ("Technical Skills", "Rust, JS, Postgres"),
        ]);
        let c = Normalizer::default().normalize(&raw, today()).unwrap();
        assert_eq!(c.display_name, "Ada Lovelace");
        assert_eq!(c.experiences.len(), 1);
        let exp = &c.experiences[0];
        assert_eq!(exp.org_key, "acme");
        assert_eq!(exp.dept_key.as_deref(), Some("engineering"));
        assert!(exp.start.is_some());
        assert!(exp.end.is_none());
        // Section skills folded through synonyms, role keywords merged in.
        assert!(c.skills.contains("javascript"));
        assert!(c.skills.contains("postgresql"));
        assert!(c.skills.contains("rust"));
    }

    #[test]
    fn test_unparseable_date_degrades_to_null() {
        let raw = resume(&[
            ("Name", "Bob"),
            (
                "Experience",
                "Engineer | Acme\nSummer of discontent\nDid things",
            ),
        ]);
        let c = Normalizer::default().normalize(&raw, today()).unwrap();
        assert_eq!(c.experiences.len(), 1);
        assert!(c.experiences[0].start.is_none());
        assert!(c.experiences[0].end.is_none());
    }

    #[test]
    fn test_fails_only_without_name_and_experience() {
        let raw = resume(&[("Hobbies", "chess")]);
        assert!(matches!(
            Normalizer::default().normalize(&raw, today()),
            Err(NormalizationError::Unusable)
        ));
    }

    #[test]
    fn test_nameless_resume_with_experience_survives() {
        let raw = resume(&[("Experience", "Engineer | Acme\n2019 - 2021")]);
        let c = Normalizer::default().normalize(&raw, today()).unwrap();
        assert_eq!(c.display_name, "");
        assert_eq!(c.experiences.len(), 1);
    }

    #[test]
    fn test_unmatched_sections_preserved_as_opaque_text() {
        let raw = resume(&[("Name", "Eve"), ("References", "on request")]);
        let c = Normalizer::default().normalize(&raw, today()).unwrap();
        assert_eq!(c.unmatched_sections, vec!["on request".to_string()]);
        assert!(c.skills.is_empty());
    }

    #[test]
    fn test_multiple_experience_blocks() {
        let raw = resume(&[
            ("Name", "Carol"),
            (
                "Employment",
                "Engineer at Acme\n2018 - 2020\n\nSenior Engineer | Globex | Platform\n2020 - Present",
            ),
        ]);
        let c = Normalizer::default().normalize(&raw, today()).unwrap();
        assert_eq!(c.experiences.len(), 2);
        assert_eq!(c.experiences[0].org_key, "acme");
        assert_eq!(c.experiences[1].org_key, "globex");
        assert!(c.experiences[1].end.is_none());
    }

    #[test]
    fn test_reparse_keeps_upstream_id() {
        let id = Uuid::new_v4();
        let mut raw = resume(&[("Name", "Dan")]);
        raw.id = Some(id);
        let c = Normalizer::default().normalize(&raw, today()).unwrap();
        assert_eq!(c.id, id);
    }

    #[test]
    fn test_keyword_extraction_skips_stopwords() {
        let tokens = extract_keywords("Built the pipeline with Kafka and Go");
        assert!(tokens.contains(&"kafka".to_string()));
        assert!(tokens.contains(&"go".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"with".to_string()));
    }
}
