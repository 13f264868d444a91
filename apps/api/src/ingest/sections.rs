//! Fuzzy section-key matching for the raw parsed-resume section bag.
//! Section keys arrive with inconsistent labels ("Work History" vs
//! "Experience"); matching is case- and whitespace-insensitive with a small
//! alias table. Unrecognized sections stay opaque.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Name,
    Experience,
    Skills,
    Unknown,
}

const NAME_ALIASES: &[&str] = &["name", "full name", "candidate name", "contact"];

const EXPERIENCE_ALIASES: &[&str] = &[
    "experience",
    "work experience",
    "work history",
    "employment",
    "employment history",
    "professional experience",
    "career history",
    "positions",
];

const SKILLS_ALIASES: &[&str] = &[
    "skills",
    "technical skills",
    "skill set",
    "technologies",
    "competencies",
    "core competencies",
    "tools",
    "tech stack",
];

/// Classifies a raw section key. Comparison folds case and collapses all
/// whitespace runs, so "WORK   history" matches "work history".
pub fn classify(raw_key: &str) -> SectionKind {
    let folded = fold_key(raw_key);
    if NAME_ALIASES.contains(&folded.as_str()) {
        SectionKind::Name
    } else if EXPERIENCE_ALIASES.contains(&folded.as_str()) {
        SectionKind::Experience
    } else if SKILLS_ALIASES.contains(&folded.as_str()) {
        SectionKind::Skills
    } else {
        SectionKind::Unknown
    }
}

fn fold_key(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
