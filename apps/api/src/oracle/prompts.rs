//! Prompt templates for the NL-to-structured-query oracle call.

pub const TRANSLATE_SYSTEM: &str = "You translate recruiter requests about a resume database \
into a strict JSON filter. You respond with JSON only, no prose, no markdown fences.";

pub const TRANSLATE_PROMPT: &str = r#"Translate the request below into a JSON object with ONLY these fields (omit any field you cannot infer):

{
  "organization": "company name",
  "department": "department or team",
  "skills": ["skill", ...],
  "skills_any": false,
  "date_from": "YYYY-MM-DD",
  "date_to": "YYYY-MM-DD",
  "seniority": "junior" | "mid" | "senior" | "lead",
  "terms": ["free text term", ...]
}

Rules:
- skills are lowercase single tokens ("python", "kubernetes")
- set "skills_any" to true only when the request says any/either/or
- role words that are not skills ("engineer", "designer") go in "terms"
- dates only when the request names a time window
- do not invent fields or values not implied by the request

Request: {free_text}"#;
