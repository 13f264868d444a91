//! Similarity Engine: ranks pool candidates against a reference candidate.
//!
//! Pure function of (reference id, snapshot, limit): no hidden state, safe
//! to call concurrently and to cache by (reference id, snapshot version).

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::Candidate;
use crate::snapshot::PoolSnapshot;

/// Default result cap when the caller does not supply a limit.
pub const DEFAULT_LIMIT: usize = 20;

/// Feature weights for the similarity score. Tunable configuration, not
/// inline constants; the score is normalized by the weight sum so any
/// tuning keeps it in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWeights {
    pub skills: f64,
    pub organizations: f64,
    pub seniority: f64,
    pub title: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            skills: 0.45,
            organizations: 0.20,
            seniority: 0.15,
            title: 0.20,
        }
    }
}

/// Per-feature contribution, surfaced so callers can explain a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBreakdown {
    pub skill_jaccard: f64,
    pub shared_organization: bool,
    pub seniority_proximity: f64,
    pub title_overlap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityHit {
    pub candidate_id: Uuid,
    pub display_name: String,
    pub score: f64,
    pub breakdown: FeatureBreakdown,
}

/// Ephemeral result, regenerated per request. `reference_found = false`
/// with empty hits means the reference id was absent from the pool, an
/// expected race with pool updates rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub reference_id: Uuid,
    pub reference_found: bool,
    pub hits: Vec<SimilarityHit>,
}

/// Ranks the `limit` candidates most similar to `reference_id`, excluding
/// the reference itself. A limit beyond the pool size returns the full
/// pool. Ties break by higher skill overlap, then candidate id ascending,
/// so repeated calls over one snapshot are identical.
pub fn find_similar(
    reference_id: Uuid,
    snapshot: &PoolSnapshot,
    limit: Option<usize>,
    weights: &FeatureWeights,
) -> SimilarityResult {
    let reference = match snapshot.get(reference_id) {
        Some(c) => c,
        None => {
            return SimilarityResult {
                reference_id,
                reference_found: false,
                hits: Vec::new(),
            }
        }
    };

    let ref_orgs = org_set(reference);
    let ref_titles = title_tokens(reference);
    let weight_sum = weights.skills + weights.organizations + weights.seniority + weights.title;

    let mut hits: Vec<SimilarityHit> = snapshot
        .candidates
        .iter()
        .filter(|c| c.id != reference_id)
        .map(|c| score_pair(reference, c, &ref_orgs, &ref_titles, weights, weight_sum))
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.breakdown
                    .skill_jaccard
                    .partial_cmp(&a.breakdown.skill_jaccard)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    hits.truncate(limit.unwrap_or(DEFAULT_LIMIT));

    SimilarityResult {
        reference_id,
        reference_found: true,
        hits,
    }
}

fn score_pair(
    reference: &Candidate,
    other: &Candidate,
    ref_orgs: &BTreeSet<&str>,
    ref_titles: &BTreeSet<String>,
    weights: &FeatureWeights,
    weight_sum: f64,
) -> SimilarityHit {
    let skill_jaccard = jaccard(&reference.skills, &other.skills);
    let shared_organization = org_set(other).iter().any(|o| ref_orgs.contains(o));
    let seniority_proximity =
        1.0 - f64::from(reference.seniority.distance(other.seniority)) / 3.0;
    let title_overlap = jaccard(ref_titles, &title_tokens(other));

    let raw = weights.skills * skill_jaccard
        + weights.organizations * if shared_organization { 1.0 } else { 0.0 }
        + weights.seniority * seniority_proximity
        + weights.title * title_overlap;
    let score = if weight_sum > 0.0 { raw / weight_sum } else { 0.0 };

    SimilarityHit {
        candidate_id: other.id,
        display_name: other.display_name.clone(),
        score: score.clamp(0.0, 1.0),
        breakdown: FeatureBreakdown {
            skill_jaccard,
            shared_organization,
            seniority_proximity,
            title_overlap,
        },
    }
}

fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

fn org_set(c: &Candidate) -> BTreeSet<&str> {
    c.experiences
        .iter()
        .map(|e| e.org_key.as_str())
        .filter(|k| !k.is_empty())
        .collect()
}

fn title_tokens(c: &Candidate) -> BTreeSet<String> {
    c.experiences
        .iter()
        .flat_map(|e| e.title.split_whitespace())
        .map(str::to_lowercase)
        .collect()
}
