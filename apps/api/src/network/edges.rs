//! Colleague-edge inference: two candidates are colleagues when they held
//! roles at the same organization with overlapping half-open date intervals.
//!
//! Edge computation groups experiences by organization key first and only
//! compares pairs within a group, so cost is O(pairs sharing an org), never
//! a full pairwise scan of the pool.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::Experience;
use crate::snapshot::PoolSnapshot;

/// Inferred relationship between two candidates who overlapped in time at
/// the same organization. `a < b` canonically, so the same edge never
/// appears twice with swapped endpoints. Multiple edges may exist for one
/// pair when they overlapped at more than one organization or stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColleagueEdge {
    pub a: Uuid,
    pub b: Uuid,
    pub org_key: String,
    pub organization: String,
    /// Recorded when both sides carry a matching department key; advisory
    /// only, organization-level overlap is sufficient for the edge.
    pub department: Option<String>,
    pub overlap_start: NaiveDate,
    pub overlap_end: NaiveDate,
    pub overlap_months: u32,
}

/// Half-open interval overlap. A touching boundary (end of one equals start
/// of the other) is NOT an overlap. Open ends are clamped to `today`.
fn overlap(
    a: &Experience,
    b: &Experience,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let (a_start, b_start) = (a.start?, b.start?);
    let a_end = a.end.unwrap_or(today);
    let b_end = b.end.unwrap_or(today);
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    (start < end).then_some((start, end))
}

fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    use chrono::Datelike;
    let months = (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    months.max(0) as u32
}

/// Computes the full colleague-edge set for a snapshot. Deterministic:
/// identical snapshots always yield an identical, sorted edge list.
pub fn build_edges(snapshot: &PoolSnapshot, today: NaiveDate) -> Vec<ColleagueEdge> {
    // Group (candidate id, experience) by organization key.
    let mut by_org: HashMap<&str, Vec<(Uuid, &Experience)>> = HashMap::new();
    for candidate in &snapshot.candidates {
        for exp in &candidate.experiences {
            if exp.org_key.is_empty() || exp.start.is_none() {
                continue;
            }
            by_org.entry(&exp.org_key).or_default().push((candidate.id, exp));
        }
    }

    let mut edges = Vec::new();
    for group in by_org.values() {
        for (i, (id_a, exp_a)) in group.iter().enumerate() {
            for (id_b, exp_b) in &group[i + 1..] {
                if id_a == id_b {
                    continue; // duplicate stints within one resume
                }
                let Some((start, end)) = overlap(exp_a, exp_b, today) else {
                    continue;
                };
                let (a, b, exp_lo) = if id_a < id_b {
                    (*id_a, *id_b, exp_a)
                } else {
                    (*id_b, *id_a, exp_b)
                };
                let department = match (&exp_a.dept_key, &exp_b.dept_key) {
                    (Some(x), Some(y)) if x == y => exp_a.department.clone(),
                    _ => None,
                };
                edges.push(ColleagueEdge {
                    a,
                    b,
                    org_key: exp_lo.org_key.clone(),
                    organization: exp_lo.organization.clone(),
                    department,
                    overlap_start: start,
                    overlap_end: end,
                    overlap_months: months_between(start, end),
                });
            }
        }
    }

    edges.sort_by(|x, y| {
        x.a.cmp(&y.a)
            .then_with(|| x.b.cmp(&y.b))
            .then_with(|| x.org_key.cmp(&y.org_key))
            .then_with(|| x.overlap_start.cmp(&y.overlap_start))
    });
    edges.dedup();
    edges
}
