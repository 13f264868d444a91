//! Immutable, versioned candidate-pool snapshots.
//!
//! Every request operates against exactly one snapshot for its lifetime;
//! engines are pure functions of (input, snapshot). Publishing a new pool is
//! a single pointer swap, so in-flight requests keep the snapshot they
//! started with and never observe a partial update.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::models::candidate::Candidate;

/// Point-in-time view of the full candidate pool plus derived lookup
/// structures. Never mutated after construction.
#[derive(Debug)]
pub struct PoolSnapshot {
    pub version: u64,
    pub candidates: Vec<Candidate>,
    by_id: HashMap<Uuid, usize>,
    /// Vocabulary extracted from the pool, used by the fallback translator.
    pub vocabulary: Vocabulary,
}

/// Known organizations, departments, and skills in the current pool,
/// keyed by their canonical forms.
#[derive(Debug, Default)]
pub struct Vocabulary {
    pub org_keys: BTreeSet<String>,
    pub dept_keys: BTreeSet<String>,
    pub skills: BTreeSet<String>,
}

impl PoolSnapshot {
    pub fn new(version: u64, candidates: Vec<Candidate>) -> Self {
        let by_id = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        let mut vocabulary = Vocabulary::default();
        for c in &candidates {
            vocabulary.skills.extend(c.skills.iter().cloned());
            for e in &c.experiences {
                if !e.org_key.is_empty() {
                    vocabulary.org_keys.insert(e.org_key.clone());
                }
                if let Some(k) = &e.dept_key {
                    vocabulary.dept_keys.insert(k.clone());
                }
            }
        }

        Self {
            version,
            candidates,
            by_id,
            vocabulary,
        }
    }

    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn get(&self, id: Uuid) -> Option<&Candidate> {
        self.by_id.get(&id).map(|&i| &self.candidates[i])
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Holds the active snapshot. `load` hands out a cheap Arc clone; `publish`
/// swaps the pointer and bumps the version.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Arc<PoolSnapshot>>>,
}

impl SnapshotStore {
    pub fn new(initial: PoolSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub fn load(&self) -> Arc<PoolSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Publishes a new pool, superseding the active snapshot. Returns the
    /// new version.
    pub fn publish(&self, candidates: Vec<Candidate>) -> u64 {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let version = guard.version + 1;
        *guard = Arc::new(PoolSnapshot::new(version, candidates));
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::SeniorityTier;

    fn candidate(name: &str) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
            experiences: vec![],
            skills: ["rust".to_string()].into_iter().collect(),
            total_experience_months: 0,
            seniority: SeniorityTier::Junior,
            unmatched_sections: vec![],
        }
    }

    #[test]
    fn test_get_by_id() {
        let c = candidate("A");
        let id = c.id;
        let snap = PoolSnapshot::new(1, vec![c]);
        assert!(snap.get(id).is_some());
        assert!(snap.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_publish_bumps_version_and_swaps() {
        let store = SnapshotStore::new(PoolSnapshot::empty());
        let before = store.load();
        assert_eq!(before.version, 0);

        let v = store.publish(vec![candidate("A")]);
        assert_eq!(v, 1);

        // The old snapshot is untouched; the new one is live.
        assert_eq!(before.len(), 0);
        assert_eq!(store.load().len(), 1);
        assert_eq!(store.load().version, 1);
    }

    #[test]
    fn test_vocabulary_collects_skills() {
        let snap = PoolSnapshot::new(1, vec![candidate("A")]);
        assert!(snap.vocabulary.skills.contains("rust"));
    }
}
