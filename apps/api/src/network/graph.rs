//! Navigable professional network built from the colleague-edge set.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::network::edges::ColleagueEdge;

/// Adjacency view over an edge arena. Symmetric by construction: inserting
/// edge (a, b) registers it on both endpoints with the same interval data.
#[derive(Debug, Default)]
pub struct NetworkGraph {
    edges: Vec<ColleagueEdge>,
    adjacency: HashMap<Uuid, Vec<(Uuid, usize)>>,
}

/// Pool-level network statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStats {
    pub pool_size: usize,
    pub edge_count: usize,
    pub connected_candidates: usize,
    pub average_degree: f64,
}

impl NetworkGraph {
    pub fn from_edges(edges: Vec<ColleagueEdge>) -> Self {
        let mut adjacency: HashMap<Uuid, Vec<(Uuid, usize)>> = HashMap::new();
        for (idx, edge) in edges.iter().enumerate() {
            adjacency.entry(edge.a).or_default().push((edge.b, idx));
            adjacency.entry(edge.b).or_default().push((edge.a, idx));
        }
        // Deterministic neighbor order regardless of edge insertion order.
        for list in adjacency.values_mut() {
            list.sort_by(|x, y| x.0.cmp(&y.0).then_with(|| x.1.cmp(&y.1)));
        }
        Self { edges, adjacency }
    }

    /// All colleague edges touching `id`, paired with the neighbor on the
    /// other end. Empty for unknown or isolated candidates.
    pub fn neighbors(&self, id: Uuid) -> Vec<(Uuid, &ColleagueEdge)> {
        self.adjacency
            .get(&id)
            .map(|list| {
                list.iter()
                    .map(|&(neighbor, idx)| (neighbor, &self.edges[idx]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Unweighted BFS shortest path from `a` to `b` as a sequence of
    /// candidate ids (inclusive of both ends). `None` means unreachable;
    /// never a partial or approximate path.
    pub fn shortest_path(&self, a: Uuid, b: Uuid) -> Option<Vec<Uuid>> {
        if a == b {
            return self.adjacency.contains_key(&a).then(|| vec![a]);
        }
        if !self.adjacency.contains_key(&a) || !self.adjacency.contains_key(&b) {
            return None;
        }

        let mut predecessor: HashMap<Uuid, Uuid> = HashMap::new();
        let mut visited: HashSet<Uuid> = HashSet::from([a]);
        let mut queue = VecDeque::from([a]);

        while let Some(current) = queue.pop_front() {
            for &(neighbor, _) in self.adjacency.get(&current).into_iter().flatten() {
                if !visited.insert(neighbor) {
                    continue;
                }
                predecessor.insert(neighbor, current);
                if neighbor == b {
                    let mut path = vec![b];
                    let mut node = b;
                    while let Some(&prev) = predecessor.get(&node) {
                        path.push(prev);
                        node = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(neighbor);
            }
        }
        None
    }

    /// Connected component containing `id`, sorted ascending.
    pub fn connected_component(&self, id: Uuid) -> Vec<Uuid> {
        if !self.adjacency.contains_key(&id) {
            return Vec::new();
        }
        let mut component = BTreeSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for &(neighbor, _) in self.adjacency.get(&current).into_iter().flatten() {
                if component.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        component.into_iter().collect()
    }

    pub fn stats(&self, pool_size: usize) -> NetworkStats {
        let connected = self.adjacency.len();
        let average_degree = if pool_size > 0 {
            (2.0 * self.edges.len() as f64) / pool_size as f64
        } else {
            0.0
        };
        NetworkStats {
            pool_size,
            edge_count: self.edges.len(),
            connected_candidates: connected,
            average_degree,
        }
    }

    /// Verifies the symmetry invariant: every edge is registered on both of
    /// its endpoints with identical data. A violation is a defect in graph
    /// construction, not a user-facing condition.
    pub fn verify_symmetric(&self) -> Result<(), String> {
        for (idx, edge) in self.edges.iter().enumerate() {
            for (from, to) in [(edge.a, edge.b), (edge.b, edge.a)] {
                let present = self
                    .adjacency
                    .get(&from)
                    .is_some_and(|list| list.iter().any(|&(n, i)| n == to && i == idx));
                if !present {
                    return Err(format!("edge {}-{} missing from adjacency of {from}", edge.a, edge.b));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn edge(a: u128, b: u128, org: &str) -> ColleagueEdge {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        ColleagueEdge {
            a: Uuid::from_u128(a),
            b: Uuid::from_u128(b),
            org_key: org.to_lowercase(),
            organization: org.to_string(),
            department: None,
            overlap_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            overlap_end: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            overlap_months: 12,
        }
    }

    fn chain() -> NetworkGraph {
        // 1 - 2 - 3 - 4, plus isolated 5 via no edges.
        NetworkGraph::from_edges(vec![edge(1, 2, "Acme"), edge(2, 3, "Acme"), edge(3, 4, "Globex")])
    }

    #[test]
    fn test_neighbors_symmetric() {
        let g = chain();
        let n2: Vec<Uuid> = g.neighbors(Uuid::from_u128(2)).iter().map(|(n, _)| *n).collect();
        assert_eq!(n2, vec![Uuid::from_u128(1), Uuid::from_u128(3)]);
        let n1: Vec<Uuid> = g.neighbors(Uuid::from_u128(1)).iter().map(|(n, _)| *n).collect();
        assert_eq!(n1, vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn test_neighbor_edge_data_identical_both_directions() {
        let g = chain();
        let from_a = g.neighbors(Uuid::from_u128(1));
        let from_b = g.neighbors(Uuid::from_u128(2));
        let edge_ab = from_a.iter().find(|(n, _)| *n == Uuid::from_u128(2)).unwrap().1;
        let edge_ba = from_b.iter().find(|(n, _)| *n == Uuid::from_u128(1)).unwrap().1;
        assert_eq!(edge_ab, edge_ba);
    }

    #[test]
    fn test_shortest_path_chain() {
        let g = chain();
        let path = g.shortest_path(Uuid::from_u128(1), Uuid::from_u128(4)).unwrap();
        assert_eq!(
            path,
            vec![
                Uuid::from_u128(1),
                Uuid::from_u128(2),
                Uuid::from_u128(3),
                Uuid::from_u128(4)
            ]
        );
    }

    #[test]
    fn test_shortest_path_prefers_fewer_hops() {
        let g = NetworkGraph::from_edges(vec![
            edge(1, 2, "Acme"),
            edge(2, 3, "Acme"),
            edge(1, 3, "Globex"),
        ]);
        let path = g.shortest_path(Uuid::from_u128(1), Uuid::from_u128(3)).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_shortest_path_unreachable_is_none() {
        let g = NetworkGraph::from_edges(vec![edge(1, 2, "Acme"), edge(3, 4, "Globex")]);
        assert!(g.shortest_path(Uuid::from_u128(1), Uuid::from_u128(4)).is_none());
        assert!(g.shortest_path(Uuid::from_u128(1), Uuid::from_u128(99)).is_none());
    }

    #[test]
    fn test_shortest_path_self_is_single_node() {
        let g = chain();
        assert_eq!(
            g.shortest_path(Uuid::from_u128(2), Uuid::from_u128(2)),
            Some(vec![Uuid::from_u128(2)])
        );
    }

    #[test]
    fn test_connected_component() {
        let g = NetworkGraph::from_edges(vec![edge(1, 2, "Acme"), edge(2, 3, "Acme"), edge(5, 6, "Initech")]);
        let comp = g.connected_component(Uuid::from_u128(1));
        assert_eq!(
            comp,
            vec![Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)]
        );
    }

    #[test]
    fn test_stats_average_degree() {
        let g = chain();
        let stats = g.stats(5);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.pool_size, 5);
        assert_eq!(stats.connected_candidates, 4);
        assert!((stats.average_degree - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_symmetry_invariant_holds() {
        assert!(chain().verify_symmetric().is_ok());
    }
}
