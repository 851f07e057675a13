//! PageRank (§4.6 "PageRank"): standard power-iteration over the
//! directed call/uses-type graph, no teacher precedent — a textbook
//! algorithm implemented directly against the parameters spec.md
//! enumerates (damping 0.85, 100 iterations, tolerance 1e-4).

use std::collections::HashMap;

use cx_core::entity::EntityId;

use crate::graph::Graph;

#[derive(Debug, Clone, PartialEq)]
pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        PageRankConfig { damping: 0.85, max_iterations: 100, tolerance: 0.0001 }
    }
}

/// PageRank over `graph`. Dangling nodes (no successors) distribute
/// their mass uniformly across every node each iteration. The result is
/// renormalized to sum to exactly 1.0 over all nodes (§8 invariant 7).
#[tracing::instrument(skip(graph, config), fields(nodes = graph.node_count()))]
pub fn pagerank(graph: &Graph, config: &PageRankConfig) -> HashMap<EntityId, f64> {
    let n = graph.node_count();
    if n == 0 {
        return HashMap::new();
    }
    if n == 1 {
        let mut single = HashMap::new();
        single.insert(graph.node_at(0).clone(), 1.0);
        return single;
    }

    let successors: Vec<Vec<usize>> = (0..n).map(|i| graph.successor_indices(i)).collect();
    let base = (1.0 - config.damping) / n as f64;
    let mut rank = vec![1.0 / n as f64; n];

    for _ in 0..config.max_iterations {
        let dangling_mass: f64 = (0..n).filter(|&i| successors[i].is_empty()).map(|i| rank[i]).sum();
        let dangling_share = config.damping * dangling_mass / n as f64;

        let mut next = vec![base + dangling_share; n];
        for (i, succ) in successors.iter().enumerate() {
            if succ.is_empty() {
                continue;
            }
            let share = config.damping * rank[i] / succ.len() as f64;
            for &j in succ {
                next[j] += share;
            }
        }

        let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if delta <= config.tolerance {
            break;
        }
    }

    let sum: f64 = rank.iter().sum();
    if sum > 0.0 {
        for v in rank.iter_mut() {
            *v /= sum;
        }
    }

    (0..n).map(|i| (graph.node_at(i).clone(), rank[i])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_core::entity::{Entity, EntityKind, EntityStatus, LineRange, Visibility};
    use cx_core::{DepType, Dependency, Language};

    fn entity(id: &str) -> Entity {
        let now = chrono::Utc::now();
        Entity {
            id: EntityId(id.to_string()),
            name: id.to_string(),
            qualified_name: None,
            kind: EntityKind::Function,
            type_kind: None,
            file_path: "f.go".to_string(),
            lines: LineRange::new(1, 1),
            signature: "()".to_string(),
            sig_hash: "sig".to_string(),
            body_hash: "body".to_string(),
            doc_comment: None,
            skeleton: None,
            receiver: None,
            visibility: Visibility::Public,
            language: Language::Go,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(s: &str) -> EntityId {
        EntityId(s.to_string())
    }

    #[test]
    fn pagerank_sums_to_one() {
        let entities = vec![entity("a"), entity("b"), entity("c")];
        let deps = vec![
            Dependency::new(id("a"), id("b"), DepType::Calls),
            Dependency::new(id("b"), id("c"), DepType::Calls),
            Dependency::new(id("c"), id("a"), DepType::Calls),
        ];
        let g = Graph::build(&entities, &deps);
        let ranks = pagerank(&g, &PageRankConfig::default());
        let sum: f64 = ranks.values().sum();
        assert!((sum - 1.0).abs() < 1e-6, "sum was {sum}");
    }

    #[test]
    fn a_node_everyone_points_at_outranks_the_rest() {
        let entities = vec![entity("a"), entity("b"), entity("c")];
        let deps = vec![
            Dependency::new(id("a"), id("c"), DepType::Calls),
            Dependency::new(id("b"), id("c"), DepType::Calls),
        ];
        let g = Graph::build(&entities, &deps);
        let ranks = pagerank(&g, &PageRankConfig::default());
        assert!(ranks[&id("c")] > ranks[&id("a")]);
        assert!(ranks[&id("c")] > ranks[&id("b")]);
    }

    #[test]
    fn dangling_nodes_still_get_redistributed_mass() {
        let entities = vec![entity("a"), entity("b")];
        let deps = vec![Dependency::new(id("a"), id("b"), DepType::Calls)];
        let g = Graph::build(&entities, &deps);
        let ranks = pagerank(&g, &PageRankConfig::default());
        let sum: f64 = ranks.values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(ranks[&id("b")] > 0.0);
    }

    #[test]
    fn empty_graph_produces_no_ranks() {
        let g = Graph::build(&[], &[]);
        assert!(pagerank(&g, &PageRankConfig::default()).is_empty());
    }
}
