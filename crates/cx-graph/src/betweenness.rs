//! Betweenness centrality (§4.6 "Betweenness"): Brandes' algorithm on
//! the unweighted directed graph, with optional source sampling above
//! the ~50k node threshold spec.md allows for.

use std::collections::{HashMap, VecDeque};

use cx_core::entity::EntityId;

use crate::graph::Graph;

const SAMPLE_THRESHOLD: usize = 50_000;

/// Betweenness scores, normalized to `[0, 1]`, plus the sampling
/// fraction if sources were sampled rather than exhausted (§4.6: "the
/// API exposes the sampling fraction if used").
#[derive(Debug, Clone, PartialEq)]
pub struct BetweennessResult {
    pub scores: HashMap<EntityId, f64>,
    pub sample_fraction: Option<f64>,
}

/// Runs Brandes' algorithm. `sample_size` overrides the default
/// above-threshold sampling decision; `None` lets the graph size decide
/// (exhaustive under `SAMPLE_THRESHOLD`, otherwise sampling one source
/// per ~50 nodes, deterministically by node order).
pub fn betweenness(graph: &Graph, sample_size: Option<usize>) -> BetweennessResult {
    let n = graph.node_count();
    if n < 3 {
        return BetweennessResult {
            scores: graph.nodes().iter().map(|id| (id.clone(), 0.0)).collect(),
            sample_fraction: None,
        };
    }

    let default_sample = if n > SAMPLE_THRESHOLD { Some((n / 50).max(1)) } else { None };
    let k = sample_size.or(default_sample);

    let source_count = k.unwrap_or(n).min(n);
    // Deterministic "sample": evenly spaced indices over the sorted node
    // order, so repeated runs on the same graph agree (§4.6
    // "Determinism").
    let sources: Vec<usize> = if source_count == n {
        (0..n).collect()
    } else {
        let stride = n as f64 / source_count as f64;
        (0..source_count).map(|i| ((i as f64 * stride) as usize).min(n - 1)).collect()
    };

    let raw = brandes(graph, &sources);

    let scale = if source_count < n { n as f64 / source_count as f64 } else { 1.0 };
    let normalizer = if n > 2 { ((n - 1) * (n - 2)) as f64 } else { 1.0 };

    let scores = (0..n)
        .map(|i| (graph.node_at(i).clone(), (raw[i] * scale / normalizer).clamp(0.0, 1.0)))
        .collect();

    BetweennessResult {
        scores,
        sample_fraction: if source_count < n { Some(source_count as f64 / n as f64) } else { None },
    }
}

fn brandes(graph: &Graph, sources: &[usize]) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];

    for &s in sources {
        let mut stack = Vec::new();
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0; n];
        let mut dist = vec![-1i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in graph.successor_indices(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    centrality
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

    /// a -> b -> c: b sits on the only path from a to c.
    #[test]
    fn bridge_node_scores_higher_than_its_neighbors() {
        let entities = vec![entity("a"), entity("b"), entity("c")];
        let deps = vec![
            Dependency::new(id("a"), id("b"), DepType::Calls),
            Dependency::new(id("b"), id("c"), DepType::Calls),
        ];
        let g = Graph::build(&entities, &deps);
        let result = betweenness(&g, None);
        assert!(result.scores[&id("b")] > result.scores[&id("a")]);
        assert!(result.scores[&id("b")] > result.scores[&id("c")]);
        assert!(result.sample_fraction.is_none());
    }

    #[test]
    fn scores_stay_in_unit_range() {
        let entities = vec![entity("a"), entity("b"), entity("c"), entity("d")];
        let deps = vec![
            Dependency::new(id("a"), id("b"), DepType::Calls),
            Dependency::new(id("b"), id("c"), DepType::Calls),
            Dependency::new(id("c"), id("d"), DepType::Calls),
            Dependency::new(id("a"), id("d"), DepType::Calls),
        ];
        let g = Graph::build(&entities, &deps);
        let result = betweenness(&g, None);
        for score in result.scores.values() {
            assert!((0.0..=1.0).contains(score));
        }
    }

    #[test]
    fn sampling_reports_the_fraction_used() {
        let entities: Vec<Entity> = (0..10).map(|i| entity(&i.to_string())).collect();
        let g = Graph::build(&entities, &[]);
        let result = betweenness(&g, Some(4));
        assert_eq!(result.sample_fraction, Some(0.4));
    }
}
