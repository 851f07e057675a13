//! Orchestration: run PageRank and betweenness concurrently over one
//! built [`Graph`], fold in degree counts, and persist the result via
//! `cx-store`'s `Metrics` cache (§5 "independent metrics ... computed
//! concurrently").

use std::collections::HashMap;

use cx_core::entity::EntityId;
use cx_core::CxError;
use cx_store::Store;

use crate::betweenness::{betweenness, BetweennessResult};
use crate::graph::Graph;
use crate::pagerank::{pagerank, PageRankConfig};

pub struct ComputedMetrics {
    pub pagerank: HashMap<EntityId, f64>,
    pub betweenness: HashMap<EntityId, f64>,
    pub sample_fraction: Option<f64>,
}

/// Runs PageRank and betweenness on separate `rayon` threads over the
/// same read-only `graph`, since neither depends on the other's output.
pub fn compute_all(graph: &Graph, pagerank_config: &PageRankConfig, betweenness_sample: Option<usize>) -> ComputedMetrics {
    let (pr, BetweennessResult { scores: bw, sample_fraction }) =
        rayon::join(|| pagerank(graph, pagerank_config), || betweenness(graph, betweenness_sample));
    ComputedMetrics { pagerank: pr, betweenness: bw, sample_fraction }
}

/// Folds `computed` and `graph`'s degree counts into the persisted
/// `cx_core::Metrics` row shape.
pub fn to_metrics(graph: &Graph, computed: &ComputedMetrics) -> Vec<cx_core::Metrics> {
    let now = chrono::Utc::now();
    graph
        .nodes()
        .iter()
        .map(|id| {
            let degree = graph.degree(id);
            cx_core::Metrics {
                entity_id: id.clone(),
                pagerank: computed.pagerank.get(id).copied().unwrap_or(0.0),
                betweenness: computed.betweenness.get(id).copied().unwrap_or(0.0),
                in_degree: degree.in_degree,
                out_degree: degree.out_degree,
                computed_at: now,
            }
        })
        .collect()
}

/// Builds the graph, computes every metric, and writes the result back
/// to the store's `Metrics` cache (§3.3) in one call — the path the
/// scanner or a periodic recompute job takes.
pub async fn compute_and_persist(
    store: &Store,
    pagerank_config: &PageRankConfig,
    betweenness_sample: Option<usize>,
) -> Result<Vec<cx_core::Metrics>, CxError> {
    let graph = Graph::build_from_store(store).await?;
    let computed = compute_all(&graph, pagerank_config, betweenness_sample);
    let metrics = to_metrics(&graph, &computed);
    store.save_bulk_metrics(&metrics).await?;
    Ok(metrics)
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
    fn to_metrics_covers_every_node_with_its_degree() {
        let entities = vec![entity("a"), entity("b")];
        let deps = vec![Dependency::new(id("a"), id("b"), DepType::Calls)];
        let g = Graph::build(&entities, &deps);
        let computed = compute_all(&g, &PageRankConfig::default(), None);
        let rows = to_metrics(&g, &computed);
        assert_eq!(rows.len(), 2);
        let a_row = rows.iter().find(|r| r.entity_id == id("a")).unwrap();
        assert_eq!(a_row.out_degree, 1);
        assert_eq!(a_row.in_degree, 0);
    }
}
