//! `cx-graph` exercised against a real `Store` rather than hand-built
//! fixtures, covering the build/degree/traversal/metrics path end to end.

use cx_core::entity::{Entity, EntityKind, EntityStatus, LineRange, Visibility};
use cx_core::{DepType, Dependency, EntityId, Language};
use cx_graph::{collect_caller_chain, pagerank, Graph, PageRankConfig};
use cx_store::Store;

fn entity(id: &str, file: &str) -> Entity {
    let now = chrono::Utc::now();
    Entity {
        id: EntityId(id.to_string()),
        name: id.to_string(),
        qualified_name: None,
        kind: EntityKind::Function,
        type_kind: None,
        file_path: file.to_string(),
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

#[tokio::test]
async fn builds_from_a_live_store_and_excludes_archived_entities() {
    let store = Store::open_in_memory().await.unwrap();
    store
        .create_entities_bulk(&[entity("a", "x.go"), entity("b", "x.go"), entity("c", "y.go")])
        .await
        .unwrap();
    store
        .create_deps_bulk(&[
            Dependency::new(id("a"), id("b"), DepType::Calls),
            Dependency::new(id("b"), id("c"), DepType::Calls),
        ])
        .await
        .unwrap();

    let graph = Graph::build_from_store(&store).await.unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.successors(&id("a")), vec![id("b")]);

    store.archive_entity(&id("c")).await.unwrap();
    let graph = Graph::build_from_store(&store).await.unwrap();
    assert_eq!(graph.node_count(), 2);
    assert!(!graph.contains(&id("c")));
}

#[tokio::test]
async fn caller_chain_and_pagerank_agree_on_which_node_is_central() {
    let store = Store::open_in_memory().await.unwrap();
    store
        .create_entities_bulk(&[entity("a", "x.go"), entity("b", "x.go"), entity("c", "x.go")])
        .await
        .unwrap();
    store
        .create_deps_bulk(&[
            Dependency::new(id("a"), id("c"), DepType::Calls),
            Dependency::new(id("b"), id("c"), DepType::Calls),
        ])
        .await
        .unwrap();

    let graph = Graph::build_from_store(&store).await.unwrap();
    let callers = collect_caller_chain(&graph, &id("c"), 5);
    assert!(callers.contains(&id("a")));
    assert!(callers.contains(&id("b")));

    let ranks = pagerank(&graph, &PageRankConfig::default());
    assert!(ranks[&id("c")] > ranks[&id("a")]);
}

#[tokio::test]
async fn compute_and_persist_round_trips_through_the_metrics_cache() {
    let store = Store::open_in_memory().await.unwrap();
    store
        .create_entities_bulk(&[entity("a", "x.go"), entity("b", "x.go")])
        .await
        .unwrap();
    store
        .create_deps_bulk(&[Dependency::new(id("a"), id("b"), DepType::Calls)])
        .await
        .unwrap();

    cx_graph::compute_and_persist(&store, &PageRankConfig::default(), None).await.unwrap();

    let metrics = store.get_metrics(&id("b")).await.unwrap().unwrap();
    assert_eq!(metrics.in_degree, 1);
    assert!(metrics.pagerank > 0.0);
}
