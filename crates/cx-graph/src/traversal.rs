//! Path/reachability queries (§4.6 "Traversal primitives"), grounded on
//! the bounded-BFS shape of `cozo_client.rs`'s `calculate_blast_radius`
//! (distance-labeled reachable set), reimplemented in memory against a
//! built [`Graph`] instead of a recursive Datalog query.

use std::collections::VecDeque;

use cx_core::entity::EntityId;

use crate::graph::{Direction, Graph};

/// A walk through the graph, node-to-node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub nodes: Vec<EntityId>,
}

impl Path {
    /// Edge count (one less than the node count).
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// BFS shortest path between two nodes (§4.6). `None` if `to` is
/// unreachable from `from`, or either id is absent from the graph.
pub fn shortest_path(graph: &Graph, from: &EntityId, to: &EntityId, direction: Direction) -> Option<Path> {
    let start = graph.idx(from)?;
    let goal = graph.idx(to)?;
    if start == goal {
        return Some(Path { nodes: vec![from.clone()] });
    }

    let adjacency = graph.adjacency(direction);
    let mut visited = vec![false; graph.node_count()];
    let mut parent = vec![usize::MAX; graph.node_count()];
    let mut queue = VecDeque::new();
    visited[start] = true;
    queue.push_back(start);

    while let Some(cur) = queue.pop_front() {
        for &(next, _) in &adjacency[cur] {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            parent[next] = cur;
            if next == goal {
                return Some(Path { nodes: reconstruct(graph, &parent, start, goal) });
            }
            queue.push_back(next);
        }
    }
    None
}

fn reconstruct(graph: &Graph, parent: &[usize], start: usize, goal: usize) -> Vec<EntityId> {
    let mut rev = vec![goal];
    let mut cur = goal;
    while cur != start {
        cur = parent[cur];
        rev.push(cur);
    }
    rev.reverse();
    rev.into_iter().map(|i| graph.node_at(i).clone()).collect()
}

/// Every simple path from `from` to `to` with at most `max_depth` edges
/// (bounded DFS, §4.6). Ordered by length ascending, then
/// lexicographically by the node-id sequence.
pub fn all_paths(graph: &Graph, from: &EntityId, to: &EntityId, max_depth: usize) -> Vec<Path> {
    let (Some(start), Some(goal)) = (graph.idx(from), graph.idx(to)) else {
        return Vec::new();
    };

    let adjacency = graph.adjacency(Direction::Forward);
    let mut on_path = vec![false; graph.node_count()];
    on_path[start] = true;
    let mut current = vec![start];
    let mut found = Vec::new();

    dfs_all_paths(adjacency, start, goal, max_depth, &mut current, &mut on_path, &mut found);

    let mut paths: Vec<Path> = found
        .into_iter()
        .map(|idxs| Path { nodes: idxs.into_iter().map(|i| graph.node_at(i).clone()).collect() })
        .collect();
    paths.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.nodes.cmp(&b.nodes)));
    paths
}

#[allow(clippy::too_many_arguments)]
fn dfs_all_paths(
    adjacency: &[Vec<(usize, cx_core::DepType)>],
    cur: usize,
    goal: usize,
    max_depth: usize,
    current: &mut Vec<usize>,
    on_path: &mut [bool],
    found: &mut Vec<Vec<usize>>,
) {
    if cur == goal && current.len() > 1 {
        found.push(current.clone());
        return;
    }
    if current.len() - 1 >= max_depth {
        return;
    }
    for &(next, _) in &adjacency[cur] {
        if on_path[next] {
            continue;
        }
        on_path[next] = true;
        current.push(next);
        dfs_all_paths(adjacency, next, goal, max_depth, current, on_path, found);
        current.pop();
        on_path[next] = false;
    }
}

/// BFS over the reverse adjacency up to `depth` hops: every entity that
/// (transitively) calls `id`, nearest first, `id` itself at index 0.
pub fn collect_caller_chain(graph: &Graph, id: &EntityId, depth: usize) -> Vec<EntityId> {
    bfs_chain(graph, id, depth, Direction::Reverse)
}

/// BFS over the forward adjacency up to `depth` hops: every entity that
/// `id` (transitively) calls, nearest first, `id` itself at index 0.
pub fn collect_callee_chain(graph: &Graph, id: &EntityId, depth: usize) -> Vec<EntityId> {
    bfs_chain(graph, id, depth, Direction::Forward)
}

fn bfs_chain(graph: &Graph, id: &EntityId, depth: usize, direction: Direction) -> Vec<EntityId> {
    let Some(start) = graph.idx(id) else { return Vec::new() };
    let adjacency = graph.adjacency(direction);
    let mut visited = vec![false; graph.node_count()];
    let mut order = vec![start];
    visited[start] = true;
    let mut queue = VecDeque::new();
    queue.push_back((start, 0usize));

    while let Some((cur, d)) = queue.pop_front() {
        if d >= depth {
            continue;
        }
        for &(next, _) in &adjacency[cur] {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            order.push(next);
            queue.push_back((next, d + 1));
        }
    }
    order.into_iter().map(|i| graph.node_at(i).clone()).collect()
}

/// A single entity touched by a change, and how many hops away it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactedEntity {
    pub entity_id: EntityId,
    pub distance: usize,
}

/// What a change to `id` or to every entity in `file` could affect
/// (§4.6 "impact_radius"): the union of `collect_caller_chain` over the
/// target entity (or every entity in the target file), minimum distance
/// kept per entity.
pub fn impact_radius(graph: &Graph, targets: &[EntityId], depth: usize) -> Vec<ImpactedEntity> {
    let mut best: std::collections::HashMap<EntityId, usize> = std::collections::HashMap::new();
    for target in targets {
        let chain = collect_caller_chain(graph, target, depth);
        for (distance, entity_id) in chain.into_iter().enumerate() {
            if entity_id == *target {
                continue;
            }
            best.entry(entity_id)
                .and_modify(|d| *d = (*d).min(distance))
                .or_insert(distance);
        }
    }
    let mut out: Vec<ImpactedEntity> = best
        .into_iter()
        .map(|(entity_id, distance)| ImpactedEntity { entity_id, distance })
        .collect();
    out.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.entity_id.cmp(&b.entity_id)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_core::entity::{Entity, EntityKind, EntityStatus, LineRange, Visibility};
    use cx_core::{DepType, Dependency, Language};

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

    /// a -> b -> c -> d, plus a -> d directly.
    fn chain_graph() -> Graph {
        let entities = vec![entity("a", "f.go"), entity("b", "f.go"), entity("c", "f.go"), entity("d", "f.go")];
        let deps = vec![
            Dependency::new(id("a"), id("b"), DepType::Calls),
            Dependency::new(id("b"), id("c"), DepType::Calls),
            Dependency::new(id("c"), id("d"), DepType::Calls),
            Dependency::new(id("a"), id("d"), DepType::Calls),
        ];
        Graph::build(&entities, &deps)
    }

    #[test]
    fn shortest_path_prefers_the_direct_edge() {
        let g = chain_graph();
        let p = shortest_path(&g, &id("a"), &id("d"), Direction::Forward).unwrap();
        assert_eq!(p.nodes, vec![id("a"), id("d")]);
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn shortest_path_returns_none_when_unreachable() {
        let g = chain_graph();
        assert!(shortest_path(&g, &id("d"), &id("a"), Direction::Forward).is_none());
    }

    #[test]
    fn all_paths_finds_both_routes_ordered_by_length() {
        let g = chain_graph();
        let paths = all_paths(&g, &id("a"), &id("d"), 5);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].nodes, vec![id("a"), id("d")]);
        assert_eq!(paths[1].nodes, vec![id("a"), id("b"), id("c"), id("d")]);
    }

    #[test]
    fn all_paths_respects_max_depth() {
        let g = chain_graph();
        let paths = all_paths(&g, &id("a"), &id("d"), 1);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].nodes, vec![id("a"), id("d")]);
    }

    #[test]
    fn caller_chain_puts_target_first() {
        let g = chain_graph();
        let chain = collect_caller_chain(&g, &id("d"), 5);
        assert_eq!(chain[0], id("d"));
        assert!(chain.contains(&id("a")));
        assert!(chain.contains(&id("c")));
    }

    #[test]
    fn callee_chain_respects_depth() {
        let g = chain_graph();
        let chain = collect_callee_chain(&g, &id("a"), 1);
        assert_eq!(chain, vec![id("a"), id("b"), id("d")]);
    }

    #[test]
    fn impact_radius_unions_callers_of_every_entity_in_the_file() {
        let g = chain_graph();
        let affected = impact_radius(&g, &g.nodes_in_file("f.go"), 5);
        let has = |want: &str| affected.iter().any(|e| e.entity_id == id(want));
        assert!(has("a"));
        assert!(has("b"));
        assert!(has("c"));
    }
}
