//! In-memory adjacency snapshot (§4.6 "Build"), grounded on the
//! `DependencyEdges`/`calculate_blast_radius` shape in
//! `storage/cozo_client.rs`: load every edge once, then answer
//! neighbor/path queries against plain vectors rather than re-querying
//! the store per hop.

use std::collections::{BTreeMap, HashMap};

use cx_core::entity::{Entity, EntityId};
use cx_core::scan::EntityFilter;
use cx_core::{CxError, DepType, Dependency};
use cx_store::Store;

/// Which adjacency to walk: the edges an entity points at, or the edges
/// that point at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Degree counts for one node, broken out by edge type (§4.6 "Degrees").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DegreeReport {
    pub in_degree: u32,
    pub out_degree: u32,
    pub in_degree_by_type: BTreeMap<DepType, u32>,
    pub out_degree_by_type: BTreeMap<DepType, u32>,
}

/// A directed adjacency snapshot over the active entity set. Built once
/// from a `Store`; never retains a handle to it afterward (§4.6).
pub struct Graph {
    nodes: Vec<EntityId>,
    index: HashMap<EntityId, usize>,
    node_file: Vec<String>,
    file_index: HashMap<String, Vec<usize>>,
    forward: Vec<Vec<(usize, DepType)>>,
    reverse: Vec<Vec<(usize, DepType)>>,
}

impl Graph {
    /// Loads every active entity as a node and every `calls`/`uses_type`
    /// edge between two active entities as a directed edge. `implements`
    /// edges are tracked in the store but excluded from this adjacency —
    /// they describe a type relationship, not a call-graph or
    /// reachability relationship, so PageRank/betweenness/traversal over
    /// them would mix two different notions of "importance".
    pub async fn build_from_store(store: &Store) -> Result<Self, CxError> {
        let entities = store.query_entities(&EntityFilter::default()).await?;
        let deps = store.get_all_deps().await?;
        let graph = Self::build(&entities, &deps);
        tracing::debug!(nodes = graph.node_count(), edges = graph.edge_count(), "built graph snapshot");
        Ok(graph)
    }

    /// Builds directly from entity/dependency lists, for tests and for
    /// building a graph over a historical (`AS OF`) snapshot without a
    /// live `Store`.
    pub fn build(entities: &[Entity], deps: &[Dependency]) -> Self {
        let mut sorted: Vec<&Entity> = entities.iter().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let nodes: Vec<EntityId> = sorted.iter().map(|e| e.id.clone()).collect();
        let node_file: Vec<String> = sorted.iter().map(|e| e.file_path.clone()).collect();
        let index: HashMap<EntityId, usize> = nodes
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();

        let mut file_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, file) in node_file.iter().enumerate() {
            file_index.entry(file.clone()).or_default().push(i);
        }

        let mut forward = vec![Vec::new(); nodes.len()];
        let mut reverse = vec![Vec::new(); nodes.len()];
        for dep in deps {
            if !matches!(dep.dep_type, DepType::Calls | DepType::UsesType) {
                continue;
            }
            let (Some(&from), Some(&to)) = (index.get(&dep.from_id), index.get(&dep.to_id)) else {
                continue;
            };
            forward[from].push((to, dep.dep_type));
            reverse[to].push((from, dep.dep_type));
        }
        for adj in forward.iter_mut().chain(reverse.iter_mut()) {
            adj.sort();
            adj.dedup();
        }

        Graph { nodes, index, node_file, file_index, forward, reverse }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.iter().map(|a| a.len()).sum()
    }

    /// Nodes in stable sorted order (§4.6 "Determinism").
    pub fn nodes(&self) -> &[EntityId] {
        &self.nodes
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    /// Every node whose `file_path` is `file`, used by `impact_radius`.
    pub fn nodes_in_file(&self, file: &str) -> Vec<EntityId> {
        self.file_index
            .get(file)
            .map(|idxs| idxs.iter().map(|&i| self.nodes[i].clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn idx(&self, id: &EntityId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, i: usize) -> &EntityId {
        &self.nodes[i]
    }

    pub(crate) fn adjacency(&self, dir: Direction) -> &[Vec<(usize, DepType)>] {
        match dir {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        }
    }

    /// Distinct successor node indices of `i`, collapsing the
    /// per-`DepType` multi-edges `adjacency` keeps — PageRank and
    /// betweenness operate on the plain directed graph, not a multigraph.
    pub(crate) fn successor_indices(&self, i: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self.forward[i].iter().map(|(n, _)| *n).collect();
        out.dedup();
        out
    }

    /// Direct neighbors `id` points at, sorted by target id (§4.6
    /// "Determinism").
    pub fn successors(&self, id: &EntityId) -> Vec<EntityId> {
        self.neighbors(id, Direction::Forward)
    }

    /// Direct neighbors that point at `id`.
    pub fn predecessors(&self, id: &EntityId) -> Vec<EntityId> {
        self.neighbors(id, Direction::Reverse)
    }

    fn neighbors(&self, id: &EntityId, dir: Direction) -> Vec<EntityId> {
        let Some(i) = self.idx(id) else { return Vec::new() };
        let mut seen: Vec<EntityId> = self.adjacency(dir)[i]
            .iter()
            .map(|(n, _)| self.nodes[*n].clone())
            .collect();
        seen.dedup();
        seen
    }

    /// Per-type and total degree counts for `id`; zeroed if `id` is not
    /// in the graph.
    pub fn degree(&self, id: &EntityId) -> DegreeReport {
        let mut report = DegreeReport::default();
        let Some(i) = self.idx(id) else { return report };

        for (_, dep_type) in &self.forward[i] {
            report.out_degree += 1;
            *report.out_degree_by_type.entry(*dep_type).or_insert(0) += 1;
        }
        for (_, dep_type) in &self.reverse[i] {
            report.in_degree += 1;
            *report.in_degree_by_type.entry(*dep_type).or_insert(0) += 1;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_core::entity::{EntityKind, LineRange, Visibility};
    use cx_core::Language;

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
            status: cx_core::entity::EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(s: &str) -> EntityId {
        EntityId(s.to_string())
    }

    #[test]
    fn build_dedupes_and_excludes_implements_edges() {
        let entities = vec![entity("a", "a.go"), entity("b", "b.go")];
        let deps = vec![
            Dependency::new(id("a"), id("b"), DepType::Calls),
            Dependency::new(id("a"), id("b"), DepType::Calls),
            Dependency::new(id("a"), id("b"), DepType::Implements),
        ];
        let g = Graph::build(&entities, &deps);
        assert_eq!(g.successors(&id("a")), vec![id("b")]);
        let degree = g.degree(&id("a"));
        assert_eq!(degree.out_degree, 1);
        assert_eq!(degree.out_degree_by_type.get(&DepType::Implements), None);
    }

    #[test]
    fn edges_to_nodes_outside_the_snapshot_are_dropped() {
        let entities = vec![entity("a", "a.go")];
        let deps = vec![Dependency::new(id("a"), id("ghost"), DepType::Calls)];
        let g = Graph::build(&entities, &deps);
        assert!(g.successors(&id("a")).is_empty());
    }

    #[test]
    fn predecessors_and_successors_are_sorted() {
        let entities = vec![entity("a", "a.go"), entity("b", "a.go"), entity("c", "a.go")];
        let deps = vec![
            Dependency::new(id("a"), id("c"), DepType::Calls),
            Dependency::new(id("a"), id("b"), DepType::Calls),
        ];
        let g = Graph::build(&entities, &deps);
        assert_eq!(g.successors(&id("a")), vec![id("b"), id("c")]);
    }

    #[test]
    fn nodes_in_file_groups_by_file_path() {
        let entities = vec![entity("a", "x.go"), entity("b", "x.go"), entity("c", "y.go")];
        let g = Graph::build(&entities, &[]);
        let mut in_x = g.nodes_in_file("x.go");
        in_x.sort();
        assert_eq!(in_x, vec![id("a"), id("b")]);
        assert_eq!(g.nodes_in_file("y.go"), vec![id("c")]);
        assert!(g.nodes_in_file("z.go").is_empty());
    }
}
