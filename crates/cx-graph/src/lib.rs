//! Graph analytics (C6): an in-memory adjacency snapshot built once from
//! `cx-store` (C5), plus PageRank, Brandes betweenness, degree metrics,
//! and BFS/DFS traversal primitives over it.

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod betweenness;
pub mod graph;
pub mod metrics;
pub mod pagerank;
pub mod traversal;

pub use betweenness::{betweenness, BetweennessResult};
pub use graph::{DegreeReport, Direction, Graph};
pub use metrics::{compute_all, compute_and_persist, to_metrics, ComputedMetrics};
pub use pagerank::{pagerank, PageRankConfig};
pub use traversal::{all_paths, collect_callee_chain, collect_caller_chain, impact_radius, shortest_path, ImpactedEntity, Path};
