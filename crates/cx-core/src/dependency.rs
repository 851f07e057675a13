//! The `Dependency` edge (§3.2).

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepType {
    Calls,
    UsesType,
    Implements,
}

/// A directed, typed edge between two entity ids.
///
/// `to_id` may reference an archived entity: historical edges remain valid
/// (§3.2). Deduplication policy: the store upserts on
/// `(from_id, to_id, dep_type)` — see DESIGN.md's open-question (b)
/// decision — so a caller that references the same callee twice in one
/// body produces a single stored row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub from_id: EntityId,
    pub to_id: EntityId,
    pub dep_type: DepType,
}

impl Dependency {
    pub fn new(from_id: EntityId, to_id: EntityId, dep_type: DepType) -> Self {
        Dependency {
            from_id,
            to_id,
            dep_type,
        }
    }
}
