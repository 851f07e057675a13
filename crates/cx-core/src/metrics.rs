//! Per-entity cached graph metrics (§3.3).

use crate::entity::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub entity_id: EntityId,
    pub pagerank: f64,
    pub betweenness: f64,
    pub in_degree: u32,
    pub out_degree: u32,
    pub computed_at: DateTime<Utc>,
}
