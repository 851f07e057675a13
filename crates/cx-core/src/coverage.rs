//! Coverage and test-attribution model (§3.5).

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCoverage {
    pub entity_id: EntityId,
    pub covered_lines: BTreeSet<u32>,
    pub uncovered_lines: BTreeSet<u32>,
}

impl EntityCoverage {
    pub fn percent(&self) -> f64 {
        let covered = self.covered_lines.len();
        let total = covered + self.uncovered_lines.len();
        if total == 0 {
            0.0
        } else {
            covered as f64 / total as f64 * 100.0
        }
    }
}

/// Populated when a per-test coverage directory is imported; enables
/// test-impact queries (§3.5, §4.7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEntityMap {
    pub test_file: String,
    pub test_name: String,
    pub entity_id: EntityId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_empty_coverage() {
        let c = EntityCoverage {
            entity_id: EntityId("x".to_string()),
            covered_lines: BTreeSet::new(),
            uncovered_lines: BTreeSet::new(),
        };
        assert_eq!(c.percent(), 0.0);
    }

    #[test]
    fn percent_computes_ratio() {
        let c = EntityCoverage {
            entity_id: EntityId("x".to_string()),
            covered_lines: [1, 2, 3].into_iter().collect(),
            uncovered_lines: [4].into_iter().collect(),
        };
        assert_eq!(c.percent(), 75.0);
    }
}
