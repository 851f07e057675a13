//! `Tag` and `EntityLink` (§3.6): free-form labels and external-system links.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub entity_id: EntityId,
    pub tag: String,
    pub created_by: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalSystem {
    Beads,
    Github,
    Jira,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    Related,
    Implements,
    Fixes,
    DiscoveredFrom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLink {
    pub entity_id: EntityId,
    pub external_system: ExternalSystem,
    pub external_id: String,
    pub link_type: LinkType,
}
