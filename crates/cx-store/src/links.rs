//! `EntityLink` CRUD (§3.6): pointers to tickets/issues in external systems.

use crate::params::{get_str, str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::annotations::{EntityLink, ExternalSystem, LinkType};
use cx_core::entity::EntityId;
use cx_core::CxError;

fn system_to_str(s: ExternalSystem) -> &'static str {
    match s {
        ExternalSystem::Beads => "beads",
        ExternalSystem::Github => "github",
        ExternalSystem::Jira => "jira",
    }
}

fn str_to_system(s: &str) -> Result<ExternalSystem, CxError> {
    Ok(match s {
        "beads" => ExternalSystem::Beads,
        "github" => ExternalSystem::Github,
        "jira" => ExternalSystem::Jira,
        other => return Err(CxError::Integrity { reason: format!("unknown external_system: {other}") }),
    })
}

fn link_type_to_str(t: LinkType) -> &'static str {
    match t {
        LinkType::Related => "related",
        LinkType::Implements => "implements",
        LinkType::Fixes => "fixes",
        LinkType::DiscoveredFrom => "discovered-from",
    }
}

fn str_to_link_type(s: &str) -> Result<LinkType, CxError> {
    Ok(match s {
        "related" => LinkType::Related,
        "implements" => LinkType::Implements,
        "fixes" => LinkType::Fixes,
        "discovered-from" => LinkType::DiscoveredFrom,
        other => return Err(CxError::Integrity { reason: format!("unknown link_type: {other}") }),
    })
}

impl Store {
    pub async fn create_link(&self, link: &EntityLink) -> Result<(), CxError> {
        let query = "?[entity_id, external_system, link_type, external_id] <- \
                     [[$entity_id, $external_system, $link_type, $external_id]] \
                     :put EntityLinks { entity_id, external_system, link_type => external_id }";
        let mut params = Params::new();
        params.insert("entity_id".into(), str_param(link.entity_id.0.clone()));
        params.insert("external_system".into(), str_param(system_to_str(link.external_system)));
        params.insert("link_type".into(), str_param(link_type_to_str(link.link_type)));
        params.insert("external_id".into(), str_param(link.external_id.clone()));
        self.db()
            .run_script(query, params, ScriptMutability::Mutable)
            .map_err(|e| CxError::StoreConflict { reason: format!("create_link: {e}") })?;
        Ok(())
    }

    pub async fn delete_link(
        &self,
        entity_id: &EntityId,
        system: ExternalSystem,
        link_type: LinkType,
    ) -> Result<(), CxError> {
        let query = "?[entity_id, external_system, link_type] <- \
                     [[$entity_id, $external_system, $link_type]] \
                     :rm EntityLinks { entity_id, external_system, link_type }";
        let mut params = Params::new();
        params.insert("entity_id".into(), str_param(entity_id.0.clone()));
        params.insert("external_system".into(), str_param(system_to_str(system)));
        params.insert("link_type".into(), str_param(link_type_to_str(link_type)));
        self.db()
            .run_script(query, params, ScriptMutability::Mutable)
            .map_err(|e| CxError::StoreConflict { reason: format!("delete_link: {e}") })?;
        Ok(())
    }

    pub async fn get_links(&self, entity_id: &EntityId) -> Result<Vec<EntityLink>, CxError> {
        let query = "?[entity_id, external_system, link_type, external_id] := \
                     *EntityLinks { entity_id, external_system, link_type, external_id }, \
                     entity_id == $id";
        let mut params = Params::new();
        params.insert("id".into(), str_param(entity_id.0.clone()));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_links: {e}") })?;
        result.rows.iter().map(|r| row_to_link(r)).collect()
    }
}

fn row_to_link(row: &[DataValue]) -> Result<EntityLink, CxError> {
    Ok(EntityLink {
        entity_id: EntityId(get_str(row, 0, "entity_id")?),
        external_system: str_to_system(&get_str(row, 1, "external_system")?)?,
        link_type: str_to_link_type(&get_str(row, 2, "link_type")?)?,
        external_id: get_str(row, 3, "external_id")?,
    })
}
