//! Tag CRUD (§3.6).

use crate::params::{get_opt_str, get_str, opt_str_param, str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::annotations::Tag;
use cx_core::entity::EntityId;
use cx_core::CxError;
use std::collections::HashSet;

impl Store {
    pub async fn create_tag(&self, tag: &Tag) -> Result<(), CxError> {
        let query = "?[entity_id, tag, created_by, note] <- [[$entity_id, $tag, $created_by, $note]] \
                     :put Tags { entity_id, tag => created_by, note }";
        let mut params = Params::new();
        params.insert("entity_id".into(), str_param(tag.entity_id.0.clone()));
        params.insert("tag".into(), str_param(tag.tag.clone()));
        params.insert("created_by".into(), str_param(tag.created_by.clone()));
        params.insert("note".into(), opt_str_param(tag.note.as_deref()));
        self.db()
            .run_script(query, params, ScriptMutability::Mutable)
            .map_err(|e| CxError::StoreConflict { reason: format!("create_tag: {e}") })?;
        Ok(())
    }

    pub async fn delete_tag(&self, entity_id: &EntityId, tag: &str) -> Result<(), CxError> {
        let query = "?[entity_id, tag] <- [[$entity_id, $tag]] :rm Tags { entity_id, tag }";
        let mut params = Params::new();
        params.insert("entity_id".into(), str_param(entity_id.0.clone()));
        params.insert("tag".into(), str_param(tag));
        self.db()
            .run_script(query, params, ScriptMutability::Mutable)
            .map_err(|e| CxError::StoreConflict { reason: format!("delete_tag: {e}") })?;
        Ok(())
    }

    pub async fn get_tags(&self, entity_id: &EntityId) -> Result<Vec<Tag>, CxError> {
        let query = "?[entity_id, tag, created_by, note] := *Tags { entity_id, tag, created_by, note }, \
                     entity_id == $id";
        let mut params = Params::new();
        params.insert("id".into(), str_param(entity_id.0.clone()));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_tags: {e}") })?;
        result.rows.iter().map(|r| row_to_tag(r)).collect()
    }

    pub(crate) async fn entity_ids_with_tag(&self, tag: &str) -> Result<HashSet<EntityId>, CxError> {
        let query = "?[entity_id] := *Tags { entity_id, tag: t }, t == $tag";
        let mut params = Params::new();
        params.insert("tag".into(), str_param(tag));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("entity_ids_with_tag: {e}") })?;
        result
            .rows
            .iter()
            .map(|r| get_str(r, 0, "entity_id").map(EntityId))
            .collect()
    }
}

fn row_to_tag(row: &[DataValue]) -> Result<Tag, CxError> {
    Ok(Tag {
        entity_id: EntityId(get_str(row, 0, "entity_id")?),
        tag: get_str(row, 1, "tag")?,
        created_by: get_str(row, 2, "created_by")?,
        note: get_opt_str(row, 3, "note")?,
    })
}
