//! Entity CRUD and `query_entities` (§4.5), grounded on the teacher's
//! `insert_entity` / `get_entity` / `entity_to_params` / `row_to_entity`.

use crate::params::{get_int, get_opt_str, get_str, int_param, opt_str_param, str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::entity::{Entity, EntityId, EntityKind, EntityStatus, LineRange, TypeKind, Visibility};
use cx_core::scan::EntityFilter;
use cx_core::{CxError, Language};

const ENTITY_COLUMNS: &str = "id, name, qualified_name, kind, type_kind, file_path, line_start, \
    line_end, signature, sig_hash, body_hash, doc_comment, skeleton, receiver, visibility, \
    language, status, created_at, updated_at";

fn entity_to_params(e: &Entity) -> Params {
    let mut p = Params::new();
    p.insert("id".into(), str_param(e.id.0.clone()));
    p.insert("name".into(), str_param(e.name.clone()));
    p.insert("qualified_name".into(), opt_str_param(e.qualified_name.as_deref()));
    p.insert("kind".into(), str_param(kind_to_str(e.kind)));
    p.insert(
        "type_kind".into(),
        opt_str_param(e.type_kind.map(type_kind_to_str)),
    );
    p.insert("file_path".into(), str_param(e.file_path.clone()));
    p.insert("line_start".into(), int_param(e.lines.start as i64));
    p.insert("line_end".into(), int_param(e.lines.end as i64));
    p.insert("signature".into(), str_param(e.signature.clone()));
    p.insert("sig_hash".into(), str_param(e.sig_hash.clone()));
    p.insert("body_hash".into(), str_param(e.body_hash.clone()));
    p.insert("doc_comment".into(), opt_str_param(e.doc_comment.as_deref()));
    p.insert("skeleton".into(), opt_str_param(e.skeleton.as_deref()));
    p.insert("receiver".into(), opt_str_param(e.receiver.as_deref()));
    p.insert("visibility".into(), str_param(visibility_to_str(e.visibility)));
    p.insert("language".into(), str_param(e.language.as_str()));
    p.insert("status".into(), str_param(status_to_str(e.status)));
    p.insert("created_at".into(), str_param(e.created_at.to_rfc3339()));
    p.insert("updated_at".into(), str_param(e.updated_at.to_rfc3339()));
    p
}

fn row_to_entity(row: &[DataValue]) -> Result<Entity, CxError> {
    let type_kind = get_opt_str(row, 4, "type_kind")?
        .map(|s| str_to_type_kind(&s))
        .transpose()?;
    Ok(Entity {
        id: EntityId(get_str(row, 0, "id")?),
        name: get_str(row, 1, "name")?,
        qualified_name: get_opt_str(row, 2, "qualified_name")?,
        kind: str_to_kind(&get_str(row, 3, "kind")?)?,
        type_kind,
        file_path: get_str(row, 5, "file_path")?,
        lines: LineRange::new(get_int(row, 6, "line_start")? as u32, get_int(row, 7, "line_end")? as u32),
        signature: get_str(row, 8, "signature")?,
        sig_hash: get_str(row, 9, "sig_hash")?,
        body_hash: get_str(row, 10, "body_hash")?,
        doc_comment: get_opt_str(row, 11, "doc_comment")?,
        skeleton: get_opt_str(row, 12, "skeleton")?,
        receiver: get_opt_str(row, 13, "receiver")?,
        visibility: str_to_visibility(&get_str(row, 14, "visibility")?)?,
        language: str_to_language(&get_str(row, 15, "language")?)?,
        status: str_to_status(&get_str(row, 16, "status")?)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&get_str(row, 17, "created_at")?)
            .map_err(|e| CxError::Integrity { reason: format!("created_at: {e}") })?
            .with_timezone(&chrono::Utc),
        updated_at: chrono::DateTime::parse_from_rfc3339(&get_str(row, 18, "updated_at")?)
            .map_err(|e| CxError::Integrity { reason: format!("updated_at: {e}") })?
            .with_timezone(&chrono::Utc),
    })
}

fn str_to_language(s: &str) -> Result<Language, CxError> {
    Language::ALL
        .iter()
        .copied()
        .find(|l| l.as_str() == s)
        .ok_or_else(|| CxError::Integrity { reason: format!("unknown language: {s}") })
}

fn kind_to_str(k: EntityKind) -> &'static str {
    match k {
        EntityKind::Function => "function",
        EntityKind::Method => "method",
        EntityKind::Type => "type",
        EntityKind::Constant => "constant",
        EntityKind::Variable => "variable",
        EntityKind::Enum => "enum",
        EntityKind::Import => "import",
    }
}

fn str_to_kind(s: &str) -> Result<EntityKind, CxError> {
    Ok(match s {
        "function" => EntityKind::Function,
        "method" => EntityKind::Method,
        "type" => EntityKind::Type,
        "constant" => EntityKind::Constant,
        "variable" => EntityKind::Variable,
        "enum" => EntityKind::Enum,
        "import" => EntityKind::Import,
        other => return Err(CxError::Integrity { reason: format!("unknown kind: {other}") }),
    })
}

fn type_kind_to_str(k: TypeKind) -> &'static str {
    match k {
        TypeKind::Struct => "struct",
        TypeKind::Interface => "interface",
        TypeKind::Class => "class",
        TypeKind::Enum => "enum",
        TypeKind::Alias => "alias",
    }
}

fn str_to_type_kind(s: &str) -> Result<TypeKind, CxError> {
    Ok(match s {
        "struct" => TypeKind::Struct,
        "interface" => TypeKind::Interface,
        "class" => TypeKind::Class,
        "enum" => TypeKind::Enum,
        "alias" => TypeKind::Alias,
        other => return Err(CxError::Integrity { reason: format!("unknown type_kind: {other}") }),
    })
}

fn visibility_to_str(v: Visibility) -> &'static str {
    match v {
        Visibility::Public => "public",
        Visibility::Private => "private",
        Visibility::Protected => "protected",
        Visibility::Package => "package",
    }
}

fn str_to_visibility(s: &str) -> Result<Visibility, CxError> {
    Ok(match s {
        "public" => Visibility::Public,
        "private" => Visibility::Private,
        "protected" => Visibility::Protected,
        "package" => Visibility::Package,
        other => return Err(CxError::Integrity { reason: format!("unknown visibility: {other}") }),
    })
}

fn status_to_str(s: EntityStatus) -> &'static str {
    match s {
        EntityStatus::Active => "active",
        EntityStatus::Archived => "archived",
    }
}

fn str_to_status(s: &str) -> Result<EntityStatus, CxError> {
    Ok(match s {
        "active" => EntityStatus::Active,
        "archived" => EntityStatus::Archived,
        other => return Err(CxError::Integrity { reason: format!("unknown status: {other}") }),
    })
}

/// The predicate behind `query_entities`, shared with the `AS OF`/`diff`
/// paths in `version.rs` so live and historical reads agree (§8 invariant
/// 10).
pub(crate) fn matches_filter(e: &Entity, filter: &EntityFilter) -> bool {
    let active_only = filter.status_active_only.unwrap_or(true);
    if active_only && e.status != EntityStatus::Active {
        return false;
    }
    if let Some(name) = &filter.name {
        if &e.name != name {
            return false;
        }
    }
    if let Some(kind) = filter.kind {
        if e.kind != kind {
            return false;
        }
    }
    if let Some(prefix) = &filter.file_path_prefix {
        if !e.file_path.starts_with(prefix.as_str()) {
            return false;
        }
    }
    if let Some(language) = filter.language {
        if e.language != language {
            return false;
        }
    }
    if let Some(visibility) = filter.visibility {
        if e.visibility != visibility {
            return false;
        }
    }
    true
}

impl Store {
    /// Inserts or replaces entity rows (`:put` upsert, same as the
    /// teacher's `insert_entity`/`update_entity_internal` pair).
    pub async fn create_entities_bulk(&self, entities: &[Entity]) -> Result<(), CxError> {
        for e in entities {
            let query = format!(
                "?[{ENTITY_COLUMNS}] <- [[$id, $name, $qualified_name, $kind, $type_kind, \
                 $file_path, $line_start, $line_end, $signature, $sig_hash, $body_hash, \
                 $doc_comment, $skeleton, $receiver, $visibility, $language, $status, \
                 $created_at, $updated_at]] :put Entities {{ id => name, qualified_name, kind, \
                 type_kind, file_path, line_start, line_end, signature, sig_hash, body_hash, \
                 doc_comment, skeleton, receiver, visibility, language, status, created_at, \
                 updated_at }}"
            );
            self.db()
                .run_script(&query, entity_to_params(e), ScriptMutability::Mutable)
                .map_err(|err| CxError::StoreConflict { reason: format!("insert entity {}: {err}", e.id) })?;
            self.touch_entity(&e.id);
        }
        Ok(())
    }

    pub async fn update_entity(&self, entity: &Entity) -> Result<(), CxError> {
        self.create_entities_bulk(std::slice::from_ref(entity)).await
    }

    pub async fn get_entity(&self, id: &EntityId) -> Result<Option<Entity>, CxError> {
        let query = format!("?[{ENTITY_COLUMNS}] := *Entities {{ {ENTITY_COLUMNS} }}, id == $id");
        let mut params = Params::new();
        params.insert("id".into(), str_param(id.0.clone()));
        let result = self
            .db()
            .run_script(&query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_entity: {e}") })?;
        result.rows.first().map(|r| row_to_entity(r)).transpose()
    }

    /// Marks an entity archived (§4.4 archival step). Leaves the row in
    /// place so historical dependency edges still resolve (§3.2, §8
    /// invariant 6).
    pub async fn archive_entity(&self, id: &EntityId) -> Result<(), CxError> {
        if let Some(mut e) = self.get_entity(id).await? {
            e.status = EntityStatus::Archived;
            e.updated_at = chrono::Utc::now();
            self.update_entity(&e).await?;
        }
        Ok(())
    }

    /// Returns every active entity id within `scope` (a `file_path` prefix),
    /// used by the scanner to determine which active entities were not
    /// "seen" during a scoped scan (§4.4 scope semantics).
    pub async fn active_ids_in_scope(&self, scope_prefix: &str) -> Result<Vec<EntityId>, CxError> {
        let filter = EntityFilter {
            file_path_prefix: Some(scope_prefix.to_string()),
            status_active_only: Some(true),
            ..Default::default()
        };
        Ok(self
            .query_entities(&filter)
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect())
    }

    /// `query_entities(filter)` (§4.5): sorted by `(file_path, line_start)`.
    pub async fn query_entities(&self, filter: &EntityFilter) -> Result<Vec<Entity>, CxError> {
        let query = format!("?[{ENTITY_COLUMNS}] := *Entities {{ {ENTITY_COLUMNS} }}");
        let result = self
            .db()
            .run_script(&query, Params::new(), ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("query_entities: {e}") })?;

        let mut rows = result
            .rows
            .iter()
            .map(|r| row_to_entity(r))
            .collect::<Result<Vec<_>, _>>()?;

        rows.retain(|e| matches_filter(e, filter));

        if let Some(tag) = &filter.tag {
            let tagged = self.entity_ids_with_tag(tag).await?;
            rows.retain(|e| tagged.contains(&e.id));
        }

        rows.sort_by(|a, b| (a.file_path.as_str(), a.lines.start).cmp(&(b.file_path.as_str(), b.lines.start)));

        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }
}
