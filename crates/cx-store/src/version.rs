//! The versioning substrate (§3.8, §4.5, §6.2).
//!
//! CozoDB has no native git-style branch/commit model, so this layer is
//! original to this crate rather than grounded in the teacher (see
//! DESIGN.md). It borrows the teacher's content-addressing idiom from
//! `cx_core::hash` for commit hashes, and its `run_script`/`DataValue`
//! plumbing from `storage/cozo_client.rs` for everything else.
//!
//! Model: every commit snapshots the full row for each entity it touched
//! into `EntityLog`, and a put/remove marker for each dependency edge it
//! touched into `DependencyLog`. A ref resolves to a commit hash; the
//! state "as of" that commit is rebuilt by replaying the ancestor chain
//! from the root commit forward, which is why `EntityLog.snapshot` carries
//! the whole serialized `Entity` rather than just its hash columns.

use crate::dependencies::{dep_type_to_str, str_to_dep_type};
use crate::entities::matches_filter;
use crate::params::{get_opt_str, get_str, str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::entity::{Entity, EntityId};
use cx_core::scan::EntityFilter;
use cx_core::version::{Commit, DiffResult, EntityChange, Ref};
use cx_core::{hash, CxError, DepType, Dependency};
use std::collections::{BTreeMap, HashMap, HashSet};

const DEFAULT_AUTHOR: &str = "cx-scan";

impl Store {
    /// `commit(msg) -> hash` (§4.5): snapshots every entity/dependency
    /// touched since the last commit on the current branch.
    pub async fn commit(&self, message: &str) -> Result<String, CxError> {
        let branch = self.current_branch();
        let parent = self.branch_head(&branch).await?;
        let seq = self.next_seq().await?;
        let timestamp = chrono::Utc::now();
        let hash = hash::sig_hash(&format!("{parent:?}|{branch}|{seq}|{message}"));

        let touched = {
            let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
            std::mem::take(&mut *pending)
        };

        for id in &touched.entities {
            if let Some(entity) = self.get_entity(id).await? {
                let snapshot = serde_json::to_string(&entity)?;
                self.log_entity(&hash, id, &snapshot).await?;
            }
        }
        for (from, to, dep_type) in &touched.deps {
            let exists = self.dep_exists(from, to, *dep_type).await?;
            self.log_dependency(&hash, from, to, *dep_type, exists).await?;
        }

        let mut params = Params::new();
        params.insert("hash".into(), str_param(hash.clone()));
        params.insert(
            "parent".into(),
            parent.map(str_param).unwrap_or(DataValue::Null),
        );
        params.insert("message".into(), str_param(message));
        params.insert("author".into(), str_param(DEFAULT_AUTHOR));
        params.insert("branch".into(), str_param(branch.clone()));
        params.insert("seq".into(), DataValue::from(seq));
        params.insert("timestamp".into(), str_param(timestamp.to_rfc3339()));
        self.db()
            .run_script(
                "?[hash, parent, message, author, branch, seq, timestamp] <- \
                 [[$hash, $parent, $message, $author, $branch, $seq, $timestamp]] \
                 :put Commits { hash => parent, message, author, branch, seq, timestamp }",
                params,
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("commit: {e}") })?;

        self.set_branch_head(&branch, &hash).await?;
        Ok(hash)
    }

    pub async fn branch_list(&self) -> Result<Vec<String>, CxError> {
        let result = self
            .db()
            .run_script(
                "?[name] := *Branches { name }",
                Params::new(),
                ScriptMutability::Immutable,
            )
            .map_err(|e| CxError::Integrity { reason: format!("branch_list: {e}") })?;
        result.rows.iter().map(|r| get_str(r, 0, "name")).collect()
    }

    /// Creates `name` pointing at the current branch's head (a branch
    /// point, like `git branch <name>`).
    pub async fn branch_create(&self, name: &str) -> Result<(), CxError> {
        let head = self.branch_head(&self.current_branch()).await?;
        let mut params = Params::new();
        params.insert("name".into(), str_param(name));
        params.insert("head".into(), head.map(str_param).unwrap_or(DataValue::Null));
        self.db()
            .run_script(
                "?[name, head] <- [[$name, $head]] :put Branches { name => head }",
                params,
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("branch_create: {e}") })?;
        Ok(())
    }

    pub async fn branch_delete(&self, name: &str) -> Result<(), CxError> {
        if name == self.current_branch() {
            return Err(CxError::Integrity {
                reason: format!("cannot delete the checked-out branch `{name}`"),
            });
        }
        let mut params = Params::new();
        params.insert("name".into(), str_param(name));
        self.db()
            .run_script(
                "?[name] <- [[$name]] :rm Branches { name }",
                params,
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("branch_delete: {e}") })?;
        Ok(())
    }

    /// Switches the current branch. Only plain branch refs are supported;
    /// a detached checkout onto an arbitrary commit is out of scope for
    /// this store (see DESIGN.md).
    pub async fn checkout(&self, r: &Ref) -> Result<(), CxError> {
        match r {
            Ref::Branch(name) => {
                if !self.branch_exists(name).await? {
                    return Err(CxError::InvalidRef { raw: name.clone() });
                }
                *self.current_branch.lock().unwrap_or_else(|p| p.into_inner()) = name.clone();
                Ok(())
            }
            other => Err(CxError::InvalidRef { raw: format!("{other:?}") }),
        }
    }

    /// `reset(ref, hard)`: moves the current branch's head to `ref`. When
    /// `hard`, also overwrites the live `Entities`/`Dependencies` tables
    /// with the state replayed at that commit (`git reset --hard`).
    pub async fn reset(&self, r: &Ref, hard: bool) -> Result<(), CxError> {
        let target = self
            .resolve_to_commit(r)
            .await?
            .ok_or_else(|| CxError::InvalidRef { raw: format!("{r:?}") })?;
        let branch = self.current_branch();
        self.set_branch_head(&branch, &target).await?;

        if hard {
            let (entities, deps) = self.materialize_at(&target).await?;
            self.replace_entities_table(entities).await?;
            self.replace_dependencies_table(deps).await?;
        }
        Ok(())
    }

    /// `log(limit)`: commits on the current branch, newest first.
    pub async fn log(&self, limit: usize) -> Result<Vec<Commit>, CxError> {
        let head = self.branch_head(&self.current_branch()).await?;
        let mut out = Vec::new();
        let mut cursor = head;
        while let Some(hash) = cursor {
            if out.len() >= limit {
                break;
            }
            let commit = self.get_commit(&hash).await?.ok_or_else(|| CxError::Integrity {
                reason: format!("dangling commit reference {hash}"),
            })?;
            cursor = self.commit_parent(&hash).await?;
            out.push(commit);
        }
        Ok(out)
    }

    /// `entity_history(id, limit)`: every commit that logged a snapshot of
    /// `id`, newest first, paired with that snapshot.
    pub async fn entity_history(&self, id: &EntityId, limit: usize) -> Result<Vec<(Commit, Entity)>, CxError> {
        let query = "?[commit_hash, snapshot] := *EntityLog { commit_hash, entity_id, snapshot }, \
                     entity_id == $id";
        let mut params = Params::new();
        params.insert("id".into(), str_param(id.0.clone()));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("entity_history: {e}") })?;

        let mut pairs = Vec::new();
        for row in &result.rows {
            let hash = get_str(row, 0, "commit_hash")?;
            let snapshot = get_opt_str(row, 1, "snapshot")?;
            let Some(snapshot) = snapshot else { continue };
            let entity: Entity = serde_json::from_str(&snapshot)?;
            let commit = self.get_commit(&hash).await?.ok_or_else(|| CxError::Integrity {
                reason: format!("dangling commit reference {hash}"),
            })?;
            pairs.push((commit, entity));
        }
        pairs.sort_by(|a, b| b.0.timestamp.cmp(&a.0.timestamp));
        pairs.truncate(limit);
        Ok(pairs)
    }

    /// `dependency_history(id, limit)`: commits that added or removed an
    /// edge touching `id` (as either endpoint), newest first.
    pub async fn dependency_history(
        &self,
        id: &EntityId,
        limit: usize,
    ) -> Result<Vec<(Commit, Dependency, bool)>, CxError> {
        let query = "?[commit_hash, from_id, to_id, dep_type, op] := \
                     *DependencyLog { commit_hash, from_id, to_id, dep_type, op }, \
                     (from_id == $id or to_id == $id)";
        let mut params = Params::new();
        params.insert("id".into(), str_param(id.0.clone()));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("dependency_history: {e}") })?;

        let mut out = Vec::new();
        for row in &result.rows {
            let hash = get_str(row, 0, "commit_hash")?;
            let from_id = EntityId(get_str(row, 1, "from_id")?);
            let to_id = EntityId(get_str(row, 2, "to_id")?);
            let dep_type = str_to_dep_type(&get_str(row, 3, "dep_type")?)?;
            let added = get_str(row, 4, "op")? == "put";
            let commit = self.get_commit(&hash).await?.ok_or_else(|| CxError::Integrity {
                reason: format!("dangling commit reference {hash}"),
            })?;
            out.push((commit, Dependency::new(from_id, to_id, dep_type), added));
        }
        out.sort_by(|a, b| b.0.timestamp.cmp(&a.0.timestamp));
        out.truncate(limit);
        Ok(out)
    }

    /// `diff(from, to, table, filter)` (§4.5). Only `"entities"` is
    /// supported; dependency-table diffing is not exposed through the
    /// typed `DiffResult` (see DESIGN.md).
    ///
    /// An entity touched by any commit strictly between `from` and `to`
    /// counts as modified even if its net state round-trips (e.g.
    /// archived then reactivated) — comparing only the two endpoint
    /// snapshots would miss that (§8: a status toggle and back still
    /// counts as a change).
    pub async fn diff(&self, from: &Ref, to: &Ref, table: &str, filter: &EntityFilter) -> Result<DiffResult, CxError> {
        if table != "entities" {
            return Err(CxError::Integrity {
                reason: format!("diff: unsupported table `{table}`"),
            });
        }
        let from_hash = self.resolve_to_commit(from).await?;
        let to_hash = self.resolve_to_commit(to).await?;

        let before = match &from_hash {
            Some(h) => self.materialize_at(h).await?.0,
            None => self.query_entities(&EntityFilter::default()).await?,
        };
        let after = match &to_hash {
            Some(h) => self.materialize_at(h).await?.0,
            None => self.query_entities(&EntityFilter::default()).await?,
        };
        let touched = match &to_hash {
            Some(to) => self.entity_ids_touched_after(from_hash.as_deref(), to).await?,
            None => HashSet::new(),
        };

        let before_map: HashMap<&EntityId, &Entity> = before.iter().map(|e| (&e.id, e)).collect();
        let after_map: HashMap<&EntityId, &Entity> = after.iter().map(|e| (&e.id, e)).collect();

        let mut result = DiffResult::default();
        for e in &after {
            if !matches_filter(e, filter) {
                continue;
            }
            match before_map.get(&e.id) {
                None => result.added.push(to_change(e, None)),
                Some(old)
                    if touched.contains(&e.id)
                        || old.sig_hash != e.sig_hash
                        || old.body_hash != e.body_hash
                        || old.status != e.status =>
                {
                    result.modified.push(to_change(e, Some(old)));
                }
                _ => {}
            }
        }
        for e in &before {
            if matches_filter(e, filter) && !after_map.contains_key(&e.id) {
                result.removed.push(to_change(e, None));
            }
        }
        Ok(result)
    }

    /// `query_entities(filter) AS OF ref` (§8 invariant 10).
    pub async fn query_entities_as_of(&self, filter: &EntityFilter, r: &Ref) -> Result<Vec<Entity>, CxError> {
        match self.resolve_to_commit(r).await? {
            None => self.query_entities(filter).await,
            Some(hash) => {
                let (entities, _) = self.materialize_at(&hash).await?;
                let mut rows: Vec<Entity> = entities.into_iter().filter(|e| matches_filter(e, filter)).collect();
                rows.sort_by(|a, b| (a.file_path.clone(), a.lines.start).cmp(&(b.file_path.clone(), b.lines.start)));
                if let Some(limit) = filter.limit {
                    rows.truncate(limit);
                }
                Ok(rows)
            }
        }
    }

    // -- internal plumbing --

    pub(crate) async fn resolve_to_commit(&self, r: &Ref) -> Result<Option<String>, CxError> {
        match r {
            Ref::Working => Ok(None),
            Ref::Head => self.branch_head(&self.current_branch()).await,
            Ref::Branch(name) => {
                if !self.branch_exists(name).await? {
                    return Err(CxError::InvalidRef { raw: name.clone() });
                }
                self.branch_head(name).await
            }
            Ref::Commit(hash) => {
                if self.get_commit(hash).await?.is_some() {
                    Ok(Some(hash.clone()))
                } else {
                    Err(CxError::InvalidRef { raw: hash.clone() })
                }
            }
            Ref::HeadRelative(n) => {
                let mut cursor = self.branch_head(&self.current_branch()).await?;
                for _ in 0..*n {
                    cursor = match cursor {
                        Some(h) => self.commit_parent(&h).await?,
                        None => None,
                    };
                }
                Ok(cursor)
            }
            Ref::Tag(name) => Err(CxError::InvalidRef { raw: name.clone() }),
        }
    }

    async fn branch_exists(&self, name: &str) -> Result<bool, CxError> {
        let query = "?[name] := *Branches { name }, name == $name";
        let mut params = Params::new();
        params.insert("name".into(), str_param(name));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("branch_exists: {e}") })?;
        Ok(!result.rows.is_empty())
    }

    async fn branch_head(&self, name: &str) -> Result<Option<String>, CxError> {
        let query = "?[head] := *Branches { name, head }, name == $name";
        let mut params = Params::new();
        params.insert("name".into(), str_param(name));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("branch_head: {e}") })?;
        match result.rows.first() {
            Some(row) => get_opt_str(row, 0, "head"),
            None => Ok(None),
        }
    }

    async fn set_branch_head(&self, name: &str, hash: &str) -> Result<(), CxError> {
        let mut params = Params::new();
        params.insert("name".into(), str_param(name));
        params.insert("head".into(), str_param(hash));
        self.db()
            .run_script(
                "?[name, head] <- [[$name, $head]] :put Branches { name => head }",
                params,
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("set_branch_head: {e}") })?;
        Ok(())
    }

    async fn next_seq(&self) -> Result<i64, CxError> {
        let result = self
            .db()
            .run_script(
                "?[count(hash)] := *Commits { hash }",
                Params::new(),
                ScriptMutability::Immutable,
            )
            .map_err(|e| CxError::Integrity { reason: format!("next_seq: {e}") })?;
        match result.rows.first().and_then(|r| r.first()) {
            Some(DataValue::Num(n)) => Ok(match n {
                cozo::Num::Int(i) => i + 1,
                cozo::Num::Float(f) => *f as i64 + 1,
            }),
            _ => Ok(0),
        }
    }

    async fn get_commit(&self, hash: &str) -> Result<Option<Commit>, CxError> {
        let query = "?[hash, parent, message, author, branch, timestamp] := \
                     *Commits { hash, parent, message, author, branch, timestamp }, hash == $hash";
        let mut params = Params::new();
        params.insert("hash".into(), str_param(hash));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_commit: {e}") })?;
        result.rows.first().map(|r| row_to_commit(r)).transpose()
    }

    async fn commit_parent(&self, hash: &str) -> Result<Option<String>, CxError> {
        let query = "?[parent] := *Commits { hash, parent }, hash == $hash";
        let mut params = Params::new();
        params.insert("hash".into(), str_param(hash));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("commit_parent: {e}") })?;
        match result.rows.first() {
            Some(row) => get_opt_str(row, 0, "parent"),
            None => Ok(None),
        }
    }

    async fn log_entity(&self, commit_hash: &str, id: &EntityId, snapshot: &str) -> Result<(), CxError> {
        let mut params = Params::new();
        params.insert("commit_hash".into(), str_param(commit_hash));
        params.insert("entity_id".into(), str_param(id.0.clone()));
        params.insert("op".into(), str_param("put"));
        params.insert("snapshot".into(), str_param(snapshot));
        self.db()
            .run_script(
                "?[commit_hash, entity_id, op, snapshot] <- [[$commit_hash, $entity_id, $op, $snapshot]] \
                 :put EntityLog { commit_hash, entity_id => op, snapshot }",
                params,
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("log_entity: {e}") })?;
        Ok(())
    }

    async fn log_dependency(
        &self,
        commit_hash: &str,
        from: &EntityId,
        to: &EntityId,
        dep_type: DepType,
        exists: bool,
    ) -> Result<(), CxError> {
        let mut params = Params::new();
        params.insert("commit_hash".into(), str_param(commit_hash));
        params.insert("from_id".into(), str_param(from.0.clone()));
        params.insert("to_id".into(), str_param(to.0.clone()));
        params.insert("dep_type".into(), str_param(dep_type_to_str(dep_type)));
        params.insert("op".into(), str_param(if exists { "put" } else { "rm" }));
        self.db()
            .run_script(
                "?[commit_hash, from_id, to_id, dep_type, op] <- \
                 [[$commit_hash, $from_id, $to_id, $dep_type, $op]] \
                 :put DependencyLog { commit_hash, from_id, to_id, dep_type => op }",
                params,
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("log_dependency: {e}") })?;
        Ok(())
    }

    /// Entity ids logged by any commit in `(from, to]` (walking `to`'s
    /// ancestor chain backward, stopping at `from` exclusive or genesis).
    /// `from = None` means "since the beginning of history".
    async fn entity_ids_touched_after(&self, from: Option<&str>, to: &str) -> Result<HashSet<EntityId>, CxError> {
        let mut touched = HashSet::new();
        let mut cursor = Some(to.to_string());
        while let Some(hash) = cursor {
            if Some(hash.as_str()) == from {
                break;
            }
            let query = "?[entity_id] := *EntityLog { commit_hash, entity_id }, commit_hash == $hash";
            let mut params = Params::new();
            params.insert("hash".into(), str_param(hash.clone()));
            let result = self
                .db()
                .run_script(query, params, ScriptMutability::Immutable)
                .map_err(|e| CxError::Integrity { reason: format!("entity_ids_touched_after: {e}") })?;
            for row in &result.rows {
                touched.insert(EntityId(get_str(row, 0, "entity_id")?));
            }
            cursor = self.commit_parent(&hash).await?;
        }
        Ok(touched)
    }

    async fn dep_exists(&self, from: &EntityId, to: &EntityId, dep_type: DepType) -> Result<bool, CxError> {
        let query = "?[from_id] := *Dependencies { from_id, to_id, dep_type }, \
                     from_id == $from, to_id == $to, dep_type == $dep_type";
        let mut params = Params::new();
        params.insert("from".into(), str_param(from.0.clone()));
        params.insert("to".into(), str_param(to.0.clone()));
        params.insert("dep_type".into(), str_param(dep_type_to_str(dep_type)));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("dep_exists: {e}") })?;
        Ok(!result.rows.is_empty())
    }

    /// Replays the ancestor chain from genesis to `target` (inclusive),
    /// returning the materialized entity set and dependency set at that
    /// point in history.
    async fn materialize_at(&self, target: &str) -> Result<(Vec<Entity>, Vec<Dependency>), CxError> {
        let mut chain = Vec::new();
        let mut cursor = Some(target.to_string());
        while let Some(hash) = cursor {
            cursor = self.commit_parent(&hash).await?;
            chain.push(hash);
        }
        chain.reverse();

        let mut entities: BTreeMap<EntityId, Entity> = BTreeMap::new();
        let mut deps: HashSet<(EntityId, EntityId, DepType)> = HashSet::new();

        for commit_hash in &chain {
            let query = "?[entity_id, snapshot] := *EntityLog { commit_hash, entity_id, snapshot }, \
                         commit_hash == $hash";
            let mut params = Params::new();
            params.insert("hash".into(), str_param(commit_hash.clone()));
            let result = self
                .db()
                .run_script(query, params, ScriptMutability::Immutable)
                .map_err(|e| CxError::Integrity { reason: format!("materialize_at (entities): {e}") })?;
            for row in &result.rows {
                if let Some(snapshot) = get_opt_str(row, 1, "snapshot")? {
                    let entity: Entity = serde_json::from_str(&snapshot)?;
                    entities.insert(entity.id.clone(), entity);
                }
            }

            let query = "?[from_id, to_id, dep_type, op] := \
                         *DependencyLog { commit_hash, from_id, to_id, dep_type, op }, \
                         commit_hash == $hash";
            let mut params = Params::new();
            params.insert("hash".into(), str_param(commit_hash.clone()));
            let result = self
                .db()
                .run_script(query, params, ScriptMutability::Immutable)
                .map_err(|e| CxError::Integrity { reason: format!("materialize_at (deps): {e}") })?;
            for row in &result.rows {
                let from_id = EntityId(get_str(row, 0, "from_id")?);
                let to_id = EntityId(get_str(row, 1, "to_id")?);
                let dep_type = str_to_dep_type(&get_str(row, 2, "dep_type")?)?;
                let op = get_str(row, 3, "op")?;
                let key = (from_id, to_id, dep_type);
                if op == "put" {
                    deps.insert(key);
                } else {
                    deps.remove(&key);
                }
            }
        }

        let deps = deps
            .into_iter()
            .map(|(from_id, to_id, dep_type)| Dependency::new(from_id, to_id, dep_type))
            .collect();
        Ok((entities.into_values().collect(), deps))
    }

    async fn replace_entities_table(&self, entities: Vec<Entity>) -> Result<(), CxError> {
        self.db()
            .run_script(
                "?[id] := *Entities { id } :rm Entities { id }",
                Params::new(),
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("replace_entities_table: {e}") })?;
        self.create_entities_bulk(&entities).await
    }

    async fn replace_dependencies_table(&self, deps: Vec<Dependency>) -> Result<(), CxError> {
        self.db()
            .run_script(
                "?[from_id, to_id, dep_type] := *Dependencies { from_id, to_id, dep_type } \
                 :rm Dependencies { from_id, to_id, dep_type }",
                Params::new(),
                ScriptMutability::Mutable,
            )
            .map_err(|e| CxError::StoreConflict { reason: format!("replace_dependencies_table: {e}") })?;
        self.create_deps_bulk(&deps).await
    }
}

fn row_to_commit(row: &[DataValue]) -> Result<Commit, CxError> {
    Ok(Commit {
        hash: get_str(row, 0, "hash")?,
        message: get_str(row, 2, "message")?,
        author: get_str(row, 3, "author")?,
        branch: get_str(row, 4, "branch")?,
        timestamp: chrono::DateTime::parse_from_rfc3339(&get_str(row, 5, "timestamp")?)
            .map_err(|e| CxError::Integrity { reason: format!("timestamp: {e}") })?
            .with_timezone(&chrono::Utc),
    })
}

fn to_change(entity: &Entity, old: Option<&Entity>) -> EntityChange {
    EntityChange {
        entity_id: entity.id.clone(),
        name: entity.name.clone(),
        file_path: entity.file_path.clone(),
        line_start: entity.lines.start,
        old_sig_hash: old.map(|e| e.sig_hash.clone()),
        new_sig_hash: Some(entity.sig_hash.clone()),
        old_body_hash: old.map(|e| e.body_hash.clone()),
        new_body_hash: Some(entity.body_hash.clone()),
    }
}
