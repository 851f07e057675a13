//! Dependency-edge CRUD, grounded on the teacher's `insert_edge` /
//! `insert_edges_batch` / `get_forward_dependencies` /
//! `get_reverse_dependencies`, generalized from one `Calls` edge type to
//! the three `DepType` variants this engine tracks.

use crate::params::{str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::entity::EntityId;
use cx_core::{CxError, DepType, Dependency};

pub(crate) fn dep_type_to_str(t: DepType) -> &'static str {
    match t {
        DepType::Calls => "calls",
        DepType::UsesType => "uses_type",
        DepType::Implements => "implements",
    }
}

pub(crate) fn str_to_dep_type(s: &str) -> Result<DepType, CxError> {
    Ok(match s {
        "calls" => DepType::Calls,
        "uses_type" => DepType::UsesType,
        "implements" => DepType::Implements,
        other => return Err(CxError::Integrity { reason: format!("unknown dep_type: {other}") }),
    })
}

impl Store {
    /// Bulk-inserts dependency edges. Upserts on `(from_id, to_id, dep_type)`
    /// (DESIGN.md open-question (b)): a caller that references the same
    /// callee twice in one body produces one stored row.
    pub async fn create_deps_bulk(&self, deps: &[Dependency]) -> Result<(), CxError> {
        for d in deps {
            let query = "?[from_id, to_id, dep_type] <- [[$from_id, $to_id, $dep_type]] \
                         :put Dependencies { from_id, to_id, dep_type }";
            let mut params = Params::new();
            params.insert("from_id".into(), str_param(d.from_id.0.clone()));
            params.insert("to_id".into(), str_param(d.to_id.0.clone()));
            params.insert("dep_type".into(), str_param(dep_type_to_str(d.dep_type)));
            self.db()
                .run_script(query, params, ScriptMutability::Mutable)
                .map_err(|e| CxError::StoreConflict { reason: format!("insert dependency: {e}") })?;
            self.touch_dep(&d.from_id, &d.to_id, d.dep_type);
        }
        Ok(())
    }

    pub async fn delete_dep(&self, from: &EntityId, to: &EntityId, dep_type: DepType) -> Result<(), CxError> {
        let query = "?[from_id, to_id, dep_type] <- [[$from_id, $to_id, $dep_type]] \
                     :rm Dependencies { from_id, to_id, dep_type }";
        let mut params = Params::new();
        params.insert("from_id".into(), str_param(from.0.clone()));
        params.insert("to_id".into(), str_param(to.0.clone()));
        params.insert("dep_type".into(), str_param(dep_type_to_str(dep_type)));
        self.db()
            .run_script(query, params, ScriptMutability::Mutable)
            .map_err(|e| CxError::StoreConflict { reason: format!("delete dependency: {e}") })?;
        self.touch_dep(from, to, dep_type);
        Ok(())
    }

    /// Outgoing edges: what `id` depends on.
    pub async fn get_deps_from(&self, id: &EntityId) -> Result<Vec<Dependency>, CxError> {
        let query = "?[from_id, to_id, dep_type] := *Dependencies { from_id, to_id, dep_type }, \
                     from_id == $id";
        let mut params = Params::new();
        params.insert("id".into(), str_param(id.0.clone()));
        self.run_dep_query(query, params).await
    }

    /// Incoming edges: what depends on `id`.
    pub async fn get_deps_to(&self, id: &EntityId) -> Result<Vec<Dependency>, CxError> {
        let query = "?[from_id, to_id, dep_type] := *Dependencies { from_id, to_id, dep_type }, \
                     to_id == $id";
        let mut params = Params::new();
        params.insert("id".into(), str_param(id.0.clone()));
        self.run_dep_query(query, params).await
    }

    pub async fn get_all_deps(&self) -> Result<Vec<Dependency>, CxError> {
        let query = "?[from_id, to_id, dep_type] := *Dependencies { from_id, to_id, dep_type }";
        self.run_dep_query(query, Params::new()).await
    }

    async fn run_dep_query(&self, query: &str, params: Params) -> Result<Vec<Dependency>, CxError> {
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("dependency query: {e}") })?;
        result
            .rows
            .iter()
            .map(|row| row_to_dependency(row))
            .collect()
    }
}

fn row_to_dependency(row: &[DataValue]) -> Result<Dependency, CxError> {
    let from_id = match row.first() {
        Some(DataValue::Str(s)) => EntityId(s.to_string()),
        other => return Err(CxError::Integrity { reason: format!("from_id: {other:?}") }),
    };
    let to_id = match row.get(1) {
        Some(DataValue::Str(s)) => EntityId(s.to_string()),
        other => return Err(CxError::Integrity { reason: format!("to_id: {other:?}") }),
    };
    let dep_type = match row.get(2) {
        Some(DataValue::Str(s)) => str_to_dep_type(s.as_ref())?,
        other => return Err(CxError::Integrity { reason: format!("dep_type: {other:?}") }),
    };
    Ok(Dependency::new(from_id, to_id, dep_type))
}
