//! `DataValue` conversion helpers shared by every table module.
//!
//! Grounded on the teacher's `entity_to_params`/`row_to_entity` pair in
//! `storage/cozo_client.rs`: build a `BTreeMap<String, DataValue>` for
//! `run_script` parameters, and pull typed values back out of a result row
//! with an explicit error on the wrong `DataValue` variant.

use cozo::DataValue;
use cx_core::CxError;
use std::collections::BTreeMap;

pub type Params = BTreeMap<String, DataValue>;

pub fn str_param(v: impl Into<String>) -> DataValue {
    DataValue::Str(v.into().into())
}

pub fn opt_str_param(v: Option<&str>) -> DataValue {
    v.map(|s| DataValue::Str(s.into())).unwrap_or(DataValue::Null)
}

pub fn bool_param(v: bool) -> DataValue {
    DataValue::Bool(v)
}

pub fn int_param(v: i64) -> DataValue {
    DataValue::from(v)
}

pub fn opt_int_param(v: Option<i64>) -> DataValue {
    v.map(DataValue::from).unwrap_or(DataValue::Null)
}

pub fn get_str(row: &[DataValue], idx: usize, field: &str) -> Result<String, CxError> {
    match row.get(idx) {
        Some(DataValue::Str(s)) => Ok(s.to_string()),
        other => Err(integrity(field, other)),
    }
}

pub fn get_opt_str(row: &[DataValue], idx: usize, field: &str) -> Result<Option<String>, CxError> {
    match row.get(idx) {
        Some(DataValue::Str(s)) => Ok(Some(s.to_string())),
        Some(DataValue::Null) | None => Ok(None),
        other => Err(integrity(field, other)),
    }
}

pub fn get_bool(row: &[DataValue], idx: usize, field: &str) -> Result<bool, CxError> {
    match row.get(idx) {
        Some(DataValue::Bool(b)) => Ok(*b),
        other => Err(integrity(field, other)),
    }
}

pub fn get_int(row: &[DataValue], idx: usize, field: &str) -> Result<i64, CxError> {
    match row.get(idx) {
        Some(DataValue::Num(n)) => Ok(match n {
            cozo::Num::Int(i) => *i,
            cozo::Num::Float(f) => *f as i64,
        }),
        other => Err(integrity(field, other)),
    }
}

pub fn get_float(row: &[DataValue], idx: usize, field: &str) -> Result<f64, CxError> {
    match row.get(idx) {
        Some(DataValue::Num(n)) => Ok(match n {
            cozo::Num::Int(i) => *i as f64,
            cozo::Num::Float(f) => *f,
        }),
        other => Err(integrity(field, other)),
    }
}

fn integrity(field: &str, got: Option<&DataValue>) -> CxError {
    CxError::Integrity {
        reason: format!("column {field} had unexpected value: {got:?}"),
    }
}

/// Escapes a string for inline embedding inside a batch CozoScript literal
/// (used where `run_script` builds one `<-` relation from many rows, as the
/// teacher's `insert_edges_batch` does for dependency edges).
pub fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
