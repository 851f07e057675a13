//! `ScanMetadata` CRUD (§3.6, §4.4 commit step), grounded on the same
//! `entity_to_params`/`row_to_entity` shape as `metrics.rs`.

use crate::params::{get_int, get_opt_str, get_str, int_param, opt_str_param, str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::scan::ScanMetadata;
use cx_core::CxError;

const SCAN_METADATA_COLUMNS: &str = "scan_time, git_commit, git_branch, files_scanned, \
    entities_found, dependencies_found, duration_ms";

fn scan_metadata_to_params(m: &ScanMetadata) -> Params {
    let mut p = Params::new();
    p.insert("scan_time".into(), str_param(m.scan_time.to_rfc3339()));
    p.insert("git_commit".into(), opt_str_param(m.git_commit.as_deref()));
    p.insert("git_branch".into(), opt_str_param(m.git_branch.as_deref()));
    p.insert("files_scanned".into(), int_param(m.files_scanned as i64));
    p.insert("entities_found".into(), int_param(m.entities_found as i64));
    p.insert("dependencies_found".into(), int_param(m.dependencies_found as i64));
    p.insert("duration_ms".into(), int_param(m.duration_ms as i64));
    p
}

fn row_to_scan_metadata(row: &[DataValue]) -> Result<ScanMetadata, CxError> {
    Ok(ScanMetadata {
        scan_time: chrono::DateTime::parse_from_rfc3339(&get_str(row, 0, "scan_time")?)
            .map_err(|e| CxError::Integrity { reason: format!("scan_time: {e}") })?
            .with_timezone(&chrono::Utc),
        git_commit: get_opt_str(row, 1, "git_commit")?,
        git_branch: get_opt_str(row, 2, "git_branch")?,
        files_scanned: get_int(row, 3, "files_scanned")? as u64,
        entities_found: get_int(row, 4, "entities_found")? as u64,
        dependencies_found: get_int(row, 5, "dependencies_found")? as u64,
        duration_ms: get_int(row, 6, "duration_ms")? as u64,
    })
}

impl Store {
    /// Records one completed scan (§3.6). Keyed on `scan_time`, so two
    /// scans landing on the same instant would collide; scans are
    /// expected to be seconds apart in practice.
    pub async fn record_scan_metadata(&self, metadata: &ScanMetadata) -> Result<(), CxError> {
        let query = format!(
            "?[{SCAN_METADATA_COLUMNS}] <- [[$scan_time, $git_commit, $git_branch, \
             $files_scanned, $entities_found, $dependencies_found, $duration_ms]] \
             :put ScanMetadata {{ scan_time => git_commit, git_branch, files_scanned, \
             entities_found, dependencies_found, duration_ms }}"
        );
        self.db()
            .run_script(&query, scan_metadata_to_params(metadata), ScriptMutability::Mutable)
            .map_err(|e| CxError::StoreConflict { reason: format!("record_scan_metadata: {e}") })?;
        Ok(())
    }

    /// Most recent scans, newest first.
    pub async fn recent_scans(&self, limit: usize) -> Result<Vec<ScanMetadata>, CxError> {
        let query = format!("?[{SCAN_METADATA_COLUMNS}] := *ScanMetadata {{ {SCAN_METADATA_COLUMNS} }}");
        let result = self
            .db()
            .run_script(&query, Params::new(), ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("recent_scans: {e}") })?;
        let mut rows = result
            .rows
            .iter()
            .map(|r| row_to_scan_metadata(r))
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by(|a, b| b.scan_time.cmp(&a.scan_time));
        rows.truncate(limit);
        Ok(rows)
    }
}
