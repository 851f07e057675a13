//! `FileIndex` ops (§3.4, §4.5): the incremental-skip driver.

use crate::params::{get_str, str_param, Params};
use crate::Store;
use cozo::{DataValue, ScriptMutability};
use cx_core::file_index::FileIndexEntry;
use cx_core::CxError;

impl Store {
    pub async fn set_file_scanned(&self, file_path: &str, scan_hash: &str) -> Result<(), CxError> {
        let query = "?[file_path, scan_hash, scanned_at] <- [[$file_path, $scan_hash, $scanned_at]] \
                     :put FileIndex { file_path => scan_hash, scanned_at }";
        let mut params = Params::new();
        params.insert("file_path".into(), str_param(file_path));
        params.insert("scan_hash".into(), str_param(scan_hash));
        params.insert("scanned_at".into(), str_param(chrono::Utc::now().to_rfc3339()));
        self.db()
            .run_script(query, params, ScriptMutability::Mutable)
            .map_err(|e| CxError::StoreConflict { reason: format!("set_file_scanned: {e}") })?;
        Ok(())
    }

    /// `true` if `path` is unknown to the index or its recorded hash
    /// differs from `hash` (§4.4 pass-1 step 2).
    pub async fn is_file_changed(&self, path: &str, hash: &str) -> Result<bool, CxError> {
        match self.get_file_entry(path).await? {
            Some(entry) => Ok(entry.scan_hash != hash),
            None => Ok(true),
        }
    }

    pub async fn get_file_entry(&self, path: &str) -> Result<Option<FileIndexEntry>, CxError> {
        let query = "?[file_path, scan_hash, scanned_at] := *FileIndex { file_path, scan_hash, \
                     scanned_at }, file_path == $path";
        let mut params = Params::new();
        params.insert("path".into(), str_param(path));
        let result = self
            .db()
            .run_script(query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_file_entry: {e}") })?;
        result.rows.first().map(|r| row_to_entry(r)).transpose()
    }

    pub async fn get_all_file_entries(&self) -> Result<Vec<FileIndexEntry>, CxError> {
        let query = "?[file_path, scan_hash, scanned_at] := *FileIndex { file_path, scan_hash, scanned_at }";
        let result = self
            .db()
            .run_script(query, Params::new(), ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_all_file_entries: {e}") })?;
        result.rows.iter().map(|r| row_to_entry(r)).collect()
    }

    /// Removes index rows for paths no longer present on disk, returning
    /// the count removed.
    pub async fn prune_stale_entries(&self, valid_paths: &[String]) -> Result<usize, CxError> {
        let all = self.get_all_file_entries().await?;
        let valid: std::collections::HashSet<&str> = valid_paths.iter().map(|s| s.as_str()).collect();
        let mut removed = 0usize;
        for entry in all {
            if !valid.contains(entry.file_path.as_str()) {
                let query = "?[file_path] <- [[$file_path]] :rm FileIndex { file_path }";
                let mut params = Params::new();
                params.insert("file_path".into(), str_param(entry.file_path.clone()));
                self.db()
                    .run_script(query, params, ScriptMutability::Mutable)
                    .map_err(|e| CxError::StoreConflict { reason: format!("prune_stale_entries: {e}") })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn row_to_entry(row: &[DataValue]) -> Result<FileIndexEntry, CxError> {
    Ok(FileIndexEntry {
        file_path: get_str(row, 0, "file_path")?,
        scan_hash: get_str(row, 1, "scan_hash")?,
        scanned_at: chrono::DateTime::parse_from_rfc3339(&get_str(row, 2, "scanned_at")?)
            .map_err(|e| CxError::Integrity { reason: format!("scanned_at: {e}") })?
            .with_timezone(&chrono::Utc),
    })
}
