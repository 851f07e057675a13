//! Scan-time configuration and reporting types shared between `cx-scan`
//! and `cx-store` (§3.6, §4.4).
//!
//! These are the "configuration the core's view of it" objects named in
//! SPEC_FULL.md §1.1: plain serde structs with `Default` impls so an
//! outer CLI/config loader (out of scope here) can deserialize directly
//! into them.

use crate::entity::{EntityKind, Visibility};
use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row per completed scan (§3.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_time: DateTime<Utc>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub files_scanned: u64,
    pub entities_found: u64,
    pub dependencies_found: u64,
    pub duration_ms: u64,
}

/// Recognized scan options (§4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Restrict to one language; `None` means detect by file count.
    pub language: Option<Language>,
    /// Glob patterns to skip (files and directories).
    pub exclude: Vec<String>,
    /// Ignore `FileIndex`; reparse everything.
    pub force: bool,
    /// Compute what would change; persist nothing.
    pub dry_run: bool,
    /// Passed through to an out-of-scope summary renderer; has no effect
    /// on scan semantics.
    pub overview: bool,
    /// Disable default dependency-directory exclusion.
    pub no_auto_exclude: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            language: None,
            exclude: Vec::new(),
            force: false,
            dry_run: false,
            overview: false,
            no_auto_exclude: false,
        }
    }
}

/// Outcome of one `scan()` call (§4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub files_scanned: u64,
    pub files_skipped: u64,
    pub entities_created: u64,
    pub entities_updated_sig: u64,
    pub entities_updated_body: u64,
    pub entities_unchanged: u64,
    pub entities_archived: u64,
    pub dependencies_created: u64,
    pub errors: Vec<ScanFileError>,
    pub commit_hash: Option<String>,
}

/// A per-file error collected during a scan rather than propagated
/// (§7 propagation policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFileError {
    pub file_path: String,
    pub message: String,
}

/// Query filter for `Store::query_entities` (§4.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityFilter {
    pub name: Option<String>,
    pub kind: Option<EntityKind>,
    pub file_path_prefix: Option<String>,
    pub language: Option<Language>,
    pub visibility: Option<Visibility>,
    /// Defaults to only active entities when `None` (§4.5).
    pub status_active_only: Option<bool>,
    pub limit: Option<usize>,
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scan_options_are_permissive() {
        let opts = ScanOptions::default();
        assert!(!opts.force);
        assert!(!opts.dry_run);
        assert!(opts.exclude.is_empty());
    }

    #[test]
    fn default_entity_filter_matches_everything() {
        let filter = EntityFilter::default();
        assert!(filter.name.is_none());
        assert!(filter.kind.is_none());
    }
}
