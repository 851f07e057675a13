//! Coverage storage and the three import formats (§3.5, §4.7, §6.1).
//!
//! No teacher code covers coverage import; this is built from the file
//! format described in SPEC_FULL.md §4.7, in the style `cx-extract`
//! already established (small, focused line-oriented parsers with no
//! external crate pulled in just for this).

use crate::params::{get_str, str_param, Params};
use crate::Store;
use cozo::ScriptMutability;
use cx_core::coverage::{EntityCoverage, TestEntityMap};
use cx_core::entity::{Entity, EntityId};
use cx_core::CxError;
use std::collections::BTreeSet;
use std::path::Path;

/// One `file_path:start_line.col,end_line.col num_statements count` record
/// from an aggregate profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub count: u64,
}

/// Parses an aggregate coverage profile (§6.1 format 1). The first line
/// must be `mode: set|count|atomic`; it is validated but not otherwise
/// interpreted (mode only affects how a real tool would have produced the
/// counts, not how this mapper reads them).
pub fn parse_aggregate_profile(text: &str) -> Result<Vec<ProfileRecord>, CxError> {
    let mut lines = text.lines();
    let mode_line = lines.next().ok_or_else(|| CxError::Parse {
        file_path: "<coverage profile>".to_string(),
        reason: "empty profile".to_string(),
    })?;
    if !mode_line.trim_start().starts_with("mode:") {
        return Err(CxError::Parse {
            file_path: "<coverage profile>".to_string(),
            reason: format!("expected `mode:` header, got `{mode_line}`"),
        });
    }

    let mut records = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(parse_record(line)?);
    }
    Ok(records)
}

fn parse_record(line: &str) -> Result<ProfileRecord, CxError> {
    let err = || CxError::Parse {
        file_path: "<coverage profile>".to_string(),
        reason: format!("malformed record: {line}"),
    };
    // file_path:start_line.col,end_line.col num_statements count
    let mut fields = line.split_whitespace();
    let location = fields.next().ok_or_else(err)?;
    let _num_statements = fields.next().ok_or_else(err)?;
    let count: u64 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;

    let (file_path, range) = location.rsplit_once(':').ok_or_else(err)?;
    let (start, end) = range.split_once(',').ok_or_else(err)?;
    let start_line: u32 = start.split('.').next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let end_line: u32 = end.split('.').next().ok_or_else(err)?.parse().map_err(|_| err())?;

    Ok(ProfileRecord {
        file_path: file_path.to_string(),
        start_line,
        end_line,
        count,
    })
}

/// Intersects profile records against a set of entities, producing one
/// `EntityCoverage` per entity whose range overlaps at least one record
/// (§6.1 format 1, §8 invariant 9).
pub fn map_records_to_entities(records: &[ProfileRecord], entities: &[Entity]) -> Vec<EntityCoverage> {
    let mut out = Vec::new();
    for entity in entities {
        let mut covered = BTreeSet::new();
        let mut uncovered = BTreeSet::new();
        for record in records {
            if record.file_path != entity.file_path {
                continue;
            }
            let lo = record.start_line.max(entity.lines.start);
            let hi = record.end_line.min(entity.lines.end);
            if lo > hi {
                continue;
            }
            for line in lo..=hi {
                if record.count > 0 {
                    covered.insert(line);
                } else {
                    uncovered.insert(line);
                }
            }
        }
        if !covered.is_empty() || !uncovered.is_empty() {
            uncovered.retain(|l| !covered.contains(l));
            out.push(EntityCoverage {
                entity_id: entity.id.clone(),
                covered_lines: covered,
                uncovered_lines: uncovered,
            });
        }
    }
    out
}

/// Reads a per-test coverage directory (§6.1 format 2): every `<Test>.out`
/// file holds an aggregate profile for that one test.
pub fn read_per_test_directory(dir: &Path) -> Result<Vec<(String, Vec<ProfileRecord>)>, CxError> {
    let mut out = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| CxError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| CxError::Io { path: dir.display().to_string(), source: e })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("out") {
            continue;
        }
        let test_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let text = std::fs::read_to_string(&path).map_err(|e| CxError::Io { path: path.display().to_string(), source: e })?;
        out.push((test_name, parse_aggregate_profile(&text)?));
    }
    Ok(out)
}

/// Detects whether `dir` looks like a native per-test coverage directory:
/// a metadata file plus one or more counter files, the shape modern
/// language-level coverage tooling (e.g. Go's `-test.gocoverdir`) writes.
pub fn is_native_per_test_dir(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else { return false };
    let mut has_meta = false;
    let mut has_counter = false;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("covmeta.") {
            has_meta = true;
        }
        if name.starts_with("covcounters.") {
            has_counter = true;
        }
    }
    has_meta && has_counter
}

/// Auto-detection order (§6.1): per-test text dir → native per-test dir →
/// aggregate file. Returns `None` if `path` matches none of the three.
pub enum CoverageSource {
    PerTestText,
    NativePerTest,
    Aggregate,
}

pub fn detect_coverage_source(path: &Path) -> Option<CoverageSource> {
    if path.is_dir() {
        let has_out_files = std::fs::read_dir(path)
            .ok()?
            .flatten()
            .any(|e| e.path().extension().and_then(|e| e.to_str()) == Some("out"));
        if has_out_files {
            return Some(CoverageSource::PerTestText);
        }
        if is_native_per_test_dir(path) {
            return Some(CoverageSource::NativePerTest);
        }
        None
    } else if path.is_file() {
        Some(CoverageSource::Aggregate)
    } else {
        None
    }
}

const COVERAGE_COLUMNS: &str = "entity_id, scope, covered_lines, uncovered_lines";

fn lines_to_json(lines: &BTreeSet<u32>) -> String {
    serde_json::to_string(lines).unwrap_or_else(|_| "[]".to_string())
}

fn json_to_lines(s: &str) -> Result<BTreeSet<u32>, CxError> {
    serde_json::from_str(s).map_err(CxError::Serialization)
}

impl Store {
    /// Stores one scope's worth of per-entity coverage. `scope` is
    /// `"__aggregate__"` for the whole-suite view or a test name for a
    /// per-test view (§6.1 format 2).
    pub async fn store_coverage(&self, scope: &str, coverages: &[EntityCoverage]) -> Result<(), CxError> {
        for c in coverages {
            let query = format!(
                "?[{COVERAGE_COLUMNS}] <- [[$entity_id, $scope, $covered_lines, $uncovered_lines]] \
                 :put EntityCoverage {{ entity_id, scope => covered_lines, uncovered_lines }}"
            );
            let mut params = Params::new();
            params.insert("entity_id".into(), str_param(c.entity_id.0.clone()));
            params.insert("scope".into(), str_param(scope));
            params.insert("covered_lines".into(), str_param(lines_to_json(&c.covered_lines)));
            params.insert("uncovered_lines".into(), str_param(lines_to_json(&c.uncovered_lines)));
            self.db()
                .run_script(&query, params, ScriptMutability::Mutable)
                .map_err(|e| CxError::StoreConflict { reason: format!("store_coverage: {e}") })?;
        }
        Ok(())
    }

    pub async fn store_test_entity_mappings(&self, mappings: &[TestEntityMap]) -> Result<(), CxError> {
        for m in mappings {
            let query = "?[test_file, test_name, entity_id] <- [[$test_file, $test_name, $entity_id]] \
                         :put TestEntityMap { test_file, test_name, entity_id }";
            let mut params = Params::new();
            params.insert("test_file".into(), str_param(m.test_file.clone()));
            params.insert("test_name".into(), str_param(m.test_name.clone()));
            params.insert("entity_id".into(), str_param(m.entity_id.0.clone()));
            self.db()
                .run_script(query, params, ScriptMutability::Mutable)
                .map_err(|e| CxError::StoreConflict { reason: format!("store_test_entity_mappings: {e}") })?;
        }
        Ok(())
    }

    pub async fn get_coverage_stats(&self, scope: &str) -> Result<Vec<EntityCoverage>, CxError> {
        let query = format!(
            "?[{COVERAGE_COLUMNS}] := *EntityCoverage {{ {COVERAGE_COLUMNS} }}, scope == $scope"
        );
        let mut params = Params::new();
        params.insert("scope".into(), str_param(scope));
        let result = self
            .db()
            .run_script(&query, params, ScriptMutability::Immutable)
            .map_err(|e| CxError::Integrity { reason: format!("get_coverage_stats: {e}") })?;
        result
            .rows
            .iter()
            .map(|row| {
                Ok(EntityCoverage {
                    entity_id: EntityId(get_str(row, 0, "entity_id")?),
                    covered_lines: json_to_lines(&get_str(row, 2, "covered_lines")?)?,
                    uncovered_lines: json_to_lines(&get_str(row, 3, "uncovered_lines")?)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aggregate_profile() {
        let text = "mode: set\nsrc/lib.rs:10.1,12.5 2 1\nsrc/lib.rs:20.1,20.9 1 0\n";
        let records = parse_aggregate_profile(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start_line, 10);
        assert_eq!(records[0].end_line, 12);
        assert_eq!(records[0].count, 1);
        assert_eq!(records[1].count, 0);
    }

    #[test]
    fn rejects_missing_mode_header() {
        let text = "src/lib.rs:10.1,12.5 2 1\n";
        assert!(parse_aggregate_profile(text).is_err());
    }

    #[test]
    fn maps_records_intersecting_entity_ranges() {
        let entity = Entity {
            id: EntityId("ent-fn-x-f".to_string()),
            name: "f".to_string(),
            qualified_name: None,
            kind: cx_core::entity::EntityKind::Function,
            type_kind: None,
            file_path: "src/lib.rs".to_string(),
            lines: cx_core::entity::LineRange::new(10, 15),
            signature: "f()".to_string(),
            sig_hash: "h".to_string(),
            body_hash: "b".to_string(),
            doc_comment: None,
            skeleton: None,
            receiver: None,
            visibility: cx_core::entity::Visibility::Public,
            language: cx_core::Language::Rust,
            status: cx_core::entity::EntityStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let records = vec![ProfileRecord {
            file_path: "src/lib.rs".to_string(),
            start_line: 12,
            end_line: 13,
            count: 1,
        }];
        let coverages = map_records_to_entities(&records, std::slice::from_ref(&entity));
        assert_eq!(coverages.len(), 1);
        assert_eq!(coverages[0].covered_lines, [12, 13].into_iter().collect());
    }
}
