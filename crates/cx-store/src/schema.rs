//! Schema creation, grounded on the teacher's `create_schema` /
//! `create_dependency_edges_schema` pair in `storage/cozo_client.rs`,
//! generalized to the full set of relations the engine needs.

use cozo::{DbInstance, ScriptMutability};
use cx_core::CxError;

const SCHEMAS: &[(&str, &str)] = &[
    (
        "Entities",
        r#"
        :create Entities {
            id: String =>
            name: String,
            qualified_name: String?,
            kind: String,
            type_kind: String?,
            file_path: String,
            line_start: Int,
            line_end: Int,
            signature: String,
            sig_hash: String,
            body_hash: String,
            doc_comment: String?,
            skeleton: String?,
            receiver: String?,
            visibility: String,
            language: String,
            status: String,
            created_at: String,
            updated_at: String,
        }
        "#,
    ),
    (
        "Dependencies",
        r#"
        :create Dependencies {
            from_id: String,
            to_id: String,
            dep_type: String,
        }
        "#,
    ),
    (
        "FileIndex",
        r#"
        :create FileIndex {
            file_path: String =>
            scan_hash: String,
            scanned_at: String,
        }
        "#,
    ),
    (
        "Metrics",
        r#"
        :create Metrics {
            entity_id: String =>
            pagerank: Float,
            betweenness: Float,
            in_degree: Int,
            out_degree: Int,
            computed_at: String,
        }
        "#,
    ),
    (
        "EntityCoverage",
        r#"
        :create EntityCoverage {
            entity_id: String,
            scope: String =>
            covered_lines: String,
            uncovered_lines: String,
        }
        "#,
    ),
    (
        "TestEntityMap",
        r#"
        :create TestEntityMap {
            test_file: String,
            test_name: String,
            entity_id: String,
        }
        "#,
    ),
    (
        "Tags",
        r#"
        :create Tags {
            entity_id: String,
            tag: String =>
            created_by: String,
            note: String?,
        }
        "#,
    ),
    (
        "EntityLinks",
        r#"
        :create EntityLinks {
            entity_id: String,
            external_system: String,
            link_type: String =>
            external_id: String,
        }
        "#,
    ),
    (
        "ScanMetadata",
        r#"
        :create ScanMetadata {
            scan_time: String =>
            git_commit: String?,
            git_branch: String?,
            files_scanned: Int,
            entities_found: Int,
            dependencies_found: Int,
            duration_ms: Int,
        }
        "#,
    ),
    (
        "Commits",
        r#"
        :create Commits {
            hash: String =>
            parent: String?,
            message: String,
            author: String,
            branch: String,
            seq: Int,
            timestamp: String,
        }
        "#,
    ),
    (
        "Branches",
        r#"
        :create Branches {
            name: String =>
            head: String?,
        }
        "#,
    ),
    (
        "EntityLog",
        r#"
        :create EntityLog {
            commit_hash: String,
            entity_id: String =>
            op: String,
            snapshot: String?,
        }
        "#,
    ),
    (
        "DependencyLog",
        r#"
        :create DependencyLog {
            commit_hash: String,
            from_id: String,
            to_id: String,
            dep_type: String =>
            op: String,
        }
        "#,
    ),
];

/// Creates every relation the store needs. Idempotent is NOT guaranteed by
/// CozoDB's `:create` (it errors if the relation already exists), so this
/// is meant to run once against a fresh database directory.
pub fn create_all(db: &DbInstance) -> Result<(), CxError> {
    for (name, script) in SCHEMAS {
        db.run_script(script, Default::default(), ScriptMutability::Mutable)
            .map_err(|e| CxError::NotInitialized {
                path: format!("schema `{name}`: {e}"),
            })?;
    }
    // The repository always has at least a `main` branch with no commits yet.
    let seed = "?[name, head] <- [['main', null]] :put Branches { name => head }";
    db.run_script(seed, Default::default(), ScriptMutability::Mutable)
        .map_err(|e| CxError::NotInitialized {
            path: format!("seeding main branch: {e}"),
        })?;
    Ok(())
}
