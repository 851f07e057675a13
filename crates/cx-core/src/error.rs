//! Core error taxonomy shared by every crate in the engine.

use thiserror::Error;

/// Error kinds produced anywhere in the scan-and-store pipeline.
///
/// Per-file `Parse`/`Extract`/`Io` errors are meant to be collected, not
/// propagated: callers in `cx-scan` record them on a `ScanReport` and keep
/// going. `StoreConflict`, `NotInitialized` and `InvalidRef` are fatal to
/// the operation that raised them.
#[derive(Debug, Error)]
pub enum CxError {
    /// The store directory is missing or has not been initialized.
    #[error("store not initialized at {path}")]
    NotInitialized { path: String },

    /// A file read/write or directory traversal failed.
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A file failed to parse structurally.
    #[error("parse error in {file_path}: {reason}")]
    Parse { file_path: String, reason: String },

    /// The extractor rejected a node produced by an otherwise valid parse.
    #[error("extract error in {file_path}: {reason}")]
    Extract { file_path: String, reason: String },

    /// The versioning engine rejected a write (e.g. a concurrent branch).
    #[error("store conflict: {reason}")]
    StoreConflict { reason: String },

    /// A caller-supplied entity query matched zero or more than one entity
    /// with no tiebreaker. `candidates` lists what did match.
    #[error("could not resolve a unique entity for query ({}): {} candidates", query, candidates.len())]
    Resolve {
        query: String,
        candidates: Vec<String>,
    },

    /// A ref string did not parse (`§3.8`: commit-hash, branch, tag, HEAD,
    /// HEAD~N, WORKING).
    #[error("invalid ref: {raw}")]
    InvalidRef { raw: String },

    /// A `doctor` sweep detected a structural inconsistency.
    #[error("integrity violation: {reason}")]
    Integrity { reason: String },

    /// Serialization/deserialization of a stored value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_formatting_includes_file_and_reason() {
        let err = CxError::Parse {
            file_path: "src/main.rs".to_string(),
            reason: "unexpected token".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("src/main.rs"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn io_error_chain_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = CxError::Io {
            path: "a.go".to_string(),
            source: io,
        };
        let msg = err.to_string();
        assert!(msg.contains("a.go"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn resolve_error_reports_candidate_count() {
        let err = CxError::Resolve {
            query: "name=Foo".to_string(),
            candidates: vec!["id1".to_string(), "id2".to_string()],
        };
        assert!(err.to_string().contains("2 candidates"));
    }
}
