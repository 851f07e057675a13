//! Shared model types for the code-intelligence engine: entities,
//! dependencies, metrics, file index, coverage, tags/links, scan metadata,
//! the versioning-substrate shapes, and the error taxonomy.
//!
//! This crate has no parsing or storage dependencies; `cx-parse`,
//! `cx-extract`, `cx-store`, `cx-scan` and `cx-graph` all build on top of
//! it.

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod annotations;
pub mod coverage;
pub mod dependency;
pub mod entity;
pub mod error;
pub mod file_index;
pub mod hash;
pub mod language;
pub mod metrics;
pub mod scan;
pub mod version;

pub use annotations::{EntityLink, ExternalSystem, LinkType, Tag};
pub use coverage::{EntityCoverage, TestEntityMap};
pub use dependency::{DepType, Dependency};
pub use entity::{Entity, EntityId, EntityKind, EntityStatus, EntityUpdateKind, LineRange, TypeKind, Visibility};
pub use error::{CxError, Result};
pub use file_index::FileIndexEntry;
pub use hash::{body_hash, generate_entity_id, normalize_whitespace, sig_hash};
pub use language::Language;
pub use metrics::Metrics;
pub use scan::{EntityFilter, ScanFileError, ScanMetadata, ScanOptions, ScanReport};
pub use version::{Commit, DiffResult, EntityChange, Ref};
