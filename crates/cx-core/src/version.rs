//! Versioning substrate types the store exposes (§3.8, §6.2).
//!
//! The core does not reimplement a versioning engine; these are the
//! shapes a concrete `cx-store::Store` returns when it delegates to one.

use crate::entity::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A ref is one of `{commit-hash, branch, tag, HEAD, HEAD~N, WORKING}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ref {
    Commit(String),
    Branch(String),
    Tag(String),
    Head,
    HeadRelative(u32),
    Working,
}

impl FromStr for Ref {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty ref".to_string());
        }
        if s == "HEAD" {
            return Ok(Ref::Head);
        }
        if s == "WORKING" {
            return Ok(Ref::Working);
        }
        if let Some(rest) = s.strip_prefix("HEAD~") {
            return rest
                .parse::<u32>()
                .map(Ref::HeadRelative)
                .map_err(|_| format!("invalid HEAD~N ref: {s}"));
        }
        if s.len() >= 7 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Ref::Commit(s.to_string()));
        }
        // Branch vs tag ambiguity is resolved by the store (it knows which
        // names are registered); default to Branch, the more common case.
        Ok(Ref::Branch(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub branch: String,
    pub timestamp: DateTime<Utc>,
}

/// A single row-level change reported by `diff` (§4.5 diff contract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityChange {
    pub entity_id: EntityId,
    pub name: String,
    pub file_path: String,
    pub line_start: u32,
    pub old_sig_hash: Option<String>,
    pub new_sig_hash: Option<String>,
    pub old_body_hash: Option<String>,
    pub new_body_hash: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub added: Vec<EntityChange>,
    pub modified: Vec<EntityChange>,
    pub removed: Vec<EntityChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_head_and_working() {
        assert_eq!("HEAD".parse::<Ref>().unwrap(), Ref::Head);
        assert_eq!("WORKING".parse::<Ref>().unwrap(), Ref::Working);
    }

    #[test]
    fn parses_head_relative() {
        assert_eq!("HEAD~3".parse::<Ref>().unwrap(), Ref::HeadRelative(3));
    }

    #[test]
    fn parses_commit_hash() {
        assert_eq!(
            "abc1234".parse::<Ref>().unwrap(),
            Ref::Commit("abc1234".to_string())
        );
    }

    #[test]
    fn falls_back_to_branch_name() {
        assert_eq!(
            "main".parse::<Ref>().unwrap(),
            Ref::Branch("main".to_string())
        );
    }

    #[test]
    fn rejects_empty_ref() {
        assert!("".parse::<Ref>().is_err());
        assert!("   ".parse::<Ref>().is_err());
    }
}
