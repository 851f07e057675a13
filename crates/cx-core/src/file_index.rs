//! `FileIndex` (§3.4): the incremental-skip driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndexEntry {
    pub file_path: String,
    pub scan_hash: String,
    pub scanned_at: DateTime<Utc>,
}
