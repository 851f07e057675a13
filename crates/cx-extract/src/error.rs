use thiserror::Error;

/// Extraction-time failures (§7 `Extract` kind).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no entity/call-graph extractor bundled for language {0}")]
    UnsupportedLanguage(String),

    #[error("malformed node while extracting {file_path}: {reason}")]
    MalformedNode { file_path: String, reason: String },
}
