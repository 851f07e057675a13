use thiserror::Error;

/// Parse-time failures from a single parser adapter invocation (§4.1).
///
/// The scanner (`cx-scan`) wraps these into `cx_core::CxError::Parse` when
/// recording a per-file error; they are never fatal to the scan as a
/// whole.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no parser registered for language {0}")]
    UnsupportedLanguage(String),

    #[error("tree-sitter failed to set grammar for {0}")]
    GrammarSetup(String),

    #[error("tree-sitter produced no tree for {file_path}")]
    NoTree { file_path: String },
}
