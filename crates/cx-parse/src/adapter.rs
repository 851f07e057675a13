//! The parser-adapter contract (C1, §4.1).

use crate::error::ParseError;
use cx_core::Language;
use tree_sitter::Tree;

/// The parse of one file: the grammar's concrete syntax tree plus the
/// bytes it was parsed from. `root_node()`/`source()` give `cx-extract`
/// everything it needs to walk the tree without re-reading the file.
///
/// Scoped like the teacher's parse trees: acquired on parse, released once
/// the owning pass-2 extraction for this file completes (native memory
/// behind `Tree` is freed on drop).
pub struct ParseResult {
    pub language: Language,
    pub file_path: String,
    source: Vec<u8>,
    tree: Tree,
}

impl ParseResult {
    pub fn new(language: Language, file_path: String, source: Vec<u8>, tree: Tree) -> Self {
        ParseResult {
            language,
            file_path,
            source,
            tree,
        }
    }

    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn source_text(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

/// One adapter per supported language (§4.1 contract).
pub trait ParserAdapter: Send + Sync {
    fn language(&self) -> Language;

    /// Parses `source` taken from `file_path`. Implementations should be
    /// robust to syntactically incomplete files: tree-sitter always
    /// returns a best-effort tree for the parseable prefix, so failure
    /// here is reserved for grammar-setup problems, not malformed source.
    fn parse(&self, file_path: &str, source: &[u8]) -> Result<ParseResult, ParseError>;
}
