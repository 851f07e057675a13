//! A `ParserAdapter` backed by a single tree-sitter grammar.
//!
//! Grounded on `Isgl1KeyGeneratorImpl`'s `parsers: HashMap<Language,
//! Arc<Mutex<Parser>>>` plus its `init_parser!` macro: one parser instance
//! per language, reused across calls and guarded by a mutex because
//! `tree_sitter::Parser` is not `Sync`.

use crate::adapter::{ParseResult, ParserAdapter};
use crate::error::ParseError;
use cx_core::Language;
use std::sync::Mutex;
use tree_sitter::Parser;

pub struct TreeSitterAdapter {
    language: Language,
    parser: Mutex<Parser>,
}

impl TreeSitterAdapter {
    pub fn new(language: Language, grammar: tree_sitter::Language) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|_| ParseError::GrammarSetup(language.to_string()))?;
        Ok(TreeSitterAdapter {
            language,
            parser: Mutex::new(parser),
        })
    }
}

impl ParserAdapter for TreeSitterAdapter {
    fn language(&self) -> Language {
        self.language
    }

    fn parse(&self, file_path: &str, source: &[u8]) -> Result<ParseResult, ParseError> {
        let mut parser = self
            .parser
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let tree = parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            file_path: file_path.to_string(),
        })?;
        Ok(ParseResult::new(
            self.language,
            file_path.to_string(),
            source.to_vec(),
            tree,
        ))
    }
}
