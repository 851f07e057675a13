//! Builds the set of parser adapters this crate bundles (§4.1).
//!
//! Only the languages with a real tree-sitter grammar dependency here get
//! an adapter; `cx_core::Language` recognizes a wider set so the
//! scanner's detection/auto-exclusion stays total (SPEC_FULL.md §4 C1
//! note). A language with no adapter surfaces as
//! `cx_extract::ExtractError::UnsupportedLanguage`, a counted per-file
//! error, not a panic.

use crate::adapter::ParserAdapter;
use crate::error::ParseError;
use crate::tree_sitter_adapter::TreeSitterAdapter;
use cx_core::Language;
use std::collections::HashMap;

pub struct ParserRegistry {
    adapters: HashMap<Language, Box<dyn ParserAdapter>>,
}

impl ParserRegistry {
    pub fn new() -> Result<Self, ParseError> {
        let mut adapters: HashMap<Language, Box<dyn ParserAdapter>> = HashMap::new();

        macro_rules! register {
            ($lang:expr, $grammar:expr) => {
                let adapter = TreeSitterAdapter::new($lang, $grammar.into())?;
                adapters.insert($lang, Box::new(adapter));
            };
        }

        register!(Language::Rust, tree_sitter_rust::LANGUAGE);
        register!(Language::Python, tree_sitter_python::LANGUAGE);
        register!(Language::JavaScript, tree_sitter_javascript::LANGUAGE);
        register!(Language::TypeScript, tree_sitter_typescript::LANGUAGE_TYPESCRIPT);
        register!(Language::Go, tree_sitter_go::LANGUAGE);
        register!(Language::Java, tree_sitter_java::LANGUAGE);
        register!(Language::C, tree_sitter_c::LANGUAGE);
        register!(Language::Cpp, tree_sitter_cpp::LANGUAGE);

        Ok(ParserRegistry { adapters })
    }

    pub fn get(&self, language: Language) -> Option<&dyn ParserAdapter> {
        self.adapters.get(&language).map(|b| b.as_ref())
    }

    pub fn supports(&self, language: Language) -> bool {
        self.adapters.contains_key(&language)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new().expect("bundled grammars must initialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_supports_bundled_languages() {
        let registry = ParserRegistry::new().unwrap();
        assert!(registry.supports(Language::Rust));
        assert!(registry.supports(Language::Go));
        assert!(!registry.supports(Language::Ruby));
    }

    #[test]
    fn parses_a_trivial_rust_file() {
        let registry = ParserRegistry::new().unwrap();
        let adapter = registry.get(Language::Rust).unwrap();
        let result = adapter.parse("a.rs", b"fn main() {}").unwrap();
        assert_eq!(result.language, Language::Rust);
        assert!(!result.root_node().has_error());
    }

    #[test]
    fn robust_to_incomplete_source() {
        let registry = ParserRegistry::new().unwrap();
        let adapter = registry.get(Language::Rust).unwrap();
        // missing closing brace: tree-sitter still returns a tree covering
        // the parseable prefix.
        let result = adapter.parse("a.rs", b"fn main() {").unwrap();
        assert_eq!(result.root_node().kind(), "source_file");
    }
}
