//! Maps a [`cx_core::Language`] to the extractor pair that handles it.

use crate::c_family::CFamilyExtractor;
use crate::go::GoExtractor;
use crate::java::JavaExtractor;
use crate::js_ts::JsTsExtractor;
use crate::python::PythonExtractor;
use crate::rust::RustExtractor;
use crate::traits::{CallGraphExtractor, EntityExtractor};
use cx_core::Language;
use std::collections::HashMap;

/// An extractor that implements both halves of the contract (C2 + C3).
pub trait LanguageExtractor: EntityExtractor + CallGraphExtractor + Send + Sync {}
impl<T: EntityExtractor + CallGraphExtractor + Send + Sync> LanguageExtractor for T {}

pub struct ExtractorRegistry {
    extractors: HashMap<Language, Box<dyn LanguageExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        let mut extractors: HashMap<Language, Box<dyn LanguageExtractor>> = HashMap::new();
        extractors.insert(Language::Rust, Box::new(RustExtractor::new()));
        extractors.insert(Language::Go, Box::new(GoExtractor::new()));
        extractors.insert(Language::Python, Box::new(PythonExtractor::new()));
        extractors.insert(Language::JavaScript, Box::new(JsTsExtractor::new(Language::JavaScript)));
        extractors.insert(Language::TypeScript, Box::new(JsTsExtractor::new(Language::TypeScript)));
        extractors.insert(Language::Java, Box::new(JavaExtractor::new()));
        extractors.insert(Language::C, Box::new(CFamilyExtractor::new(Language::C)));
        extractors.insert(Language::Cpp, Box::new(CFamilyExtractor::new(Language::Cpp)));
        ExtractorRegistry { extractors }
    }

    pub fn get(&self, language: Language) -> Option<&dyn LanguageExtractor> {
        self.extractors.get(&language).map(|b| b.as_ref())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_bundled_languages() {
        let registry = ExtractorRegistry::new();
        assert!(registry.get(Language::Rust).is_some());
        assert!(registry.get(Language::Cpp).is_some());
        assert!(registry.get(Language::Ruby).is_none());
    }
}
