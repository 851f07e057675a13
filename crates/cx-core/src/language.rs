//! Source language tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The language a source file is written in.
///
/// Every language named in the parser-adapter contract is represented here
/// so that detection and auto-exclusion logic is total, even for languages
/// that have no bundled extractor (`cx-extract` returns
/// `ExtractError::UnsupportedLanguage` for those).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Go,
    TypeScript,
    JavaScript,
    Java,
    Rust,
    Python,
    C,
    Cpp,
    CSharp,
    Php,
    Kotlin,
    Ruby,
    Swift,
}

impl Language {
    /// All languages the engine knows how to name, in a stable order used
    /// for language-detection tie-breaking.
    pub const ALL: &'static [Language] = &[
        Language::Go,
        Language::TypeScript,
        Language::JavaScript,
        Language::Java,
        Language::Rust,
        Language::Python,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Php,
        Language::Kotlin,
        Language::Ruby,
        Language::Swift,
    ];

    /// Maps a file extension (without the leading dot) to a language.
    ///
    /// `.h` is deliberately NOT resolved here: the C/C++ disambiguation
    /// rule needs project-wide context (whether `.c` files exist), so it
    /// lives in the scanner's language detector, not in this pure mapping.
    pub fn from_extension(ext: &str) -> Option<Language> {
        Some(match ext {
            "go" => Language::Go,
            "ts" | "tsx" => Language::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "java" => Language::Java,
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "c" => Language::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "cs" => Language::CSharp,
            "php" => Language::Php,
            "kt" | "kts" => Language::Kotlin,
            "rb" => Language::Ruby,
            "swift" => Language::Swift,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Rust => "rust",
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "c#",
            Language::Php => "php",
            Language::Kotlin => "kotlin",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_extensions() {
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_extension("go"), Some(Language::Go));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("unknown"), None);
    }

    #[test]
    fn h_extension_is_unmapped_by_design() {
        assert_eq!(Language::from_extension("h"), None);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Language::Rust.to_string(), "rust");
        assert_eq!(Language::CSharp.to_string(), "c#");
    }
}
