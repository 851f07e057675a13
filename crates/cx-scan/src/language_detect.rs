//! Language detection (§4.1/§4.4): a single walk counting files by
//! extension, descending sort, `.h` disambiguation. Grounded on the
//! teacher's `streamer.rs` walk, generalized from a single fixed
//! language into a detect-by-count pass that can drive more than one
//! parser in the same scan.

use std::collections::HashMap;
use std::path::Path;

use cx_core::Language;
use walkdir::WalkDir;

use crate::exclude::is_excluded;

/// Result of one detection pass: every language with at least one file,
/// ordered by descending file count (ties broken by [`Language::ALL`]
/// order), plus which language `.h` files resolve to for this project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLanguages {
    pub ordered: Vec<Language>,
    pub header_language: Language,
}

/// Counts source files by [`Language`] under `root`, skipping excluded
/// paths. `.h` files are counted toward whichever of C/C++ the project
/// resolves to (§4.1): C++ if C++ sources exist and no `.c` files exist,
/// else C.
pub fn detect_languages(root: &Path, excludes: &[String]) -> DetectedLanguages {
    let mut counts: HashMap<Language, usize> = HashMap::new();
    let mut header_count = 0usize;
    let mut has_c_source = false;
    let mut has_cpp_source = false;

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if is_excluded(&rel, excludes) {
            continue;
        }
        let ext = match entry.path().extension().and_then(|e| e.to_str()) {
            Some(e) => e,
            None => continue,
        };
        match ext {
            "h" => {
                header_count += 1;
                continue;
            }
            "c" => has_c_source = true,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => has_cpp_source = true,
            _ => {}
        }
        if let Some(lang) = Language::from_extension(ext) {
            *counts.entry(lang).or_insert(0) += 1;
        }
    }

    let header_language = resolve_header_language(has_c_source, has_cpp_source);
    if header_count > 0 {
        *counts.entry(header_language).or_insert(0) += header_count;
    }

    let mut ordered: Vec<(Language, usize)> = Language::ALL
        .iter()
        .copied()
        .filter_map(|l| counts.get(&l).map(|c| (l, *c)))
        .filter(|(_, c)| *c > 0)
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    DetectedLanguages {
        ordered: ordered.into_iter().map(|(l, _)| l).collect(),
        header_language,
    }
}

/// §4.1: C++ if C++ sources exist and no `.c` files exist, else C.
pub fn resolve_header_language(has_c_source: bool, has_cpp_source: bool) -> Language {
    if has_cpp_source && !has_c_source {
        Language::Cpp
    } else {
        Language::C
    }
}

/// Resolves the language a single file should be parsed/extracted as,
/// given the project-wide header-language decision for `.h`.
pub fn language_for_file(ext: &str, header_language: Language) -> Option<Language> {
    if ext == "h" {
        return Some(header_language);
    }
    Language::from_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn orders_by_descending_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        fs::write(dir.path().join("b.rs"), "fn b() {}").unwrap();
        fs::write(dir.path().join("c.py"), "def c(): pass").unwrap();
        let detected = detect_languages(dir.path(), &[]);
        assert_eq!(detected.ordered, vec![Language::Rust, Language::Python]);
    }

    #[test]
    fn header_only_defaults_to_c() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.h"), "void a();").unwrap();
        let detected = detect_languages(dir.path(), &[]);
        assert_eq!(detected.header_language, Language::C);
        assert_eq!(detected.ordered, vec![Language::C]);
    }

    #[test]
    fn header_with_cpp_sources_resolves_cpp() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.h"), "void a();").unwrap();
        fs::write(dir.path().join("a.cpp"), "void a() {}").unwrap();
        let detected = detect_languages(dir.path(), &[]);
        assert_eq!(detected.header_language, Language::Cpp);
    }

    #[test]
    fn header_with_c_source_resolves_c_even_if_cpp_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.h"), "void a();").unwrap();
        fs::write(dir.path().join("a.c"), "void a() {}").unwrap();
        fs::write(dir.path().join("b.cpp"), "void b() {}").unwrap();
        let detected = detect_languages(dir.path(), &[]);
        assert_eq!(detected.header_language, Language::C);
        assert!(detected.ordered.contains(&Language::C));
        assert!(detected.ordered.contains(&Language::Cpp));
    }
}
