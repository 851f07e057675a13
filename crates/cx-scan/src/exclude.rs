//! Exclusion rules (§4.4): auto-exclusion marker probing plus the
//! `exclude` glob-pattern list, grounded on the teacher's
//! `should_process_file`/`matches_pattern` pair in `streamer.rs`,
//! generalized from an include/exclude allowlist into an exclude-only
//! filter (this engine auto-detects languages rather than requiring an
//! include list).

use std::path::Path;

/// `(marker relative to root, directory to exclude if the marker exists)`.
const DEPENDENCY_MARKERS: &[(&str, &str)] = &[
    ("Cargo.toml", "target"),
    ("vendor/modules.txt", "vendor"),
    ("package.json", "node_modules"),
    ("vendor/autoload.php", "vendor"),
];

/// Common virtualenv directory names; a directory is a venv root if it
/// contains `pyvenv.cfg`.
const VENV_CANDIDATES: &[&str] = &["venv", ".venv", "env", ".env"];

/// Probes `root` for dependency-manager marker files and returns the
/// sibling directories that should be auto-excluded (§4.4 auto-exclusion).
/// Advisory only: callers can disable this with `no_auto_exclude`.
pub fn auto_exclusions(root: &Path) -> Vec<String> {
    let mut dirs = Vec::new();
    for (marker, exclude_dir) in DEPENDENCY_MARKERS {
        if root.join(marker).exists() {
            dirs.push((*exclude_dir).to_string());
        }
    }
    for candidate in VENV_CANDIDATES {
        if root.join(candidate).join("pyvenv.cfg").exists() {
            dirs.push((*candidate).to_string());
        }
    }
    dirs
}

/// True if `path` (relative to the scan root, forward-slash separated)
/// matches any of `patterns`. Patterns may contain `*` wildcards; a
/// pattern with no wildcard matches as a substring of any path segment,
/// matching the teacher's deliberately simple `matches_pattern`.
pub fn is_excluded(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| matches_glob(path, p))
}

fn matches_glob(path: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return path.contains(pattern);
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let mut cursor = 0usize;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        match path[cursor..].find(part) {
            Some(found) => {
                if i == 0 && found != 0 && !pattern.starts_with('*') {
                    return false;
                }
                cursor += found + part.len();
            }
            None => return false,
        }
    }
    if let Some(last) = parts.last() {
        if !pattern.ends_with('*') && !last.is_empty() && !path.ends_with(last) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches_substring() {
        assert!(is_excluded("src/target/debug/a.rs", &["target".to_string()]));
        assert!(!is_excluded("src/lib.rs", &["target".to_string()]));
    }

    #[test]
    fn wildcard_matches_extension() {
        assert!(matches_glob("a/b/c.test.rs", "*.test.rs"));
        assert!(!matches_glob("a/b/c.rs", "*.test.rs"));
    }

    #[test]
    fn wildcard_matches_prefix_and_suffix() {
        assert!(matches_glob("vendor/lib/a.go", "vendor/*"));
    }
}
