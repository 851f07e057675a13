//! The global symbol table shared between pass 1 and pass 2 (§4.3).
//!
//! Built once after pass 1 completes across every file that was parsed or
//! whose entities remained active, then treated as immutable and shared
//! read-only across pass 2 (§5 shared-resource policy).

use cx_core::{EntityId, EntityKind};
use std::collections::HashMap;

/// A light projection of `Entity` with exactly the fields call resolution
/// needs, so `cx-extract` doesn't have to carry full `Entity` rows (with
/// bodies/skeletons) through pass 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub id: EntityId,
    pub name: String,
    pub qualified_name: Option<String>,
    pub file_path: String,
    pub line_start: u32,
    pub kind: EntityKind,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: HashMap<String, Vec<SymbolRef>>,
    by_qualified_name: HashMap<String, SymbolRef>,
    by_id: HashMap<EntityId, SymbolRef>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn insert(&mut self, symbol: SymbolRef) {
        if let Some(qn) = &symbol.qualified_name {
            self.by_qualified_name.insert(qn.clone(), symbol.clone());
        }
        self.by_id.insert(symbol.id.clone(), symbol.clone());
        self.by_name.entry(symbol.name.clone()).or_default().push(symbol);
    }

    pub fn get_by_id(&self, id: &EntityId) -> Option<&SymbolRef> {
        self.by_id.get(id)
    }

    /// Resolves a call-site callee expression to an entity id, following
    /// the preference order in §4.3: (a) exact local symbol handled by the
    /// caller before this is invoked, (b) qualified name, (c) simple name
    /// with the documented tie-break.
    pub fn resolve(
        &self,
        name: &str,
        qualifier: Option<&str>,
        current_file: &str,
    ) -> Option<EntityId> {
        if let Some(qualifier) = qualifier {
            let qualified = format!("{qualifier}.{name}");
            if let Some(sym) = self.by_qualified_name.get(&qualified) {
                return Some(sym.id.clone());
            }
        }

        let candidates = self.by_name.get(name)?;
        if candidates.is_empty() {
            return None;
        }
        if candidates.len() == 1 {
            return Some(candidates[0].id.clone());
        }

        // Tie-break: same-file candidates first (smallest line_start among
        // them), otherwise smallest file_path lexicographically, then
        // smallest line_start (§4.3).
        let mut same_file: Vec<&SymbolRef> =
            candidates.iter().filter(|c| c.file_path == current_file).collect();
        if !same_file.is_empty() {
            same_file.sort_by_key(|c| c.line_start);
            return Some(same_file[0].id.clone());
        }

        let mut sorted: Vec<&SymbolRef> = candidates.iter().collect();
        sorted.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then(a.line_start.cmp(&b.line_start))
        });
        sorted.first().map(|s| s.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(id: &str, name: &str, file: &str, line: u32) -> SymbolRef {
        SymbolRef {
            id: EntityId(id.to_string()),
            name: name.to_string(),
            qualified_name: None,
            file_path: file.to_string(),
            line_start: line,
            kind: EntityKind::Function,
        }
    }

    #[test]
    fn resolves_unique_name() {
        let mut table = SymbolTable::new();
        table.insert(sym("id-g", "G", "b.go", 1));
        assert_eq!(table.resolve("G", None, "a.go"), Some(EntityId("id-g".to_string())));
    }

    #[test]
    fn prefers_same_file_on_ambiguity() {
        let mut table = SymbolTable::new();
        table.insert(sym("id-other", "F", "z.go", 1));
        table.insert(sym("id-local", "F", "a.go", 5));
        assert_eq!(
            table.resolve("F", None, "a.go"),
            Some(EntityId("id-local".to_string()))
        );
    }

    #[test]
    fn tie_breaks_by_smallest_path_then_line() {
        let mut table = SymbolTable::new();
        table.insert(sym("id-b", "F", "b.go", 1));
        table.insert(sym("id-a-late", "F", "a.go", 20));
        table.insert(sym("id-a-early", "F", "a.go", 5));
        assert_eq!(
            table.resolve("F", None, "z.go"),
            Some(EntityId("id-a-early".to_string()))
        );
    }

    #[test]
    fn unresolved_name_returns_none() {
        let table = SymbolTable::new();
        assert_eq!(table.resolve("Missing", None, "a.go"), None);
    }
}
