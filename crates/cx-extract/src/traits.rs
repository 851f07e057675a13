//! C2/C3 contracts (§4.2, §4.3).

use crate::error::ExtractError;
use crate::symbol_table::SymbolTable;
use cx_core::{Dependency, Entity};
use cx_parse::ParseResult;

/// An entity paired with the tree-sitter node it was extracted from.
///
/// The node is retained only for the duration of the scan (needed by
/// `CallGraphExtractor` to find "the containing function" for a call
/// site); it borrows from the `ParseResult`'s tree.
pub struct ExtractedEntity<'tree> {
    pub entity: Entity,
    pub node: tree_sitter::Node<'tree>,
}

/// C2: walks a parse tree and emits entities in source order.
pub trait EntityExtractor {
    fn extract_entities<'tree>(
        &self,
        parse_result: &'tree ParseResult,
    ) -> Result<Vec<ExtractedEntity<'tree>>, ExtractError>;
}

/// C3: given a parse tree and the global symbol table, emits best-effort
/// dependency edges.
pub trait CallGraphExtractor {
    fn extract_dependencies(
        &self,
        parse_result: &ParseResult,
        local_entities: &[ExtractedEntity<'_>],
        symbols: &SymbolTable,
    ) -> Result<Vec<Dependency>, ExtractError>;
}
