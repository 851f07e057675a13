//! C and C++ entity and call-graph extraction.
//!
//! One walker covers both grammars: `function_definition`, `struct_specifier`,
//! plus `class_specifier` for C++. Neither language has a `pub` keyword or
//! a capitalization rule; everything declared outside an anonymous/`static`
//! qualifier is treated as public, matching the header-is-the-interface
//! convention these languages use in practice.

use crate::common::{build_entity, find_child_by_kind, line_range, node_text};
use crate::error::ExtractError;
use crate::symbol_table::SymbolTable;
use crate::traits::{CallGraphExtractor, EntityExtractor, ExtractedEntity};
use cx_core::{DepType, Dependency, EntityKind, Language, TypeKind, Visibility};
use cx_parse::ParseResult;
use tree_sitter::Node;

pub struct CFamilyExtractor {
    language: Language,
}

impl CFamilyExtractor {
    pub fn new(language: Language) -> Self {
        CFamilyExtractor { language }
    }

    fn visibility_of(node: &Node<'_>, source: &[u8]) -> Visibility {
        if node_text(node, source).trim_start().starts_with("static") {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    fn declarator_name<'a>(node: &Node<'a>, source: &[u8]) -> Option<String> {
        // function_declarator -> identifier, possibly nested under pointer_declarator
        let mut current = *node;
        loop {
            if let Some(id) = find_child_by_kind(&current, "identifier")
                .or_else(|| find_child_by_kind(&current, "field_identifier"))
            {
                return Some(node_text(&id, source).to_string());
            }
            let next = current
                .children(&mut current.walk())
                .find(|c| c.kind() == "function_declarator" || c.kind() == "pointer_declarator");
            match next {
                Some(n) => current = n,
                None => return None,
            }
        }
    }
}

impl EntityExtractor for CFamilyExtractor {
    fn extract_entities<'tree>(
        &self,
        parse_result: &'tree ParseResult,
    ) -> Result<Vec<ExtractedEntity<'tree>>, ExtractError> {
        let mut out = Vec::new();
        walk(self.language, parse_result.root_node(), parse_result.source(), &parse_result.file_path, &mut out);
        Ok(out)
    }
}

fn walk<'tree>(
    language: Language,
    node: Node<'tree>,
    source: &'tree [u8],
    file_path: &str,
    out: &mut Vec<ExtractedEntity<'tree>>,
) {
    match node.kind() {
        "function_definition" => {
            if let Some(declarator) = find_child_by_kind(&node, "function_declarator")
                .or_else(|| find_child_by_kind(&node, "pointer_declarator"))
            {
                if let Some(name) = CFamilyExtractor::declarator_name(&declarator, source) {
                    let body = find_child_by_kind(&node, "compound_statement")
                        .map(|b| node_text(&b, source).to_string())
                        .unwrap_or_default();
                    let entity = build_entity(
                        language,
                        file_path,
                        EntityKind::Function,
                        None,
                        &name,
                        None,
                        None,
                        line_range(&node),
                        format!("{name}(...)"),
                        &body,
                        None,
                        CFamilyExtractor::visibility_of(&node, source),
                    );
                    out.push(ExtractedEntity { entity, node });
                }
            }
            return;
        }
        "struct_specifier" | "class_specifier" => {
            if let Some(name_node) = find_child_by_kind(&node, "type_identifier") {
                let name = node_text(&name_node, source).to_string();
                let type_kind = if node.kind() == "class_specifier" {
                    TypeKind::Class
                } else {
                    TypeKind::Struct
                };
                let entity = build_entity(
                    language,
                    file_path,
                    EntityKind::Type,
                    Some(type_kind),
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("{} {name}", if type_kind == TypeKind::Class { "class" } else { "struct" }),
                    "",
                    None,
                    Visibility::Public,
                );
                out.push(ExtractedEntity { entity, node });
            }
        }
        "preproc_include" => {
            let text = node_text(&node, source).to_string();
            let entity = build_entity(
                language,
                file_path,
                EntityKind::Import,
                None,
                &text,
                None,
                None,
                line_range(&node),
                text.clone(),
                "",
                None,
                Visibility::Private,
            );
            out.push(ExtractedEntity { entity, node });
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(language, child, source, file_path, out);
    }
}

impl CallGraphExtractor for CFamilyExtractor {
    fn extract_dependencies(
        &self,
        parse_result: &ParseResult,
        local_entities: &[ExtractedEntity<'_>],
        symbols: &SymbolTable,
    ) -> Result<Vec<Dependency>, ExtractError> {
        let mut deps = Vec::new();
        let source = parse_result.source();
        let file_path = &parse_result.file_path;
        for local in local_entities {
            if local.entity.kind != EntityKind::Function {
                continue;
            }
            if let Some(body) = find_child_by_kind(&local.node, "compound_statement") {
                collect_calls(&body, source, file_path, &local.entity.id, symbols, &mut deps);
            }
        }
        Ok(deps)
    }
}

fn collect_calls(
    node: &Node<'_>,
    source: &[u8],
    file_path: &str,
    from_id: &cx_core::EntityId,
    symbols: &SymbolTable,
    deps: &mut Vec<Dependency>,
) {
    if node.kind() == "call_expression" {
        if let Some(func) = node.child_by_field_name("function") {
            if func.kind() == "identifier" {
                let name = node_text(&func, source).to_string();
                if let Some(to_id) = symbols.resolve(&name, None, file_path) {
                    deps.push(Dependency::new(from_id.clone(), to_id, DepType::Calls));
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(&child, source, file_path, from_id, symbols, deps);
    }
}
