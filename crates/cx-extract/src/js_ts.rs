//! JavaScript/TypeScript entity and call-graph extraction. One walker
//! serves both grammars; TypeScript's extra syntax (`interface`, type
//! annotations) just adds a couple of node kinds to match on.

use crate::common::{build_entity, find_child_by_kind, line_range, node_text};
use crate::error::ExtractError;
use crate::symbol_table::SymbolTable;
use crate::traits::{CallGraphExtractor, EntityExtractor, ExtractedEntity};
use cx_core::{DepType, Dependency, EntityKind, Language, TypeKind, Visibility};
use cx_parse::ParseResult;
use tree_sitter::Node;

pub struct JsTsExtractor {
    language: Language,
}

impl JsTsExtractor {
    pub fn new(language: Language) -> Self {
        JsTsExtractor { language }
    }

    fn visibility_of(node: &Node<'_>, source: &[u8]) -> Visibility {
        let mut current = node.prev_sibling();
        while let Some(n) = current {
            if n.kind() == "export_statement" {
                return Visibility::Public;
            }
            current = n.prev_sibling();
        }
        if let Some(parent) = node.parent() {
            if parent.kind() == "export_statement" {
                return Visibility::Public;
            }
        }
        let _ = source;
        Visibility::Private
    }
}

impl EntityExtractor for JsTsExtractor {
    fn extract_entities<'tree>(
        &self,
        parse_result: &'tree ParseResult,
    ) -> Result<Vec<ExtractedEntity<'tree>>, ExtractError> {
        let mut out = Vec::new();
        walk(self.language, parse_result.root_node(), parse_result.source(), &parse_result.file_path, None, &mut out);
        Ok(out)
    }
}

fn walk<'tree>(
    language: Language,
    node: Node<'tree>,
    source: &'tree [u8],
    file_path: &str,
    receiver: Option<String>,
    out: &mut Vec<ExtractedEntity<'tree>>,
) {
    match node.kind() {
        "function_declaration" | "method_definition" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier")
                .or_else(|| find_child_by_kind(&node, "property_identifier"))
            {
                let name = node_text(&name_node, source).to_string();
                let params = find_child_by_kind(&node, "formal_parameters")
                    .map(|p| node_text(&p, source).to_string())
                    .unwrap_or_default();
                let signature = format!("{name}{params}");
                let body = find_child_by_kind(&node, "statement_block")
                    .map(|b| node_text(&b, source).to_string())
                    .unwrap_or_default();
                let kind = if receiver.is_some() || node.kind() == "method_definition" {
                    EntityKind::Method
                } else {
                    EntityKind::Function
                };
                let entity = build_entity(
                    language,
                    file_path,
                    kind,
                    None,
                    &name,
                    None,
                    receiver.clone(),
                    line_range(&node),
                    signature,
                    &body,
                    None,
                    JsTsExtractor::visibility_of(&node, source),
                );
                out.push(ExtractedEntity { entity, node });
            }
            return;
        }
        "class_declaration" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier")
                .or_else(|| find_child_by_kind(&node, "type_identifier"))
            {
                let name = node_text(&name_node, source).to_string();
                let entity = build_entity(
                    language,
                    file_path,
                    EntityKind::Type,
                    Some(TypeKind::Class),
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("class {name}"),
                    "",
                    None,
                    JsTsExtractor::visibility_of(&node, source),
                );
                out.push(ExtractedEntity { entity, node });
                if let Some(body) = find_child_by_kind(&node, "class_body") {
                    let mut cursor = body.walk();
                    for child in body.children(&mut cursor) {
                        walk(language, child, source, file_path, Some(name.clone()), out);
                    }
                }
                return;
            }
        }
        "interface_declaration" => {
            if let Some(name_node) = find_child_by_kind(&node, "type_identifier") {
                let name = node_text(&name_node, source).to_string();
                let entity = build_entity(
                    language,
                    file_path,
                    EntityKind::Type,
                    Some(TypeKind::Interface),
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("interface {name}"),
                    "",
                    None,
                    JsTsExtractor::visibility_of(&node, source),
                );
                out.push(ExtractedEntity { entity, node });
            }
        }
        "import_statement" => {
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
        walk(language, child, source, file_path, receiver.clone(), out);
    }
}

impl CallGraphExtractor for JsTsExtractor {
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
            if !matches!(local.entity.kind, EntityKind::Function | EntityKind::Method) {
                continue;
            }
            if let Some(body) = find_child_by_kind(&local.node, "statement_block") {
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
            let (qualifier, name) = match func.kind() {
                "member_expression" => {
                    let recv = func
                        .child_by_field_name("object")
                        .map(|n| node_text(&n, source).to_string());
                    let prop = func
                        .child_by_field_name("property")
                        .map(|n| node_text(&n, source).to_string());
                    (recv, prop)
                }
                "identifier" => (None, Some(node_text(&func, source).to_string())),
                _ => (None, None),
            };
            if let Some(name) = name {
                if let Some(to_id) = symbols.resolve(&name, qualifier.as_deref(), file_path) {
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
