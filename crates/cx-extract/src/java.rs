//! Java entity and call-graph extraction.

use crate::common::{build_entity, find_child_by_kind, line_range, node_text};
use crate::error::ExtractError;
use crate::symbol_table::SymbolTable;
use crate::traits::{CallGraphExtractor, EntityExtractor, ExtractedEntity};
use cx_core::{DepType, Dependency, EntityKind, Language, TypeKind, Visibility};
use cx_parse::ParseResult;
use tree_sitter::Node;

pub struct JavaExtractor;

impl JavaExtractor {
    pub fn new() -> Self {
        JavaExtractor
    }

    fn visibility_of(node: &Node<'_>, source: &[u8]) -> Visibility {
        if let Some(modifiers) = find_child_by_kind(node, "modifiers") {
            let text = node_text(&modifiers, source);
            if text.contains("public") {
                return Visibility::Public;
            }
            if text.contains("protected") {
                return Visibility::Protected;
            }
            if text.contains("private") {
                return Visibility::Private;
            }
        }
        Visibility::Package
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for JavaExtractor {
    fn extract_entities<'tree>(
        &self,
        parse_result: &'tree ParseResult,
    ) -> Result<Vec<ExtractedEntity<'tree>>, ExtractError> {
        let mut out = Vec::new();
        walk(parse_result.root_node(), parse_result.source(), &parse_result.file_path, None, &mut out);
        Ok(out)
    }
}

fn walk<'tree>(
    node: Node<'tree>,
    source: &'tree [u8],
    file_path: &str,
    receiver: Option<String>,
    out: &mut Vec<ExtractedEntity<'tree>>,
) {
    match node.kind() {
        "method_declaration" | "constructor_declaration" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier") {
                let name = node_text(&name_node, source).to_string();
                let params = find_child_by_kind(&node, "formal_parameters")
                    .map(|p| node_text(&p, source).to_string())
                    .unwrap_or_default();
                let signature = format!("{name}{params}");
                let body = find_child_by_kind(&node, "block")
                    .map(|b| node_text(&b, source).to_string())
                    .unwrap_or_default();
                let entity = build_entity(
                    Language::Java,
                    file_path,
                    EntityKind::Method,
                    None,
                    &name,
                    None,
                    receiver.clone(),
                    line_range(&node),
                    signature,
                    &body,
                    None,
                    JavaExtractor::visibility_of(&node, source),
                );
                out.push(ExtractedEntity { entity, node });
            }
            return;
        }
        "class_declaration" | "interface_declaration" | "enum_declaration" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier") {
                let name = node_text(&name_node, source).to_string();
                let type_kind = match node.kind() {
                    "interface_declaration" => TypeKind::Interface,
                    "enum_declaration" => TypeKind::Enum,
                    _ => TypeKind::Class,
                };
                let entity = build_entity(
                    Language::Java,
                    file_path,
                    EntityKind::Type,
                    Some(type_kind),
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("{} {name}", node.kind().trim_end_matches("_declaration")),
                    "",
                    None,
                    JavaExtractor::visibility_of(&node, source),
                );
                out.push(ExtractedEntity { entity, node });
                if let Some(body) = node.children(&mut node.walk()).find(|c| c.kind().ends_with("_body")) {
                    let mut cursor = body.walk();
                    for child in body.children(&mut cursor) {
                        walk(child, source, file_path, Some(name.clone()), out);
                    }
                }
                return;
            }
        }
        "import_declaration" => {
            let text = node_text(&node, source).to_string();
            let entity = build_entity(
                Language::Java,
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
        walk(child, source, file_path, receiver.clone(), out);
    }
}

impl CallGraphExtractor for JavaExtractor {
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
            if local.entity.kind != EntityKind::Method {
                continue;
            }
            if let Some(body) = find_child_by_kind(&local.node, "block") {
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
    if node.kind() == "method_invocation" {
        let qualifier = node
            .child_by_field_name("object")
            .map(|n| node_text(&n, source).to_string());
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source).to_string());
        if let Some(name) = name {
            if let Some(to_id) = symbols.resolve(&name, qualifier.as_deref(), file_path) {
                deps.push(Dependency::new(from_id.clone(), to_id, DepType::Calls));
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(&child, source, file_path, from_id, symbols, deps);
    }
}
