//! Go entity and call-graph extraction.
//!
//! Same two-pass shape as [`crate::rust`], generalized to Go's grammar:
//! `function_declaration`/`method_declaration`, `type_declaration`,
//! `const_declaration`/`var_declaration`, `import_declaration`. Visibility
//! follows Go's capitalization rule rather than a keyword (§4.2).

use crate::common::{build_entity, collect_preceding_doc_comment, find_child_by_kind, line_range, node_text};
use crate::error::ExtractError;
use crate::symbol_table::SymbolTable;
use crate::traits::{CallGraphExtractor, EntityExtractor, ExtractedEntity};
use cx_core::{DepType, Dependency, EntityKind, Language, TypeKind, Visibility};
use cx_parse::ParseResult;
use tree_sitter::Node;

pub struct GoExtractor;

impl GoExtractor {
    pub fn new() -> Self {
        GoExtractor
    }

    fn visibility_of(name: &str) -> Visibility {
        match name.chars().next() {
            Some(c) if c.is_uppercase() => Visibility::Public,
            _ => Visibility::Private,
        }
    }

    fn receiver_type(method_node: &Node<'_>, source: &[u8]) -> Option<String> {
        let params = find_child_by_kind(method_node, "parameter_list")?;
        let param = find_child_by_kind(&params, "parameter_declaration")?;
        let ty = param.children(&mut param.walk()).last()?;
        Some(node_text(&ty, source).trim_start_matches('*').to_string())
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for GoExtractor {
    fn extract_entities<'tree>(
        &self,
        parse_result: &'tree ParseResult,
    ) -> Result<Vec<ExtractedEntity<'tree>>, ExtractError> {
        let mut out = Vec::new();
        walk(parse_result.root_node(), parse_result.source(), &parse_result.file_path, &mut out);
        Ok(out)
    }
}

fn walk<'tree>(node: Node<'tree>, source: &'tree [u8], file_path: &str, out: &mut Vec<ExtractedEntity<'tree>>) {
    match node.kind() {
        "function_declaration" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier") {
                let name = node_text(&name_node, source).to_string();
                let signature = format!("{name}(...)");
                let body = find_child_by_kind(&node, "block")
                    .map(|b| node_text(&b, source).to_string())
                    .unwrap_or_default();
                let entity = build_entity(
                    Language::Go,
                    file_path,
                    EntityKind::Function,
                    None,
                    &name,
                    None,
                    None,
                    line_range(&node),
                    signature,
                    &body,
                    collect_preceding_doc_comment(&node, source, "comment"),
                    GoExtractor::visibility_of(&name),
                );
                out.push(ExtractedEntity { entity, node });
            }
            return;
        }
        "method_declaration" => {
            if let Some(name_node) = find_child_by_kind(&node, "field_identifier") {
                let name = node_text(&name_node, source).to_string();
                let receiver = GoExtractor::receiver_type(&node, source);
                let signature = format!("{name}(...)");
                let body = find_child_by_kind(&node, "block")
                    .map(|b| node_text(&b, source).to_string())
                    .unwrap_or_default();
                let entity = build_entity(
                    Language::Go,
                    file_path,
                    EntityKind::Method,
                    None,
                    &name,
                    None,
                    receiver,
                    line_range(&node),
                    signature,
                    &body,
                    collect_preceding_doc_comment(&node, source, "comment"),
                    GoExtractor::visibility_of(&name),
                );
                out.push(ExtractedEntity { entity, node });
            }
            return;
        }
        "type_spec" => {
            if let Some(name_node) = find_child_by_kind(&node, "type_identifier") {
                let name = node_text(&name_node, source).to_string();
                let type_kind = if find_child_by_kind(&node, "interface_type").is_some() {
                    TypeKind::Interface
                } else {
                    TypeKind::Struct
                };
                let entity = build_entity(
                    Language::Go,
                    file_path,
                    EntityKind::Type,
                    Some(type_kind),
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("type {name}"),
                    "",
                    None,
                    GoExtractor::visibility_of(&name),
                );
                out.push(ExtractedEntity { entity, node });
            }
        }
        "const_spec" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier") {
                let name = node_text(&name_node, source).to_string();
                let entity = build_entity(
                    Language::Go,
                    file_path,
                    EntityKind::Constant,
                    None,
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("const {name}"),
                    "",
                    None,
                    GoExtractor::visibility_of(&name),
                );
                out.push(ExtractedEntity { entity, node });
            }
        }
        "import_spec" => {
            let text = node_text(&node, source).to_string();
            let entity = build_entity(
                Language::Go,
                file_path,
                EntityKind::Import,
                None,
                text.trim_matches('"'),
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
        walk(child, source, file_path, out);
    }
}

impl CallGraphExtractor for GoExtractor {
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
    if node.kind() == "call_expression" {
        if let Some(func) = node.child(0) {
            let (qualifier, name) = match func.kind() {
                "selector_expression" => {
                    let recv = func
                        .child_by_field_name("operand")
                        .map(|n| node_text(&n, source).to_string());
                    let field = func
                        .child_by_field_name("field")
                        .map(|n| node_text(&n, source).to_string());
                    (recv, field)
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
