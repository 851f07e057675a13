//! Rust entity and call-graph extraction.
//!
//! Grounded on `Isgl1KeyGeneratorImpl::walk_node` /
//! `extract_rust_dependencies` / `find_containing_function` /
//! `extract_callee_name` / `check_preceding_test_attribute`, generalized
//! from ISGL1's struct-only extraction into the full entity set the model
//! requires (functions, methods, types, constants, statics, imports) with
//! canonical signature rendering and doc-comment collection.

use crate::common::{
    build_entity, collect_preceding_doc_comment, find_child_by_kind, line_range, node_text,
};
use crate::error::ExtractError;
use crate::symbol_table::SymbolTable;
use crate::traits::{CallGraphExtractor, EntityExtractor, ExtractedEntity};
use cx_core::{DepType, Dependency, EntityKind, Language, TypeKind, Visibility};
use cx_parse::ParseResult;
use tree_sitter::Node;

pub struct RustExtractor;

impl RustExtractor {
    pub fn new() -> Self {
        RustExtractor
    }

    fn visibility_of(node: &Node<'_>, source: &[u8]) -> Visibility {
        if find_child_by_kind(node, "visibility_modifier")
            .map(|v| node_text(&v, source).starts_with("pub"))
            .unwrap_or(false)
        {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    fn doc_comment(node: &Node<'_>, source: &[u8]) -> Option<String> {
        collect_preceding_doc_comment(node, source, "line_comment")
            .filter(|c| c.lines().all(|l| l.starts_with("///") || l.starts_with("//!")))
    }

    fn render_signature(node: &Node<'_>, source: &[u8]) -> String {
        let name = find_child_by_kind(node, "identifier")
            .map(|n| node_text(&n, source).to_string())
            .unwrap_or_default();
        let params = find_child_by_kind(node, "parameters")
            .map(|p| Self::render_parameters(&p, source))
            .unwrap_or_default();
        let ret = node
            .children(&mut node.walk())
            .find(|c| c.kind() != "parameters" && c.kind() != "identifier" && c.kind() != "block" && c.kind() != "visibility_modifier" && c.kind() != "function_modifiers")
            .filter(|c| {
                // crude: anything type-shaped that appears after the params and
                // before the body counts as the return type annotation.
                matches!(
                    c.kind(),
                    "type_identifier" | "generic_type" | "reference_type" | "primitive_type" | "tuple_type" | "unit_type" | "scoped_type_identifier"
                )
            })
            .map(|n| node_text(&n, source).to_string());
        match ret {
            Some(r) => format!("{name}({params}) -> ({r})"),
            None => format!("{name}({params}) -> ()"),
        }
    }

    fn render_parameters(params_node: &Node<'_>, source: &[u8]) -> String {
        let mut cursor = params_node.walk();
        let mut rendered = Vec::new();
        for child in params_node.children(&mut cursor) {
            match child.kind() {
                "parameter" => {
                    let pname = find_child_by_kind(&child, "identifier")
                        .map(|n| node_text(&n, source).to_string())
                        .unwrap_or_else(|| "_".to_string());
                    let ptype = child
                        .children(&mut child.walk())
                        .last()
                        .map(|n| node_text(&n, source).to_string())
                        .unwrap_or_default();
                    rendered.push(format!("{pname}: {ptype}"));
                }
                "self_parameter" => rendered.push(node_text(&child, source).to_string()),
                _ => {}
            }
        }
        rendered.join(", ")
    }

    fn extract_function(
        &self,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        receiver: Option<String>,
    ) -> ExtractedEntity<'_> {
        let name = find_child_by_kind(&node, "identifier")
            .map(|n| node_text(&n, source).to_string())
            .unwrap_or_default();
        let signature = Self::render_signature(&node, source);
        let body_text = find_child_by_kind(&node, "block")
            .map(|b| node_text(&b, source).to_string())
            .unwrap_or_default();
        let kind = if receiver.is_some() {
            EntityKind::Method
        } else {
            EntityKind::Function
        };
        let entity = build_entity(
            Language::Rust,
            file_path,
            kind,
            None,
            &name,
            None,
            receiver,
            line_range(&node),
            signature,
            &body_text,
            Self::doc_comment(&node, source),
            Self::visibility_of(&node, source),
        );
        ExtractedEntity { entity, node }
    }

    fn extract_type_item(
        &self,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        type_kind: TypeKind,
        name_kind: &str,
    ) -> Option<ExtractedEntity<'_>> {
        let name = find_child_by_kind(&node, name_kind)
            .map(|n| node_text(&n, source).to_string())?;
        let entity = build_entity(
            Language::Rust,
            file_path,
            EntityKind::Type,
            Some(type_kind),
            &name,
            None,
            None,
            line_range(&node),
            format!("type {name}"),
            "",
            Self::doc_comment(&node, source),
            Self::visibility_of(&node, source),
        );
        Some(ExtractedEntity { entity, node })
    }

    fn receiver_type(impl_node: &Node<'_>, source: &[u8]) -> Option<String> {
        // impl_item: "impl" type_parameters? type ("for" type)? body
        // Without a trait, the first `type_identifier`/`generic_type` child
        // is the Self type. With a trait, it's the second such child.
        let type_children: Vec<Node<'_>> = impl_node
            .children(&mut impl_node.walk())
            .filter(|c| {
                matches!(
                    c.kind(),
                    "type_identifier" | "generic_type" | "scoped_type_identifier"
                )
            })
            .collect();
        type_children.last().map(|n| node_text(n, source).to_string())
    }

    fn trait_name(impl_node: &Node<'_>, source: &[u8]) -> Option<String> {
        let type_children: Vec<Node<'_>> = impl_node
            .children(&mut impl_node.walk())
            .filter(|c| {
                matches!(
                    c.kind(),
                    "type_identifier" | "generic_type" | "scoped_type_identifier"
                )
            })
            .collect();
        if type_children.len() >= 2 {
            Some(node_text(&type_children[0], source).to_string())
        } else {
            None
        }
    }
}

impl Default for RustExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for RustExtractor {
    fn extract_entities<'tree>(
        &self,
        parse_result: &'tree ParseResult,
    ) -> Result<Vec<ExtractedEntity<'tree>>, ExtractError> {
        let mut out = Vec::new();
        let source = parse_result.source();
        let file_path = parse_result.file_path.clone();
        walk_rust(self, parse_result.root_node(), source, &file_path, None, &mut out);
        Ok(out)
    }
}

fn walk_rust<'tree>(
    ex: &RustExtractor,
    node: Node<'tree>,
    source: &'tree [u8],
    file_path: &str,
    receiver: Option<String>,
    out: &mut Vec<ExtractedEntity<'tree>>,
) {
    match node.kind() {
        "function_item" => {
            out.push(ex.extract_function(node, source, file_path, receiver.clone()));
            return; // body is captured as text; don't descend into it for entities
        }
        "struct_item" => {
            if let Some(e) = ex.extract_type_item(node, source, file_path, TypeKind::Struct, "type_identifier") {
                out.push(e);
            }
        }
        "enum_item" => {
            if let Some(e) = ex.extract_type_item(node, source, file_path, TypeKind::Enum, "type_identifier") {
                out.push(e);
            }
        }
        "trait_item" => {
            if let Some(e) = ex.extract_type_item(node, source, file_path, TypeKind::Interface, "type_identifier") {
                out.push(e);
            }
        }
        "const_item" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier") {
                let name = node_text(&name_node, source).to_string();
                let entity = build_entity(
                    Language::Rust,
                    file_path,
                    EntityKind::Constant,
                    None,
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("const {name}"),
                    "",
                    RustExtractor::doc_comment(&node, source),
                    RustExtractor::visibility_of(&node, source),
                );
                out.push(ExtractedEntity { entity, node });
            }
        }
        "static_item" => {
            if let Some(name_node) = find_child_by_kind(&node, "identifier") {
                let name = node_text(&name_node, source).to_string();
                let entity = build_entity(
                    Language::Rust,
                    file_path,
                    EntityKind::Variable,
                    None,
                    &name,
                    None,
                    None,
                    line_range(&node),
                    format!("static {name}"),
                    "",
                    RustExtractor::doc_comment(&node, source),
                    RustExtractor::visibility_of(&node, source),
                );
                out.push(ExtractedEntity { entity, node });
            }
        }
        "use_declaration" => {
            let text = node_text(&node, source).trim().to_string();
            let name = text
                .trim_start_matches("use")
                .trim()
                .trim_end_matches(';')
                .to_string();
            let entity = build_entity(
                Language::Rust,
                file_path,
                EntityKind::Import,
                None,
                &name,
                None,
                None,
                line_range(&node),
                text,
                "",
                None,
                Visibility::Private,
            );
            out.push(ExtractedEntity { entity, node });
        }
        "impl_item" => {
            let recv = RustExtractor::receiver_type(&node, source);
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk_rust(ex, child, source, file_path, recv.clone(), out);
            }
            return;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_rust(ex, child, source, file_path, receiver.clone(), out);
    }
}

impl CallGraphExtractor for RustExtractor {
    fn extract_dependencies(
        &self,
        parse_result: &ParseResult,
        local_entities: &[ExtractedEntity<'_>],
        symbols: &SymbolTable,
    ) -> Result<Vec<Dependency>, ExtractError> {
        let mut deps = Vec::new();
        let source = parse_result.source();
        let file_path = &parse_result.file_path;

        // `implements` edges: one per impl block that names a trait.
        collect_impl_edges(parse_result.root_node(), source, file_path, symbols, &mut deps);

        // `calls` edges: one per resolved call_expression inside a function body.
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

fn collect_impl_edges(
    node: Node<'_>,
    source: &[u8],
    file_path: &str,
    symbols: &SymbolTable,
    deps: &mut Vec<Dependency>,
) {
    if node.kind() == "impl_item" {
        if let (Some(trait_name), Some(self_type)) = (
            RustExtractor::trait_name(&node, source),
            RustExtractor::receiver_type(&node, source),
        ) {
            if let (Some(impl_id), Some(trait_id)) = (
                symbols.resolve(&self_type, None, file_path),
                symbols.resolve(&trait_name, None, file_path),
            ) {
                deps.push(Dependency::new(impl_id, trait_id, DepType::Implements));
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_impl_edges(child, source, file_path, symbols, deps);
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
        if let Some(function_node) = node.child(0) {
            let (qualifier, name) = match function_node.kind() {
                "field_expression" => {
                    let recv = find_child_by_kind(&function_node, "identifier")
                        .map(|n| node_text(&n, source).to_string());
                    let field = function_node
                        .child_by_field_name("field")
                        .map(|n| node_text(&n, source).to_string());
                    (recv, field)
                }
                "identifier" => (None, Some(node_text(&function_node, source).to_string())),
                "scoped_identifier" => {
                    let full = node_text(&function_node, source);
                    match full.rsplit_once("::") {
                        Some((module, name)) => (Some(module.to_string()), Some(name.to_string())),
                        None => (None, Some(full.to_string())),
                    }
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_table::SymbolRef;
    use cx_parse::ParserRegistry;

    fn parse(src: &str) -> ParseResult {
        let registry = ParserRegistry::new().unwrap();
        let adapter = registry.get(Language::Rust).unwrap();
        adapter.parse("a.rs", src.as_bytes()).unwrap()
    }

    #[test]
    fn extracts_free_function_with_signature() {
        let pr = parse("pub fn add(a: i32, b: i32) -> i32 { a + b }");
        let entities = RustExtractor::new().extract_entities(&pr).unwrap();
        assert_eq!(entities.len(), 1);
        let e = &entities[0].entity;
        assert_eq!(e.name, "add");
        assert_eq!(e.kind, EntityKind::Function);
        assert_eq!(e.visibility, Visibility::Public);
        assert!(e.signature.contains("add("));
    }

    #[test]
    fn extracts_struct_and_method_with_receiver() {
        let src = "struct Buffer { len: usize }\nimpl Buffer { fn write(&self) {} }";
        let pr = parse(src);
        let entities = RustExtractor::new().extract_entities(&pr).unwrap();
        assert!(entities.iter().any(|e| e.entity.name == "Buffer" && e.entity.kind == EntityKind::Type));
        let method = entities.iter().find(|e| e.entity.name == "write").unwrap();
        assert_eq!(method.entity.kind, EntityKind::Method);
        assert_eq!(method.entity.receiver.as_deref(), Some("Buffer"));
    }

    #[test]
    fn body_only_edit_preserves_id_and_sig_hash() {
        let pr1 = parse("fn f() { g(); }");
        let pr2 = parse("fn f() { g(); g(); }");
        let e1 = &RustExtractor::new().extract_entities(&pr1).unwrap()[0].entity;
        let e2 = &RustExtractor::new().extract_entities(&pr2).unwrap()[0].entity;
        assert_eq!(e1.id, e2.id);
        assert_eq!(e1.sig_hash, e2.sig_hash);
        assert_ne!(e1.body_hash, e2.body_hash);
    }

    #[test]
    fn resolves_simple_call_within_same_file() {
        let src = "fn f() { g(); }\nfn g() {}";
        let pr = parse(src);
        let extractor = RustExtractor::new();
        let entities = extractor.extract_entities(&pr).unwrap();
        let mut symbols = SymbolTable::new();
        for e in &entities {
            symbols.insert(SymbolRef {
                id: e.entity.id.clone(),
                name: e.entity.name.clone(),
                qualified_name: e.entity.qualified_name.clone(),
                file_path: e.entity.file_path.clone(),
                line_start: e.entity.lines.start,
                kind: e.entity.kind,
            });
        }
        let deps = extractor.extract_dependencies(&pr, &entities, &symbols).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].dep_type, DepType::Calls);
    }
}
