//! Small tree-walking helpers shared by every language module.

use chrono::Utc;
use cx_core::{
    generate_entity_id, sig_hash, body_hash, Entity, EntityId, EntityKind, EntityStatus, Language,
    LineRange, TypeKind, Visibility,
};
use tree_sitter::Node;

pub fn node_text<'a>(node: &Node<'_>, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

pub fn line_range(node: &Node<'_>) -> LineRange {
    LineRange::new(
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

/// Collects contiguous `///`/`//!`/`#`/`//`-style comment lines immediately
/// preceding `node`, stopping at the first non-comment sibling (§4.2 doc
/// comment rule). `comment_kind` is the grammar's node kind for a single
/// comment line/block (e.g. `"line_comment"`, `"comment"`).
pub fn collect_preceding_doc_comment(
    node: &Node<'_>,
    source: &[u8],
    comment_kind: &str,
) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        if sibling.kind() != comment_kind {
            break;
        }
        lines.push(node_text(&sibling, source).trim().to_string());
        current = sibling.prev_sibling();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

pub fn skeleton_for(kind: EntityKind, name: &str, signature: &str, type_kind: Option<TypeKind>) -> String {
    match kind {
        EntityKind::Function | EntityKind::Method => format!("{signature} {{ ... }}"),
        EntityKind::Type => {
            let kw = type_kind
                .map(|t| format!("{t:?}").to_lowercase())
                .unwrap_or_else(|| "type".to_string());
            format!("type {name} {kw} {{ ... }}")
        }
        EntityKind::Constant => format!("const {name} {signature}"),
        EntityKind::Variable => format!("var {name} {signature}"),
        EntityKind::Enum => format!("enum {name} {{ ... }}"),
        EntityKind::Import => signature.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn build_entity(
    language: Language,
    file_path: &str,
    kind: EntityKind,
    type_kind: Option<TypeKind>,
    name: &str,
    qualified_name: Option<String>,
    receiver: Option<String>,
    lines: LineRange,
    signature: String,
    body_text: &str,
    doc_comment: Option<String>,
    visibility: Visibility,
) -> Entity {
    let id = EntityId(generate_entity_id(language, file_path, kind, name, receiver.as_deref()));
    let sig_h = sig_hash(&signature);
    let body_h = body_hash(body_text);
    let skeleton = skeleton_for(kind, name, &signature, type_kind);
    let now = Utc::now();
    Entity {
        id,
        name: name.to_string(),
        qualified_name,
        kind,
        type_kind,
        file_path: file_path.to_string(),
        lines,
        signature,
        sig_hash: sig_h,
        body_hash: body_h,
        doc_comment,
        skeleton: Some(skeleton),
        receiver,
        visibility,
        language,
        status: EntityStatus::Active,
        created_at: now,
        updated_at: now,
    }
}
