//! TypeScript and TSX via tree-sitter-typescript

use tree_sitter::{Language, Node};

use super::{DeclarationLanguage, is_field_of};
use crate::parser::Dialect;

/// Node kinds whose `name` field binds a new type name.
const BINDING_KINDS: &[&str] = &[
    "interface_declaration",
    "type_alias_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "class",
    "type_parameter",
    "mapped_type_clause",
];

const HERITAGE_CLAUSES: &[&str] = &["extends_type_clause", "extends_clause", "implements_clause"];

#[derive(Debug, Clone, Copy)]
pub struct TypeScript {
    dialect: Dialect,
}

impl TypeScript {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl DeclarationLanguage for TypeScript {
    fn name(&self) -> &'static str {
        self.dialect.as_str()
    }

    fn grammar(&self) -> Language {
        match self.dialect {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn declared_name<'s>(&self, node: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
        if node.kind() != "interface_declaration" {
            return None;
        }
        node.child_by_field_name("name")?.utf8_text(source).ok()
    }

    fn referenced_name<'s>(&self, node: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
        if node.kind() != "type_identifier" {
            return None;
        }
        let parent = node.parent()?;
        match parent.kind() {
            // `Ns.Name`: the right-hand side is not a plain identifier
            "nested_type_identifier" | "infer_type" => return None,
            kind if BINDING_KINDS.contains(&kind) && is_field_of(parent, "name", node) => {
                return None;
            }
            _ => {}
        }
        node.utf8_text(source).ok()
    }

    fn is_heritage_head(&self, node: Node<'_>) -> bool {
        let Some(parent) = node.parent() else {
            return false;
        };
        if HERITAGE_CLAUSES.contains(&parent.kind()) {
            return true;
        }
        // `extends Base<T>`: `Base` is the head, `T` is an ordinary reference
        parent.kind() == "generic_type"
            && is_field_of(parent, "name", node)
            && parent
                .parent()
                .is_some_and(|clause| HERITAGE_CLAUSES.contains(&clause.kind()))
    }
}
