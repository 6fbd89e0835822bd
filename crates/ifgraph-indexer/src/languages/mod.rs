//! Grammar knowledge behind the scanner and extractor

pub mod typescript;

use tree_sitter::{Language, Node};

use crate::parser::Dialect;

/// What the scanner and extractor need to know about a grammar.
pub trait DeclarationLanguage: Send + Sync {
    fn name(&self) -> &'static str;

    fn grammar(&self) -> Language;

    /// Name introduced by `node` if it is an interface declaration.
    ///
    /// Ignored names are still returned here: an ignored interface still
    /// encloses the references inside it.
    fn declared_name<'s>(&self, node: Node<'_>, source: &'s [u8]) -> Option<&'s str>;

    /// Plain name `node` refers to if it is a type reference.
    ///
    /// Binders and qualified names yield `None`.
    fn referenced_name<'s>(&self, node: Node<'_>, source: &'s [u8]) -> Option<&'s str>;

    /// Whether `node` is the supertype named by an `extends`/`implements`
    /// clause.
    fn is_heritage_head(&self, node: Node<'_>) -> bool;
}

/// Language implementation for a dialect.
pub fn for_dialect(dialect: Dialect) -> Box<dyn DeclarationLanguage> {
    Box::new(typescript::TypeScript::new(dialect))
}

/// Visit every node under `root` in document order.
///
/// Iterative, so nesting depth is bounded by the heap rather than the stack.
pub fn walk_preorder<'t, F>(root: Node<'t>, mut visit: F)
where
    F: FnMut(Node<'t>),
{
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Whether `child` is the node stored under `field` on `parent`.
pub(crate) fn is_field_of(parent: Node<'_>, field: &str, child: Node<'_>) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|named| named.id() == child.id())
}
