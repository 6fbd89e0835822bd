//! Declaration scanner: the set of interface names a source declares

use ifgraph_core::DeclaredSet;
use tree_sitter::Tree;

use crate::config::AnalyzerConfig;
use crate::languages::{DeclarationLanguage, walk_preorder};

/// Collect every interface name declared anywhere in `tree`, minus the
/// ignore list.
///
/// Order is document order of first declaration; re-declarations (merged
/// interfaces) appear once.
pub fn scan_declarations(
    tree: &Tree,
    source: &[u8],
    language: &dyn DeclarationLanguage,
    config: &AnalyzerConfig,
) -> DeclaredSet {
    let mut declared = DeclaredSet::new();
    let mut ignored = 0usize;

    walk_preorder(tree.root_node(), |node| {
        let Some(name) = language.declared_name(node, source) else {
            return;
        };
        if config.is_ignored(name) {
            ignored += 1;
        } else {
            declared.insert(name);
        }
    });

    tracing::debug!(
        "Scanned {} interface declarations ({} ignored)",
        declared.len(),
        ignored
    );
    declared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::typescript::TypeScript;
    use crate::parser::{Dialect, parse_source};

    fn scan(source: &str) -> Vec<String> {
        let ts = TypeScript::new(Dialect::TypeScript);
        let tree = parse_source(source, &ts, false).unwrap();
        scan_declarations(&tree, source.as_bytes(), &ts, &AnalyzerConfig::default())
            .iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_only_interfaces_are_declarations() {
        let names = scan("interface A {}\ntype B = {};\nclass C {}\nenum D { X }\ninterface E {}");
        assert_eq!(names, vec!["A", "E"]);
    }

    #[test]
    fn test_ignore_list_applies() {
        let names = scan("interface Entry {}\ninterface File {}\ninterface Link {}");
        assert_eq!(names, vec!["Entry"]);
    }

    #[test]
    fn test_merged_interface_appears_once() {
        let names = scan("interface A { x: 1 }\ninterface B {}\ninterface A { y: 2 }");
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_source() {
        assert!(scan("").is_empty());
        assert!(scan("const x = 1;").is_empty());
    }
}
