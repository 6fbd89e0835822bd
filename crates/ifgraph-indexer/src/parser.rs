//! tree-sitter parsing for uploaded sources
//!
//! `tree_sitter::Parser` is neither `Send` nor `Sync`, so every call builds
//! its own parser. Requests therefore share no parser state.

use std::path::Path;

use tree_sitter::{Parser, Tree};

use crate::error::{AnalysisError, Result};
use crate::languages::DeclarationLanguage;

/// Grammar variant an input is parsed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `.ts`, `.d.ts`, and anything unrecognised
    #[default]
    TypeScript,
    /// `.tsx`
    Tsx,
}

impl Dialect {
    /// Pick the dialect from a file name's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    pub fn from_file_name(name: &str) -> Self {
        Self::from_path(Path::new(name))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }
}

/// Parse `source` with the grammar of `language`.
///
/// Error-recovered trees are accepted unless `strict` is set.
pub fn parse_source(source: &str, language: &dyn DeclarationLanguage, strict: bool) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| AnalysisError::SourceUnreadable(format!("grammar unavailable: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::SourceUnreadable("parser produced no tree".into()))?;

    let root = tree.root_node();
    tracing::debug!(
        "Parsed {} bytes as {}: {} top-level nodes, has_error={}",
        source.len(),
        language.name(),
        root.named_child_count(),
        root.has_error()
    );

    if strict && root.has_error() {
        return Err(AnalysisError::SourceUnreadable(
            "source contains syntax errors".into(),
        ));
    }

    Ok(tree)
}

/// Decode raw upload bytes before parsing.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| AnalysisError::SourceUnreadable(format!("input is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::typescript::TypeScript;

    #[test]
    fn test_dialect_from_path() {
        assert_eq!(Dialect::from_path(Path::new("types.ts")), Dialect::TypeScript);
        assert_eq!(Dialect::from_path(Path::new("lib/index.d.ts")), Dialect::TypeScript);
        assert_eq!(Dialect::from_path(Path::new("View.TSX")), Dialect::Tsx);
        assert_eq!(Dialect::from_file_name("no_extension"), Dialect::TypeScript);
    }

    #[test]
    fn test_parse_accepts_recovered_tree_by_default() {
        let ts = TypeScript::new(Dialect::TypeScript);
        let tree = parse_source("interface A { b: ", &ts, false).unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_strict_rejects_syntax_errors() {
        let ts = TypeScript::new(Dialect::TypeScript);
        let err = parse_source("interface A { b: ", &ts, true).unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnreadable(_)));
    }

    #[test]
    fn test_tsx_dialect_parses_jsx() {
        let tsx = TypeScript::new(Dialect::Tsx);
        let tree = parse_source("interface P { a: string }\nconst x = <div />;", &tsx, true).unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_decode_utf8_rejects_invalid_bytes() {
        assert_eq!(decode_utf8(b"interface A {}").unwrap(), "interface A {}");
        assert!(matches!(
            decode_utf8(&[0x69, 0xff, 0xfe]),
            Err(AnalysisError::SourceUnreadable(_))
        ));
    }
}
