// crates/mcp-compiler/src/checker/program.rs
// One parsed TypeScript source file

use crate::error::{CompilerError, Result};
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

/// Extensions accepted as compiler input
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Source text plus its syntax tree
pub struct Program {
    path: PathBuf,
    source: String,
    tree: Tree,
}

/// Where a node sits in the source, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    pub line_text: String,
    /// Node length in characters
    pub width: usize,
}

impl Program {
    /// Parse `source`, choosing the grammar from the file extension
    pub fn parse(path: impl Into<PathBuf>, source: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let source = source.into();
        let language = language_for(&path)?;

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| CompilerError::Config(format!("Failed to set TypeScript language: {}", e)))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| CompilerError::Parse(path.clone()))?;

        Ok(Self { path, source, tree })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`
    pub fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    pub fn location(&self, node: Node) -> Location {
        let start = node.start_byte();
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[start..]
            .find('\n')
            .map_or(self.source.len(), |i| start + i);
        let line_text = self.source[line_start..line_end].trim_end_matches('\r');

        Location {
            line: node.start_position().row + 1,
            column: self.source[line_start..start].chars().count() + 1,
            line_text: line_text.to_string(),
            width: self.text(node).chars().count(),
        }
    }
}

fn language_for(path: &Path) -> Result<Language> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "tsx" => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
        e if SOURCE_EXTENSIONS.contains(&e) => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        _ => Err(CompilerError::UnsupportedSource(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        children.into_iter().find_map(|c| find(c, kind))
    }

    #[test]
    fn test_parse_typescript() {
        let program = Program::parse("a.ts", "export function f(a: number) {}").unwrap();
        assert_eq!(program.root().kind(), "program");
        assert!(!program.root().has_error());
    }

    #[test]
    fn test_parse_tsx() {
        let program = Program::parse("a.tsx", "export function f() { return <div />; }").unwrap();
        assert!(!program.root().has_error());
    }

    #[test]
    fn test_rejects_other_extensions() {
        let err = Program::parse("a.py", "def f(): pass").err().unwrap();
        assert!(matches!(err, CompilerError::UnsupportedSource(_)));
    }

    #[test]
    fn test_location_of_parameter() {
        let src = "// header\nexport function f(count: number, w: Widget) {}\n";
        let program = Program::parse("a.ts", src).unwrap();
        let params = find(program.root(), "formal_parameters").unwrap();
        let mut cursor = params.walk();
        let second = params.named_children(&mut cursor).nth(1).unwrap();
        let loc = program.location(second);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 34);
        assert_eq!(loc.width, "w: Widget".len());
        assert_eq!(loc.line_text, "export function f(count: number, w: Widget) {}");
    }

    #[test]
    fn test_location_counts_characters_not_bytes() {
        let src = "export function f(é: string, w: Widget) {}";
        let program = Program::parse("a.ts", src).unwrap();
        let params = find(program.root(), "formal_parameters").unwrap();
        let mut cursor = params.walk();
        let second = params.named_children(&mut cursor).nth(1).unwrap();
        assert_eq!(program.location(second).column, 30);
    }
}
