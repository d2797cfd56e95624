//! Source loading: Go text to [`SourceTree`].

use std::fs;
use std::path::Path;

use tree_sitter::{LanguageError, Node, Parser};

use crate::comments::{Anchor, Comment, CommentMap, TopItem};
use crate::errors::{LoadError, SyntaxError};
use crate::syntax::{Decl, DeclId, DeclKind, Span, SyntaxNode};

/// Grammar kinds allowed at the top level of a Go file.
const DECLARATION_KINDS: &[&str] = &[
    "import_declaration",
    "const_declaration",
    "var_declaration",
    "type_declaration",
    "function_declaration",
    "method_declaration",
];

/// A parsed Go file.
#[derive(Debug, Clone)]
pub struct SourceTree {
    pub package: SyntaxNode,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
    pub comments: CommentMap,
}

impl SourceTree {
    /// Anchors whose comment groups are still part of the output.
    pub fn retained_anchors(&self) -> Vec<Anchor> {
        let mut anchors = vec![Anchor::File, Anchor::Package];
        anchors.extend(self.decls.iter().map(|decl| Anchor::Decl(decl.id)));
        anchors
    }

    /// The package clause followed by every declaration.
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        std::iter::once(&self.package).chain(self.decls.iter().map(|decl| &decl.node))
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SyntaxNode> {
        std::iter::once(&mut self.package).chain(self.decls.iter_mut().map(|decl| &mut decl.node))
    }
}

pub fn new_parser() -> Result<Parser, LanguageError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
    Ok(parser)
}

/// Read and parse the Go file at `path`.
pub fn load(path: &Path) -> Result<SourceTree, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_source(path, &text)
}

/// Parse Go `text`; `path` is only used in error messages.
pub fn parse_source(path: &Path, text: &str) -> Result<SourceTree, LoadError> {
    let mut parser = new_parser()?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| syntax_error(path, text, 0..0, "parser produced no tree"))?;
    let root = tree.root_node();
    check_node(path, text, root)?;

    let mut package = None;
    let mut decls = Vec::new();
    let mut items = Vec::new();

    let mut cursor = root.walk();
    if cursor.goto_first_child() {
        loop {
            let node = cursor.node();
            let span = Span::of(&node);
            match node.kind() {
                // Statement terminators.
                _ if !node.is_named() => {}
                "comment" => items.push(TopItem::Comment(Comment {
                    text: text[node.byte_range()].to_owned(),
                    span,
                })),
                "package_clause" => {
                    if package.is_some() || !decls.is_empty() {
                        return Err(syntax_error(
                            path,
                            text,
                            node.byte_range(),
                            "package clause must come first",
                        )
                        .into());
                    }
                    package = Some(SyntaxNode::from_cursor(&mut cursor, text));
                    items.push(TopItem::Node {
                        anchor: Anchor::Package,
                        span,
                    });
                }
                kind if DECLARATION_KINDS.contains(&kind) => {
                    if package.is_none() {
                        return Err(syntax_error(
                            path,
                            text,
                            node.byte_range(),
                            "expected package clause",
                        )
                        .into());
                    }
                    let id = DeclId(decls.len());
                    decls.push(Decl {
                        id,
                        kind: DeclKind::of(kind),
                        node: SyntaxNode::from_cursor(&mut cursor, text),
                    });
                    items.push(TopItem::Node {
                        anchor: Anchor::Decl(id),
                        span,
                    });
                }
                kind => {
                    return Err(syntax_error(
                        path,
                        text,
                        node.byte_range(),
                        format!("expected declaration, found {kind}"),
                    )
                    .into());
                }
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    let package = package
        .ok_or_else(|| syntax_error(path, text, 0..0, "expected package clause"))?;
    let comments = CommentMap::build(items);
    tracing::debug!(
        path = %path.display(),
        decls = decls.len(),
        comment_groups = comments.len(),
        "Parsed source"
    );

    Ok(SourceTree {
        package,
        decls,
        comments,
    })
}

/// Check that `text` parses as Go without errors.
pub fn check_syntax(parser: &mut Parser, path: &Path, text: &str) -> Result<(), SyntaxError> {
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| syntax_error(path, text, 0..0, "parser produced no tree"))?;
    check_node(path, text, tree.root_node())
}

fn check_node(path: &Path, text: &str, root: Node) -> Result<(), SyntaxError> {
    if !root.has_error() {
        return Ok(());
    }
    let Some(node) = first_error(root) else {
        return Err(syntax_error(path, text, root.byte_range(), "syntax error"));
    };
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let snippet = text[node.byte_range()].lines().next().unwrap_or_default();
        let snippet: String = snippet.chars().take(24).collect();
        format!("unexpected `{snippet}`")
    };
    Err(syntax_error(path, text, node.byte_range(), message))
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.has_error())
        .find_map(first_error)
}

fn syntax_error(
    path: &Path,
    text: &str,
    span: std::ops::Range<usize>,
    message: impl Into<String>,
) -> SyntaxError {
    let before = &text[..span.start.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
    SyntaxError {
        path: path.to_owned(),
        line,
        column,
        span,
        message: message.into(),
        text: text.to_owned(),
    }
}
