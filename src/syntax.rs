//! Owned syntax tree for Go source.
//!
//! The tree-sitter CST is immutable and borrows the source text, so the loader
//! converts it into [`SyntaxNode`]s that own their token text. Every stage
//! after loading edits these nodes in place.

use tree_sitter::{Node, TreeCursor};

/// Token kinds that name something: the candidates for renaming.
pub const NAME_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "field_identifier",
    "package_identifier",
    "label_name",
];

/// Nodes kept as a single token even though the grammar gives them children.
const ATOMIC_KINDS: &[&str] = &[
    "interpreted_string_literal",
    "raw_string_literal",
    "rune_literal",
];

/// Byte range of a node together with the rows it covers (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub first_row: usize,
    pub last_row: usize,
}

impl Span {
    pub fn of(node: &Node) -> Self {
        Span {
            start: node.start_byte(),
            end: node.end_byte(),
            first_row: node.start_position().row,
            last_row: node.end_position().row,
        }
    }
}

/// A leaf of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Whitespace between the previous token of the same declaration and this one.
    pub leading: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Token(Token),
    Inner(Vec<SyntaxNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: &'static str,
    field: Option<&'static str>,
    span: Span,
    content: NodeContent,
}

impl SyntaxNode {
    /// Convert the node under `cursor` and everything below it.
    ///
    /// The cursor is left on the same node it started on.
    pub fn from_cursor(cursor: &mut TreeCursor, source: &str) -> Self {
        let mut prev_end = None;
        Self::build(cursor, source, &mut prev_end)
    }

    fn build(cursor: &mut TreeCursor, source: &str, prev_end: &mut Option<usize>) -> Self {
        let node = cursor.node();
        let kind = node.kind();
        let field = cursor.field_name();
        let span = Span::of(&node);

        let content = if node.child_count() == 0 || ATOMIC_KINDS.contains(&kind) {
            let leading = match *prev_end {
                Some(end) if end <= span.start => source.get(end..span.start).unwrap_or_default(),
                _ => "",
            };
            *prev_end = Some(span.end);
            NodeContent::Token(Token {
                leading: leading.to_owned(),
                text: source.get(span.start..span.end).unwrap_or_default().to_owned(),
            })
        } else {
            let mut children = Vec::with_capacity(node.child_count());
            if cursor.goto_first_child() {
                loop {
                    children.push(Self::build(cursor, source, prev_end));
                    if !cursor.goto_next_sibling() {
                        break;
                    }
                }
                cursor.goto_parent();
            }
            NodeContent::Inner(children)
        };

        SyntaxNode {
            kind,
            field,
            span,
            content,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Grammar field this node occupies in its parent, e.g. `"type"` or `"value"`.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.content {
            NodeContent::Token(token) => Some(token),
            NodeContent::Inner(_) => None,
        }
    }

    pub fn token_mut(&mut self) -> Option<&mut Token> {
        match &mut self.content {
            NodeContent::Token(token) => Some(token),
            NodeContent::Inner(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.token().map(|token| token.text.as_str())
    }

    pub fn children(&self) -> &[SyntaxNode] {
        match &self.content {
            NodeContent::Inner(children) => children,
            NodeContent::Token(_) => &[],
        }
    }

    /// The first token under this node.
    pub fn first_token(&self) -> Option<&Token> {
        match &self.content {
            NodeContent::Token(token) => Some(token),
            NodeContent::Inner(children) => children.iter().find_map(SyntaxNode::first_token),
        }
    }

    pub fn is_name(&self) -> bool {
        self.token().is_some() && NAME_KINDS.contains(&self.kind)
    }

    pub fn is_comment(&self) -> bool {
        self.kind == "comment"
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a SyntaxNode)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Pre-order traversal with mutable access to every node.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut SyntaxNode)) {
        f(self);
        if let NodeContent::Inner(children) = &mut self.content {
            for child in children {
                child.walk_mut(f);
            }
        }
    }

    /// Source text reassembled from the tokens, with the original spacing.
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        let mut first = true;
        self.walk(&mut |node| {
            if let Some(token) = node.token() {
                if !first {
                    out.push_str(&token.leading);
                }
                first = false;
                out.push_str(&token.text);
            }
        });
        out
    }
}

/// Stable identity of a top-level declaration: its position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `const` declaration, shared with the hand-written companion file.
    Const,
    Import,
    Other,
}

impl DeclKind {
    pub fn of(kind: &str) -> Self {
        match kind {
            "const_declaration" => DeclKind::Const,
            "import_declaration" => DeclKind::Import,
            _ => DeclKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub id: DeclId,
    pub kind: DeclKind,
    pub node: SyntaxNode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::new_parser;

    fn first_decl(source: &str) -> SyntaxNode {
        let mut parser = new_parser().expect("Failed to set language");
        let tree = parser.parse(source, None).expect("parse");
        let root = tree.root_node();
        let mut cursor = root.walk();
        cursor.goto_first_child();
        while !cursor.node().is_named() || cursor.node().kind() == "package_clause" {
            assert!(cursor.goto_next_sibling(), "no declaration found");
        }
        SyntaxNode::from_cursor(&mut cursor, source)
    }

    #[test]
    fn test_decl_kind_tags() {
        assert_eq!(DeclKind::of("const_declaration"), DeclKind::Const);
        assert_eq!(DeclKind::of("import_declaration"), DeclKind::Import);
        assert_eq!(DeclKind::of("function_declaration"), DeclKind::Other);
        assert_eq!(DeclKind::of("var_declaration"), DeclKind::Other);
    }

    #[test]
    fn test_source_text_round_trips() {
        let source = "package p\n\nfunc f(a int) int {\n\treturn a + 1 // one\n}\n";
        let decl = first_decl(source);
        assert_eq!(decl.kind(), "function_declaration");
        assert_eq!(
            decl.source_text(),
            "func f(a int) int {\n\treturn a + 1 // one\n}"
        );
    }

    #[test]
    fn test_string_literals_are_atomic() {
        let source = "package p\n\nvar s = \"a\\tb\"\n";
        let decl = first_decl(source);
        let mut literals = Vec::new();
        decl.walk(&mut |node| {
            if node.kind() == "interpreted_string_literal" {
                literals.push(node.text().map(str::to_owned));
            }
        });
        assert_eq!(literals, vec![Some("\"a\\tb\"".to_owned())]);
    }

    #[test]
    fn test_name_tokens() {
        let source = "package p\n\nfunc f(x T) { x.y = 1 }\n";
        let decl = first_decl(source);
        let mut names = Vec::new();
        decl.walk(&mut |node| {
            if node.is_name() {
                names.push(node.text().unwrap_or_default().to_owned());
            }
        });
        assert_eq!(names, ["f", "x", "T", "x", "y"]);
    }
}
