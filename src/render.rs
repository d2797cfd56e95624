//! Rendering a [`SourceTree`] back to Go source.
//!
//! The layout follows gofmt where the input leaves room for it:
//!
//! - top-level items are separated by a newline, or by one blank line when
//!   they were at least one line apart in the input;
//! - inside declarations the input spacing is kept, minus trailing
//!   whitespace and repeated blank lines;
//! - trailing comments, keyed composite-literal values, struct field types
//!   and tags, and types and `=` in parenthesized `const`/`var` groups are
//!   aligned in columns the way `text/tabwriter` does it for gofmt.

use std::path::Path;

use crate::comments::{Anchor, CommentGroup, Placement};
use crate::errors::RenderError;
use crate::source::{SourceTree, check_syntax, new_parser};
use crate::syntax::{SyntaxNode, Token};

/// Name written into the generated-file marker.
pub const GENERATOR: &str = "variantgen";

/// How the children of an aligned node are split into columns.
#[derive(Clone, Copy)]
struct AlignRule {
    kind: &'static str,
    /// Only aligned inside a parenthesized group.
    grouped_only: bool,
    /// Column a trailing line comment goes into.
    comment_column: Option<usize>,
    /// Cell breaks before `child`, which follows `prev`.
    cells_before: fn(prev: &SyntaxNode, child: &SyntaxNode, keep_type: bool) -> usize,
}

const ALIGN_RULES: &[AlignRule] = &[
    AlignRule {
        kind: "keyed_element",
        grouped_only: false,
        comment_column: None,
        cells_before: keyed_element_cells,
    },
    AlignRule {
        kind: "field_declaration",
        grouped_only: false,
        comment_column: None,
        cells_before: field_cells,
    },
    AlignRule {
        kind: "const_spec",
        grouped_only: true,
        comment_column: Some(3),
        cells_before: value_spec_cells,
    },
    AlignRule {
        kind: "var_spec",
        grouped_only: true,
        comment_column: Some(3),
        cells_before: value_spec_cells,
    },
];

/// The marker line and the blank line that follows it.
pub fn header(generator: &str) -> String {
    format!("// Code generated by {generator}. DO NOT EDIT.\n\n")
}

/// Render `tree` with the generated-file header and check the result parses.
pub fn render(tree: &SourceTree, generator: &str) -> Result<String, RenderError> {
    let mut out = header(generator);
    out.push_str(&render_body(tree));

    let mut parser = new_parser()?;
    check_syntax(&mut parser, Path::new("<rendered>"), &out).map_err(RenderError::Invalid)?;
    Ok(out)
}

/// Render `tree` without the header.
pub fn render_body(tree: &SourceTree) -> String {
    let mut printer = Printer::new();
    let mut last_row = None;

    let nodes = [(Anchor::File, None), (Anchor::Package, Some(&tree.package))]
        .into_iter()
        .chain(
            tree.decls
                .iter()
                .map(|decl| (Anchor::Decl(decl.id), Some(&decl.node))),
        );

    for (anchor, node) in nodes {
        for group in tree.comments.groups_at(anchor, Placement::Leading) {
            printer.separate(last_row, group.first_row());
            printer.group(group);
            last_row = Some(group.last_row());
        }
        if let Some(node) = node {
            printer.separate(last_row, node.span().first_row);
            printer.node(node);
            last_row = Some(node.span().last_row);
        }
        for group in tree.comments.groups_at(anchor, Placement::Trailing) {
            if group.is_same_line() && last_row.is_some() {
                printer.cell();
            } else {
                printer.separate(last_row, group.first_row());
            }
            printer.group(group);
            last_row = Some(group.last_row());
        }
    }

    let mut out = printer.finish();
    out.push('\n');
    out
}

/// One output line split into tabwriter-style cells.
///
/// Every cell but the last is terminated and takes part in alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    cells: Vec<String>,
    /// Set when the line starts a node with a fixed comment column.
    comment_column: Option<usize>,
}

impl Line {
    fn new() -> Self {
        Line::with_cells(vec![String::new()])
    }

    fn with_cells(cells: Vec<String>) -> Self {
        Line {
            cells,
            comment_column: None,
        }
    }

    fn last_cell(&mut self) -> &mut String {
        let last = self.cells.len() - 1;
        &mut self.cells[last]
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.trim().is_empty())
    }

    fn indent(&self) -> &str {
        let first = &self.cells[0];
        &first[..first.len() - first.trim_start().len()]
    }

    fn has_terminated_cell(&self, column: usize) -> bool {
        self.cells.len() > column + 1
    }

    fn width(&self, column: usize) -> usize {
        self.cells[column].chars().count()
    }

    fn pad(&mut self, column: usize, width: usize) {
        let padding = width.saturating_sub(self.width(column));
        self.cells[column].extend(std::iter::repeat_n(' ', padding));
    }
}

/// Align column `column` and everything right of it.
///
/// A column block is a run of consecutive lines with the same indentation
/// that all have a terminated cell in that column. Cells in a block are padded
/// to the widest one plus a single space; a column that is empty on every line
/// of its block is dropped.
fn align(lines: &mut [Line], column: usize) {
    let mut start = 0;
    while start < lines.len() {
        if !lines[start].has_terminated_cell(column) {
            start += 1;
            continue;
        }
        let mut end = start + 1;
        while end < lines.len()
            && lines[end].has_terminated_cell(column)
            && lines[end].indent() == lines[start].indent()
        {
            end += 1;
        }

        let block = &mut lines[start..end];
        let width = block.iter().map(|line| line.width(column)).max().unwrap_or(0);
        if width > 0 {
            for line in block.iter_mut() {
                line.pad(column, width + 1);
            }
        }
        align(block, column + 1);
        start = end;
    }
}

struct Printer {
    lines: Vec<Line>,
    /// Whitespace seen since the last printed token.
    pending: String,
    /// Cell breaks to insert before the next token.
    cells_next: usize,
    /// Comment column for the line of the next token.
    comment_column: Option<usize>,
    /// The next token is the first of a top-level node.
    at_start: bool,
}

impl Printer {
    fn new() -> Self {
        Printer {
            lines: vec![Line::new()],
            pending: String::new(),
            cells_next: 0,
            comment_column: None,
            at_start: false,
        }
    }

    fn current(&mut self) -> &mut Line {
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn text(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            self.current().last_cell().push_str(part);
        }
    }

    fn newline(&mut self) {
        self.lines.push(Line::new());
    }

    fn cell(&mut self) {
        self.current().cells.push(String::new());
    }

    /// Line break between two top-level items.
    fn separate(&mut self, last_row: Option<usize>, first_row: usize) {
        let Some(last_row) = last_row else {
            return;
        };
        self.newline();
        if first_row > last_row + 1 {
            self.newline();
        }
    }

    /// Whitespace containing newlines: at most one blank line, then the indentation.
    fn line_break(&mut self, gap: &str) {
        let newlines = gap.matches('\n').count().min(2);
        for _ in 0..newlines {
            self.newline();
        }
        let indent = &gap[gap.rfind('\n').map_or(0, |i| i + 1)..];
        self.text(indent);
    }

    fn group(&mut self, group: &CommentGroup) {
        let mut prev_row = None;
        for comment in group.comments() {
            if let Some(row) = prev_row {
                if comment.span.first_row > row {
                    self.newline();
                } else {
                    self.text(" ");
                }
            }
            self.text(comment_text(&comment.text));
            prev_row = Some(comment.span.last_row);
        }
    }

    fn node(&mut self, node: &SyntaxNode) {
        self.pending.clear();
        self.cells_next = 0;
        self.comment_column = None;
        self.at_start = true;
        self.visit(node, None, false);
        self.pending.clear();
    }

    fn visit(&mut self, node: &SyntaxNode, parent: Option<&SyntaxNode>, keep_type: bool) {
        if let Some(token) = node.token() {
            self.token(node, token);
            return;
        }

        let rule = ALIGN_RULES
            .iter()
            .find(|rule| rule.kind == node.kind())
            .filter(|rule| !rule.grouped_only || parent.is_some_and(is_grouped))
            .filter(|_| self.starts_line(node));
        if let Some(rule) = rule {
            self.comment_column = rule.comment_column;
        }

        let keep = keep_type_column(node);
        let children = node.children();
        for (i, child) in children.iter().enumerate() {
            if let Some(rule) = rule.filter(|_| i > 0) {
                self.cells_next += (rule.cells_before)(&children[i - 1], child, keep_type);
            }
            self.visit(child, Some(node), keep[i]);
        }
    }

    /// Whether the first token of `node` will be the first on its line.
    fn starts_line(&self, node: &SyntaxNode) -> bool {
        self.at_start
            || self.pending.contains('\n')
            || node
                .first_token()
                .is_some_and(|token| token.leading.contains('\n'))
    }

    fn token(&mut self, node: &SyntaxNode, token: &Token) {
        if token.text.chars().all(char::is_whitespace) {
            // Statement terminators are part of the spacing.
            self.pending.push_str(&token.leading);
            self.pending.push_str(&token.text);
            return;
        }

        let mut gap = std::mem::take(&mut self.pending);
        gap.push_str(&token.leading);
        let cells = std::mem::take(&mut self.cells_next);
        let line_comment = node.is_comment() && token.text.starts_with("//");

        if !std::mem::take(&mut self.at_start) {
            if gap.contains('\n') {
                self.line_break(&gap);
            } else if cells > 0 {
                for _ in 0..cells {
                    self.cell();
                }
            } else if line_comment && !self.current().is_blank() {
                self.comment_cells();
            } else {
                self.text(&gap);
            }
        }
        if let Some(column) = self.comment_column.take() {
            self.current().comment_column = Some(column);
        }

        if node.is_comment() {
            self.text(comment_text(&token.text));
        } else {
            self.text(&token.text);
        }
    }

    /// Cell breaks before a trailing line comment.
    fn comment_cells(&mut self) {
        let line = self.current();
        let target = line.comment_column.map_or(0, |column| column + 1);
        loop {
            line.cells.push(String::new());
            if line.cells.len() >= target {
                break;
            }
        }
    }

    fn finish(mut self) -> String {
        align(&mut self.lines, 0);
        self.lines
            .into_iter()
            .map(|line| line.cells.concat())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Line comments lose trailing whitespace.
fn comment_text(text: &str) -> &str {
    if text.starts_with("//") {
        text.trim_end()
    } else {
        text
    }
}

fn is_grouped(node: &SyntaxNode) -> bool {
    node.children().iter().any(|child| child.kind() == "(")
}

fn keyed_element_cells(prev: &SyntaxNode, _child: &SyntaxNode, _keep_type: bool) -> usize {
    usize::from(prev.kind() == ":")
}

fn field_cells(prev: &SyntaxNode, child: &SyntaxNode, _keep_type: bool) -> usize {
    match child.field() {
        Some("type") => usize::from(prev.field() == Some("name")),
        Some("tag") => 1,
        _ => 0,
    }
}

/// Names, type and values of a grouped `const`/`var` spec each get a column.
/// An untyped spec keeps an empty type cell when `keep_type` is set.
fn value_spec_cells(prev: &SyntaxNode, child: &SyntaxNode, keep_type: bool) -> usize {
    if child.field() == Some("type") {
        1
    } else if child.kind() != "=" {
        0
    } else if keep_type && prev.field() != Some("type") {
        2
    } else {
        1
    }
}

fn is_value_spec(node: &SyntaxNode) -> bool {
    matches!(node.kind(), "const_spec" | "var_spec")
}

/// Which children of a spec group keep a type column.
///
/// Consecutive specs with values form a run; if any spec in a run has a type,
/// every spec in the run keeps the column, as gofmt does.
fn keep_type_column(node: &SyntaxNode) -> Vec<bool> {
    let children = node.children();
    let mut keep = vec![false; children.len()];
    if !is_grouped(node) {
        return keep;
    }

    // Start of the current run and whether a spec in it has a type.
    let mut run: Option<(usize, bool)> = None;
    for (i, child) in children.iter().enumerate() {
        if !is_value_spec(child) {
            continue;
        }
        if child.children().iter().any(|c| c.kind() == "=") {
            let typed = child.children().iter().any(|c| c.field() == Some("type"));
            run.get_or_insert((i, false)).1 |= typed;
        } else if let Some((start, true)) = run.take() {
            keep[start..i].fill(true);
        }
    }
    if let Some((start, true)) = run {
        keep[start..].fill(true);
    }
    keep
}
