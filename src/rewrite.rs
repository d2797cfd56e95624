//! Identifier and comment rewriting.

use crate::source::SourceTree;
use crate::table::SubstitutionTable;

/// Replace every name token that is exactly a key of `table`.
///
/// Only tokens of a name kind are candidates, so literals, keywords, comments
/// and longer identifiers that merely contain a key are left alone. Returns
/// the number of tokens replaced.
pub fn rename_identifiers(tree: &mut SourceTree, table: &SubstitutionTable) -> usize {
    let mut renamed = 0;
    for node in tree.nodes_mut() {
        node.walk_mut(&mut |node| {
            if !node.is_name() {
                return;
            }
            let Some(token) = node.token_mut() else {
                return;
            };
            if let Some(replacement) = table.get(&token.text) {
                tracing::trace!(from = %token.text, to = replacement, "Renamed identifier");
                token.text = replacement.to_owned();
                renamed += 1;
            }
        });
    }
    renamed
}

/// Apply the comment substitutions to every comment that reaches the output.
///
/// That is every group linked to a retained anchor plus the comments inside
/// retained declarations. Returns the number of comments whose text changed.
pub fn rewrite_comments(tree: &mut SourceTree, table: &SubstitutionTable) -> usize {
    let mut changed = 0;

    let mut group_ids: Vec<_> = tree
        .retained_anchors()
        .into_iter()
        .flat_map(|anchor| tree.comments.group_ids(anchor).collect::<Vec<_>>())
        .collect();
    group_ids.sort();
    group_ids.dedup();

    for id in group_ids {
        for comment in tree.comments.group_mut(id).comments_mut() {
            changed += rewrite_text(&mut comment.text, table);
        }
    }

    for node in tree.nodes_mut() {
        node.walk_mut(&mut |node| {
            if !node.is_comment() {
                return;
            }
            if let Some(token) = node.token_mut() {
                changed += rewrite_text(&mut token.text, table);
            }
        });
    }

    changed
}

fn rewrite_text(text: &mut String, table: &SubstitutionTable) -> usize {
    let rewritten = table.rewrite_comment_text(text);
    if rewritten == *text {
        return 0;
    }
    *text = rewritten;
    1
}
