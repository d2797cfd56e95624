//! Declaration filtering.
//!
//! The template file mixes declarations that exist once, in a hand-written
//! companion file, with declarations that are duplicated per variant. Shared
//! `const` blocks are dropped here, and comments that would be repeated
//! verbatim at the top of every generated file are detached.

use crate::comments::Anchor;
use crate::source::SourceTree;
use crate::syntax::DeclKind;

/// What [`filter_declarations`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub kept: usize,
    pub dropped: usize,
    /// Comment groups unlinked from the file header and import declarations.
    pub detached_groups: usize,
}

/// Drop `const` declarations and detach header and import comments.
///
/// The remaining declarations keep their relative order and are not modified.
pub fn filter_declarations(tree: &mut SourceTree) -> FilterReport {
    let mut report = FilterReport {
        detached_groups: tree.comments.clear(Anchor::File),
        ..FilterReport::default()
    };

    let decls = std::mem::take(&mut tree.decls);
    for decl in decls {
        match decl.kind {
            DeclKind::Const => {
                tracing::debug!(decl = decl.id.0, "Dropping shared const declaration");
                report.dropped += 1;
                continue;
            }
            DeclKind::Import => {
                report.detached_groups += tree.comments.clear(Anchor::Decl(decl.id));
            }
            DeclKind::Other => {}
        }
        tree.decls.push(decl);
    }

    report.kept = tree.decls.len();
    report
}
