//! Top-level comment groups and their association with declarations.
//!
//! Comments inside a declaration are tokens of that declaration. Comments
//! between declarations are collected into [`CommentGroup`]s and linked to an
//! [`Anchor`] so that dropping or detaching a declaration decides what happens
//! to the prose around it.

use std::collections::BTreeMap;

use crate::syntax::{DeclId, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// Comments on adjacent rows with no code or blank line between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    comments: Vec<Comment>,
    /// Starts on the row where the preceding node ends.
    same_line: bool,
}

impl CommentGroup {
    fn new(first: Comment, same_line: bool) -> Self {
        CommentGroup {
            comments: vec![first],
            same_line,
        }
    }

    /// Whether `comment` continues this group.
    fn accepts(&self, comment: &Comment) -> bool {
        if self.same_line {
            comment.span.first_row == self.last_row()
        } else {
            comment.span.first_row <= self.last_row() + 1
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut [Comment] {
        &mut self.comments
    }

    pub fn is_same_line(&self) -> bool {
        self.same_line
    }

    pub fn first_row(&self) -> usize {
        self.comments[0].span.first_row
    }

    pub fn last_row(&self) -> usize {
        self.comments[self.comments.len() - 1].span.last_row
    }
}

/// What a comment group is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Anchor {
    /// The file itself: everything before the package clause.
    File,
    Package,
    Decl(DeclId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Leading,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    group: GroupId,
    placement: Placement,
}

/// Association table from anchors to comment groups.
///
/// Groups are never deleted; clearing an anchor only unlinks them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentMap {
    groups: Vec<CommentGroup>,
    links: BTreeMap<Anchor, Vec<Link>>,
}

impl CommentMap {
    fn add_group(&mut self, group: CommentGroup) -> GroupId {
        self.groups.push(group);
        GroupId(self.groups.len() - 1)
    }

    fn associate(&mut self, anchor: Anchor, group: GroupId, placement: Placement) {
        self.links
            .entry(anchor)
            .or_default()
            .push(Link { group, placement });
    }

    /// Unlink every group attached to `anchor`. Returns how many were unlinked.
    pub fn clear(&mut self, anchor: Anchor) -> usize {
        self.links.remove(&anchor).map_or(0, |links| links.len())
    }

    pub fn group(&self, id: GroupId) -> &CommentGroup {
        &self.groups[id.0]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut CommentGroup {
        &mut self.groups[id.0]
    }

    /// Every group, linked or not.
    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    /// Groups attached to `anchor` with the given placement, in source order.
    pub fn groups_at(
        &self,
        anchor: Anchor,
        placement: Placement,
    ) -> impl Iterator<Item = &CommentGroup> + '_ {
        self.linked(anchor)
            .filter(move |link| link.placement == placement)
            .map(|link| self.group(link.group))
    }

    /// Ids of every group attached to `anchor`.
    pub fn group_ids(&self, anchor: Anchor) -> impl Iterator<Item = GroupId> + '_ {
        self.linked(anchor).map(|link| link.group)
    }

    fn linked(&self, anchor: Anchor) -> impl Iterator<Item = &Link> + '_ {
        self.links.get(&anchor).into_iter().flatten()
    }

    /// Group the top-level comments in `items` and link each group to a node.
    ///
    /// A group before the first node belongs to [`Anchor::File`]. A group that
    /// starts on the row where the previous node ends trails it, as does a group
    /// on the next row that is followed by a blank line or the end of the
    /// file. Every other group leads the next node.
    pub fn build(items: impl IntoIterator<Item = TopItem>) -> Self {
        let mut map = CommentMap::default();
        let mut prev: Option<(Anchor, Span)> = None;
        let mut current: Option<CommentGroup> = None;
        let mut waiting: Vec<GroupId> = Vec::new();

        for item in items {
            match item {
                TopItem::Comment(comment) => {
                    if let Some(group) = current.as_mut().filter(|group| group.accepts(&comment)) {
                        group.comments.push(comment);
                        continue;
                    }
                    if let Some(group) = current.take() {
                        waiting.push(map.add_group(group));
                    }
                    let same_line = waiting.is_empty()
                        && prev.is_some_and(|(_, span)| span.last_row == comment.span.first_row);
                    current = Some(CommentGroup::new(comment, same_line));
                }
                TopItem::Node { anchor, span } => {
                    if let Some(group) = current.take() {
                        waiting.push(map.add_group(group));
                    }
                    for id in waiting.drain(..) {
                        map.place(id, prev, Some((anchor, span)));
                    }
                    prev = Some((anchor, span));
                }
            }
        }

        if let Some(group) = current.take() {
            waiting.push(map.add_group(group));
        }
        for id in waiting {
            map.place(id, prev, None);
        }
        map
    }

    fn place(&mut self, id: GroupId, prev: Option<(Anchor, Span)>, next: Option<(Anchor, Span)>) {
        let group = self.group(id);
        let (anchor, placement) = match (prev, next) {
            (None, _) => (Anchor::File, Placement::Leading),
            (Some((anchor, _)), _) if group.same_line => (anchor, Placement::Trailing),
            (Some((anchor, span)), next)
                if group.first_row() == span.last_row + 1
                    && next.is_none_or(|(_, next)| next.first_row > group.last_row() + 1) =>
            {
                (anchor, Placement::Trailing)
            }
            (_, Some((anchor, _))) => (anchor, Placement::Leading),
            (Some((anchor, _)), None) => (anchor, Placement::Trailing),
        };
        self.associate(anchor, id, placement);
    }
}

/// A top-level item in source order, as seen by [`CommentMap::build`].
#[derive(Debug, Clone)]
pub enum TopItem {
    Comment(Comment),
    Node { anchor: Anchor, span: Span },
}
