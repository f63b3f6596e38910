//! Depth-first traversal of a collection tree
//!
//! Each object is visited at most once, so containment loops and objects
//! linked from several collections cannot cause repeated or endless descent.

use crate::domain::collection::{CollectionTree, Node};
use crate::domain::ids::ObjectHandle;
use std::collections::HashSet;

/// One visited object
#[derive(Debug, Clone, Copy)]
pub struct TreeEntry<'a> {
    /// Distance from the root collection (root = 0)
    pub depth: usize,

    /// The object itself
    pub node: Node<'a>,

    /// Collection the object was reached from; `None` for the root
    pub parent: Option<&'a ObjectHandle>,
}

/// A child listed by a collection but absent from the export listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingChild<'a> {
    pub parent: &'a ObjectHandle,
    pub handle: &'a ObjectHandle,
}

/// Result of a traversal, in pre-order
#[derive(Debug, Default)]
pub struct Walk<'a> {
    pub entries: Vec<TreeEntry<'a>>,
    pub missing: Vec<MissingChild<'a>>,
}

/// Pre-order walker with an optional depth limit
///
/// With `max_depth = Some(n)`, collections at depth `n` or deeper are not
/// visited; documents and links of visited collections always are. A limit
/// of 0 means no limit.
pub struct TreeWalker<'a> {
    tree: &'a CollectionTree,
    max_depth: Option<usize>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(tree: &'a CollectionTree) -> Self {
        Self {
            tree,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth.filter(|&max| max > 0);
        self
    }

    fn too_deep(&self, depth: usize) -> bool {
        depth > 0 && self.max_depth.is_some_and(|max| depth >= max)
    }

    /// Walks the tree from the root collection
    pub fn walk(&self) -> Walk<'a> {
        let tree = self.tree;
        let mut walk = Walk::default();
        let mut seen: HashSet<&'a ObjectHandle> = HashSet::new();
        let mut stack: Vec<(&'a ObjectHandle, Option<&'a ObjectHandle>, usize)> =
            vec![(tree.root(), None, 0)];

        while let Some((handle, parent, depth)) = stack.pop() {
            if tree.is_ignored(handle) {
                continue;
            }

            let Some(node) = tree.node(handle) else {
                if let Some(parent) = parent {
                    walk.missing.push(MissingChild { parent, handle });
                }
                continue;
            };

            if let Node::Folder(_) = node {
                if self.too_deep(depth) {
                    tracing::debug!(handle = %handle, depth, "Skipping collection below max depth");
                    continue;
                }
            }

            if !seen.insert(handle) {
                tracing::warn!(
                    handle = %handle,
                    parent = parent.map(ObjectHandle::as_str),
                    "Object already visited, skipping repeated containment"
                );
                continue;
            }

            walk.entries.push(TreeEntry {
                depth,
                node,
                parent,
            });

            if let Node::Folder(folder) = node {
                for child in folder.children.iter().rev() {
                    stack.push((child, Some(handle), depth + 1));
                }
            }
        }

        walk
    }
}

/// Renders one line per object, indented by depth: `<indent><handle> <title>`
pub fn render_tree(walk: &Walk<'_>) -> String {
    let mut out = String::new();
    for entry in &walk.entries {
        out.push_str(&" ".repeat(entry.depth));
        out.push_str(entry.node.handle().as_str());
        out.push(' ');
        out.push_str(entry.node.title());
        out.push('\n');
    }
    out
}
