//! Collection tree traversal

pub mod walker;

pub use walker::{render_tree, MissingChild, TreeEntry, TreeWalker, Walk};
