//! Collection domain model
//!
//! A DocuShare collection is a tree of sub-collections (folders), documents and
//! URL links. The export listing is flat, so [`CollectionTree::from_objects`]
//! rebuilds the hierarchy from the containment links of each object.

use super::document::Document;
use super::errors::DumpError;
use super::ids::{CollectionId, ObjectHandle};
use super::result::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Sort order DocuShare applies to the children of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    /// By title, ascending
    #[default]
    Title,
    /// By title, descending
    TitleReversed,
    /// Sub-collections first, then documents, then links; each by title
    TypeAndTitle,
    /// As `TypeAndTitle` with titles descending
    TypeAndTitleReversed,
    /// Keep the order the server listed the children in
    Unsorted,
}

impl SortOrder {
    /// Maps the `sort_order` property; unknown values keep server order
    pub fn from_property(value: &str) -> Self {
        match value.trim() {
            "Title" => SortOrder::Title,
            "TitleReversed" => SortOrder::TitleReversed,
            "TypeAndTitle" => SortOrder::TypeAndTitle,
            "TypeAndTitleReversed" => SortOrder::TypeAndTitleReversed,
            _ => SortOrder::Unsorted,
        }
    }
}

/// A DocuShare collection, exported as a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Collection handle (`Collection-<n>`)
    pub handle: ObjectHandle,

    /// Collection title, used as the directory name
    pub title: String,

    /// Containing collection
    pub parent: Option<ObjectHandle>,

    /// How the children are ordered
    pub sort_order: SortOrder,

    /// Creation time
    pub created: Option<DateTime<Utc>>,

    /// Child handles, in display order once the tree is built
    pub children: Vec<ObjectHandle>,

    /// Not readable by any of the site-wide groups
    #[serde(default)]
    pub private: bool,
}

impl Folder {
    /// Create an empty folder
    pub fn new(handle: ObjectHandle, title: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            handle.to_string()
        } else {
            title
        };
        Self {
            handle,
            title,
            parent: None,
            sort_order: SortOrder::default(),
            created: None,
            children: Vec::new(),
            private: false,
        }
    }

    /// Set the parent collection
    pub fn with_parent(mut self, parent: ObjectHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Append a child handle
    pub fn with_child(mut self, child: ObjectHandle) -> Self {
        self.children.push(child);
        self
    }

    /// Set the sort order
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Mark the folder as private
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }
}

/// A DocuShare URL object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// URL handle (`URL-<n>`)
    pub handle: ObjectHandle,

    /// Link title
    pub title: String,

    /// Target address
    pub url: String,

    /// Containing collection
    pub parent: Option<ObjectHandle>,

    /// Not readable by any of the site-wide groups
    #[serde(default)]
    pub private: bool,
}

/// One object from a DocuShare export listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceObject {
    /// A collection
    Folder(Folder),
    /// A document with its versions
    Document(Document),
    /// A URL object
    Link(Link),
    /// An object class that is never exported (users, calendars, wikis, ...)
    Ignored {
        /// Object handle
        handle: ObjectHandle,
        /// DocuShare class name
        class_name: String,
    },
}

impl SourceObject {
    /// Handle of the object
    pub fn handle(&self) -> &ObjectHandle {
        match self {
            SourceObject::Folder(f) => &f.handle,
            SourceObject::Document(d) => &d.handle,
            SourceObject::Link(l) => &l.handle,
            SourceObject::Ignored { handle, .. } => handle,
        }
    }

    fn parent(&self) -> Option<&ObjectHandle> {
        match self {
            SourceObject::Folder(f) => f.parent.as_ref(),
            SourceObject::Document(d) => d.parent.as_ref(),
            SourceObject::Link(l) => l.parent.as_ref(),
            SourceObject::Ignored { .. } => None,
        }
    }
}

/// Borrowed view of a tree node
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A sub-collection
    Folder(&'a Folder),
    /// A document
    Document(&'a Document),
    /// A URL link
    Link(&'a Link),
}

impl<'a> Node<'a> {
    /// Handle of the node
    pub fn handle(&self) -> &'a ObjectHandle {
        match self {
            Node::Folder(f) => &f.handle,
            Node::Document(d) => &d.handle,
            Node::Link(l) => &l.handle,
        }
    }

    /// Title of the node
    pub fn title(&self) -> &'a str {
        match self {
            Node::Folder(f) => &f.title,
            Node::Document(d) => &d.title,
            Node::Link(l) => &l.title,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Node::Folder(_) => 0,
            Node::Document(_) => 1,
            Node::Link(_) => 2,
        }
    }
}

/// The folder hierarchy of one exported collection
#[derive(Debug, Clone)]
pub struct CollectionTree {
    root: ObjectHandle,
    folders: HashMap<ObjectHandle, Folder>,
    documents: HashMap<ObjectHandle, Document>,
    links: HashMap<ObjectHandle, Link>,
    ignored: HashSet<ObjectHandle>,
}

impl CollectionTree {
    /// Builds the tree rooted at `root` from a flat export listing.
    ///
    /// Children are taken from each collection's containment list, merged with
    /// objects that name the collection as their parent, then ordered by the
    /// collection's sort order.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::NotFound`] if the listing does not contain the root
    /// collection.
    pub fn from_objects(root: &CollectionId, objects: Vec<SourceObject>) -> Result<Self> {
        let mut folders = HashMap::new();
        let mut documents = HashMap::new();
        let mut links = HashMap::new();
        let mut ignored = HashSet::new();
        let mut parent_links = Vec::new();

        for object in objects {
            if let Some(parent) = object.parent() {
                parent_links.push((parent.clone(), object.handle().clone()));
            }
            match object {
                SourceObject::Folder(f) => {
                    folders.insert(f.handle.clone(), f);
                }
                SourceObject::Document(d) => {
                    documents.insert(d.handle.clone(), d);
                }
                SourceObject::Link(l) => {
                    links.insert(l.handle.clone(), l);
                }
                SourceObject::Ignored { handle, .. } => {
                    ignored.insert(handle);
                }
            }
        }

        if !folders.contains_key(root.handle()) {
            return Err(DumpError::NotFound(format!(
                "collection {root} is not present in the export listing"
            )));
        }

        for (parent, child) in parent_links {
            if let Some(folder) = folders.get_mut(&parent) {
                if !folder.children.contains(&child) {
                    folder.children.push(child);
                }
            }
        }

        let mut tree = Self {
            root: root.handle().clone(),
            folders,
            documents,
            links,
            ignored,
        };
        tree.sort_children();
        Ok(tree)
    }

    fn sort_children(&mut self) {
        let mut ordered = Vec::with_capacity(self.folders.len());
        for folder in self.folders.values() {
            let mut children = folder.children.clone();
            if folder.sort_order != SortOrder::Unsorted {
                children.sort_by(|a, b| self.compare_children(folder.sort_order, a, b));
            }
            ordered.push((folder.handle.clone(), children));
        }
        for (handle, children) in ordered {
            if let Some(folder) = self.folders.get_mut(&handle) {
                folder.children = children;
            }
        }
    }

    fn compare_children(&self, order: SortOrder, a: &ObjectHandle, b: &ObjectHandle) -> Ordering {
        // Unknown children keep their relative order after all known ones.
        let (a, b) = match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => (a, b),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        };
        let by_title = a.title().cmp(b.title());
        match order {
            SortOrder::Title => by_title,
            SortOrder::TitleReversed => by_title.reverse(),
            SortOrder::TypeAndTitle => a.type_rank().cmp(&b.type_rank()).then(by_title),
            SortOrder::TypeAndTitleReversed => {
                a.type_rank().cmp(&b.type_rank()).then(by_title.reverse())
            }
            SortOrder::Unsorted => Ordering::Equal,
        }
    }

    /// Root collection handle
    pub fn root(&self) -> &ObjectHandle {
        &self.root
    }

    /// Root collection
    pub fn root_folder(&self) -> &Folder {
        // from_objects guarantees the root is present
        &self.folders[&self.root]
    }

    /// Looks up any exportable node
    pub fn node(&self, handle: &ObjectHandle) -> Option<Node<'_>> {
        if let Some(f) = self.folders.get(handle) {
            return Some(Node::Folder(f));
        }
        if let Some(d) = self.documents.get(handle) {
            return Some(Node::Document(d));
        }
        self.links.get(handle).map(Node::Link)
    }

    /// Looks up a folder
    pub fn folder(&self, handle: &ObjectHandle) -> Option<&Folder> {
        self.folders.get(handle)
    }

    /// Looks up a document
    pub fn document(&self, handle: &ObjectHandle) -> Option<&Document> {
        self.documents.get(handle)
    }

    /// True if the handle names an object class that is never exported
    pub fn is_ignored(&self, handle: &ObjectHandle) -> bool {
        self.ignored.contains(handle)
    }

    /// Number of collections in the listing, root included
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Number of documents in the listing
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}
