//! Export planning
//!
//! Maps the collection tree onto relative output paths before anything is
//! fetched or written. The plan is a pure function of the tree and the export
//! options, so repeated runs over the same source produce the same layout.

use super::naming::{infer_extension, sanitize_name, truncate_name, NameKind, SiblingNames};
use crate::config::ExportConfig;
use crate::core::tree::{TreeWalker, Walk};
use crate::domain::collection::{CollectionTree, Node};
use crate::domain::document::{Document, Version};
use crate::domain::ids::ObjectHandle;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A directory to create, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDirectory {
    pub handle: ObjectHandle,
    pub relative_path: PathBuf,
    pub private: bool,
}

/// A document version to fetch and write
#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub document: ObjectHandle,
    pub title: String,
    pub version: Version,
    pub relative_path: PathBuf,
    pub private: bool,
}

impl PlannedFile {
    /// Size declared by the source, if any
    pub fn declared_size(&self) -> Option<u64> {
        self.version.rendition.as_ref().and_then(|r| r.size)
    }
}

/// A URL object written as a small text file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLink {
    pub handle: ObjectHandle,
    pub url: String,
    pub relative_path: PathBuf,
    pub private: bool,
}

/// Why an object cannot be exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanFailureReason {
    /// Listed as a child but absent from the export listing
    MissingMetadata { parent: ObjectHandle },
    NoVersion,
    NoRendition { version: ObjectHandle },
}

impl fmt::Display for PlanFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFailureReason::MissingMetadata { parent } => {
                write!(f, "listed in {parent} but has no metadata in the export")
            }
            PlanFailureReason::NoVersion => write!(f, "document has no versions"),
            PlanFailureReason::NoRendition { version } => {
                write!(f, "{version} has no content rendition")
            }
        }
    }
}

/// An object that will not be exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanFailure {
    pub handle: ObjectHandle,
    pub relative_path: Option<PathBuf>,
    pub reason: PlanFailureReason,
}

/// Everything one export run will do, in tree order
#[derive(Debug, Default)]
pub struct ExportPlan {
    pub directories: Vec<PlannedDirectory>,
    pub files: Vec<PlannedFile>,
    pub links: Vec<PlannedLink>,
    pub failures: Vec<PlanFailure>,
}

struct DirectorySlot {
    path: PathBuf,
    names: SiblingNames,
}

impl ExportPlan {
    /// Plans the export of `tree` under the given options
    pub fn build(tree: &CollectionTree, options: &ExportConfig) -> Self {
        let walk = TreeWalker::new(tree)
            .with_max_depth(options.max_depth)
            .walk();
        Self::from_walk(&walk, options)
    }

    fn from_walk(walk: &Walk<'_>, options: &ExportConfig) -> Self {
        let mut plan = ExportPlan::default();
        let mut slots: HashMap<&ObjectHandle, DirectorySlot> = HashMap::new();

        for entry in &walk.entries {
            let Some(parent) = entry.parent else {
                // The root collection is the output directory itself
                slots.insert(
                    entry.node.handle(),
                    DirectorySlot {
                        path: PathBuf::new(),
                        names: SiblingNames::new(),
                    },
                );
                continue;
            };
            let Some(slot) = slots.get_mut(parent) else {
                continue;
            };

            let opened = match entry.node {
                Node::Folder(folder) => {
                    let name = truncate_name(
                        &sanitize_name(&folder.title, &folder.handle),
                        NameKind::Directory,
                    );
                    let path = slot.path.join(slot.names.claim(&name, NameKind::Directory));
                    plan.directories.push(PlannedDirectory {
                        handle: folder.handle.clone(),
                        relative_path: path.clone(),
                        private: folder.private,
                    });
                    Some((&folder.handle, path))
                }
                Node::Document(document) => {
                    plan.plan_document(document, slot, options);
                    None
                }
                Node::Link(link) if link.url.trim().is_empty() => {
                    tracing::debug!(handle = %link.handle, "Skipping link without a target");
                    None
                }
                Node::Link(link) if options.export_links => {
                    let name = format!("{}.txt", sanitize_name(&link.title, &link.handle));
                    let name = slot
                        .names
                        .claim(&truncate_name(&name, NameKind::File), NameKind::File);
                    plan.links.push(PlannedLink {
                        handle: link.handle.clone(),
                        url: link.url.clone(),
                        relative_path: slot.path.join(name),
                        private: link.private,
                    });
                    None
                }
                Node::Link(_) => None,
            };

            if let Some((handle, path)) = opened {
                slots.insert(
                    handle,
                    DirectorySlot {
                        path,
                        names: SiblingNames::new(),
                    },
                );
            }
        }

        for missing in &walk.missing {
            tracing::warn!(
                handle = %missing.handle,
                parent = %missing.parent,
                "Listed child has no metadata in the export"
            );
            plan.failures.push(PlanFailure {
                handle: missing.handle.clone(),
                relative_path: None,
                reason: PlanFailureReason::MissingMetadata {
                    parent: missing.parent.clone(),
                },
            });
        }

        plan
    }

    fn plan_document(&mut self, document: &Document, slot: &mut DirectorySlot, options: &ExportConfig) {
        let version = document.select_version(options.version_policy);
        let rendition = version.and_then(|v| v.rendition.as_ref());

        let mut name = sanitize_name(&document.title, &document.handle);
        if options.infer_extensions {
            let original = document
                .original_file_name
                .as_deref()
                .or_else(|| rendition.and_then(|r| r.original_name.as_deref()));
            let stored = rendition.and_then(|r| r.stored_name.as_deref());
            name = infer_extension(&name, original, stored);
        }
        let name = slot
            .names
            .claim(&truncate_name(&name, NameKind::File), NameKind::File);
        let relative_path = slot.path.join(name);

        let reason = match version {
            None => PlanFailureReason::NoVersion,
            Some(version) => match version.rendition {
                None => PlanFailureReason::NoRendition {
                    version: version.handle.clone(),
                },
                Some(_) => {
                    self.files.push(PlannedFile {
                        document: document.handle.clone(),
                        title: document.title.clone(),
                        version: version.clone(),
                        relative_path,
                        private: document.private,
                    });
                    return;
                }
            },
        };

        self.failures.push(PlanFailure {
            handle: document.handle.clone(),
            relative_path: Some(relative_path),
            reason,
        });
    }

    /// Number of documents planned for download
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of subdirectories, the output directory itself excluded
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::{Folder, Link, SourceObject};
    use crate::domain::document::{Rendition, VersionPolicy};
    use crate::domain::ids::CollectionId;
    use std::path::Path;

    fn h(s: &str) -> ObjectHandle {
        ObjectHandle::new(s).unwrap()
    }

    fn version(handle: &str, number: u32, stored: &str) -> Version {
        Version::new(h(handle), number).with_rendition(Rendition {
            stored_name: Some(stored.to_string()),
            ..Default::default()
        })
    }

    fn doc(handle: &str, title: &str, parent: &str) -> Document {
        Document::builder()
            .handle(h(handle))
            .title(title)
            .parent(h(parent))
            .version(version(&format!("Version-{}", &handle[9..]), 1, "File.bin"))
            .build()
            .unwrap()
    }

    fn tree(objects: Vec<SourceObject>) -> CollectionTree {
        let mut all = vec![SourceObject::Folder(Folder::new(h("Collection-42"), "Root"))];
        all.extend(objects);
        CollectionTree::from_objects(&CollectionId::parse("42").unwrap(), all).unwrap()
    }

    fn no_inference() -> ExportConfig {
        ExportConfig {
            infer_extensions: false,
            ..Default::default()
        }
    }

    fn paths(plan: &ExportPlan) -> Vec<&Path> {
        plan.files.iter().map(|f| f.relative_path.as_path()).collect()
    }

    #[test]
    fn test_plan_mirrors_folders() {
        let tree = tree(vec![
            SourceObject::Folder(Folder::new(h("Collection-43"), "Reports").with_parent(h("Collection-42"))),
            SourceObject::Document(doc("Document-1", "Q1 Report", "Collection-43")),
        ]);

        let plan = ExportPlan::build(&tree, &no_inference());
        assert_eq!(plan.directory_count(), 1);
        assert_eq!(plan.directories[0].relative_path, Path::new("Reports"));
        assert_eq!(paths(&plan), vec![Path::new("Reports/Q1 Report")]);
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn test_plan_sanitizes_and_disambiguates() {
        let tree = tree(vec![
            SourceObject::Document(doc("Document-1", "a/b", "Collection-42")),
            SourceObject::Document(doc("Document-2", "a:b", "Collection-42")),
            SourceObject::Document(doc("Document-3", "a-b", "Collection-42")),
        ]);

        let plan = ExportPlan::build(&tree, &no_inference());
        assert_eq!(
            paths(&plan),
            vec![Path::new("a-b"), Path::new("a-b (2)"), Path::new("a-b (3)")]
        );
    }

    #[test]
    fn test_folder_and_document_share_namespace() {
        let tree = tree(vec![
            SourceObject::Folder(Folder::new(h("Collection-43"), "Minutes").with_parent(h("Collection-42"))),
            SourceObject::Document(doc("Document-1", "Minutes", "Collection-42")),
        ]);

        let plan = ExportPlan::build(&tree, &no_inference());
        assert_eq!(plan.directories[0].relative_path, Path::new("Minutes"));
        assert_eq!(paths(&plan), vec![Path::new("Minutes (2)")]);
    }

    #[test]
    fn test_plan_infers_extension() {
        let tree = tree(vec![SourceObject::Document(
            Document::builder()
                .handle(h("Document-1"))
                .title("Budget")
                .original_file_name("budget-final.xlsx")
                .parent(h("Collection-42"))
                .version(version("Version-1", 1, "File-1.bin"))
                .build()
                .unwrap(),
        )]);

        let plan = ExportPlan::build(&tree, &ExportConfig::default());
        assert_eq!(paths(&plan), vec![Path::new("Budget.xlsx")]);
    }

    #[test]
    fn test_plan_selects_version_by_policy() {
        let document = Document::builder()
            .handle(h("Document-1"))
            .title("Handbook")
            .parent(h("Collection-42"))
            .version(version("Version-2", 2, "v2.bin"))
            .version(version("Version-1", 1, "v1.bin"))
            .preferred_version(h("Version-1"))
            .build()
            .unwrap();
        let tree = tree(vec![SourceObject::Document(document)]);

        let latest = ExportPlan::build(&tree, &no_inference());
        assert_eq!(latest.files[0].version.handle.as_str(), "Version-2");

        let preferred = ExportPlan::build(
            &tree,
            &ExportConfig {
                version_policy: VersionPolicy::Preferred,
                ..no_inference()
            },
        );
        assert_eq!(preferred.files[0].version.handle.as_str(), "Version-1");
    }

    #[test]
    fn test_plan_records_failures() {
        let no_versions = Document::builder()
            .handle(h("Document-1"))
            .title("Empty")
            .parent(h("Collection-42"))
            .build()
            .unwrap();
        let no_rendition = Document::builder()
            .handle(h("Document-2"))
            .title("Hollow")
            .parent(h("Collection-42"))
            .version(Version::new(h("Version-2"), 1))
            .build()
            .unwrap();
        let mut tree_objects = vec![
            SourceObject::Document(no_versions),
            SourceObject::Document(no_rendition),
        ];
        tree_objects.push(SourceObject::Folder(
            Folder::new(h("Collection-43"), "Sub")
                .with_parent(h("Collection-42"))
                .with_child(h("Document-404")),
        ));
        let tree = tree(tree_objects);

        let plan = ExportPlan::build(&tree, &no_inference());
        assert!(plan.files.is_empty());
        assert_eq!(plan.failures.len(), 3);
        assert!(plan
            .failures
            .iter()
            .any(|f| f.reason == PlanFailureReason::NoVersion));
        assert!(plan
            .failures
            .iter()
            .any(|f| matches!(f.reason, PlanFailureReason::NoRendition { .. })));
        assert!(plan
            .failures
            .iter()
            .any(|f| matches!(f.reason, PlanFailureReason::MissingMetadata { .. })));
    }

    #[test]
    fn test_links_follow_export_links_option() {
        let link = SourceObject::Link(Link {
            handle: h("URL-5"),
            title: "Wiki".to_string(),
            url: "https://wiki.example.org".to_string(),
            parent: Some(h("Collection-42")),
            private: false,
        });
        let tree = tree(vec![link]);

        let plan = ExportPlan::build(&tree, &ExportConfig::default());
        assert_eq!(plan.links.len(), 1);
        assert_eq!(plan.links[0].relative_path, Path::new("Wiki.txt"));

        let plan = ExportPlan::build(
            &tree,
            &ExportConfig {
                export_links: false,
                ..Default::default()
            },
        );
        assert!(plan.links.is_empty());
    }

    #[test]
    fn test_private_flags_reach_the_plan() {
        let tree = tree(vec![
            SourceObject::Folder(
                Folder::new(h("Collection-43"), "HR")
                    .with_parent(h("Collection-42"))
                    .with_private(true),
            ),
            SourceObject::Document(Document {
                private: true,
                ..doc("Document-10", "Salaries", "Collection-43")
            }),
            SourceObject::Document(doc("Document-11", "Handbook", "Collection-42")),
            SourceObject::Link(Link {
                handle: h("URL-5"),
                title: "Payroll".to_string(),
                url: "https://payroll.example.org".to_string(),
                parent: Some(h("Collection-43")),
                private: true,
            }),
        ]);

        let plan = ExportPlan::build(&tree, &no_inference());
        assert!(plan.directories[0].private);

        let private: HashMap<&str, bool> = plan
            .files
            .iter()
            .map(|f| (f.document.as_str(), f.private))
            .collect();
        assert!(private["Document-10"]);
        assert!(!private["Document-11"]);
        assert!(plan.links[0].private);
    }

    #[test]
    fn test_link_without_url_is_skipped() {
        let link = |handle: &str, title: &str, url: &str| {
            SourceObject::Link(Link {
                handle: h(handle),
                title: title.to_string(),
                url: url.to_string(),
                parent: Some(h("Collection-42")),
                private: false,
            })
        };
        let tree = tree(vec![
            link("URL-5", "Wiki", ""),
            link("URL-6", "Wiki", "  "),
            link("URL-7", "Wiki", "https://wiki.example.org"),
        ]);

        let plan = ExportPlan::build(&tree, &ExportConfig::default());
        assert_eq!(plan.links.len(), 1);
        assert_eq!(plan.links[0].handle.as_str(), "URL-7");
        assert_eq!(plan.links[0].relative_path, Path::new("Wiki.txt"));
        assert!(plan.failures.is_empty());
    }
}
