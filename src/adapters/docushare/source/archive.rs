//! On-disk DocuShare export source
//!
//! Reads the directory `dsexport -m` produces for a collection:
//!
//! ```text
//! <archive>/Collection-42.xml      listing
//! <archive>/documents/File-9.bin   content, named by the rendition's stored file name
//! ```

use super::DocumentSource;
use crate::adapters::docushare::xml::parse_export;
use crate::domain::collection::CollectionTree;
use crate::domain::document::Version;
use crate::domain::ids::{CollectionId, ObjectHandle};
use crate::domain::{DumpError, Result, SourceError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Export archive source
pub struct ArchiveSource {
    root: PathBuf,
    location: String,
}

impl ArchiveSource {
    /// Create a source over an export directory
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Configuration`] if `root` is not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DumpError::Configuration(format!(
                "Archive path is not a directory: {}",
                root.display()
            )));
        }
        let location = root.display().to_string();
        Ok(Self { root, location })
    }

    fn listing_path(&self, collection: &CollectionId) -> PathBuf {
        self.root.join(format!("{}.xml", collection.as_str()))
    }

    fn content_path(&self, stored_name: &str) -> Option<PathBuf> {
        let relative = Path::new(stored_name);
        // Stored names are plain file names; anything else could escape the archive
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        plain.then(|| self.root.join("documents").join(relative))
    }
}

#[async_trait]
impl DocumentSource for ArchiveSource {
    async fn authenticate(&mut self) -> Result<()> {
        Ok(())
    }

    async fn fetch_collection(&self, collection: &CollectionId) -> Result<CollectionTree> {
        let path = self.listing_path(collection);
        tracing::info!(path = %path.display(), collection_id = %collection, "Reading collection listing");

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DumpError::NotFound(format!(
                    "collection {collection} (no {} in archive)",
                    path.display()
                )))
            }
            Err(e) => return Err(DumpError::io_at(&path, e)),
        };

        let xml = String::from_utf8_lossy(&bytes);
        let objects = parse_export(&xml)?;
        CollectionTree::from_objects(collection, objects)
    }

    async fn fetch_content(&self, document: &ObjectHandle, version: &Version) -> Result<Vec<u8>> {
        let stored_name = version
            .rendition
            .as_ref()
            .and_then(|r| r.stored_name.as_deref())
            .ok_or_else(|| {
                DumpError::Source(SourceError::ContentNotFound(format!(
                    "{document} ({}) has no stored file",
                    version.handle
                )))
            })?;

        let path = self.content_path(stored_name).ok_or_else(|| {
            DumpError::Source(SourceError::InvalidFormat(format!(
                "{document}: unsafe stored file name {stored_name:?}"
            )))
        })?;

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DumpError::Source(SourceError::ContentNotFound(format!(
                "{document} ({}): {}",
                version.handle,
                path.display()
            ))),
            _ => DumpError::io_at(&path, e),
        })
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    fn location(&self) -> &str {
        &self.location
    }
}
