//! DocuShare source trait definition
//!
//! A source is anything that can list a collection and hand out version
//! content. The exporter only talks to this trait, so a live server and an
//! on-disk `dsexport` directory are interchangeable.

use crate::domain::collection::CollectionTree;
use crate::domain::document::Version;
use crate::domain::ids::{CollectionId, ObjectHandle};
use crate::domain::Result;
use async_trait::async_trait;

/// Trait for DocuShare source implementations
///
/// # Example
///
/// ```no_run
/// use docudump::adapters::docushare::source::{DocumentSource, HttpSource};
/// use docudump::config::DocuShareConfig;
/// use docudump::domain::CollectionId;
///
/// # async fn example() -> docudump::domain::Result<()> {
/// let mut source = HttpSource::new(DocuShareConfig::default())?;
/// source.authenticate().await?;
///
/// let id = CollectionId::parse("42").map_err(docudump::domain::DumpError::Validation)?;
/// let tree = source.fetch_collection(&id).await?;
/// println!("{} documents", tree.document_count());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Prepare credentials for subsequent requests
    ///
    /// # Errors
    ///
    /// Returns an error if the configured credentials are unusable.
    async fn authenticate(&mut self) -> Result<()>;

    /// List a collection and build its folder hierarchy
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::NotFound`](crate::domain::DumpError::NotFound) if the
    /// collection does not exist or is not accessible, and a source error for
    /// connection, authentication or format problems.
    async fn fetch_collection(&self, collection: &CollectionId) -> Result<CollectionTree>;

    /// Fetch the content bytes of one version of a document
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be retrieved. Callers treat this
    /// as a failure of that document only.
    async fn fetch_content(&self, document: &ObjectHandle, version: &Version) -> Result<Vec<u8>>;

    /// Whether requests will carry credentials
    fn is_authenticated(&self) -> bool;

    /// Server URL or archive path, for log messages
    fn location(&self) -> &str;
}
