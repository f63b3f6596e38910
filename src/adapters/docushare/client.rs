//! DocuShare client factory
//!
//! Picks the source implementation from configuration and authenticates it.

use crate::config::{DocuShareConfig, SourceKind};
use crate::domain::{DumpError, Result};
use std::sync::Arc;

use super::source::{ArchiveSource, DocumentSource, HttpSource};

/// DocuShare client that wraps a source implementation
pub struct DocuShareClient {
    source: Arc<dyn DocumentSource>,
}

impl DocuShareClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the archive source has no path, or if the source
    /// cannot be initialized or authenticated.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docudump::adapters::docushare::DocuShareClient;
    /// use docudump::config::DocuShareConfig;
    ///
    /// # async fn example() -> docudump::domain::Result<()> {
    /// let client = DocuShareClient::new(DocuShareConfig::default()).await?;
    /// println!("Reading from {}", client.location());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: DocuShareConfig) -> Result<Self> {
        let source: Arc<dyn DocumentSource> = match config.source {
            SourceKind::Http => {
                let mut source = HttpSource::new(config)?;
                source.authenticate().await?;
                Arc::new(source)
            }
            SourceKind::Archive => {
                let path = config.archive_path.clone().ok_or_else(|| {
                    DumpError::Configuration(
                        "docushare.archive_path is required when source = 'archive'".to_string(),
                    )
                })?;
                let mut source = ArchiveSource::new(path)?;
                source.authenticate().await?;
                Arc::new(source)
            }
        };

        tracing::info!(location = source.location(), "DocuShare source ready");
        Ok(Self { source })
    }

    /// Get a reference to the underlying source
    pub fn source(&self) -> &Arc<dyn DocumentSource> {
        &self.source
    }

    /// Check if the client is authenticated
    pub fn is_authenticated(&self) -> bool {
        self.source.is_authenticated()
    }

    /// Server URL or archive path
    pub fn location(&self) -> &str {
        self.source.location()
    }
}
