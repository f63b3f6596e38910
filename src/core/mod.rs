//! Core business logic for docudump.
//!
//! # Modules
//!
//! - [`tree`] - Depth-first traversal with loop protection and depth limits
//! - [`export`] - Planning, downloading and writing the local tree
//!
//! # Export Workflow
//!
//! 1. **List**: Fetch the collection's export listing from the source
//! 2. **Plan**: Walk the tree and assign sanitized, unique relative paths
//! 3. **Create**: Make the directory tree under the output directory
//! 4. **Download**: Fetch document content with bounded concurrency
//! 5. **Write**: Store each file atomically, in plan order
//! 6. **Report**: Produce the export summary and optional mapping file
//!
//! # Example
//!
//! ```rust,no_run
//! use docudump::adapters::docushare::DocuShareClient;
//! use docudump::config::load_config;
//! use docudump::core::export::ExportCoordinator;
//! use docudump::domain::CollectionId;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("docudump.toml")?;
//! let client = DocuShareClient::new(config.docushare.clone()).await?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator =
//!     ExportCoordinator::new(client.source().clone(), config.export.clone(), shutdown_rx);
//!
//! let collection = CollectionId::parse("42")?;
//! let summary = coordinator
//!     .execute_export(&collection, Path::new("/tmp/out"))
//!     .await?;
//!
//! println!("Exported: {}", summary.exported_documents);
//! println!("Failed: {}", summary.failed_documents);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod tree;
