// Docudump - DocuShare collection exporter
// Copyright (c) 2025 Docudump Contributors
// Licensed under the MIT License

//! # Docudump - DocuShare Collection Exporter
//!
//! Docudump mirrors a DocuShare collection into a local directory tree so that
//! a generic sync tool (rclone, azcopy, ...) can upload it elsewhere.
//!
//! ## Overview
//!
//! - **Listing** a collection through the DocuShare export XML, from a live
//!   server or an on-disk `dsexport` archive
//! - **Planning** one directory per sub-collection and one file per document,
//!   with sanitized, collision-free names
//! - **Downloading** the selected version of each document with bounded
//!   concurrency
//! - **Writing** files atomically, so re-runs produce identical trees
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Tree traversal, export planning and coordination
//! - [`adapters`] - DocuShare sources (HTTP server, export archive)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docudump::adapters::docushare::DocuShareClient;
//! use docudump::config::resolve_config;
//! use docudump::core::export::ExportCoordinator;
//! use docudump::domain::CollectionId;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = resolve_config(None)?;
//!     let client = DocuShareClient::new(config.docushare.clone()).await?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator =
//!         ExportCoordinator::new(client.source().clone(), config.export, shutdown_rx);
//!
//!     let collection = CollectionId::parse("42")?;
//!     let summary = coordinator
//!         .execute_export(&collection, Path::new("/srv/export"))
//!         .await?;
//!
//!     println!("Exported {} documents", summary.exported_documents);
//!     Ok(())
//! }
//! ```
//!
//! ## Offline Exports
//!
//! The same exporter runs against the directory written by `dsexport -m`:
//!
//! ```rust,no_run
//! use docudump::adapters::docushare::{ArchiveSource, DocumentSource};
//! use docudump::core::tree::{render_tree, TreeWalker};
//! use docudump::domain::CollectionId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ArchiveSource::new("/srv/dsexport/Collection-42")?;
//! let tree = source.fetch_collection(&CollectionId::parse("42")?).await?;
//!
//! let walk = TreeWalker::new(&tree).with_max_depth(Some(2)).walk();
//! print!("{}", render_tree(&walk));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`] with [`domain::DumpError`].
//! Per-document failures do not abort an export; they are collected in the
//! [`ExportSummary`](core::export::ExportSummary).

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
