//! Domain models and types for docudump.
//!
//! This module contains the DocuShare object model the exporter works on.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ObjectHandle`], [`CollectionId`])
//! - **Domain models** ([`Document`], [`Version`], [`Folder`], [`Link`], [`CollectionTree`])
//! - **Error types** ([`DumpError`], [`SourceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! A collection ID is always normalized to its full handle, so the bare number
//! shown in the DocuShare UI and the handle refer to the same collection:
//!
//! ```rust
//! use docudump::domain::CollectionId;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let from_number = CollectionId::parse("42")?;
//! let from_handle = CollectionId::parse("Collection-42")?;
//! assert_eq!(from_number, from_handle);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, DumpError>`]. Each error kind maps
//! to a process exit code through [`DumpError::exit_code`].

pub mod collection;
pub mod document;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use collection::{CollectionTree, Folder, Link, Node, SortOrder, SourceObject};
pub use document::{Document, DocumentBuilder, Rendition, Version, VersionPolicy};
pub use errors::{DumpError, SourceError};
pub use ids::{CollectionId, ObjectHandle};
pub use result::Result;
