//! DocuShare source implementations
//!
//! The `DocumentSource` trait defines the common interface. `HttpSource` talks
//! to a live server; `ArchiveSource` reads a `dsexport` directory.

pub mod archive;
pub mod http;
mod r#trait;

pub use archive::ArchiveSource;
pub use http::HttpSource;
pub use r#trait::DocumentSource;
