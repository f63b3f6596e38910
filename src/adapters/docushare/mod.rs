//! DocuShare adapter implementation
//!
//! This module provides the integration with DocuShare: the export XML
//! parser, the source implementations and the client factory.

pub mod client;
pub mod source;
pub mod xml;

pub use client::DocuShareClient;
pub use source::{ArchiveSource, DocumentSource, HttpSource};
pub use xml::parse_export;
