//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod export;
pub mod init;
pub mod tree;
pub mod validate;

use crate::config::{DocuShareConfig, SourceKind};
use crate::domain::DumpError;
use std::path::Path;

/// Points the source at an export archive instead of a server
pub(crate) fn use_archive(config: &mut DocuShareConfig, archive: Option<&Path>) {
    if let Some(path) = archive {
        tracing::info!(archive = %path.display(), "Reading from export archive");
        config.source = SourceKind::Archive;
        config.archive_path = Some(path.to_path_buf());
    }
}

/// Reports a fatal error and returns its exit code
pub(crate) fn fail(context: &str, error: &DumpError) -> i32 {
    crate::log_error_with_context!(error, context);
    eprintln!("❌ {context}: {error}");
    error.exit_code()
}
