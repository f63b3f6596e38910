//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::domain::{DumpError, SourceError};
use std::path::PathBuf;
use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Collection handle that was exported
    pub collection: String,

    /// Directories created below the output directory
    pub directories_created: usize,

    /// Documents planned for export, failures included
    pub total_documents: usize,

    /// Documents written successfully
    pub exported_documents: usize,

    /// Documents that could not be exported
    pub failed_documents: usize,

    /// Link files written
    pub exported_links: usize,

    /// Bytes of document content written
    pub bytes_written: u64,

    /// Nothing was fetched or written
    pub dry_run: bool,

    /// Stopped early by a shutdown signal
    pub interrupted: bool,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            directories_created: 0,
            total_documents: 0,
            exported_documents: 0,
            failed_documents: 0,
            exported_links: 0,
            bytes_written: 0,
            dry_run: false,
            interrupted: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Records a document that could not be exported
    pub fn record_failure(&mut self, error: ExportError) {
        self.failed_documents += 1;
        self.add_error(error);
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed_documents == 0 && self.errors.is_empty() && !self.interrupted
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_documents == 0 {
            return 100.0;
        }
        (self.exported_documents as f64 / self.total_documents as f64) * 100.0
    }

    /// Process exit code for a completed run
    ///
    /// `130` when interrupted, `1` when any document failed, else `0`.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if self.failed_documents > 0 || !self.errors.is_empty() {
            1
        } else {
            0
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            collection = %self.collection,
            directories = self.directories_created,
            total_documents = self.total_documents,
            exported = self.exported_documents,
            failed = self.failed_documents,
            links = self.exported_links,
            bytes = self.bytes_written,
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    handle = %error.handle,
                    path = error.path.as_ref().map(|p| p.display().to_string()),
                    message = %error.message,
                    "Export error"
                );
            }
        }
    }

    /// Human readable failure list, one line per failed object
    pub fn failure_report(&self) -> String {
        let mut report = String::new();
        for error in &self.errors {
            report.push_str(&format!("FAILED {} ", error.handle));
            if let Some(path) = &error.path {
                report.push_str(&format!("({}) ", path.display()));
            }
            report.push_str(&error.message);
            report.push('\n');
        }
        report
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Object listed without metadata
    MissingMetadata,
    /// Document has no version to export
    NoVersion,
    /// Version has no content rendition
    NoRendition,
    /// Content not available at the source
    ContentNotFound,
    /// Connection, timeout or server failure while fetching
    Fetch,
    /// The source refused access to this document
    AccessDenied,
    /// Local file could not be written
    Write,
    /// Unknown error
    Unknown,
}

impl ExportErrorType {
    /// Classifies a fetch error
    pub fn from_error(error: &DumpError) -> Self {
        match error {
            DumpError::Source(SourceError::ContentNotFound(_)) | DumpError::NotFound(_) => {
                ExportErrorType::ContentNotFound
            }
            DumpError::Source(SourceError::ClientError { status: 403, .. }) => {
                ExportErrorType::AccessDenied
            }
            DumpError::Source(_) => ExportErrorType::Fetch,
            DumpError::Io(_) => ExportErrorType::Write,
            _ => ExportErrorType::Unknown,
        }
    }
}

/// Export error for one object
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Handle of the object that failed
    pub handle: String,

    /// Intended path relative to the output directory, when known
    pub path: Option<PathBuf>,

    /// Error message
    pub message: String,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, handle: impl Into<String>, message: String) -> Self {
        Self {
            error_type,
            handle: handle.into(),
            path: None,
            message,
        }
    }

    /// Attach the intended output path
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}
