//! Logging and observability
//!
//! Structured `tracing` output with:
//! - Human-readable console logs on stderr
//! - Configurable log levels, overridable with `RUST_LOG`
//! - Optional JSON log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use docudump::logging::init_logging;
//! use docudump::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an export
///
/// # Example
///
/// ```no_run
/// use docudump::log_export_start;
/// use docudump::domain::CollectionId;
///
/// let id = CollectionId::parse("42").unwrap();
/// log_export_start!(&id, "/tmp/out");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($collection_id:expr, $output_dir:expr) => {
        tracing::info!(
            collection_id = %$collection_id,
            output_dir = %$output_dir,
            "Starting export"
        );
    };
}

/// Log the completion of an export
///
/// # Example
///
/// ```no_run
/// use docudump::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, 1, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($exported:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            exported = $exported,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log a finished document download
///
/// # Example
///
/// ```no_run
/// use docudump::log_download_progress;
///
/// log_download_progress!(10, 120, "Document-7");
/// ```
#[macro_export]
macro_rules! log_download_progress {
    ($current:expr, $total:expr, $handle:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            handle = %$handle,
            progress_pct = ($current as f64 / ($total as f64).max(1.0) * 100.0),
            "Downloaded document"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use docudump::log_error_with_context;
/// use docudump::domain::DumpError;
///
/// let error = DumpError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use docudump::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 2000u64, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request"
        );
    };
}
