//! Configuration management for docudump.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! docudump reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DOCUDUMP_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation that names the offending key
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docudump::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("docudump.toml")?;
//!
//! println!("DocuShare URL: {}", config.docushare.base_url);
//! println!("Parallel downloads: {}", config.export.parallel_downloads);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DocuShareConfig`] - Source selection, server connection and authentication
//! - [`ExportConfig`] - Naming, version selection, concurrency and output options
//! - [`LoggingConfig`] - Rolling JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [docushare]
//! base_url = "https://docushare.example.com/docushare"
//! auth_type = "basic"
//! username = "exporter"
//! password = "${DOCUSHARE_PASSWORD}"
//!
//! [export]
//! parallel_downloads = 4
//! version_policy = "latest"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, resolve_config, DEFAULT_CONFIG_FILE};
pub use schema::{
    ApplicationConfig, DocuShareConfig, DumpConfig, Environment, ExportConfig, LoggingConfig,
    RetryConfig, SourceKind,
};
pub use secret::{basic_auth_header, secret_string, secret_string_opt, SecretString, SecretValue};
