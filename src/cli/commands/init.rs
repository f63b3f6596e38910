//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::DEFAULT_CONFIG_FILE;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing docudump configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your DocuShare URL", self.output);
                println!("  2. Put credentials in a .env file:");
                println!("     - DOCUSHARE_USERNAME and DOCUSHARE_PASSWORD");
                println!("  3. Validate configuration: docudump validate-config");
                println!("  4. Preview the layout: docudump tree <COLLECTION_ID>");
                println!("  5. Run export: docudump <COLLECTION_ID> <OUTPUT_DIR>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Docudump Configuration File
# DocuShare collection exporter

environment = "development"

[application]
log_level = "info"

[docushare]
source = "http"
base_url = "https://docushare.example.com/docushare"
auth_type = "basic"
username = "${DOCUSHARE_USERNAME}"
password = "${DOCUSHARE_PASSWORD}"
tls_verify = true
timeout_seconds = 60

[docushare.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

[export]
parallel_downloads = 4
version_policy = "latest"
infer_extensions = true
export_links = true
preserve_timestamps = true
restrict_private = true

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Docudump Configuration File
# DocuShare collection exporter
#
# Values can reference environment variables with ${VAR_NAME}.
# Any key can be overridden with DOCUDUMP_<SECTION>_<KEY>, for example
# DOCUDUMP_EXPORT_PARALLEL_DOWNLOADS=8.

# Runtime environment: development | staging | production
# TLS verification cannot be disabled in production.
environment = "development"

# ============================================================================
# Application Configuration
# ============================================================================
[application]
# Log level: trace | debug | info | warn | error
log_level = "info"

# ============================================================================
# DocuShare Source Configuration
# ============================================================================
[docushare]
# Where to read from: http (live server) | archive (dsexport output directory)
source = "http"

# Server base URL, without the /dsweb suffix
base_url = "https://docushare.example.com/docushare"

# Directory produced by `dsexport -m`, used when source = "archive"
# archive_path = "/srv/dsexport/Collection-42"

# Authentication: basic | none
auth_type = "basic"
username = "${DOCUSHARE_USERNAME}"
password = "${DOCUSHARE_PASSWORD}"

# TLS settings
tls_verify = true
# tls_ca_cert = "/etc/ssl/certs/docushare-ca.pem"

# Request timeout in seconds
timeout_seconds = 60

[docushare.retry]
# Attempts per request; connection errors, timeouts, 429 and 5xx are retried
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Export Configuration
# ============================================================================
[export]
# Concurrent downloads (1-64); files are still written in tree order
parallel_downloads = 4

# Do not descend into collections at this depth or deeper (root = 0, 0 = no limit)
# max_depth = 3

# Version to export: latest | preferred
version_policy = "latest"

# Append the original file extension when a title has none
infer_extensions = true

# Write URL objects as <title>.txt files containing the address
export_links = true

# Set file modification times to the version creation date
preserve_timestamps = true

# Owner-only permissions for objects no site-wide group may read
restrict_private = true

# CSV of handle,path,size,sha256 for every written file
# mapping_file = "docudump-mapping.csv"

# Plan and report without fetching or writing
dry_run = false

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Write JSON logs to rolling files in addition to the console
local_enabled = false
local_path = "logs"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
