//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the docudump configuration file.

use crate::config::{DumpConfig, SourceKind};
use crate::domain::Result;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `loaded` is the outcome of loading `config_path`; loading already
    /// validates, so any error here is reported with exit code 2.
    pub async fn execute(&self, config_path: &str, loaded: Result<DumpConfig>) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration: {config_path}");
        println!();

        let config = match loaded {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        match config.docushare.source {
            SourceKind::Http => {
                println!("  Source: DocuShare server");
                println!("  Base URL: {}", config.docushare.base_url);
                println!("  Auth Type: {}", config.docushare.auth_type);
                println!("  TLS Verify: {}", config.docushare.tls_verify);
            }
            SourceKind::Archive => {
                println!("  Source: export archive");
                if let Some(path) = &config.docushare.archive_path {
                    println!("  Archive Path: {}", path.display());
                }
            }
        }
        println!("  Parallel Downloads: {}", config.export.parallel_downloads);
        match config.export.max_depth {
            Some(depth) => println!("  Max Depth: {depth}"),
            None => println!("  Max Depth: unlimited"),
        }
        println!("  Version Policy: {:?}", config.export.version_policy);
        println!("  Infer Extensions: {}", config.export.infer_extensions);
        println!("  Export Links: {}", config.export.export_links);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DumpError;

    #[tokio::test]
    async fn test_valid_config_exits_zero() {
        let code = ValidateArgs {}
            .execute("docudump.toml", Ok(DumpConfig::default()))
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_exits_two() {
        let loaded = Err(DumpError::Configuration("bad".to_string()));
        let code = ValidateArgs {}
            .execute("docudump.toml", loaded)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
