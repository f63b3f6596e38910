//! Export command implementation
//!
//! This module implements the `export` command, which mirrors a DocuShare
//! collection into a local directory tree.

use super::{fail, use_archive};
use crate::adapters::docushare::DocuShareClient;
use crate::config::DumpConfig;
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::domain::{CollectionId, DumpError, VersionPolicy};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Collection to export, e.g. 42 or Collection-42
    #[arg(value_name = "COLLECTION_ID")]
    pub collection_id: String,

    /// Directory that receives the exported tree
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Read from a dsexport archive directory instead of the server
    #[arg(long, value_name = "DIR")]
    pub archive: Option<PathBuf>,

    /// Number of concurrent downloads
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Do not descend into collections at this depth or deeper (0 = no limit)
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Version to export for each document (latest or preferred)
    #[arg(long, value_name = "POLICY")]
    pub version_policy: Option<VersionPolicy>,

    /// Write a handle,path,size,sha256 mapping file
    #[arg(long, value_name = "PATH")]
    pub mapping_file: Option<PathBuf>,

    /// Plan the export and report it without fetching or writing
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Export arguments with no overrides
    pub fn new(collection_id: String, output_dir: PathBuf) -> Self {
        Self {
            collection_id,
            output_dir,
            archive: None,
            parallel: None,
            max_depth: None,
            version_policy: None,
            mapping_file: None,
            dry_run: false,
        }
    }

    /// Apply command line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut DumpConfig) {
        use_archive(&mut config.docushare, self.archive.as_deref());

        if let Some(parallel) = self.parallel {
            tracing::info!(parallel, "Overriding parallel downloads from CLI");
            config.export.parallel_downloads = parallel;
        }
        if let Some(max_depth) = self.max_depth {
            tracing::info!(max_depth, "Overriding max depth from CLI");
            config.export.max_depth = Some(max_depth);
        }
        if let Some(policy) = self.version_policy {
            tracing::info!(policy = ?policy, "Overriding version policy from CLI");
            config.export.version_policy = policy;
        }
        if let Some(mapping_file) = &self.mapping_file {
            config.export.mapping_file = Some(mapping_file.clone());
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        mut config: DumpConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let collection = match CollectionId::parse(&self.collection_id) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid collection ID: {e}");
                return Ok(2);
            }
        };

        if config.export.dry_run {
            println!("🔍 DRY RUN MODE - No files will be written");
            println!();
        }

        let client = match DocuShareClient::new(config.docushare.clone()).await {
            Ok(client) => client,
            Err(e) => return Ok(fail("Failed to connect to DocuShare", &e)),
        };

        let coordinator =
            ExportCoordinator::new(client.source().clone(), config.export.clone(), shutdown_signal);

        println!(
            "🚀 Exporting {collection} from {} to {}",
            client.location(),
            self.output_dir.display()
        );

        let summary = match coordinator
            .execute_export(&collection, &self.output_dir)
            .await
        {
            Ok(summary) => summary,
            Err(e @ DumpError::NotFound(_)) => return Ok(fail("Collection not found", &e)),
            Err(e) => return Ok(fail("Export failed", &e)),
        };

        print_summary(&summary);
        Ok(summary.exit_code())
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Collection: {}", summary.collection);
    println!("  Directories: {}", summary.directories_created);
    println!("  Documents: {}", summary.total_documents);
    println!("  Exported: {}", summary.exported_documents);
    println!("  Failed: {}", summary.failed_documents);
    println!("  Links: {}", summary.exported_links);
    println!("  Bytes Written: {}", summary.bytes_written);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    if !summary.errors.is_empty() {
        eprintln!("⚠️  {} object(s) could not be exported:", summary.errors.len());
        eprint!("{}", summary.failure_report());
        eprintln!();
    }

    if summary.interrupted {
        println!("⚠️  Export interrupted. Re-run the same command to complete it.");
    } else if summary.dry_run {
        println!("✅ Dry run completed");
    } else if summary.is_successful() {
        println!("✅ Export completed successfully!");
    } else {
        println!("⚠️  Export completed with failures");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs::new("42".to_string(), PathBuf::from("/tmp/out"));

        assert!(args.archive.is_none());
        assert!(args.parallel.is_none());
        assert!(args.max_depth.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_export_args_overrides() {
        let args = ExportArgs {
            archive: Some(PathBuf::from("/data/dsexport")),
            parallel: Some(2),
            max_depth: Some(4),
            version_policy: Some(VersionPolicy::Preferred),
            mapping_file: Some(PathBuf::from("map.csv")),
            dry_run: true,
            ..ExportArgs::new("42".to_string(), PathBuf::from("/tmp/out"))
        };
        let mut config = DumpConfig::default();

        args.apply_overrides(&mut config);

        assert_eq!(config.docushare.source, SourceKind::Archive);
        assert_eq!(
            config.docushare.archive_path,
            Some(PathBuf::from("/data/dsexport"))
        );
        assert_eq!(config.export.parallel_downloads, 2);
        assert_eq!(config.export.max_depth, Some(4));
        assert_eq!(config.export.version_policy, VersionPolicy::Preferred);
        assert_eq!(config.export.mapping_file, Some(PathBuf::from("map.csv")));
        assert!(config.export.dry_run);
    }

    #[tokio::test]
    async fn test_invalid_parallel_override_is_config_error() {
        let args = ExportArgs {
            parallel: Some(0),
            ..ExportArgs::new("42".to_string(), PathBuf::from("/tmp/out"))
        };
        let (_tx, rx) = watch::channel(false);

        let code = args.execute(DumpConfig::default(), rx).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_invalid_collection_id_is_config_error() {
        let args = ExportArgs::new("not a collection".to_string(), PathBuf::from("/tmp/out"));
        let (_tx, rx) = watch::channel(false);

        let code = args.execute(DumpConfig::default(), rx).await.unwrap();
        assert_eq!(code, 2);
    }
}
