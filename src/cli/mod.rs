//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for docudump using clap.
//! Running without a subcommand, `docudump <COLLECTION_ID> <OUTPUT_DIR>`, is
//! shorthand for `docudump export <COLLECTION_ID> <OUTPUT_DIR>`.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docudump - DocuShare collection exporter
#[derive(Parser, Debug)]
#[command(name = "docudump")]
#[command(version, about, long_about = None)]
#[command(author = "Docudump Contributors")]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    /// Path to configuration file [default: docudump.toml if present]
    #[arg(short, long, global = true, env = "DOCUDUMP_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "DOCUDUMP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Collection to export, e.g. 42 or Collection-42
    #[arg(value_name = "COLLECTION_ID", required = true)]
    pub collection_id: Option<String>,

    /// Directory that receives the exported tree
    #[arg(value_name = "OUTPUT_DIR", required = true)]
    pub output_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to run, with the positional shorthand mapped to `export`
    pub fn into_command(self) -> Option<Commands> {
        match (self.command, self.collection_id, self.output_dir) {
            (Some(command), _, _) => Some(command),
            (None, Some(collection_id), Some(output_dir)) => Some(Commands::Export(
                commands::export::ExportArgs::new(collection_id, output_dir),
            )),
            _ => None,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a collection to a local directory tree
    Export(commands::export::ExportArgs),

    /// Print the collection hierarchy without writing files
    Tree(commands::tree::TreeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
