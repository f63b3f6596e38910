//! Tree command implementation
//!
//! Prints the collection hierarchy, one object per line, indented by depth.

use super::{fail, use_archive};
use crate::adapters::docushare::DocuShareClient;
use crate::config::DumpConfig;
use crate::core::tree::{render_tree, TreeWalker};
use crate::domain::CollectionId;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the tree command
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Collection to list, e.g. 42 or Collection-42
    #[arg(value_name = "COLLECTION_ID")]
    pub collection_id: String,

    /// Read from a dsexport archive directory instead of the server
    #[arg(long, value_name = "DIR")]
    pub archive: Option<PathBuf>,

    /// Do not descend into collections at this depth or deeper (0 = no limit)
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

impl TreeArgs {
    /// Execute the tree command
    pub async fn execute(&self, mut config: DumpConfig) -> anyhow::Result<i32> {
        use_archive(&mut config.docushare, self.archive.as_deref());

        let collection = match CollectionId::parse(&self.collection_id) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid collection ID: {e}");
                return Ok(2);
            }
        };

        let client = match DocuShareClient::new(config.docushare).await {
            Ok(client) => client,
            Err(e) => return Ok(fail("Failed to connect to DocuShare", &e)),
        };

        let tree = match client.source().fetch_collection(&collection).await {
            Ok(tree) => tree,
            Err(e) => return Ok(fail("Failed to list collection", &e)),
        };

        let max_depth = self.max_depth.or(config.export.max_depth);
        let walk = TreeWalker::new(&tree).with_max_depth(max_depth).walk();
        print!("{}", render_tree(&walk));

        for missing in &walk.missing {
            eprintln!("⚠️  {} listed in {} has no metadata", missing.handle, missing.parent);
        }

        Ok(0)
    }
}
