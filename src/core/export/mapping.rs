//! Handle to path mapping file
//!
//! One CSV row per written object: `handle,relative path,size,sha256`. Sync
//! tools and audits use it to trace local files back to DocuShare objects.

use crate::domain::{DumpError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const HEADER: &str = "handle,path,size,sha256";

/// Hex encoded SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// One written object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    pub handle: String,
    pub relative_path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

impl MappingRecord {
    pub fn new(handle: impl Into<String>, relative_path: PathBuf, content: &[u8]) -> Self {
        Self {
            handle: handle.into(),
            relative_path,
            size: content.len() as u64,
            sha256: sha256_hex(content),
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Mapping rows collected in export order
#[derive(Debug, Default)]
pub struct ExportMapping {
    records: Vec<MappingRecord>,
}

impl ExportMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MappingRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MappingRecord] {
        &self.records
    }

    /// Renders the mapping as CSV with a header row
    pub fn to_csv(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        for record in &self.records {
            // Forward slashes keep the file identical across platforms
            let path = record
                .relative_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push_str(&format!(
                "{},{},{},{}\n",
                csv_field(&record.handle),
                csv_field(&path),
                record.size,
                record.sha256
            ));
        }
        out
    }

    /// Writes the mapping to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Io`] if the file cannot be written.
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DumpError::io_at(parent, e))?;
        }
        tokio::fs::write(path, self.to_csv())
            .await
            .map_err(|e| DumpError::io_at(path, e))?;
        tracing::info!(path = %path.display(), rows = self.records.len(), "Mapping file written");
        Ok(())
    }
}
