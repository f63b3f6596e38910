//! Output tree writer
//!
//! Files are written to a hidden sibling and renamed into place, so a reader
//! never observes a half-written document and re-runs replace stale copies.
//!
//! With access restriction on, every object gets explicit Unix permissions:
//! owner-only for private objects, world-readable otherwise. The mode is set
//! before any content is written.

use crate::domain::{DumpError, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;

const PRIVATE_FILE_MODE: u32 = 0o600;
const PRIVATE_DIRECTORY_MODE: u32 = 0o700;
const SHARED_FILE_MODE: u32 = 0o644;
const SHARED_DIRECTORY_MODE: u32 = 0o755;

/// Unix permission bits for an exported file or directory
pub fn access_mode(private: bool, directory: bool) -> u32 {
    match (private, directory) {
        (true, true) => PRIVATE_DIRECTORY_MODE,
        (true, false) => PRIVATE_FILE_MODE,
        (false, true) => SHARED_DIRECTORY_MODE,
        (false, false) => SHARED_FILE_MODE,
    }
}

/// Writes directories and files under one output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
    preserve_timestamps: bool,
    restrict_private: bool,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, preserve_timestamps: bool) -> Self {
        Self {
            root: root.into(),
            preserve_timestamps,
            restrict_private: false,
        }
    }

    /// Sets explicit permissions on everything written below the root
    pub fn with_restrict_private(mut self, restrict_private: bool) -> Self {
        self.restrict_private = restrict_private;
        self
    }

    /// The output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the output directory and any missing parents
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Io`] if the directory cannot be created.
    pub async fn prepare_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DumpError::io_at(&self.root, e))
    }

    /// Creates a directory below the output directory
    ///
    /// An existing directory keeps its contents but has its mode reset, so a
    /// collection that changed visibility is corrected on the next run.
    pub async fn create_directory(&self, relative: &Path, private: bool) -> Result<()> {
        let path = self.root.join(relative);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| DumpError::io_at(&path, e))?;
        self.apply_access(&path, private, true).await
    }

    async fn apply_access(&self, path: &Path, private: bool, directory: bool) -> Result<()> {
        if !self.restrict_private {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let permissions = std::fs::Permissions::from_mode(access_mode(private, directory));
            tokio::fs::set_permissions(path, permissions)
                .await
                .map_err(|e| DumpError::io_at(path, e))?;
        }
        #[cfg(not(unix))]
        tracing::trace!(path = %path.display(), private, directory, "Permissions are not set on this platform");

        Ok(())
    }

    /// Atomically writes `bytes` to `relative`, replacing any existing file
    ///
    /// When timestamp preservation is on and `modified` is known, the file's
    /// modification time is set to it. `private` selects the file mode when
    /// access restriction is on.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Io`] naming the path that failed.
    pub async fn write_file(
        &self,
        relative: &Path,
        bytes: &[u8],
        modified: Option<DateTime<Utc>>,
        private: bool,
    ) -> Result<PathBuf> {
        let path = self.root.join(relative);
        let temp = temp_path(&path);

        let result = self.write_temp(&temp, bytes, modified, private).await;
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(DumpError::io_at(&path, e));
        }

        Ok(path)
    }

    async fn write_temp(
        &self,
        temp: &Path,
        bytes: &[u8],
        modified: Option<DateTime<Utc>>,
        private: bool,
    ) -> Result<()> {
        let io = |e| DumpError::io_at(temp, e);

        let mut file = tokio::fs::File::create(temp).await.map_err(io)?;
        self.apply_access(temp, private, false).await?;
        file.write_all(bytes).await.map_err(io)?;
        file.sync_all().await.map_err(io)?;

        if let Some(modified) = modified.filter(|_| self.preserve_timestamps) {
            let file = file.into_std().await;
            file.set_modified(SystemTime::from(modified)).map_err(io)?;
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.docudump-tmp"))
}
