//! Export coordinator - main orchestrator for the export process
//!
//! Fetches the collection listing, plans the output tree, downloads document
//! content with bounded concurrency and writes everything in plan order.

use crate::adapters::docushare::DocumentSource;
use crate::config::ExportConfig;
use crate::core::export::mapping::{ExportMapping, MappingRecord};
use crate::core::export::plan::{ExportPlan, PlanFailureReason, PlannedFile};
use crate::core::export::summary::{ExportError, ExportErrorType, ExportSummary};
use crate::core::export::writer::OutputWriter;
use crate::domain::ids::CollectionId;
use crate::domain::Result;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Export coordinator
pub struct ExportCoordinator {
    source: Arc<dyn DocumentSource>,
    options: ExportConfig,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    ///
    /// Downloads stop being scheduled once `shutdown_signal` turns `true`.
    pub fn new(
        source: Arc<dyn DocumentSource>,
        options: ExportConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            options,
            shutdown_signal,
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    /// Execute the export of `collection` into `output_dir`
    ///
    /// Per-document problems are recorded in the returned summary and do not
    /// stop the run.
    ///
    /// # Errors
    ///
    /// - [`DumpError::NotFound`](crate::domain::DumpError::NotFound) if the
    ///   collection does not exist or is inaccessible
    /// - [`DumpError::Io`](crate::domain::DumpError::Io) if the output tree or
    ///   mapping file cannot be written
    /// - source errors that prevent listing the collection, and authentication
    ///   or connection failures while downloading
    pub async fn execute_export(
        &self,
        collection: &CollectionId,
        output_dir: &Path,
    ) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new(collection.as_str());
        summary.dry_run = self.options.dry_run;

        crate::log_export_start!(collection, output_dir.display());

        let tree = self.source.fetch_collection(collection).await?;
        tracing::info!(
            folders = tree.folder_count(),
            documents = tree.document_count(),
            "Collection listing loaded"
        );

        let plan = ExportPlan::build(&tree, &self.options);
        summary.total_documents = plan.files.len() + plan.failures.len();
        for failure in &plan.failures {
            let error_type = match failure.reason {
                PlanFailureReason::MissingMetadata { .. } => ExportErrorType::MissingMetadata,
                PlanFailureReason::NoVersion => ExportErrorType::NoVersion,
                PlanFailureReason::NoRendition { .. } => ExportErrorType::NoRendition,
            };
            let mut error =
                ExportError::new(error_type, failure.handle.as_str(), failure.reason.to_string());
            if let Some(path) = &failure.relative_path {
                error = error.with_path(path.clone());
            }
            summary.record_failure(error);
        }

        if self.options.dry_run {
            self.report_dry_run(&plan);
            let summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        let writer = OutputWriter::new(output_dir, self.options.preserve_timestamps)
            .with_restrict_private(self.options.restrict_private);
        writer.prepare_root().await?;
        for directory in &plan.directories {
            writer
                .create_directory(&directory.relative_path, directory.private)
                .await?;
            summary.directories_created += 1;
        }

        let mut mapping = ExportMapping::new();

        for link in &plan.links {
            let content = format!("{}\n", link.url);
            writer
                .write_file(&link.relative_path, content.as_bytes(), None, link.private)
                .await?;
            mapping.push(MappingRecord::new(
                link.handle.as_str(),
                link.relative_path.clone(),
                content.as_bytes(),
            ));
            summary.exported_links += 1;
        }

        self.download_files(&plan.files, &writer, &mut mapping, &mut summary)
            .await?;

        if let Some(mapping_path) = &self.options.mapping_file {
            mapping.write_to(mapping_path).await?;
        }

        let summary = summary.with_duration(start_time.elapsed());
        crate::log_export_complete!(
            summary.exported_documents,
            summary.failed_documents,
            summary.duration
        );
        summary.log_summary();

        Ok(summary)
    }

    /// Fetches with up to `parallel_downloads` requests in flight, writing
    /// results sequentially in plan order
    async fn download_files(
        &self,
        files: &[PlannedFile],
        writer: &OutputWriter,
        mapping: &mut ExportMapping,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        let total = files.len();
        let concurrency = self.options.parallel_downloads.max(1);

        let mut fetches = stream::iter(files)
            .map(|file| {
                let source = Arc::clone(&self.source);
                let cancelled = self.shutdown_requested();
                async move {
                    if cancelled {
                        return (file, None);
                    }
                    let content = source.fetch_content(&file.document, &file.version).await;
                    (file, Some(content))
                }
            })
            .buffered(concurrency);

        let mut done = 0usize;
        while let Some((file, outcome)) = fetches.next().await {
            let Some(content) = outcome else {
                if !summary.interrupted {
                    tracing::warn!("Shutdown requested, no further downloads will be started");
                    summary.interrupted = true;
                }
                continue;
            };
            done += 1;

            let bytes = match content {
                Ok(bytes) => bytes,
                Err(e) if e.aborts_export() => {
                    tracing::error!(
                        handle = %file.document,
                        error = %e,
                        "Download failed for the whole source, stopping export"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        handle = %file.document,
                        path = %file.relative_path.display(),
                        error = %e,
                        "Failed to fetch document"
                    );
                    summary.record_failure(
                        ExportError::new(
                            ExportErrorType::from_error(&e),
                            file.document.as_str(),
                            e.to_string(),
                        )
                        .with_path(file.relative_path.clone()),
                    );
                    continue;
                }
            };

            if let Some(declared) = file.declared_size() {
                if declared != bytes.len() as u64 {
                    tracing::warn!(
                        handle = %file.document,
                        declared,
                        actual = bytes.len(),
                        "Downloaded size differs from declared size"
                    );
                }
            }

            writer
                .write_file(
                    &file.relative_path,
                    &bytes,
                    file.version.modified(),
                    file.private,
                )
                .await?;

            mapping.push(MappingRecord::new(
                file.document.as_str(),
                file.relative_path.clone(),
                &bytes,
            ));
            summary.exported_documents += 1;
            summary.bytes_written += bytes.len() as u64;
            crate::log_download_progress!(done, total, file.document);
        }

        Ok(())
    }

    fn report_dry_run(&self, plan: &ExportPlan) {
        tracing::info!(
            directories = plan.directory_count(),
            documents = plan.file_count(),
            links = plan.links.len(),
            failures = plan.failures.len(),
            "Dry run, nothing will be fetched or written"
        );
        for directory in &plan.directories {
            tracing::info!(
                handle = %directory.handle,
                path = %directory.relative_path.display(),
                "Would create directory"
            );
        }
        for link in &plan.links {
            tracing::info!(
                handle = %link.handle,
                path = %link.relative_path.display(),
                "Would write link"
            );
        }
        for file in &plan.files {
            tracing::info!(
                handle = %file.document,
                version = %file.version.handle,
                path = %file.relative_path.display(),
                "Would export document"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::{CollectionTree, Folder, SourceObject};
    use crate::domain::document::{Document, Rendition, Version};
    use crate::domain::ids::ObjectHandle;
    use crate::domain::{DumpError, SourceError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn h(s: &str) -> ObjectHandle {
        ObjectHandle::new(s).unwrap()
    }

    struct StaticSource {
        content: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl DocumentSource for StaticSource {
        async fn authenticate(&mut self) -> Result<()> {
            Ok(())
        }

        async fn fetch_collection(&self, collection: &CollectionId) -> Result<CollectionTree> {
            let doc = |n: u32, title: &str| {
                SourceObject::Document(
                    Document::builder()
                        .handle(h(&format!("Document-{n}")))
                        .title(title)
                        .parent(h("Collection-1"))
                        .version(
                            Version::new(h(&format!("Version-{n}")), 1)
                                .with_rendition(Rendition::default()),
                        )
                        .build()
                        .unwrap(),
                )
            };
            CollectionTree::from_objects(
                collection,
                vec![
                    SourceObject::Folder(Folder::new(h("Collection-1"), "Root")),
                    doc(1, "one"),
                    doc(2, "two"),
                ],
            )
        }

        async fn fetch_content(
            &self,
            _document: &ObjectHandle,
            version: &Version,
        ) -> Result<Vec<u8>> {
            self.content
                .get(version.handle.as_str())
                .cloned()
                .ok_or_else(|| {
                    DumpError::Source(SourceError::ContentNotFound(version.handle.to_string()))
                })
        }

        fn is_authenticated(&self) -> bool {
            true
        }

        fn location(&self) -> &str {
            "static"
        }
    }

    fn coordinator(options: ExportConfig, shutdown: bool) -> ExportCoordinator {
        let mut content = HashMap::new();
        content.insert("Version-1".to_string(), b"first".to_vec());
        content.insert("Version-2".to_string(), b"second".to_vec());
        let (_tx, rx) = watch::channel(shutdown);
        ExportCoordinator::new(Arc::new(StaticSource { content }), options, rx)
    }

    fn collection() -> CollectionId {
        CollectionId::parse("1").unwrap()
    }

    #[tokio::test]
    async fn test_export_writes_all_documents() {
        let dir = TempDir::new().unwrap();
        let summary = coordinator(ExportConfig::default(), false)
            .execute_export(&collection(), dir.path())
            .await
            .unwrap();

        assert!(summary.is_successful());
        assert_eq!(summary.exported_documents, 2);
        assert_eq!(summary.bytes_written, 11);
        assert_eq!(std::fs::read(dir.path().join("one")).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.path().join("two")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let options = ExportConfig {
            dry_run: true,
            ..Default::default()
        };

        let summary = coordinator(options, false)
            .execute_export(&collection(), &out)
            .await
            .unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.total_documents, 2);
        assert_eq!(summary.exported_documents, 0);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_shutdown_before_start_marks_interrupted() {
        let dir = TempDir::new().unwrap();
        let summary = coordinator(ExportConfig::default(), true)
            .execute_export(&collection(), dir.path())
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.exported_documents, 0);
        assert_eq!(summary.exit_code(), 130);
    }

    #[tokio::test]
    async fn test_unknown_collection_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = coordinator(ExportConfig::default(), false)
            .execute_export(&CollectionId::parse("99").unwrap(), dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, DumpError::NotFound(_)));
    }
}
