//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that:
//! - Shutdown signals propagate through the watch channel
//! - No download is started once shutdown is requested
//! - Documents already fetched are still written completely
//! - An interrupted run reports exit code 130

use async_trait::async_trait;
use docudump::adapters::docushare::DocumentSource;
use docudump::config::ExportConfig;
use docudump::core::export::{ExportCoordinator, ExportSummary};
use docudump::domain::{
    CollectionId, CollectionTree, Document, Folder, ObjectHandle, Rendition, Result, SortOrder,
    SourceObject, Version,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::watch;

fn h(s: &str) -> ObjectHandle {
    ObjectHandle::new(s).unwrap()
}

/// Source that requests shutdown as soon as its first document is fetched
struct InterruptingSource {
    documents: usize,
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
    fetches: AtomicUsize,
}

impl InterruptingSource {
    fn new(documents: usize, shutdown_tx: watch::Sender<bool>) -> Self {
        Self {
            documents,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentSource for InterruptingSource {
    async fn authenticate(&mut self) -> Result<()> {
        Ok(())
    }

    async fn fetch_collection(&self, collection: &CollectionId) -> Result<CollectionTree> {
        let root =
            Folder::new(collection.handle().clone(), "Root").with_sort_order(SortOrder::Title);
        let mut objects = vec![SourceObject::Folder(root)];
        for n in 1..=self.documents {
            let document = Document::builder()
                .handle(h(&format!("Document-{n}")))
                .title(format!("doc-{n:02}"))
                .parent(collection.handle().clone())
                .version(
                    Version::new(h(&format!("Version-{n}")), 1)
                        .with_rendition(Rendition::default()),
                )
                .build()
                .unwrap();
            objects.push(SourceObject::Document(document));
        }
        CollectionTree::from_objects(collection, objects)
    }

    async fn fetch_content(&self, document: &ObjectHandle, _version: &Version) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = self.shutdown_tx.lock().unwrap().take() {
            let _ = tx.send(true);
        }
        Ok(document.as_str().as_bytes().to_vec())
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    fn location(&self) -> &str {
        "memory"
    }
}

#[tokio::test]
async fn test_shutdown_signal_channel_creation() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    assert!(!*shutdown_rx.borrow());

    shutdown_tx.send(true).unwrap();
    assert!(*shutdown_rx.borrow());
}

#[tokio::test]
async fn test_shutdown_signal_reaches_every_receiver() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut rx1 = shutdown_rx.clone();
    let mut rx2 = shutdown_rx.clone();

    shutdown_tx.send(true).unwrap();

    rx1.changed().await.unwrap();
    rx2.changed().await.unwrap();
    assert!(*rx1.borrow());
    assert!(*rx2.borrow());
}

#[tokio::test]
async fn test_interrupt_stops_scheduling_but_writes_fetched_documents() {
    let out = TempDir::new().unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let source = Arc::new(InterruptingSource::new(4, shutdown_tx));

    let options = ExportConfig {
        parallel_downloads: 1,
        ..Default::default()
    };
    let coordinator = ExportCoordinator::new(source.clone(), options, shutdown_rx);
    let summary = coordinator
        .execute_export(&CollectionId::parse("1").unwrap(), out.path())
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.exit_code(), 130);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(summary.exported_documents, 1);
    assert_eq!(summary.failed_documents, 0);

    assert_eq!(
        std::fs::read(out.path().join("doc-01")).unwrap(),
        b"Document-1"
    );
    assert!(!out.path().join("doc-02").exists());
}

#[tokio::test]
async fn test_interrupted_summary_exit_code_wins_over_failures() {
    let mut summary = ExportSummary::new("Collection-1");
    summary.failed_documents = 2;
    assert_eq!(summary.exit_code(), 1);

    summary.interrupted = true;
    assert_eq!(summary.exit_code(), 130);
    assert!(!summary.is_successful());
}
