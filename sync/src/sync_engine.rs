//! Root coordination: one concurrent worker per directory root

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::SyncConfig;
use crate::diff::change_set;
use crate::error::{Result, SyncError};
use crate::ledger::Ledger;
use crate::mover::Mover;
use crate::record::{relative_to, Record, Root};
use crate::registry::MovedRegistry;
use crate::scanner::{DirectoryScanner, ScanOptions};

/// Main sync engine.
///
/// Dispatches one independent worker per directory root, handles single-file
/// roots inline on the dispatching task, and flushes whatever is left in the
/// moved registry on the way out.
pub struct SyncEngine {
    config: Arc<SyncConfig>,
    scanner: DirectoryScanner,
    ledger: Ledger,
    registry: MovedRegistry,
    mover: Mover,
}

impl SyncEngine {
    /// Create a new sync engine from a validated configuration
    pub fn new(config: SyncConfig) -> Self {
        let scanner = DirectoryScanner::new(ScanOptions {
            filter_extensions: config.filter_extensions.clone(),
            immutable_extensions: config.immutable_extensions.clone(),
        });
        let ledger = Ledger::new(&config.working_dir);
        let registry = MovedRegistry::new(ledger.clone());
        let mover = Mover::new(&config.destination, registry.clone());

        Self {
            config: Arc::new(config),
            scanner,
            ledger,
            registry,
            mover,
        }
    }

    /// Synchronize every configured root.
    ///
    /// Directory roots run concurrently to completion; file roots are
    /// handled in configured order on this task. Registry entries still
    /// present after dispatch, including a failed run's, are flushed so
    /// accumulated history is not lost.
    pub async fn run(&self) -> Result<()> {
        let outcome = self.dispatch().await;
        self.registry.flush_and_remove_all();
        if let Err(e) = &outcome {
            error!("Synchronization run failed: {}", e);
        }
        outcome
    }

    async fn dispatch(&self) -> Result<()> {
        fs::create_dir_all(&self.config.working_dir).await?;

        let mut workers: Vec<JoinHandle<Result<()>>> = Vec::new();
        for source in &self.config.sources {
            if source.is_dir() {
                workers.push(self.spawn_worker(Root::new(source.clone())));
            } else {
                // Single files block dispatch, not the running workers
                self.mover.sync_single_file(source).await?;
            }
        }

        let mut failed = 0usize;
        for joined in join_all(workers).await {
            match joined {
                Ok(Ok(())) => {}
                // The worker already logged its own failure
                Ok(Err(_)) => failed += 1,
                Err(e) => {
                    error!("Worker terminated abnormally: {}", e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(SyncError::SyncOperation(format!(
                "{failed} root(s) failed to synchronize"
            )));
        }
        Ok(())
    }

    fn spawn_worker(&self, root: Root) -> JoinHandle<Result<()>> {
        let scanner = self.scanner.clone();
        let ledger = self.ledger.clone();
        let registry = self.registry.clone();
        let mover = self.mover.clone();
        let destination = self.config.destination.clone();

        tokio::spawn(async move {
            let shown = root.path().display().to_string();
            let outcome =
                sync_root(root, scanner, ledger, registry, mover, &destination).await;
            if let Err(e) = &outcome {
                error!("Synchronization of root '{}' failed: {}", shown, e);
            }
            outcome
        })
    }
}

/// One directory root's full pass: snapshot, diff, move, flush, strictly in
/// that order
async fn sync_root(
    root: Root,
    scanner: DirectoryScanner,
    ledger: Ledger,
    registry: MovedRegistry,
    mover: Mover,
    destination: &Path,
) -> Result<()> {
    info!("Parsing source root: {}", root.path().display());
    registry.create_entry(root.key());

    let records = scanner.scan(root.path(), root.disk_prefix()).await;
    ledger.write_snapshot(root.key(), &records).await?;

    let changes = diff_root(&root, &scanner, &ledger, destination).await?;
    if changes.is_empty() {
        info!(
            "No files need synchronization for {}",
            root.path().display()
        );
    }
    for record in &changes {
        mover.move_record(&root, record).await;
    }

    registry.flush_and_remove(root.key())
}

/// Change set for one root: bootstrap the history ledger when missing, then
/// subtract history from the freshly written snapshot
async fn diff_root(
    root: &Root,
    scanner: &DirectoryScanner,
    ledger: &Ledger,
    destination: &Path,
) -> Result<Vec<Record>> {
    if !ledger.history_exists(root.key()) {
        bootstrap_history(root, scanner, ledger, destination).await;
    }
    let snapshot = ledger.read_snapshot(root.key()).await?;
    let history = ledger.read_history(root.key()).await?;
    Ok(change_set(snapshot, &history))
}

/// Derive an initial history from whatever already exists in the destination
/// mirror, so a first run against a pre-populated destination does not
/// re-copy everything.
///
/// Mirror records are formed relative to the destination root so they align
/// textually with source-side records. Failures here are logged and the root
/// proceeds with an empty history.
async fn bootstrap_history(
    root: &Root,
    scanner: &DirectoryScanner,
    ledger: &Ledger,
    destination: &Path,
) {
    let Some(mirror) = mirror_of(destination, root) else {
        return;
    };
    if !mirror.exists() {
        return;
    }

    info!(
        "No history of moved records, deriving it from: {}",
        mirror.display()
    );
    let records = scanner.scan(&mirror, destination).await;
    if let Err(e) = ledger.write_history(root.key(), &records).await {
        error!(
            "Failed to derive history from {}: {}",
            mirror.display(),
            e
        );
    }
}

/// Mirrored destination directory for a source root
pub(crate) fn mirror_of(destination: &Path, root: &Root) -> Option<PathBuf> {
    relative_to(root.path(), root.disk_prefix()).map(|rel| destination.join(rel))
}
