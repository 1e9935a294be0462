//! Sync Engine Library
//!
//! An incremental mirror synchronization library providing:
//! - Directory scanning with hidden-directory pruning and extension filtering
//! - Streaming content fingerprinting of scanned files
//! - Snapshot-vs-history diffing for incremental runs
//! - Concurrent per-root processing with a shared moved-file registry
//! - Append-only per-root history ledgers persisted across runs

pub mod config;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod ledger;
pub mod mover;
pub mod record;
pub mod registry;
pub mod scanner;
pub mod sync_engine;

// Re-export main types and functions
pub use config::SyncConfig;
pub use diff::change_set;
pub use error::{Result, SyncError};
pub use fingerprint::fingerprint;
pub use ledger::Ledger;
pub use mover::Mover;
pub use record::{Record, Root};
pub use registry::MovedRegistry;
pub use scanner::{DirectoryScanner, ScanOptions};
pub use sync_engine::SyncEngine;

/// Run one full synchronization pass over every configured root
pub async fn synchronize(config: SyncConfig) -> Result<()> {
    SyncEngine::new(config).run().await
}
