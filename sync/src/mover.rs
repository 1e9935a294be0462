//! Copying changed files into the mirrored destination tree

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info};

use crate::error::{Result, SyncError};
use crate::fingerprint::fingerprint;
use crate::record::{disk_prefix, relative_to, Record, Root};
use crate::registry::MovedRegistry;

/// Copies source files into the destination mirror and accounts for them in
/// the moved registry
#[derive(Debug, Clone)]
pub struct Mover {
    destination: PathBuf,
    registry: MovedRegistry,
}

impl Mover {
    pub fn new(destination: impl Into<PathBuf>, registry: MovedRegistry) -> Self {
        Self {
            destination: destination.into(),
            registry,
        }
    }

    /// Copy one changed record's file into the mirror.
    ///
    /// On success the record joins the registry entry for this root. On any
    /// failure the record is logged, dropped from the registry entry if
    /// present, and processing is expected to continue with the next record.
    /// No retries.
    pub async fn move_record(&self, root: &Root, record: &Record) {
        let source = root.resolve(record);
        let dest_file = self.destination.join(record.rel_path());

        match self.copy(&source, &dest_file).await {
            Ok(()) => {
                info!("Moved {} ==> {}", source.display(), dest_file.display());
                self.registry.append(root.key(), record.clone());
            }
            Err(e) => {
                error!("Failed to move {}: {}", source.display(), e);
                self.registry.remove(root.key(), record);
            }
        }
    }

    /// Mirror a single-file root, bypassing snapshot and history: copy when
    /// the destination is absent, or when the fingerprints differ
    pub async fn sync_single_file(&self, file: &Path) -> Result<()> {
        info!("Synchronizing single file: {}", file.display());

        let rel = relative_to(file, &disk_prefix(file)).ok_or_else(|| {
            SyncError::copy_error(file, &self.destination, "Cannot derive relative path")
        })?;
        let dest_file = self.destination.join(rel);

        if dest_file.exists() {
            if fingerprint(file).await? != fingerprint(&dest_file).await? {
                self.copy(file, &dest_file).await?;
            }
        } else {
            self.copy(file, &dest_file).await?;
        }
        Ok(())
    }

    async fn copy(&self, source: &Path, dest_file: &Path) -> Result<()> {
        if let Some(parent) = dest_file.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                SyncError::copy_error(
                    source,
                    dest_file,
                    format!("Failed to create destination directory: {}", e),
                )
            })?;
        }
        fs::copy(source, dest_file).await.map_err(|e| {
            SyncError::copy_error(source, dest_file, format!("Failed to copy file: {}", e))
        })?;
        Ok(())
    }
}
