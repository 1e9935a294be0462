//! Directory scanning functionality using walkdir

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, SyncError};
use crate::fingerprint::fingerprint;
use crate::record::{relative_to, Record, RECORD_SEPARATOR};

/// Options for directory scanning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Extensions skipped entirely during the scan
    pub filter_extensions: Vec<String>,
    /// Extensions whose records never carry a content hash
    pub immutable_extensions: Vec<String>,
}

/// Directory scanner producing one record per eligible file
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    options: ScanOptions,
}

impl DirectoryScanner {
    /// Create a new directory scanner with options
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Walk `dir` depth-first and produce records in traversal order.
    ///
    /// Directories whose base name starts with `.` are pruned, never
    /// descended. Record paths are formed by stripping `strip` from the
    /// absolute path. A failure on a single file is logged and skipped; it
    /// never aborts the traversal.
    pub async fn scan(&self, dir: &Path, strip: &Path) -> Vec<Record> {
        let mut records = Vec::new();

        let walker = WalkDir::new(dir).into_iter().filter_entry(keep_entry);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let shown = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| dir.display().to_string());
                    info!("Skipped file: {} ({})", shown, e);
                    continue;
                }
            };

            // Directories are traversed but never yield a record
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            if self.is_filtered(path) {
                info!("Filtered file: {}", path.display());
                continue;
            }

            match self.record_for(path, strip).await {
                Ok(record) => records.push(record),
                Err(e) => info!("Skipped file: {} ({})", path.display(), e),
            }
        }

        records
    }

    /// Build the record for one file, fingerprinting unless its extension is
    /// declared content-immutable
    async fn record_for(&self, path: &Path, strip: &Path) -> Result<Record> {
        let rel = relative_to(path, strip).ok_or_else(|| {
            SyncError::scan_error(path, format!("Path is not under '{}'", strip.display()))
        })?;

        if rel.contains(RECORD_SEPARATOR) {
            return Err(SyncError::scan_error(
                path,
                "Record separator in path is unsupported",
            ));
        }

        if self.is_immutable(path) {
            Ok(Record::immutable(rel))
        } else {
            let hash = fingerprint(path).await?;
            Ok(Record::hashed(rel, hash))
        }
    }

    fn is_filtered(&self, path: &Path) -> bool {
        matches_extension(path, &self.options.filter_extensions)
    }

    fn is_immutable(&self, path: &Path) -> bool {
        matches_extension(path, &self.options.immutable_extensions)
    }
}

/// Walk predicate: descend everywhere except dot-directories
fn keep_entry(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return true;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| !name.starts_with('.'))
        .unwrap_or(true)
}

/// Case-insensitive match of a path's extension against a configured list
/// of dot-prefixed extensions
fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let dotted = format!(".{}", ext);
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&dotted))
}
