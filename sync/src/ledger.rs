//! Per-root snapshot and history files under the working directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{Result, SyncError};
use crate::record::Record;

/// Snapshot file suffix for the current run
const SNAPSHOT_SUFFIX: &str = ".syn.log.new";
/// Append-only history ledger suffix
const HISTORY_SUFFIX: &str = ".syn.moved";

/// Access to the line-delimited snapshot and history files of every root.
///
/// Each root's files are named by its flattened key and touched only by that
/// root's worker, so no locking happens here.
#[derive(Debug, Clone)]
pub struct Ledger {
    working_dir: PathBuf,
}

impl Ledger {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Path of the current run's snapshot for a root
    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.working_dir.join(format!("{key}{SNAPSHOT_SUFFIX}"))
    }

    /// Path of the append-only history ledger for a root
    pub fn history_path(&self, key: &str) -> PathBuf {
        self.working_dir.join(format!("{key}{HISTORY_SUFFIX}"))
    }

    pub fn history_exists(&self, key: &str) -> bool {
        self.history_path(key).exists()
    }

    /// Replace any previous run's snapshot with `records`, deleting the old
    /// file first and fully materializing the new one before returning
    pub async fn write_snapshot(&self, key: &str, records: &[Record]) -> Result<()> {
        let path = self.snapshot_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SyncError::history_error(
                    key,
                    format!("Failed to delete old snapshot '{}': {}", path.display(), e),
                ))
            }
        }
        fs::write(&path, render(records)).await.map_err(|e| {
            SyncError::history_error(
                key,
                format!("Failed to write snapshot '{}': {}", path.display(), e),
            )
        })
    }

    pub async fn read_snapshot(&self, key: &str) -> Result<Vec<Record>> {
        let path = self.snapshot_path(key);
        let content = fs::read_to_string(&path).await.map_err(|e| {
            SyncError::history_error(
                key,
                format!("Failed to read snapshot '{}': {}", path.display(), e),
            )
        })?;
        Ok(parse(&content))
    }

    /// Write an initial history ledger, used when bootstrapping from the
    /// destination mirror
    pub async fn write_history(&self, key: &str, records: &[Record]) -> Result<()> {
        let path = self.history_path(key);
        fs::write(&path, render(records)).await.map_err(|e| {
            SyncError::history_error(
                key,
                format!("Failed to write history '{}': {}", path.display(), e),
            )
        })
    }

    /// Read a root's history; a missing ledger reads as empty
    pub async fn read_history(&self, key: &str) -> Result<Vec<Record>> {
        let path = self.history_path(key);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(SyncError::history_error(
                key,
                format!("Failed to read history '{}': {}", path.display(), e),
            )),
        }
    }
}

fn render(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}

fn parse(content: &str) -> Vec<Record> {
    content
        .lines()
        .filter(|line| !line.is_empty())
        .map(Record::parse)
        .collect()
}

/// Append records to a history ledger with blocking IO; used by the moved
/// registry while holding its lock
pub(crate) fn append_history(path: &Path, records: &[Record]) -> std::io::Result<()> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    for record in records {
        writeln!(file, "{record}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Ledger::new(temp_dir.path());

        let records = vec![
            Record::hashed("data/a.txt", "01"),
            Record::immutable("data/b.bin"),
        ];
        ledger.write_snapshot("data.project", &records).await.unwrap();

        let read_back = ledger.read_snapshot("data.project").await.unwrap();
        assert_eq!(read_back, records);
    }

    #[tokio::test]
    async fn test_snapshot_overwrites_previous_run() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Ledger::new(temp_dir.path());

        ledger
            .write_snapshot("k", &[Record::hashed("old.txt", "01")])
            .await
            .unwrap();
        ledger
            .write_snapshot("k", &[Record::hashed("new.txt", "02")])
            .await
            .unwrap();

        let read_back = ledger.read_snapshot("k").await.unwrap();
        assert_eq!(read_back, vec![Record::hashed("new.txt", "02")]);
    }

    #[tokio::test]
    async fn test_missing_history_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Ledger::new(temp_dir.path());

        assert!(!ledger.history_exists("k"));
        assert!(ledger.read_history("k").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_history_error() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Ledger::new(temp_dir.path());

        let result = ledger.read_snapshot("k").await;
        assert!(matches!(result, Err(SyncError::History { .. })));
    }

    #[tokio::test]
    async fn test_append_history_accumulates() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Ledger::new(temp_dir.path());
        let path = ledger.history_path("k");

        append_history(&path, &[Record::hashed("a.txt", "01")]).unwrap();
        append_history(&path, &[Record::hashed("a.txt", "02")]).unwrap();

        let read_back = ledger.read_history("k").await.unwrap();
        assert_eq!(
            read_back,
            vec![Record::hashed("a.txt", "01"), Record::hashed("a.txt", "02")]
        );
    }
}
