//! The record grammar used for diffing, and root path derivation

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Separator between the relative path and the content hash in a record line.
/// Paths containing this character cannot be represented and are rejected
/// during scanning.
pub const RECORD_SEPARATOR: char = '|';

/// Line-oriented representation of one file.
///
/// A record is either `relativePath` for content-immutable extensions or
/// `relativePath|contentHash` for everything else. Two records are the same
/// iff their full text matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    rel_path: String,
    hash: Option<String>,
}

impl Record {
    /// Record for a content-immutable file, carrying no hash
    pub fn immutable(rel_path: impl Into<String>) -> Self {
        Self {
            rel_path: rel_path.into(),
            hash: None,
        }
    }

    /// Record for a changeable file, carrying its content hash
    pub fn hashed(rel_path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            rel_path: rel_path.into(),
            hash: Some(hash.into()),
        }
    }

    /// Parse one ledger line back into a record
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        match line.split_once(RECORD_SEPARATOR) {
            Some((path, hash)) => Self::hashed(path, hash),
            None => Self::immutable(line),
        }
    }

    /// Relative path of the file this record describes
    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    /// Content hash, absent for content-immutable extensions
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hash {
            Some(hash) => write!(f, "{}{}{}", self.rel_path, RECORD_SEPARATOR, hash),
            None => write!(f, "{}", self.rel_path),
        }
    }
}

/// One configured source location.
///
/// Carries the derived disk prefix (stripped before storage, re-attached on
/// resolution) and the flattened key naming this root's snapshot and history
/// files.
#[derive(Debug, Clone)]
pub struct Root {
    path: PathBuf,
    disk_prefix: PathBuf,
    key: String,
}

impl Root {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let disk_prefix = disk_prefix(&path);
        let key = flatten_key(&path);
        Self {
            path,
            disk_prefix,
            key,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn disk_prefix(&self) -> &Path {
        &self.disk_prefix
    }

    /// Filesystem-safe identifier naming this root's persisted state files
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Absolute source path for a record under this root
    pub fn resolve(&self, record: &Record) -> PathBuf {
        self.disk_prefix.join(record.rel_path())
    }
}

/// Leading volume-identifying segment of a path: `/` on Unix, the drive
/// prefix on Windows, empty for relative paths.
pub fn disk_prefix(path: &Path) -> PathBuf {
    path.components()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect()
}

/// Textual form of `path` with `prefix` stripped, as stored in records.
/// `None` when the path does not start with the prefix.
pub fn relative_to(path: &Path, prefix: &Path) -> Option<String> {
    path.strip_prefix(prefix)
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
}

/// Flattened key derived deterministically from a root path: drop `:`, map
/// separators to `.`, trim leading dots so the file is not hidden.
pub fn flatten_key(path: &Path) -> String {
    let flat: String = path
        .to_string_lossy()
        .chars()
        .filter(|c| *c != ':')
        .map(|c| if c == '/' || c == '\\' { '.' } else { c })
        .collect();
    flat.trim_start_matches('.').to_string()
}
