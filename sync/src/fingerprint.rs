//! Content fingerprinting by streaming SHA-256

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::error::{Result, SyncError};

/// Compute the hex digest of a file's contents.
///
/// The file is read in fixed-size chunks so large files never sit in memory
/// whole. Read failures propagate to the caller.
pub async fn fingerprint<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut file = fs::File::open(path)
        .await
        .map_err(|e| SyncError::hash_error(path, format!("Failed to open file: {}", e)))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .await
            .map_err(|e| SyncError::hash_error(path, format!("Failed to read file: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    #[tokio::test]
    async fn test_known_digest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hello.txt");
        fs::write(&path, b"hello").await.unwrap();

        let digest = fingerprint(&path).await.unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_same_content_same_digest() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"identical content").await.unwrap();
        fs::write(&b, b"identical content").await.unwrap();

        assert_eq!(
            fingerprint(&a).await.unwrap(),
            fingerprint(&b).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = fingerprint(&missing).await;
        assert!(matches!(result, Err(SyncError::Hash { .. })));
    }
}
