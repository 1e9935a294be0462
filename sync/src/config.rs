//! Static configuration loaded once at startup

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Engine configuration, read from a YAML document and immutable for the
/// run's duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory holding per-root snapshot, history and log files
    pub working_dir: PathBuf,
    /// Destination root the sources are mirrored under
    pub destination: PathBuf,
    /// Source roots, directories or single files, processed in order
    pub sources: Vec<PathBuf>,
    /// Extensions whose content never changes; their records carry no hash
    #[serde(default)]
    pub immutable_extensions: Vec<String>,
    /// Extensions excluded from scanning entirely
    #[serde(default)]
    pub filter_extensions: Vec<String>,
    /// Log file path; defaults to stdout.log under the working directory
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl SyncConfig {
    /// Load and validate a configuration document
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SyncError::config_error(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let config: SyncConfig = serde_yaml::from_str(&content)
            .map_err(|e| SyncError::config_error(format!("Could not parse YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(SyncError::config_error("working_dir cannot be empty"));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(SyncError::config_error("destination cannot be empty"));
        }
        if self.sources.is_empty() {
            return Err(SyncError::config_error(
                "at least one source root is required",
            ));
        }
        for ext in self
            .immutable_extensions
            .iter()
            .chain(self.filter_extensions.iter())
        {
            if !ext.starts_with('.') {
                return Err(SyncError::config_error(format!(
                    "extension '{ext}' must start with '.'"
                )));
            }
        }
        Ok(())
    }

    /// Resolved log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.working_dir.join("stdout.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn valid_config() -> SyncConfig {
        SyncConfig {
            working_dir: PathBuf::from("/var/sync"),
            destination: PathBuf::from("/backup"),
            sources: vec![PathBuf::from("/data/project")],
            immutable_extensions: vec![".bin".to_string()],
            filter_extensions: vec![".tmp".to_string()],
            log_file: None,
        }
    }

    #[test]
    fn test_parse_yaml_document() {
        let doc = r#"
working_dir: /var/sync
destination: /backup
sources:
  - /data/project
  - /data/notes.txt
immutable_extensions:
  - .bin
filter_extensions:
  - .tmp
log_file: /var/log/sync.log
"#;
        let config: SyncConfig = serde_yaml::from_str(doc).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.immutable_extensions, vec![".bin"]);
        assert_eq!(config.log_path(), PathBuf::from("/var/log/sync.log"));
        config.validate().unwrap();
    }

    #[test]
    fn test_optional_fields_default() {
        let doc = r#"
working_dir: /var/sync
destination: /backup
sources:
  - /data/project
"#;
        let config: SyncConfig = serde_yaml::from_str(doc).unwrap();
        assert!(config.immutable_extensions.is_empty());
        assert!(config.filter_extensions.is_empty());
        assert_eq!(config.log_path(), PathBuf::from("/var/sync/stdout.log"));
    }

    #[test]
    fn test_empty_sources_rejected() {
        let mut config = valid_config();
        config.sources.clear();
        assert!(config.validate().is_err());
    }

    #[test_case("bin" ; "missing dot")]
    #[test_case("tmp" ; "missing dot on filter")]
    fn test_extension_without_dot_rejected(ext: &str) {
        let mut config = valid_config();
        config.filter_extensions = vec![ext.to_string()];
        assert!(config.validate().is_err());
    }
}
