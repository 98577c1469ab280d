//! Filesystem access for the site.
//!
//! Handles reading and writing:
//! - The two data documents (`teams.json`, `matches.json`)
//! - Site files edited through the admin panel

mod files;

pub use files::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::Snapshot;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("File type not editable: {0}")]
    Disallowed(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("File changed since it was read (expected {expected}, found {actual})")]
    DigestMismatch { expected: String, actual: String },
}

/// The two data documents behind every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDocument {
    Teams,
    Matches,
}

impl DataDocument {
    pub fn filename(&self) -> &'static str {
        match self {
            DataDocument::Teams => "teams.json",
            DataDocument::Matches => "matches.json",
        }
    }

    /// Top-level key every valid document must carry.
    pub fn root_key(&self) -> &'static str {
        match self {
            DataDocument::Teams => "teams",
            DataDocument::Matches => "matches",
        }
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the data documents
    pub data_dir: PathBuf,

    /// Root of the static site served and edited by the admin panel
    pub site_root: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf, site_root: PathBuf) -> Self {
        Self {
            data_dir,
            site_root,
        }
    }

    pub fn document_path(&self, document: DataDocument) -> PathBuf {
        self.data_dir.join(document.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"), PathBuf::from("."))
    }
}

fn read_required(path: &Path) -> Result<String, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Load both documents into a fresh snapshot.
///
/// A missing or unparseable document is fatal for the caller's view.
pub fn load_snapshot(config: &StorageConfig) -> Result<Snapshot, StorageError> {
    let teams = read_required(&config.document_path(DataDocument::Teams))?;
    let matches = read_required(&config.document_path(DataDocument::Matches))?;
    let snapshot = Snapshot::from_json(&teams, &matches)?;

    debug!(
        "Loaded snapshot: {} teams, {} matches",
        snapshot.teams.len(),
        snapshot.matches.len()
    );
    Ok(snapshot)
}

/// Read a data document as raw JSON. A missing file reads as `{}`.
pub fn read_document(config: &StorageConfig, document: DataDocument) -> Result<Value, StorageError> {
    let path = config.document_path(document);
    if !path.exists() {
        return Ok(Value::Object(Default::default()));
    }
    let contents = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Replace a data document after checking it carries its root key.
pub fn write_document(
    config: &StorageConfig,
    document: DataDocument,
    payload: &Value,
) -> Result<(), StorageError> {
    let valid = payload
        .as_object()
        .map_or(false, |obj| obj.contains_key(document.root_key()));
    if !valid {
        return Err(StorageError::InvalidDocument(format!(
            "expected an object with '{}'",
            document.root_key()
        )));
    }

    let json = serde_json::to_string_pretty(payload)?;
    let path = config.document_path(document);
    write_atomic(&path, json.as_bytes())?;
    info!("Wrote {:?}", path);
    Ok(())
}

/// Write through a sibling temp file and rename it into place.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(dir: &Path) -> StorageConfig {
        StorageConfig::new(dir.join("data"), dir.to_path_buf())
    }

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/site/data"), PathBuf::from("/site"));
        assert_eq!(
            config.document_path(DataDocument::Teams),
            PathBuf::from("/site/data/teams.json")
        );
        assert_eq!(
            config.document_path(DataDocument::Matches),
            PathBuf::from("/site/data/matches.json")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.site_root, PathBuf::from("."));
    }

    #[test]
    fn test_load_snapshot_missing_document() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_snapshot(&config(tmp.path())).unwrap_err();
        assert!(matches!(err, StorageError::PathNotFound(_)));
    }

    #[test]
    fn test_write_then_load_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());

        write_document(
            &config,
            DataDocument::Teams,
            &json!({"teams": {"t1": {"name": "One"}}}),
        )
        .unwrap();
        write_document(
            &config,
            DataDocument::Matches,
            &json!({"matches": [{"id": "m1"}]}),
        )
        .unwrap();

        let snapshot = load_snapshot(&config).unwrap();
        assert_eq!(snapshot.teams.len(), 1);
        assert_eq!(snapshot.matches.len(), 1);
        assert!(!config.data_dir.join("teams.json.tmp").exists());
    }

    #[test]
    fn test_write_document_requires_root_key() {
        let tmp = tempfile::tempdir().unwrap();
        let err = write_document(&config(tmp.path()), DataDocument::Matches, &json!({"teams": {}}))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidDocument(_)));

        let err = write_document(&config(tmp.path()), DataDocument::Matches, &json!([1]))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidDocument(_)));
    }

    #[test]
    fn test_read_document_missing_is_empty_object() {
        let tmp = tempfile::tempdir().unwrap();
        let value = read_document(&config(tmp.path()), DataDocument::Teams).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_load_snapshot_rejects_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        std::fs::create_dir_all(&config.data_dir).unwrap();
        std::fs::write(config.document_path(DataDocument::Teams), "{\"teams\": {}}").unwrap();
        std::fs::write(config.document_path(DataDocument::Matches), "{not json").unwrap();

        let err = load_snapshot(&config).unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
