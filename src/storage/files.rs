//! Site files editable through the admin panel.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::{write_atomic, StorageError};

fn default_allowed_extensions() -> Vec<String> {
    [".html", ".css", ".js", ".json", ".txt", ".md"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignored_dirs() -> Vec<String> {
    [".git", "target", ".idea", ".vscode", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignored_files() -> Vec<String> {
    ["config.toml"].iter().map(|s| s.to_string()).collect()
}

/// Which files the admin panel may see and edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRules {
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,

    #[serde(default = "default_ignored_files")]
    pub ignored_files: Vec<String>,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            ignored_dirs: default_ignored_dirs(),
            ignored_files: default_ignored_files(),
        }
    }
}

impl FileRules {
    fn extension_allowed(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    fn dir_ignored(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }

    fn file_ignored(&self, name: &str) -> bool {
        self.ignored_files.iter().any(|f| f == name)
    }

    /// Whether a root-relative path passes every rule.
    pub fn permits(&self, relative: &Path) -> bool {
        let names: Vec<&str> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        let Some((file_name, dirs)) = names.split_last() else {
            return false;
        };
        dirs.iter().all(|dir| !self.dir_ignored(dir))
            && !self.file_ignored(file_name)
            && self.extension_allowed(relative)
    }
}

/// Lowercase hex SHA-256 of file content.
pub fn content_digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// A site file read for editing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteFile {
    pub path: String,
    pub content: String,
    pub digest: String,
}

/// Editable view over the site root.
#[derive(Debug, Clone)]
pub struct SiteFiles {
    root: PathBuf,
    rules: FileRules,
}

impl SiteFiles {
    pub fn new(root: PathBuf, rules: FileRules) -> Self {
        Self { root, rules }
    }

    /// Whether a static request path may be served to anyone. Directory
    /// requests are checked as their `index.html`.
    pub fn is_public(&self, relative: &str) -> bool {
        let trimmed = relative.trim_start_matches('/');
        let target = if trimmed.is_empty() || trimmed.ends_with('/') {
            format!("{}index.html", trimmed)
        } else {
            trimmed.to_string()
        };
        let path = Path::new(&target);
        path.components().all(|c| matches!(c, Component::Normal(_)))
            && self.rules.permits(path)
    }

    /// Every editable file under the root, as sorted `/`-separated paths.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut out = Vec::new();
        self.walk(&self.root, &mut out)?;
        out.sort();
        Ok(out)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<String>) -> Result<(), StorageError> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                if !self.rules.dir_ignored(&name) {
                    self.walk(&path, out)?;
                }
            } else if file_type.is_file() {
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                if self.rules.permits(relative) {
                    out.push(to_slash(relative));
                }
            }
        }
        Ok(())
    }

    /// Map a client-supplied relative path onto the root.
    ///
    /// Rejects absolute paths, parent components, and anything that
    /// resolves outside the root through a symlink.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let trimmed = relative.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }

        let rel_path = Path::new(trimmed);
        let clean = rel_path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !clean {
            warn!("Rejected path outside site root: {}", relative);
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        if !self.rules.permits(rel_path) {
            return Err(StorageError::Disallowed(relative.to_string()));
        }

        let full = self.root.join(rel_path);
        if !self.contains(&full)? {
            warn!("Rejected path escaping site root: {}", relative);
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(full)
    }

    /// Whether `path` stays under the root once its nearest existing
    /// ancestor is resolved through any symlinks.
    fn contains(&self, path: &Path) -> Result<bool, StorageError> {
        let root = self.root.canonicalize()?;
        let mut anchor = path;
        // symlink_metadata so a dangling link counts as existing
        while fs::symlink_metadata(anchor).is_err() {
            match anchor.parent() {
                Some(parent) => anchor = parent,
                None => return Ok(false),
            }
        }
        Ok(match anchor.canonicalize() {
            Ok(resolved) => resolved.starts_with(&root),
            Err(_) => false,
        })
    }

    pub fn read(&self, relative: &str) -> Result<SiteFile, StorageError> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(StorageError::PathNotFound(path));
        }
        let content = fs::read_to_string(&path)?;
        debug!("Read site file {:?}", path);
        Ok(SiteFile {
            path: to_slash(path.strip_prefix(&self.root).unwrap_or(&path)),
            digest: content_digest(&content),
            content,
        })
    }

    /// Replace a file's content and return the new digest.
    ///
    /// With `expected_digest`, the write only happens if the file on disk
    /// still matches it; a missing file has the empty digest.
    pub fn write(
        &self,
        relative: &str,
        content: &str,
        expected_digest: Option<&str>,
    ) -> Result<String, StorageError> {
        let path = self.resolve(relative)?;

        if let Some(expected) = expected_digest {
            let actual = if path.is_file() {
                content_digest(&fs::read_to_string(&path)?)
            } else {
                String::new()
            };
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(StorageError::DigestMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
            if !self.contains(parent)? {
                warn!("Rejected path escaping site root: {}", relative);
                return Err(StorageError::InvalidPath(relative.to_string()));
            }
        }
        write_atomic(&path, content.as_bytes())?;
        info!("Wrote site file {:?}", path);
        Ok(content_digest(content))
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
