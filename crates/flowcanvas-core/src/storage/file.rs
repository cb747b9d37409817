//! File-based storage: one pretty-printed JSON file per workflow.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::workflow::WorkflowDefinition;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores workflows as `<id>.json` files in a directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/flowcanvas/workflows/`
    /// On Windows: `%LOCALAPPDATA%\flowcanvas\workflows\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("flowcanvas").join("workflows"))
    }

    fn workflow_path(&self, id: &str) -> StorageResult<PathBuf> {
        if !is_valid_id(id) {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", id)))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Ids are used verbatim as file names, so only `[A-Za-z0-9_-]` is accepted.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Storage for FileStorage {
    fn save(&self, id: &str, workflow: &WorkflowDefinition) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.workflow_path(id);
        let json = workflow.to_json();
        Box::pin(async move {
            let path = path?;
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::debug!("Saved workflow to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<WorkflowDefinition>> {
        let path = self.workflow_path(id);
        let id = id.to_string();
        Box::pin(async move {
            let path = path?;
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;
            WorkflowDefinition::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.workflow_path(id);
        Box::pin(async move {
            let path = path?;
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .filter(|id| is_valid_id(id))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.workflow_path(id);
        Box::pin(async move { Ok(path?.exists()) })
    }
}
