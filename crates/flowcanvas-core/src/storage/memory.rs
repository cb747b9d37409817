//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::workflow::WorkflowDefinition;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and scripted sessions.
#[derive(Default)]
pub struct MemoryStorage {
    workflows: RwLock<HashMap<String, WorkflowDefinition>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, workflow: &WorkflowDefinition) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let workflow = workflow.clone();
        Box::pin(async move {
            self.workflows.write().map_err(lock_error)?.insert(id, workflow);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<WorkflowDefinition>> {
        let id = id.to_string();
        Box::pin(async move {
            let workflows = self.workflows.read().map_err(lock_error)?;
            workflows.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.workflows.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let workflows = self.workflows.read().map_err(lock_error)?;
            let mut ids: Vec<String> = workflows.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.workflows.read().map_err(lock_error)?.contains_key(&id)) })
    }
}
