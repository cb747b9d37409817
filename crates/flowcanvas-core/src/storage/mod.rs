//! Persistence of workflow definitions.
//!
//! The editor only ever hands a [`WorkflowDefinition`] across this boundary;
//! backends decide where the JSON lands.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::workflow::WorkflowDefinition;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Workflow not found: {0}")]
    NotFound(String),
    #[error("Invalid workflow id: {0:?}")]
    InvalidId(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future returned by storage backends.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend that stores workflow definitions by id.
pub trait Storage: Send + Sync {
    /// Save a workflow, replacing any previous version.
    fn save(&self, id: &str, workflow: &WorkflowDefinition) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a workflow.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<WorkflowDefinition>>;

    /// Delete a workflow. Deleting a missing id is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List stored workflow ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a workflow exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
