//! Process directory trait and in-memory implementation.
//!
//! The directory resolves a process ID to the approval template governing
//! it. In production this is backed by the business system that owns the
//! approval configuration; the saga only depends on the lookup contract.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{ProcessDefinition, ProcessId};
use thiserror::Error;

/// Errors raised by a process directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory backend could not be reached.
    #[error("process directory unavailable: {0}")]
    Unavailable(String),
}

/// Trait for resolving approval process templates.
#[async_trait]
pub trait ProcessDirectory: Send + Sync {
    /// Looks up the definition for a process ID.
    ///
    /// Returns None when no process is configured under that ID.
    async fn definition(
        &self,
        process_id: ProcessId,
    ) -> Result<Option<ProcessDefinition>, DirectoryError>;
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    definitions: HashMap<ProcessId, ProcessDefinition>,
    fail_on_lookup: bool,
}

/// In-memory process directory for tests and embedded deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

impl InMemoryProcessDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a process definition.
    pub fn register(&self, definition: ProcessDefinition) {
        let mut state = self.state.write().unwrap();
        state.definitions.insert(definition.process_id(), definition);
    }

    /// Configures the directory to fail lookups.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }

    /// Returns the number of registered definitions.
    pub fn definition_count(&self) -> usize {
        self.state.read().unwrap().definitions.len()
    }
}

#[async_trait]
impl ProcessDirectory for InMemoryProcessDirectory {
    async fn definition(
        &self,
        process_id: ProcessId,
    ) -> Result<Option<ProcessDefinition>, DirectoryError> {
        let state = self.state.read().unwrap();

        if state.fail_on_lookup {
            return Err(DirectoryError::Unavailable(
                "directory lookup disabled".to_string(),
            ));
        }

        Ok(state.definitions.get(&process_id).cloned())
    }
}
