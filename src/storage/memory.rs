//! In-memory result store

use crate::storage::traits::{ResultStore, StorageResult};
use crate::storage::EntityResult;

/// Result store that keeps rows in a vector
///
/// Used for dry runs and tests. Honors the same duplicate-index rule as the
/// file-backed store.
#[derive(Debug, Default, Clone)]
pub struct MemoryResultStore {
    rows: Vec<EntityResult>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds the given rows
    pub fn with_rows(rows: Vec<EntityResult>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EntityResult] {
        &self.rows
    }
}

impl ResultStore for MemoryResultStore {
    fn append(&mut self, result: &EntityResult) -> StorageResult<bool> {
        if self.rows.iter().any(|r| r.index == result.index) {
            return Ok(false);
        }
        self.rows.push(result.clone());
        Ok(true)
    }

    fn load_results(&self) -> StorageResult<Vec<EntityResult>> {
        Ok(self.rows.clone())
    }
}
