//! Storage traits and error types
//!
//! This module defines the trait interface for result store backends and
//! associated error types.

use crate::storage::{ledger, EntityResult};
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Any of these is fatal to the run: results that cannot be persisted must
/// not be reported as processed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for result store implementations
///
/// The store is append-only. Implementations must make each append durable
/// before returning, and must support a full scan for resume.
pub trait ResultStore {
    /// Appends one row
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Row written and flushed
    /// * `Ok(false)` - A row with this index already exists; nothing written
    /// * `Err(StorageError)` - Store is unwritable
    fn append(&mut self, result: &EntityResult) -> StorageResult<bool>;

    /// Reads every complete row currently persisted
    ///
    /// Rows that fail to parse are skipped.
    fn load_results(&self) -> StorageResult<Vec<EntityResult>>;

    /// Returns the next index to process
    fn resume_point(&self) -> StorageResult<usize> {
        let results = self.load_results()?;
        Ok(ledger::next_index(results.iter().map(|r| r.index)))
    }
}
