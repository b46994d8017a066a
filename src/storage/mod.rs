//! Storage module for persisting enrichment results
//!
//! This module handles the append-only result store, including:
//! - The `EntityResult` row format and its CSV columns
//! - Durable per-row appends with duplicate-index protection
//! - Resume point computation that tolerates a half-written last row

mod csv_store;
mod ledger;
mod memory;
mod traits;

pub use csv_store::{CsvResultStore, HEADERS};
pub use ledger::{next_index, resume_from, resume_from_reader, scan_rows, FIRST_INDEX};
pub use memory::MemoryResultStore;
pub use traits::{ResultStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Found / Not Found flag used for both the website and the email column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoundStatus {
    #[serde(rename = "Found")]
    Found,
    #[serde(rename = "Not Found")]
    NotFound,
}

impl FoundStatus {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }

    pub fn from_bool(found: bool) -> Self {
        if found {
            Self::Found
        } else {
            Self::NotFound
        }
    }
}

impl fmt::Display for FoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => write!(f, "Found"),
            Self::NotFound => write!(f, "Not Found"),
        }
    }
}

/// One persisted row per processed entity
///
/// Created once, appended once, never updated. At most one row per `index`
/// exists in a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    #[serde(rename = "Index")]
    pub index: usize,

    #[serde(rename = "Charity Name")]
    pub name: String,

    #[serde(rename = "Website Status")]
    pub website_status: FoundStatus,

    #[serde(rename = "Website URL")]
    pub website_url: Option<String>,

    #[serde(rename = "Contact Email Status")]
    pub email_status: FoundStatus,

    #[serde(rename = "Contact Email")]
    pub email: Option<String>,

    /// Wall-clock seconds spent on the entity; logged, not persisted
    #[serde(skip)]
    pub elapsed_seconds: f64,
}

impl EntityResult {
    /// A row for an entity whose website could not be resolved
    pub fn not_found(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            website_status: FoundStatus::NotFound,
            website_url: None,
            email_status: FoundStatus::NotFound,
            email: None,
            elapsed_seconds: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_status_display() {
        assert_eq!(FoundStatus::Found.to_string(), "Found");
        assert_eq!(FoundStatus::NotFound.to_string(), "Not Found");
        assert_eq!(FoundStatus::from_bool(true), FoundStatus::Found);
    }

    #[test]
    fn test_not_found_row() {
        let row = EntityResult::not_found(4, "Example Trust");
        assert_eq!(row.index, 4);
        assert!(!row.website_status.is_found());
        assert!(!row.email_status.is_found());
        assert!(row.website_url.is_none());
    }
}
