//! Statistics generation from the result store
//!
//! This module provides functionality for extracting and displaying
//! enrichment statistics from persisted rows.

use crate::storage::{
    next_index, scan_rows, EntityResult, ResultStore, StorageError, FIRST_INDEX,
};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;

/// Result store statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStatistics {
    /// Number of persisted rows
    pub total: usize,

    /// Rows whose website answered at least one fetch
    pub websites_found: usize,

    /// Rows with a website URL that never answered
    pub websites_unreachable: usize,

    /// Rows with a contact email
    pub emails_found: usize,

    /// Next index a run would start from
    pub resume_point: usize,

    /// Runs of indices below the resume point with no row
    pub missing: Vec<RangeInclusive<usize>>,
}

impl ResultStatistics {
    /// Builds statistics from a set of rows
    pub fn from_rows(rows: &[EntityResult]) -> Self {
        let resume_point = next_index(rows.iter().map(|r| r.index));

        let present: BTreeSet<usize> = rows
            .iter()
            .map(|r| r.index)
            .filter(|&index| index < resume_point)
            .collect();

        let mut missing = Vec::new();
        let mut expected = FIRST_INDEX;
        for &index in &present {
            if index > expected {
                missing.push(expected..=index - 1);
            }
            expected = index + 1;
        }

        Self {
            total: rows.len(),
            websites_found: rows.iter().filter(|r| r.website_status.is_found()).count(),
            websites_unreachable: rows
                .iter()
                .filter(|r| !r.website_status.is_found() && r.website_url.is_some())
                .count(),
            emails_found: rows.iter().filter(|r| r.email_status.is_found()).count(),
            resume_point,
            missing,
        }
    }

    /// Total number of indices below the resume point with no row
    pub fn missing_count(&self) -> usize {
        self.missing
            .iter()
            .map(|run| run.end() - run.start() + 1)
            .sum()
    }
}

/// Loads statistics from a result store
///
/// # Arguments
///
/// * `store` - The result store to scan
///
/// # Returns
///
/// * `Ok(ResultStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to read the store
pub fn load_statistics(store: &dyn ResultStore) -> Result<ResultStatistics, StorageError> {
    let rows = store.load_results()?;
    Ok(ResultStatistics::from_rows(&rows))
}

/// Reads statistics straight from a result file without opening it for writing
///
/// A missing file yields empty statistics and is not created. A partial
/// trailing row is skipped but left on disk for the next run to repair.
pub fn read_statistics(path: impl AsRef<Path>) -> Result<ResultStatistics, StorageError> {
    let content = match fs::read(path.as_ref()) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    Ok(ResultStatistics::from_rows(&scan_rows(&content)))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ResultStatistics) {
    println!("=== Enrichment Statistics ===\n");

    println!("Overview:");
    println!("  Rows persisted: {}", stats.total);
    println!("  Next index: {}", stats.resume_point);
    println!();

    println!("Websites:");
    println!(
        "  Found: {} ({:.1}%)",
        stats.websites_found,
        percentage(stats.websites_found, stats.total)
    );
    println!("  Listed but unreachable: {}", stats.websites_unreachable);
    println!();

    println!(
        "Contact Emails Found: {} ({:.1}%)",
        stats.emails_found,
        percentage(stats.emails_found, stats.total)
    );
    println!();

    if !stats.missing.is_empty() {
        println!("Missing Indices ({}):", stats.missing_count());
        for run in stats.missing.iter().take(20) {
            if run.start() == run.end() {
                println!("  - {}", run.start());
            } else {
                println!("  - {} to {}", run.start(), run.end());
            }
        }
        if stats.missing.len() > 20 {
            println!("  ... and {} more gaps", stats.missing.len() - 20);
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
