//! Output module for reporting on the result store
//!
//! This module handles:
//! - Aggregating found / not-found counts from persisted rows
//! - Detecting gaps in the persisted index sequence
//! - Printing a statistics report for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, read_statistics, ResultStatistics};
