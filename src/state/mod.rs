//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the per-entity crawl state machine (pending, fetching, extracting, ...)
//! - `RunStats`: process-lifetime timing used for the rolling average

mod crawl_state;
mod run_stats;

// Re-export main types
pub use crawl_state::{Completion, CrawlState};
pub use run_stats::RunStats;
