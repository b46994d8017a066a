//! Crawler module for website fetching and contact discovery
//!
//! This module contains the per-entity crawl engine, including:
//! - Bounded HTTP fetching with failure classification
//! - Connectivity probing and the lost-connection retry policy
//! - Link discovery on fetched pages
//! - Crawl planning under a hard page ceiling
//! - The crawl controller state machine

mod controller;
mod fetcher;
mod parser;
mod planner;
mod probe;
mod retry;

pub use controller::{CrawlController, CrawlReport};
pub use fetcher::{build_http_client, FetchOutcome, HttpFetcher, PageFetcher};
pub use parser::{extract_links, select_first_href};
pub use planner::{CrawlPlanner, CrawlTarget};
pub use probe::{ConnectivityProbe, TcpProbe};
pub use retry::{ConnectionGuard, RetrySettings};
