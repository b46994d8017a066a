//! URL handling module for Sumi-Scout
//!
//! This module provides visited-set normalization and the same-site check
//! the crawl planner uses to stay on an organization's own website.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, same_site, site_host};
pub use normalize::{normalize_url, visit_key};
