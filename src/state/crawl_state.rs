//! Crawl state definitions for one entity's website crawl
//!
//! The controller walks these states until it reaches `Done`.

use std::fmt;
use url::Url;

/// How a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// A valid email was extracted; no further pages were visited
    Found,
    /// The plan ran out of URLs without an email
    Exhausted,
}

/// Represents the current state of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    // ===== Active States =====
    /// Waiting for the planner's next URL
    Pending,

    /// A fetch of this URL is in flight
    Fetching { url: Url },

    /// Page retrieved; running the email validator over it
    Extracting { url: Url, html: String },

    /// This URL is abandoned; move on to the next one
    Skipping { url: Url, reason: String },

    /// Connectivity lost while fetching; waiting to re-attempt the same URL
    Retrying { url: Url, attempt: u32 },

    // ===== Terminal State =====
    Done(Completion),
}

impl CrawlState {
    /// Returns true if the crawl has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// The URL this state is working on, if any
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Fetching { url }
            | Self::Extracting { url, .. }
            | Self::Skipping { url, .. }
            | Self::Retrying { url, .. } => Some(url),
            Self::Pending | Self::Done(_) => None,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching { .. } => "fetching",
            Self::Extracting { .. } => "extracting",
            Self::Skipping { .. } => "skipping",
            Self::Retrying { .. } => "retrying",
            Self::Done(Completion::Found) => "done_found",
            Self::Done(Completion::Exhausted) => "done_exhausted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.url() {
            Some(url) => write!(f, "{}({})", self.name(), url),
            None => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.org/contact").unwrap()
    }

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlState::Pending.is_terminal());
        assert!(!CrawlState::Fetching { url: url() }.is_terminal());
        assert!(!CrawlState::Retrying {
            url: url(),
            attempt: 1
        }
        .is_terminal());
        assert!(CrawlState::Done(Completion::Found).is_terminal());
        assert!(CrawlState::Done(Completion::Exhausted).is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlState::Pending.to_string(), "pending");
        assert_eq!(
            CrawlState::Fetching { url: url() }.to_string(),
            "fetching(https://example.org/contact)"
        );
        assert_eq!(
            CrawlState::Done(Completion::Exhausted).to_string(),
            "done_exhausted"
        );
    }
}
