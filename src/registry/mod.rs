//! Registry lookup
//!
//! Resolves an organization's official website from its name by querying a
//! public registry search page and reading the website link out of the
//! result markup.

use crate::config::Config;
use crate::crawler::{select_first_href, ConnectionGuard, PageFetcher, RetrySettings};
use crate::crawler::{ConnectivityProbe, FetchOutcome};
use crate::{ConfigError, ScoutError};
use async_trait::async_trait;
use scraper::Selector;
use std::sync::Arc;
use std::time::Duration;
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Name-to-website resolution
#[async_trait]
pub trait RegistryLookup: Send {
    /// Returns the registered website for `name`, if any
    ///
    /// Per-request failures come back as `Ok(None)`. Only a run-level
    /// connectivity loss is reported as an error.
    async fn lookup(&mut self, name: &str) -> Result<Option<Url>, ScoutError>;
}

/// Registry lookup over HTTP
///
/// Uses the same page fetcher, and the same lost-connection retry caps, as
/// the website crawl. The connection guard here is separate from the crawl
/// controller's, so the outage streak is tracked per call site.
pub struct HttpRegistryLookup {
    fetcher: Arc<dyn PageFetcher>,
    guard: ConnectionGuard,
    search_url: String,
    selector: Selector,
    timeout: Duration,
}

impl HttpRegistryLookup {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        guard: ConnectionGuard,
        search_url: impl Into<String>,
        selector: Selector,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            guard,
            search_url: search_url.into(),
            selector,
            timeout,
        }
    }

    /// Creates a lookup from the registry, crawler and network settings
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Result<Self, ConfigError> {
        let selector = Selector::parse(&config.registry.website_selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{}: {}", config.registry.website_selector, e))
        })?;

        Ok(Self::new(
            fetcher,
            ConnectionGuard::new(probe, RetrySettings::from_config(&config.network)),
            config.registry.search_url.clone(),
            selector,
            Duration::from_secs(config.crawler.request_timeout_secs),
        ))
    }

    /// Builds the search URL for a name
    pub fn search_url_for(&self, name: &str) -> Result<Url, ScoutError> {
        let encoded: String = byte_serialize(name.as_bytes()).collect();
        Ok(Url::parse(&format!("{}{}", self.search_url, encoded))?)
    }
}

#[async_trait]
impl RegistryLookup for HttpRegistryLookup {
    async fn lookup(&mut self, name: &str) -> Result<Option<Url>, ScoutError> {
        let search = self.search_url_for(name)?;
        tracing::debug!("Registry search: {}", search);

        let outcome = self
            .guard
            .fetch(self.fetcher.as_ref(), &search, self.timeout)
            .await?;

        match outcome {
            FetchOutcome::Success {
                html, final_url, ..
            } => {
                let base = final_url.unwrap_or(search);
                let website = select_first_href(&html, &base, &self.selector);
                match &website {
                    Some(url) => tracing::info!("Website found for {}: {}", name, url),
                    None => tracing::info!("No website listed for {}", name),
                }
                Ok(website)
            }
            other => {
                tracing::warn!("Registry search for {} failed: {}", name, other);
                Ok(None)
            }
        }
    }
}
