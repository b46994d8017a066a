//! Crawl controller - per-entity crawl orchestration
//!
//! Drives one website crawl through the [`CrawlState`] machine:
//!
//! ```text
//! Pending -> Fetching(url) -> Extracting -> Done(Found)
//!                          |             \-> Pending (no email: queue links, next URL)
//!                          -> Skipping  -> Pending
//!                          -> Retrying  -> Fetching same URL | Skipping
//! Pending (plan exhausted) -> Done(Exhausted)
//! ```
//!
//! The controller stops at the first page that yields a valid email. Only a
//! lost network connection is retried; every other failure skips the URL,
//! and a DNS failure abandons the rest of the site.

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::planner::{CrawlPlanner, CrawlTarget};
use crate::crawler::probe::ConnectivityProbe;
use crate::crawler::retry::{ConnectionGuard, RetrySettings};
use crate::email::{EmailCandidate, EmailPolicy};
use crate::state::{Completion, CrawlState};
use crate::ScoutError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// What one website crawl produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// The URL the crawl started from
    pub website_url: Url,
    /// At least one fetch during the crawl succeeded
    pub website_reachable: bool,
    /// Best-ranked address from the first page that had any
    pub email: Option<EmailCandidate>,
    pub completion: Completion,
    /// Fetch calls made, retries included
    pub fetch_attempts: usize,
    /// Distinct URLs handed out by the planner
    pub pages_planned: usize,
}

/// Runs website crawls one entity at a time
///
/// The controller outlives individual crawls so the connectivity outage
/// streak carries over from one entity to the next.
pub struct CrawlController {
    fetcher: Arc<dyn PageFetcher>,
    planner: CrawlPlanner,
    policy: EmailPolicy,
    guard: ConnectionGuard,
    request_timeout: Duration,
}

impl CrawlController {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        probe: Arc<dyn ConnectivityProbe>,
        planner: CrawlPlanner,
        policy: EmailPolicy,
        retry: RetrySettings,
        request_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            planner,
            policy,
            guard: ConnectionGuard::new(probe, retry),
            request_timeout,
        }
    }

    /// Creates a controller from the crawler, email and network settings
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self::new(
            fetcher,
            probe,
            CrawlPlanner::new(
                config.crawler.contact_paths.clone(),
                config.crawler.max_pages,
            ),
            EmailPolicy::new(&config.email),
            RetrySettings::from_config(&config.network),
            Duration::from_secs(config.crawler.request_timeout_secs),
        )
    }

    /// Crawls `website` until an email is found or the plan runs out
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Crawl finished, with or without an email
    /// * `Err(ScoutError::ConnectivityLost)` - Too many URLs in a row were
    ///   given up on because the network never came back
    pub async fn crawl(&mut self, website: &Url) -> Result<CrawlReport, ScoutError> {
        let mut target = self.planner.plan(website);
        let mut state = CrawlState::Pending;
        let mut reachable = false;
        let mut email = None;
        let mut fetch_attempts = 0;

        let completion = loop {
            tracing::trace!("Crawl state: {}", state);

            state = match state {
                CrawlState::Pending => match target.next_url() {
                    Some(url) => CrawlState::Fetching { url },
                    None => CrawlState::Done(Completion::Exhausted),
                },

                CrawlState::Fetching { url } => {
                    tracing::debug!("Scanning: {}", url);
                    fetch_attempts += 1;
                    let outcome = self.fetcher.fetch(&url, self.request_timeout).await;
                    self.after_fetch(url, outcome, 0, &mut target)
                }

                CrawlState::Retrying { url, attempt } => {
                    if !self.guard.may_retry(attempt) {
                        self.guard.note_exhausted(&url)?;
                        CrawlState::Skipping {
                            url,
                            reason: "connectivity not restored".to_string(),
                        }
                    } else if self.guard.await_reconnect(attempt).await {
                        fetch_attempts += 1;
                        let outcome = self.fetcher.fetch(&url, self.request_timeout).await;
                        self.after_fetch(url, outcome, attempt, &mut target)
                    } else {
                        CrawlState::Retrying {
                            url,
                            attempt: attempt + 1,
                        }
                    }
                }

                CrawlState::Extracting { url, html } => {
                    reachable = true;
                    match self.policy.best(&html) {
                        Some(candidate) => {
                            tracing::info!("Email found on {}: {}", url, candidate.address);
                            email = Some(candidate);
                            CrawlState::Done(Completion::Found)
                        }
                        None => {
                            target.add_discovered(extract_links(&html, &url));
                            CrawlState::Pending
                        }
                    }
                }

                CrawlState::Skipping { url, reason } => {
                    tracing::info!("Skipping {} ({})", url, reason);
                    CrawlState::Pending
                }

                CrawlState::Done(completion) => break completion,
            };
        };

        Ok(CrawlReport {
            website_url: website.clone(),
            website_reachable: reachable,
            email,
            completion,
            fetch_attempts,
            pages_planned: target.yielded(),
        })
    }

    /// Number of URLs in a row given up on for lack of connectivity
    pub fn consecutive_outages(&self) -> u32 {
        self.guard.consecutive_outages()
    }

    /// Maps a fetch outcome to the next state
    ///
    /// `attempt` is the retry number that produced the outcome (0 for the
    /// first fetch of the URL).
    fn after_fetch(
        &mut self,
        url: Url,
        outcome: FetchOutcome,
        attempt: u32,
        target: &mut CrawlTarget,
    ) -> CrawlState {
        self.guard.note_outcome(&outcome);

        match outcome {
            FetchOutcome::Success {
                html, final_url, ..
            } => {
                // links on a redirected page are relative to where it landed
                let url = match final_url {
                    Some(landed) => {
                        target.mark_visited(&landed);
                        landed
                    }
                    None => url,
                };
                CrawlState::Extracting { url, html }
            }
            FetchOutcome::ConnectionLost => CrawlState::Retrying {
                url,
                attempt: attempt + 1,
            },
            other => {
                if other.abandons_site() {
                    target.abandon_site(&url);
                }
                CrawlState::Skipping {
                    url,
                    reason: other.to_string(),
                }
            }
        }
    }
}
