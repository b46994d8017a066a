//! Connectivity-loss retry policy
//!
//! Only [`FetchOutcome::ConnectionLost`] is ever retried. Two caps apply:
//!
//! - per URL: `max_connection_retries` waits (exponential backoff, each
//!   followed by a reachability probe) before the URL is skipped;
//! - per run: `max_consecutive_outages` URLs in a row skipped that way abort
//!   the whole run with [`ScoutError::ConnectivityLost`]. Any other outcome
//!   resets the streak.

use crate::config::NetworkConfig;
use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::crawler::probe::ConnectivityProbe;
use crate::ScoutError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Retry limits and delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub retry_delay: Duration,
    pub max_retry_delay: Duration,
    pub max_connection_retries: u32,
    pub max_consecutive_outages: u32,
}

impl RetrySettings {
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            max_retry_delay: Duration::from_millis(config.max_retry_delay_ms),
            max_connection_retries: config.max_connection_retries,
            max_consecutive_outages: config.max_consecutive_outages,
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling up to the ceiling
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_delay
            .saturating_mul(factor)
            .min(self.max_retry_delay)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self::from_config(&NetworkConfig::default())
    }
}

/// Tracks the outage streak and waits for connectivity to come back
pub struct ConnectionGuard {
    probe: Arc<dyn ConnectivityProbe>,
    settings: RetrySettings,
    consecutive_outages: u32,
}

impl ConnectionGuard {
    pub fn new(probe: Arc<dyn ConnectivityProbe>, settings: RetrySettings) -> Self {
        Self {
            probe,
            settings,
            consecutive_outages: 0,
        }
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    /// Number of URLs in a row given up on for lack of connectivity
    pub fn consecutive_outages(&self) -> u32 {
        self.consecutive_outages
    }

    /// Returns true while retry number `attempt` is still within the per-URL cap
    pub fn may_retry(&self, attempt: u32) -> bool {
        attempt <= self.settings.max_connection_retries
    }

    /// Sleeps for the attempt's backoff, then probes connectivity
    pub async fn await_reconnect(&self, attempt: u32) -> bool {
        let delay = self.settings.backoff(attempt);
        tracing::warn!(
            "Network connection lost, retry {}/{} in {:.1}s",
            attempt,
            self.settings.max_connection_retries,
            delay.as_secs_f64()
        );
        tokio::time::sleep(delay).await;

        let online = self.probe.is_online().await;
        if online {
            tracing::info!("Network connectivity restored");
        }
        online
    }

    /// Records a fetch outcome; anything but a lost connection ends the streak
    pub fn note_outcome(&mut self, outcome: &FetchOutcome) {
        if !outcome.is_retryable() {
            self.consecutive_outages = 0;
        }
    }

    /// Records a URL skipped after exhausting its retries
    ///
    /// Fails once the run-level cap is reached.
    pub fn note_exhausted(&mut self, url: &Url) -> Result<(), ScoutError> {
        self.consecutive_outages += 1;
        tracing::warn!(
            "Giving up on {} after {} connectivity retries ({} in a row)",
            url,
            self.settings.max_connection_retries,
            self.consecutive_outages
        );

        if self.consecutive_outages >= self.settings.max_consecutive_outages {
            return Err(ScoutError::ConnectivityLost {
                consecutive: self.consecutive_outages,
            });
        }
        Ok(())
    }

    /// Fetches a URL, retrying lost connections under the same caps
    ///
    /// Callers outside the crawl state machine (the registry lookup) use this.
    /// An exhausted URL comes back as `ConnectionLost`.
    pub async fn fetch(
        &mut self,
        fetcher: &dyn PageFetcher,
        url: &Url,
        timeout: Duration,
    ) -> Result<FetchOutcome, ScoutError> {
        let mut outcome = fetcher.fetch(url, timeout).await;
        let mut attempt = 1;

        while outcome.is_retryable() {
            if !self.may_retry(attempt) {
                self.note_exhausted(url)?;
                return Ok(outcome);
            }
            if self.await_reconnect(attempt).await {
                outcome = fetcher.fetch(url, timeout).await;
            }
            attempt += 1;
        }

        self.note_outcome(&outcome);
        Ok(outcome)
    }
}
