//! HTTP fetcher implementation
//!
//! This module performs exactly one bounded fetch per call and turns every
//! possible result into a [`FetchOutcome`]. Nothing here retries; retrying is
//! the controller's decision, and it only ever retries `ConnectionLost`.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::probe::ConnectivityProbe;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Classified result of fetching one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page retrieved
    Success {
        /// Page body
        html: String,
        /// HTTP status code of the final response
        status: u16,
        /// Where the body actually came from, when redirects moved it away
        /// from the requested URL; relative links resolve against this
        final_url: Option<Url>,
    },

    /// Server answered with status >= 400
    HttpError { status: u16 },

    /// Host did not resolve or refused the connection
    DnsFailure,

    /// Request exceeded its time budget
    Timeout,

    /// The machine itself has no network; the only retryable outcome
    ConnectionLost,

    /// Anything else (TLS failures, redirect loops, binary content, ...)
    OtherError { detail: String },
}

impl FetchOutcome {
    /// Returns true if the page was retrieved
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true if the same URL may be attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionLost)
    }

    /// Returns true if no other page of the same site is worth trying
    pub fn abandons_site(&self) -> bool {
        matches!(self, Self::DnsFailure)
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status, .. } => write!(f, "HTTP {}", status),
            Self::HttpError { status } => write!(f, "HTTP {}", status),
            Self::DnsFailure => write!(f, "DNS failure or connection refused"),
            Self::Timeout => write!(f, "request timeout"),
            Self::ConnectionLost => write!(f, "network connection lost"),
            Self::OtherError { detail } => write!(f, "{}", detail),
        }
    }
}

/// Performs a single bounded fetch
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_scout::config::{CrawlerConfig, UserAgentConfig};
/// use sumi_scout::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.request_timeout_secs.min(10)))
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(crawler.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by `reqwest`
///
/// Connect-phase failures are ambiguous: an unresolvable host looks the same
/// as a machine that lost its uplink. The probe settles it.
pub struct HttpFetcher {
    client: Client,
    probe: Arc<dyn ConnectivityProbe>,
}

impl HttpFetcher {
    pub fn new(client: Client, probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self { client, probe }
    }

    async fn classify_error(&self, error: reqwest::Error) -> FetchOutcome {
        if error.is_timeout() {
            return FetchOutcome::Timeout;
        }

        if error.is_connect() {
            if matches!(
                io_error_kind(&error),
                Some(io::ErrorKind::NetworkUnreachable | io::ErrorKind::NetworkDown)
            ) {
                return FetchOutcome::ConnectionLost;
            }

            return if self.probe.is_online().await {
                FetchOutcome::DnsFailure
            } else {
                FetchOutcome::ConnectionLost
            };
        }

        if error.is_redirect() {
            return FetchOutcome::OtherError {
                detail: "too many redirects".to_string(),
            };
        }

        FetchOutcome::OtherError {
            detail: first_line(&error.to_string()),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchOutcome {
        let response = match self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return self.classify_error(e).await,
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            return FetchOutcome::HttpError {
                status: status.as_u16(),
            };
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !is_textual(&content_type) {
            return FetchOutcome::OtherError {
                detail: format!("non-text content ({})", content_type),
            };
        }

        let final_url = Some(response.url().clone()).filter(|landed| landed != url);
        if let Some(landed) = &final_url {
            tracing::debug!("{} redirected to {}", url, landed);
        }

        match response.text().await {
            Ok(html) => FetchOutcome::Success {
                html,
                status: status.as_u16(),
                final_url,
            },
            Err(e) => self.classify_error(e).await,
        }
    }
}

/// Missing Content-Type is treated as text; many small sites omit it
fn is_textual(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.contains("html")
        || content_type.contains("xml")
}

/// Finds the first io::Error in an error's source chain
fn io_error_kind(error: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut source = Some(error);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = err.source();
    }
    None
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}
