use serde::Deserialize;

/// Main configuration structure for Sumi-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Input dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the CSV file holding organization names
    pub path: String,

    /// Header of the column holding the names
    #[serde(rename = "name-column", default = "default_name_column")]
    pub name_column: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the append-only CSV result store
    #[serde(rename = "results-path")]
    pub results_path: String,
}

/// Registry search settings
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Search page URL; the URL-encoded name is appended to it
    #[serde(rename = "search-url", default = "default_search_url")]
    pub search_url: String,

    /// CSS selector of the anchor holding the organization's website
    #[serde(rename = "website-selector", default = "default_website_selector")]
    pub website_selector: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            website_selector: default_website_selector(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Hard ceiling on URLs visited per entity
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Timeout for a single page fetch (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Well-known relative paths tried after the homepage, in order
    #[serde(rename = "contact-paths", default = "default_contact_paths")]
    pub contact_paths: Vec<String>,

    /// Accept self-signed and expired certificates
    #[serde(rename = "accept-invalid-certs", default = "default_true")]
    pub accept_invalid_certs: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout(),
            contact_paths: default_contact_paths(),
            accept_invalid_certs: true,
        }
    }
}

/// Email validation and ranking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Local parts ranked ahead of every other address
    #[serde(rename = "preferred-prefixes", default = "default_preferred_prefixes")]
    pub preferred_prefixes: Vec<String>,

    /// Longest accepted local part
    #[serde(rename = "max-local-length", default = "default_max_local_length")]
    pub max_local_length: usize,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            preferred_prefixes: default_preferred_prefixes(),
            max_local_length: default_max_local_length(),
        }
    }
}

/// Connectivity-loss retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Delay before the first retry (milliseconds); doubles per attempt
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Upper bound on the retry delay (milliseconds)
    #[serde(rename = "max-retry-delay-ms", default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,

    /// Retries of the same URL before it is skipped
    #[serde(rename = "max-connection-retries", default = "default_max_retries")]
    pub max_connection_retries: u32,

    /// URLs in a row skipped for connectivity before the run aborts
    #[serde(rename = "max-consecutive-outages", default = "default_max_outages")]
    pub max_consecutive_outages: u32,

    /// Address the reachability probe connects to
    #[serde(rename = "probe-address", default = "default_probe_address")]
    pub probe_address: String,

    /// Reachability probe timeout (milliseconds)
    #[serde(rename = "probe-timeout-ms", default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay(),
            max_retry_delay_ms: default_max_retry_delay(),
            max_connection_retries: default_max_retries(),
            max_consecutive_outages: default_max_outages(),
            probe_address: default_probe_address(),
            probe_timeout_ms: default_probe_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiScout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.org/about".to_string(),
            contact_email: "admin@example.org".to_string(),
        }
    }
}

fn default_name_column() -> String {
    "Charity Name".to_string()
}

fn default_search_url() -> String {
    "https://www.oscr.org.uk/search/register-search?Keyword=".to_string()
}

fn default_website_selector() -> String {
    "span.col-7.col-lg-9.text a[target='_blank']".to_string()
}

fn default_max_pages() -> usize {
    10
}

fn default_request_timeout() -> u64 {
    15
}

fn default_contact_paths() -> Vec<String> {
    [
        "contact",
        "contact.php",
        "contact-us",
        "contact-us.php",
        "user_contact.php",
        "about",
        "about.php",
        "team",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_preferred_prefixes() -> Vec<String> {
    [
        "info",
        "contact",
        "enquiries",
        "admin",
        "hello",
        "office",
        "support",
        "team",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_max_local_length() -> usize {
    64
}

fn default_retry_delay() -> u64 {
    5_000
}

fn default_max_retry_delay() -> u64 {
    60_000
}

fn default_max_retries() -> u32 {
    5
}

fn default_max_outages() -> u32 {
    3
}

fn default_probe_address() -> String {
    "8.8.8.8:53".to_string()
}

fn default_probe_timeout() -> u64 {
    3_000
}
