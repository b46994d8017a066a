use crate::config::types::{
    Config, CrawlerConfig, EmailConfig, InputConfig, NetworkConfig, OutputConfig, RegistryConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_registry_config(&config.registry)?;
    validate_crawler_config(&config.crawler)?;
    validate_email_config(&config.email)?;
    validate_network_config(&config.network)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "input path cannot be empty".to_string(),
        ));
    }

    if config.name_column.trim().is_empty() {
        return Err(ConfigError::Validation(
            "name-column cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_registry_config(config: &RegistryConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.search_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "search-url '{}' must use HTTP or HTTPS",
            config.search_url
        )));
    }

    Selector::parse(&config.website_selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("'{}': {:?}", config.website_selector, e))
    })?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > 50 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 50, got {}",
            config.max_pages
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 120, got {}",
            config.request_timeout_secs
        )));
    }

    for path in &config.contact_paths {
        let trimmed = path.trim_start_matches('/');
        if trimmed.is_empty() || trimmed.contains("://") {
            return Err(ConfigError::Validation(format!(
                "contact path '{}' must be a non-empty relative path",
                path
            )));
        }
    }

    Ok(())
}

fn validate_email_config(config: &EmailConfig) -> Result<(), ConfigError> {
    if config.max_local_length < 1 || config.max_local_length > 64 {
        return Err(ConfigError::Validation(format!(
            "max-local-length must be between 1 and 64, got {}",
            config.max_local_length
        )));
    }

    if let Some(prefix) = config
        .preferred_prefixes
        .iter()
        .find(|p| p.is_empty() || p.contains('@'))
    {
        return Err(ConfigError::Validation(format!(
            "preferred prefix '{}' must be a bare local part",
            prefix
        )));
    }

    Ok(())
}

fn validate_network_config(config: &NetworkConfig) -> Result<(), ConfigError> {
    if config.max_retry_delay_ms < config.retry_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max-retry-delay-ms ({}) must be >= retry-delay-ms ({})",
            config.max_retry_delay_ms, config.retry_delay_ms
        )));
    }

    if config.max_consecutive_outages < 1 {
        return Err(ConfigError::Validation(
            "max-consecutive-outages must be >= 1".to_string(),
        ));
    }

    if config.probe_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "probe-timeout-ms must be >= 1".to_string(),
        ));
    }

    config.probe_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "probe-address '{}' is not a socket address: {}",
            config.probe_address, e
        ))
    })?;

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    crate::email::validate(&config.contact_email).map_err(|reason| {
        ConfigError::Validation(format!(
            "Invalid contact_email '{}': {:?}",
            config.contact_email, reason
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_email_checked_like_page_addresses() {
        let mut config = UserAgentConfig::default();
        assert!(validate_user_agent_config(&config).is_ok());

        for bad in ["", "invalid", "@example.com", "user@", "user@domain", "logo@2x.png"] {
            config.contact_email = bad.to_string();
            assert!(
                matches!(
                    validate_user_agent_config(&config),
                    Err(ConfigError::Validation(_))
                ),
                "accepted {:?}",
                bad
            );
        }

        config.contact_email = "admin@sub.example.com".to_string();
        assert!(validate_user_agent_config(&config).is_ok());
    }

    #[test]
    fn test_crawler_ceiling_bounds() {
        let mut config = CrawlerConfig::default();
        assert!(validate_crawler_config(&config).is_ok());

        config.max_pages = 0;
        assert!(validate_crawler_config(&config).is_err());

        config.max_pages = 51;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_contact_paths_must_be_relative() {
        let mut config = CrawlerConfig::default();
        config.contact_paths = vec!["https://other.org/contact".to_string()];
        assert!(validate_crawler_config(&config).is_err());

        config.contact_paths = vec!["/".to_string()];
        assert!(validate_crawler_config(&config).is_err());

        config.contact_paths = vec!["/contact-us".to_string()];
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_network_backoff_order() {
        let mut config = NetworkConfig::default();
        assert!(validate_network_config(&config).is_ok());

        config.max_retry_delay_ms = config.retry_delay_ms - 1;
        assert!(validate_network_config(&config).is_err());
    }

    #[test]
    fn test_probe_address_must_be_socket_address() {
        let mut config = NetworkConfig::default();
        config.probe_address = "dns.google".to_string();
        assert!(validate_network_config(&config).is_err());
    }

    #[test]
    fn test_registry_selector_is_checked() {
        let mut config = RegistryConfig::default();
        assert!(validate_registry_config(&config).is_ok());

        config.website_selector = "a[[".to_string();
        assert!(matches!(
            validate_registry_config(&config),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_preferred_prefix_without_at_sign() {
        let mut config = EmailConfig::default();
        config.preferred_prefixes.push("info@".to_string());
        assert!(validate_email_config(&config).is_err());
    }
}
