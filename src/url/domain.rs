use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scout::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.ORG/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the lowercase host with any leading `www.` removed
///
/// ```
/// use url::Url;
/// use sumi_scout::url::site_host;
///
/// let url = Url::parse("https://www.Example.org/").unwrap();
/// assert_eq!(site_host(&url), Some("example.org".to_string()));
/// ```
pub fn site_host(url: &Url) -> Option<String> {
    extract_domain(url).map(|host| match host.strip_prefix("www.") {
        Some(bare) if !bare.is_empty() => bare.to_string(),
        _ => host,
    })
}

/// Returns true if both URLs belong to the same site
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (site_host(a), site_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
