use crate::url::domain::site_host;
use crate::UrlError;
use url::Url;

/// Normalizes a URL into the form used for visited-set comparison
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP(S)
/// 3. Lowercase the host and remove a leading `www.`
/// 4. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Remove trailing slash (except for root /)
/// 5. Remove fragment (everything after #)
///
/// The query string is kept as-is: `contact.php?id=2` and `contact.php?id=3`
/// are different pages on many small sites. The scheme is kept too, since a
/// site that only answers on plain HTTP must still be fetched that way.
///
/// # Examples
///
/// ```
/// use sumi_scout::url::normalize_url;
///
/// let url = normalize_url("http://WWW.EXAMPLE.ORG/contact/#form").unwrap();
/// assert_eq!(url.as_str(), "http://example.org/contact");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Returns the visited-set key for an already parsed URL
///
/// Two URLs that only differ by fragment, trailing slash, host case or a
/// `www.` prefix produce the same key.
pub fn visit_key(url: &Url) -> Result<String, UrlError> {
    normalize_parsed(url.clone()).map(String::from)
}

fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = site_host(&url).ok_or(UrlError::MissingDomain)?;
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}
