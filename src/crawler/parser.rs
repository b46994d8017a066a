//! HTML parser for discovering follow-up links
//!
//! Only anchors are followed. Pages that failed to yield an email feed their
//! links back into the crawl plan; everything off-site is dropped there.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all followable links from an HTML page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to HTTP(S)
///
/// Links are returned in document order; duplicates are left to the planner.
///
/// # Example
///
/// ```
/// use sumi_scout::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/contact">Contact</a>"#;
/// let base = Url::parse("https://example.org/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links[0].as_str(), "https://example.org/contact");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Returns the `href` of the first element matching `selector`
///
/// The element is expected to be an anchor; hosts written without a scheme
/// (`www.example.org`) are read as `http://`.
pub fn select_first_href(html: &str, base_url: &Url, selector: &Selector) -> Option<Url> {
    let document = Html::parse_document(html);
    let href = document
        .select(selector)
        .find_map(|element| element.value().attr("href"))?
        .trim();

    if href.is_empty() {
        return None;
    }

    let has_scheme = href.starts_with("http://") || href.starts_with("https://");
    let looks_like_host = !has_scheme
        && !href.starts_with('/')
        && href.split('/').next().is_some_and(|h| h.contains('.'));

    if looks_like_host {
        return Url::parse(&format!("http://{}", href)).ok();
    }

    resolve_link(href, base_url)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url)
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" =>
        {
            Some(absolute_url)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.org/page").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        extract_links(html, &base_url())
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let found = links(r#"<html><body><a href="https://other.org/page">Link</a></body></html>"#);
        assert_eq!(found, vec!["https://other.org/page"]);
    }

    #[test]
    fn test_extract_relative_links() {
        let found = links(r#"<a href="/contact">A</a><a href="about">B</a>"#);
        assert_eq!(
            found,
            vec!["https://example.org/contact", "https://example.org/about"]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="MAILTO:info@example.org">Email</a>
            <a href="tel:+441234567890">Call</a>
            <a href="data:text/html,<h1>x</h1>">Data</a>
            <a href="ftp://example.org/file">FTP</a>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_download_and_fragment_links() {
        let html = r##"<a href="/annual-report.pdf" download>Report</a><a href="#top">Top</a>"##;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_document_order_kept() {
        let html = r#"
            <nav><a href="/team">Team</a></nav>
            <footer><a href="/privacy">Privacy</a><a href="/contact">Contact</a></footer>
        "#;
        assert_eq!(
            links(html),
            vec![
                "https://example.org/team",
                "https://example.org/privacy",
                "https://example.org/contact"
            ]
        );
    }

    #[test]
    fn test_select_first_href() {
        let html = r#"
            <div class="charitydetailrow">
              <span class="col-7 col-lg-9 text"><a target="_blank" href="https://www.example.org">site</a></span>
              <span class="col-7 col-lg-9 text"><a target="_blank" href="https://second.org">other</a></span>
            </div>
        "#;
        let selector = Selector::parse("span.col-7.col-lg-9.text a[target='_blank']").unwrap();
        let found = select_first_href(html, &base_url(), &selector).unwrap();
        assert_eq!(found.as_str(), "https://www.example.org/");
    }

    #[test]
    fn test_select_first_href_without_scheme() {
        let html = r#"<a class="site" href="www.example.org/home">site</a>"#;
        let selector = Selector::parse("a.site").unwrap();
        let found = select_first_href(html, &base_url(), &selector).unwrap();
        assert_eq!(found.as_str(), "http://www.example.org/home");
    }

    #[test]
    fn test_select_first_href_missing() {
        let selector = Selector::parse("a.site").unwrap();
        assert!(select_first_href("<p>No results</p>", &base_url(), &selector).is_none());

        let html = r#"<a class="site" href="  ">empty</a>"#;
        assert!(select_first_href(html, &base_url(), &selector).is_none());
    }
}
