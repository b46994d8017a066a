//! Validation rules applied to every raw address match
//!
//! An address failing any rule is discarded outright, never merely ranked
//! lower. Most rejects are asset file names that happen to look like
//! addresses in markup (`logo@2x.png`, `sprite@320x240.webp`).

use lazy_static::lazy_static;
use regex::Regex;

/// Extensions that show up as a "TLD" when an asset URL is mistaken for an address
const FILE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tif", "tiff", "ico", "css", "js", "pdf",
    "mp3", "mp4", "woff", "woff2", "ttf", "eot",
];

/// Shortest accepted top-level domain
pub(crate) const MIN_TLD_LENGTH: usize = 2;

lazy_static! {
    // Image dimension tokens such as 320x240
    static ref DIMENSION_REGEX: Regex = Regex::new(r"\d+x\d+").unwrap();
}

/// Why an address was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Shape,
    LocalTooLong,
    BadTld,
    FileExtension,
    NoAlphabeticDomain,
    Dimensions,
}

/// An address split into its parts, already lowercased
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Parts<'a> {
    pub local: &'a str,
    pub domain: &'a str,
    pub tld: &'a str,
}

/// Checks a lowercased address against every rule
pub(crate) fn check(address: &str, max_local_length: usize) -> Result<Parts<'_>, Rejection> {
    let (local, domain) = address.split_once('@').ok_or(Rejection::Shape)?;

    if local.is_empty() || domain.contains('@') {
        return Err(Rejection::Shape);
    }

    if local.chars().count() > max_local_length {
        return Err(Rejection::LocalTooLong);
    }

    let (host, tld) = domain.rsplit_once('.').ok_or(Rejection::Shape)?;

    if host.split('.').any(str::is_empty) {
        return Err(Rejection::Shape);
    }

    if FILE_EXTENSIONS.contains(&tld) {
        return Err(Rejection::FileExtension);
    }

    if tld.len() < MIN_TLD_LENGTH || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Rejection::BadTld);
    }

    if !host.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(Rejection::NoAlphabeticDomain);
    }

    if DIMENSION_REGEX.is_match(host) {
        return Err(Rejection::Dimensions);
    }

    Ok(Parts { local, domain, tld })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_address_passes() {
        let parts = check("info@example.org", 64).unwrap();
        assert_eq!(parts.local, "info");
        assert_eq!(parts.domain, "example.org");
        assert_eq!(parts.tld, "org");
    }

    #[test]
    fn test_short_tld_rejected() {
        assert_eq!(check("a@b.c", 64), Err(Rejection::BadTld));
    }

    #[test]
    fn test_numeric_tld_rejected() {
        assert_eq!(check("a@example.12", 64), Err(Rejection::BadTld));
    }

    #[test]
    fn test_local_part_limit() {
        let local = "a".repeat(64);
        assert!(check(&format!("{}@example.org", local), 64).is_ok());

        let local = "a".repeat(65);
        assert_eq!(
            check(&format!("{}@example.org", local), 64),
            Err(Rejection::LocalTooLong)
        );
    }

    #[test]
    fn test_asset_names_rejected() {
        assert_eq!(check("logo@2x.png", 64), Err(Rejection::FileExtension));
        assert_eq!(check("bundle@main.js", 64), Err(Rejection::FileExtension));
        assert_eq!(check("report@annual.pdf", 64), Err(Rejection::FileExtension));
    }

    #[test]
    fn test_numeric_domain_rejected() {
        assert_eq!(
            check("photo@320.240.net", 64),
            Err(Rejection::NoAlphabeticDomain)
        );
    }

    #[test]
    fn test_dimension_domain_rejected() {
        assert_eq!(
            check("photo@320x240.cdn.com", 64),
            Err(Rejection::Dimensions)
        );
    }

    #[test]
    fn test_empty_label_rejected() {
        assert_eq!(check("info@.example.org", 64), Err(Rejection::Shape));
        assert_eq!(check("info@example..org", 64), Err(Rejection::Shape));
    }
}
