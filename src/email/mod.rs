//! Email extraction, validation and ranking
//!
//! Pure functions over page text; nothing here performs I/O. Malformed or
//! empty input simply yields no candidates.
//!
//! # Example
//!
//! ```
//! use sumi_scout::email::extract;
//!
//! let html = "<p>sales@example.org</p><p>info@example.org</p>";
//! let ranked = extract(html);
//! assert_eq!(ranked[0].address, "info@example.org");
//! assert_eq!(ranked[1].address, "sales@example.org");
//! ```

mod rules;

pub use rules::Rejection;

use crate::config::EmailConfig;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap();
}

/// A validated address found in page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCandidate {
    /// Full lowercased address
    pub address: String,
    pub local_part: String,
    /// Everything after the `@`, including the TLD
    pub domain: String,
    pub tld: String,
    /// Local part is one of the generic organizational mailboxes
    pub is_preferred_prefix: bool,
}

/// Validation and ranking settings
#[derive(Debug, Clone)]
pub struct EmailPolicy {
    preferred_prefixes: Vec<String>,
    max_local_length: usize,
}

impl EmailPolicy {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            preferred_prefixes: config
                .preferred_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            max_local_length: config.max_local_length,
        }
    }

    /// Extracts every valid address from `html`, most preferred first
    ///
    /// Addresses whose local part exactly matches a preferred prefix come
    /// before all others. Within each tier the first-seen order in the source
    /// text is kept. Duplicates (case-insensitive) are reported once.
    pub fn extract(&self, html: &str) -> Vec<EmailCandidate> {
        let mut seen = HashSet::new();
        let mut preferred = Vec::new();
        let mut others = Vec::new();

        for found in EMAIL_REGEX.find_iter(html) {
            let address = found.as_str().to_lowercase();
            if !seen.insert(address.clone()) {
                continue;
            }

            let parts = match rules::check(&address, self.max_local_length) {
                Ok(parts) => parts,
                Err(reason) => {
                    tracing::trace!("Discarding {} ({:?})", address, reason);
                    continue;
                }
            };

            let is_preferred_prefix = self.preferred_prefixes.iter().any(|p| p == parts.local);
            let candidate = EmailCandidate {
                local_part: parts.local.to_string(),
                domain: parts.domain.to_string(),
                tld: parts.tld.to_string(),
                is_preferred_prefix,
                address,
            };

            if is_preferred_prefix {
                preferred.push(candidate);
            } else {
                others.push(candidate);
            }
        }

        preferred.extend(others);
        preferred
    }

    /// Returns only the best address, if any
    pub fn best(&self, html: &str) -> Option<EmailCandidate> {
        self.extract(html).into_iter().next()
    }

    /// Checks one standalone address with the same rules used on page text
    pub fn validate(&self, address: &str) -> Result<(), Rejection> {
        let address = address.trim().to_lowercase();
        let whole = EMAIL_REGEX
            .find(&address)
            .is_some_and(|found| found.start() == 0 && found.end() == address.len());
        if !whole {
            return Err(Rejection::Shape);
        }
        rules::check(&address, self.max_local_length).map(|_| ())
    }
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self::new(&EmailConfig::default())
    }
}

/// Extracts and ranks addresses using the default policy
pub fn extract(html: &str) -> Vec<EmailCandidate> {
    EmailPolicy::default().extract(html)
}

/// Validates one address using the default policy
pub fn validate(address: &str) -> Result<(), Rejection> {
    EmailPolicy::default().validate(address)
}
