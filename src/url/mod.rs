//! URL handling module for Sumi-Sieve
//!
//! This module provides dedup-key normalization, authority extraction, and the
//! domain policy that decides which discovered links are followed.

mod domain;
mod matcher;
mod normalize;

use crate::config::CrawlerConfig;
use crate::{UrlError, UrlResult};
use serde::Deserialize;
use url::Url;

// Re-export main functions
pub use domain::extract_authority;
pub use matcher::{contains_domain, is_same_or_subdomain};
pub use normalize::normalize_url;

/// How a link host is compared against the base host when subdomains are allowed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubdomainMatch {
    /// Link authority contains the base authority anywhere
    #[default]
    Contains,
    /// Link authority equals the base or ends with `.` + base
    Suffix,
}

/// The subset of crawler settings the domain policy depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopePolicy {
    pub include_subdomains: bool,
    pub include_external: bool,
    pub subdomain_match: SubdomainMatch,
}

impl ScopePolicy {
    /// Extracts the policy from crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            include_subdomains: config.include_subdomains,
            include_external: config.include_external,
            subdomain_match: config.subdomain_match,
        }
    }
}

/// Returns true for `http` and `https` URLs
pub fn is_http_family(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Parses a URL and requires an HTTP-family scheme and a host
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_http_family(&url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Decides whether a discovered link may be crawled further
///
/// The decision, in order:
/// 1. Non-HTTP schemes are always rejected
/// 2. With `include_external`, every HTTP link is in scope
/// 3. With `include_subdomains`, the link authority must match the base
///    according to `subdomain_match`
/// 4. Otherwise the authorities must be equal
///
/// Remaining depth plays no part here.
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::{in_scope, ScopePolicy, SubdomainMatch};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let link = Url::parse("https://a.example.com/page").unwrap();
/// let policy = ScopePolicy {
///     include_subdomains: true,
///     include_external: false,
///     subdomain_match: SubdomainMatch::Contains,
/// };
/// assert!(in_scope(&link, &base, &policy));
/// ```
pub fn in_scope(link: &Url, base: &Url, policy: &ScopePolicy) -> bool {
    if !is_http_family(link) {
        return false;
    }

    if policy.include_external {
        return true;
    }

    let (Some(base_authority), Some(link_authority)) =
        (extract_authority(base), extract_authority(link))
    else {
        return false;
    };

    if policy.include_subdomains {
        match policy.subdomain_match {
            SubdomainMatch::Contains => contains_domain(&base_authority, &link_authority),
            SubdomainMatch::Suffix => is_same_or_subdomain(&base_authority, &link_authority),
        }
    } else {
        base_authority == link_authority
    }
}
