/// Checks whether `candidate` is `base` itself or one of its subdomains
///
/// Unlike a plain substring test, the match must sit on a label boundary:
/// `blog.example.com` is under `example.com`, `notexample.com` is not.
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::is_same_or_subdomain;
///
/// assert!(is_same_or_subdomain("example.com", "example.com"));
/// assert!(is_same_or_subdomain("example.com", "api.v2.example.com"));
/// assert!(!is_same_or_subdomain("example.com", "notexample.com"));
/// assert!(!is_same_or_subdomain("example.com", "example.com.evil.org"));
/// ```
pub fn is_same_or_subdomain(base: &str, candidate: &str) -> bool {
    if base.is_empty() {
        return false;
    }
    candidate == base || candidate.ends_with(&format!(".{}", base))
}

/// Loose membership: `candidate` contains `base` anywhere
pub fn contains_domain(base: &str, candidate: &str) -> bool {
    candidate.contains(base)
}
