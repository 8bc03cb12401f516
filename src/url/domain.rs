use url::Url;

/// Extracts the authority (host plus explicit port) from a URL
///
/// The port is part of the site identity, so `127.0.0.1:8080` and
/// `127.0.0.1:9090` are different sites. Default ports are omitted by the `url`
/// crate and therefore never appear here.
///
/// # Returns
///
/// * `Some(String)` - `host` or `host:port`
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sieve::url::extract_authority;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
