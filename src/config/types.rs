use crate::url::SubdomainMatch;
use serde::Deserialize;

/// Browser-like user agent sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Placeholder substituted with the page number in manual pagination patterns
pub const PAGE_PLACEHOLDER: &str = "{n}";

/// Immutable snapshot of everything a crawl needs
///
/// A crawl holds this behind an `Arc` for its whole lifetime, so edits made to
/// a config after `start()` never reach the running crawl.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub pagination: Option<PaginationConfig>,
    pub download: DownloadConfig,
}

/// Crawl phase behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL the crawl starts from; also the base for the domain policy
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Number of link hops followed from the seed
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent page workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(rename = "include-subdomains", default = "default_true")]
    pub include_subdomains: bool,

    #[serde(rename = "include-external", default)]
    pub include_external: bool,

    /// How subdomain membership is decided when `include-subdomains` is set
    #[serde(rename = "subdomain-match", default)]
    pub subdomain_match: SubdomainMatch,

    /// Follow `?page=N` / `&page=N` links found while crawling
    #[serde(rename = "auto-pagination", default)]
    pub auto_pagination: bool,

    /// Per-page request timeout (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Manual numeric pagination
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// URL template containing the `{n}` placeholder
    pub pattern: String,

    /// First page number (inclusive)
    pub start: i64,

    /// Last page number (inclusive)
    pub end: i64,
}

/// Download phase behavior
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Directory images are written to (created if missing)
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Maximum concurrent image fetches
    #[serde(default = "default_download_concurrency")]
    pub concurrency: usize,

    /// Per-image request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_download_timeout")]
    pub timeout_secs: u64,

    /// Write `manifest.md` mapping file names to source URLs
    #[serde(default)]
    pub manifest: bool,
}

impl CrawlConfig {
    /// Builds a config with default settings for the given seed and output directory
    pub fn new(start_url: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                start_url: start_url.into(),
                max_depth: default_max_depth(),
                workers: default_workers(),
                include_subdomains: true,
                include_external: false,
                subdomain_match: SubdomainMatch::Contains,
                auto_pagination: false,
                page_timeout_secs: default_page_timeout(),
                user_agent: default_user_agent(),
            },
            pagination: None,
            download: DownloadConfig {
                output_dir: output_dir.into(),
                concurrency: default_download_concurrency(),
                timeout_secs: default_download_timeout(),
                manifest: false,
            },
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_workers() -> usize {
    32
}

fn default_true() -> bool {
    true
}

fn default_page_timeout() -> u64 {
    8
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_download_concurrency() -> usize {
    64
}

fn default_download_timeout() -> u64 {
    10
}
