use crate::config::types::{CrawlConfig, CrawlerConfig, DownloadConfig, PaginationConfig};
use crate::ConfigError;
use url::Url;

const MAX_WORKERS: usize = 256;
const MAX_DEPTH: u32 = 32;

/// Highest page number manual pagination may generate
pub const MAX_PAGE_NUMBER: i64 = 100_000;

/// Validates the entire configuration
///
/// A manual pagination pattern missing its placeholder passes validation; the
/// crawl warns at start and skips the manual seeds.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_download_config(&config.download)?;
    if let Some(pagination) = &config.pagination {
        validate_pagination_config(pagination)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let start_url = config.start_url.trim();
    if start_url.is_empty() {
        return Err(ConfigError::Validation(
            "start_url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' must use http or https",
            start_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' has no host",
            start_url
        )));
    }

    if config.max_depth > MAX_DEPTH {
        return Err(ConfigError::Validation(format!(
            "max_depth must be <= {}, got {}",
            MAX_DEPTH, config.max_depth
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.page_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates download configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if config.concurrency < 1 || config.concurrency > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "download concurrency must be between 1 and {}, got {}",
            MAX_WORKERS, config.concurrency
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "download timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the manual pagination range
///
/// Page numbers must lie in `1..=MAX_PAGE_NUMBER`. A reversed range is legal
/// and seeds nothing.
fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if config.start < 1 || config.start > MAX_PAGE_NUMBER {
        return Err(ConfigError::Validation(format!(
            "pagination start must be between 1 and {}, got {}",
            MAX_PAGE_NUMBER, config.start
        )));
    }

    if config.end > MAX_PAGE_NUMBER {
        return Err(ConfigError::Validation(format!(
            "pagination end must be <= {}, got {}",
            MAX_PAGE_NUMBER, config.end
        )));
    }

    Ok(())
}
