//! Manual pagination seeding
//!
//! Expands a URL pattern containing `{n}` over an inclusive numeric range into
//! crawl tasks of depth 1.

use crate::config::{PaginationConfig, PAGE_PLACEHOLDER};
use crate::crawler::CrawlTask;
use crate::ConfigError;

/// Depth given to every manually generated page
pub const MANUAL_PAGE_DEPTH: i32 = 1;

/// Generates one task per page number in `start..=end`
///
/// `start > end` yields an empty list rather than an error.
///
/// # Errors
///
/// Returns `ConfigError::InvalidPattern` if the pattern lacks `{n}`.
///
/// # Example
///
/// ```
/// use sumi_sieve::config::PaginationConfig;
/// use sumi_sieve::crawler::seed_manual;
///
/// let config = PaginationConfig {
///     pattern: "https://example.com/gallery?page={n}".to_string(),
///     start: 1,
///     end: 3,
/// };
/// let tasks = seed_manual(&config).unwrap();
/// assert_eq!(tasks.len(), 3);
/// assert_eq!(tasks[2].url, "https://example.com/gallery?page=3");
/// ```
pub fn seed_manual(config: &PaginationConfig) -> Result<Vec<CrawlTask>, ConfigError> {
    if !config.pattern.contains(PAGE_PLACEHOLDER) {
        return Err(ConfigError::InvalidPattern(format!(
            "missing {} in '{}'",
            PAGE_PLACEHOLDER, config.pattern
        )));
    }

    Ok((config.start..=config.end)
        .map(|n| {
            CrawlTask::new(
                config.pattern.replace(PAGE_PLACEHOLDER, &n.to_string()),
                MANUAL_PAGE_DEPTH,
            )
        })
        .collect())
}
