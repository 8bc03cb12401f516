//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier with exhaustion-based termination
//! - HTTP fetching and error classification
//! - HTML parsing for images, links and pagination
//! - Manual pagination seeding
//! - The crawl-phase worker pool

mod coordinator;
mod fetcher;
mod frontier;
mod pagination;
mod parser;
mod processor;

pub use coordinator::run_workers;
pub use fetcher::{
    build_http_client, content_type, fetch_page, send_get, FetchError, PageFetch,
};
pub use frontier::{CrawlTask, Frontier};
pub use pagination::{seed_manual, MANUAL_PAGE_DEPTH};
pub use parser::{is_pagination_href, parse_html, ParsedPage};
pub use processor::{process_page, CrawlContext, PageCounters, PageOutcome};
