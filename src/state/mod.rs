//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The controller state machine (idle, crawling, downloading, stopping, done)
//! - `ImageSet`: The deduplicated set of image URLs found during a crawl

mod crawl_phase;
mod image_set;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use image_set::ImageSet;
