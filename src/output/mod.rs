//! Output module for crawl events, reports and manifests
//!
//! This module handles:
//! - Delivering status lines and progress to an event sink
//! - Summarizing a finished crawl
//! - Writing the markdown manifest of downloaded files

mod events;
mod markdown;
pub mod stats;

pub use events::{ChannelSink, CrawlEvent, EventSink, TracingSink};
pub use markdown::{format_manifest, write_manifest, MANIFEST_FILE};
pub use stats::{print_report, CrawlReport};
