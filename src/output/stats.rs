//! Crawl report and its console rendering

use crate::download::DownloadReport;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Summary of one finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// HTML pages fetched and parsed
    pub pages_fetched: usize,

    /// Pages whose fetch failed
    pub page_errors: usize,

    /// Pages skipped because they were not HTML
    pub non_html: usize,

    /// Every normalized URL enqueued during the crawl
    pub visited: BTreeSet<String>,

    /// Every normalized image URL discovered
    pub images: BTreeSet<String>,

    pub download: DownloadReport,

    /// True if a stop was requested before the run finished
    pub cancelled: bool,
}

impl CrawlReport {
    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Status label used in reports
    pub fn status(&self) -> &'static str {
        if self.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    }
}

/// Prints a crawl report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Status: {}", report.status());
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {}s", report.duration_seconds());
    println!();

    println!("Pages:");
    println!("  URLs visited: {}", report.visited.len());
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Non-HTML: {}", report.non_html);
    println!("  Errors: {}", report.page_errors);
    println!();

    let dl = &report.download;
    println!("Images:");
    println!("  Discovered: {}", report.images.len());
    println!("  Downloaded: {}", dl.downloaded.len());
    println!("  Failed: {}", dl.failed);
    if dl.skipped > 0 {
        println!("  Skipped (stopped): {}", dl.skipped);
    }

    let success_rate = if dl.total > 0 {
        (dl.downloaded.len() as f64 / dl.total as f64) * 100.0
    } else {
        0.0
    };
    println!();
    println!(
        "Download Success Rate: {:.1}% ({} / {} images)",
        success_rate,
        dl.downloaded.len(),
        dl.total
    );
}
