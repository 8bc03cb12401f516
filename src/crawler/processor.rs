//! Page processor: fetch one page, harvest its images, enqueue its links

use crate::crawler::fetcher::{fetch_page, PageFetch};
use crate::crawler::parser::parse_html;
use crate::crawler::{CrawlTask, Frontier};
use crate::output::EventSink;
use crate::state::ImageSet;
use crate::url::{in_scope, ScopePolicy};
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Per-crawl page counters, updated by workers
#[derive(Debug, Default)]
pub struct PageCounters {
    pub fetched: AtomicUsize,
    pub errors: AtomicUsize,
    pub non_html: AtomicUsize,
}

impl PageCounters {
    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn non_html(&self) -> usize {
        self.non_html.load(Ordering::Relaxed)
    }
}

/// Everything a worker needs to process pages, shared across the pool
pub struct CrawlContext {
    pub frontier: Frontier,
    pub images: ImageSet,
    pub counters: PageCounters,
    pub client: Client,
    /// The start URL; its authority anchors the domain policy
    pub base_url: Url,
    pub policy: ScopePolicy,
    pub auto_pagination: bool,
    pub page_timeout: Duration,
    pub cancel: CancellationToken,
    pub sink: Arc<dyn EventSink>,
}

/// What happened to a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Cancellation was observed before fetching
    Skipped,
    /// The fetch failed; an `[ERR]` line was emitted
    Failed,
    /// The response was not HTML
    NotHtml,
    /// The page was parsed
    Processed {
        /// Images on this page that were new to the image set
        new_images: usize,
        /// Links (including pagination) that were new to the frontier
        new_links: usize,
    },
}

/// Processes one crawl task
///
/// # Steps
///
/// 1. Return immediately if cancellation was requested
/// 2. GET the page with the page timeout; failures are logged and counted
/// 3. Ignore non-HTML responses
/// 4. Insert every image URL into the image set
/// 5. With auto-pagination, push every pagination link with depth - 1,
///    regardless of the domain policy
/// 6. If depth remains, push every in-scope link with depth - 1
///
/// The caller is responsible for marking the task done afterwards; all pushes
/// have happened by the time this returns.
pub async fn process_page(ctx: &CrawlContext, task: &CrawlTask) -> PageOutcome {
    if ctx.cancel.is_cancelled() {
        return PageOutcome::Skipped;
    }

    let fetched = fetch_page(&ctx.client, &task.url, ctx.page_timeout).await;

    let (final_url, body) = match fetched {
        Ok(PageFetch::Html { final_url, body }) => (final_url, body),
        Ok(PageFetch::NotHtml { content_type }) => {
            tracing::debug!("Skipping non-HTML page {} ({})", task.url, content_type);
            ctx.counters.non_html.fetch_add(1, Ordering::Relaxed);
            return PageOutcome::NotHtml;
        }
        Err(e) => {
            ctx.sink.log(&format!("[ERR] {}: {}", task.url, e));
            ctx.counters.errors.fetch_add(1, Ordering::Relaxed);
            return PageOutcome::Failed;
        }
    };

    ctx.counters.fetched.fetch_add(1, Ordering::Relaxed);

    let page_url = match Url::parse(&final_url).or_else(|_| Url::parse(&task.url)) {
        Ok(u) => u,
        Err(e) => {
            ctx.sink.log(&format!("[ERR] {}: {}", task.url, e));
            ctx.counters.errors.fetch_add(1, Ordering::Relaxed);
            return PageOutcome::Failed;
        }
    };

    let parsed = parse_html(&body, &page_url, ctx.auto_pagination);
    let child_depth = task.remaining_depth - 1;

    let new_images = parsed
        .images
        .iter()
        .filter(|image| ctx.images.insert(image))
        .count();

    let mut new_links = parsed
        .pagination_links
        .iter()
        .filter(|link| ctx.frontier.push(CrawlTask::new(link.as_str(), child_depth)))
        .count();

    if task.remaining_depth > 0 {
        new_links += parsed
            .links
            .iter()
            .filter(|link| in_scope(link, &ctx.base_url, &ctx.policy))
            .filter(|link| ctx.frontier.push(CrawlTask::new(link.as_str(), child_depth)))
            .count();
    }

    ctx.sink.log(&format!(
        "[PAGE] {} | imgs={} | queue={}",
        task.url,
        ctx.images.len(),
        ctx.frontier.queued()
    ));

    PageOutcome::Processed {
        new_images,
        new_links,
    }
}
