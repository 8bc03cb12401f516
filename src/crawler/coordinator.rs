//! Crawler coordinator - the crawl-phase worker pool
//!
//! This module spawns a fixed number of workers on a `JoinSet`. Each worker
//! repeatedly claims a task from the frontier, processes it and marks it done,
//! until the frontier reports exhaustion or the crawl is cancelled.

use crate::crawler::processor::{process_page, CrawlContext};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Marks a claimed task done when dropped, even if processing panicked
struct InFlightGuard<'a> {
    ctx: &'a CrawlContext,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.ctx.frontier.mark_done();
    }
}

/// A single crawl worker
async fn worker_loop(id: usize, ctx: Arc<CrawlContext>) -> usize {
    let mut processed = 0;

    while let Some(task) = ctx.frontier.next_task(&ctx.cancel).await {
        let _guard = InFlightGuard { ctx: &ctx };
        tracing::trace!("worker {} processing {} (depth {})", id, task.url, task.remaining_depth);
        process_page(&ctx, &task).await;
        processed += 1;
    }

    tracing::debug!("worker {} exiting after {} pages", id, processed);
    processed
}

/// Runs the crawl phase to completion
///
/// Returns once every worker has exited, which happens when the frontier is
/// exhausted or cancellation is observed. Tasks already being processed when
/// the crawl is cancelled finish normally.
///
/// # Arguments
///
/// * `ctx` - Shared crawl context, already seeded
/// * `workers` - Number of concurrent workers (at least 1)
///
/// # Returns
///
/// The total number of tasks the workers claimed
pub async fn run_workers(ctx: Arc<CrawlContext>, workers: usize) -> usize {
    let mut pool = JoinSet::new();

    for id in 0..workers.max(1) {
        pool.spawn(worker_loop(id, Arc::clone(&ctx)));
    }

    let mut claimed = 0;
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(count) => claimed += count,
            Err(e) => ctx.sink.log(&format!("[THREAD ERR] {}", e)),
        }
    }

    claimed
}
