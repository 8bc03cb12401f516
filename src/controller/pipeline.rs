//! The crawl pipeline: seed, crawl, download, report
//!
//! Runs as one spawned task per `start()`. The crawl and download phases are
//! strictly sequential; each worker pool lives only within its phase.

use crate::config::CrawlConfig;
use crate::controller::ControllerInner;
use crate::crawler::{
    run_workers, seed_manual, CrawlContext, CrawlTask, Frontier, PageCounters,
};
use crate::download::{download_all, DownloadOptions};
use crate::output::{write_manifest, CrawlReport};
use crate::state::ImageSet;
use crate::url::ScopePolicy;
use chrono::Utc;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Moves the controller to Done even if the pipeline unwinds
struct FinishGuard(Arc<ControllerInner>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Seeds the frontier with the start URL and any manual pagination pages
fn seed(ctx: &CrawlContext, config: &CrawlConfig) {
    let depth = i32::try_from(config.crawler.max_depth).unwrap_or(i32::MAX);
    ctx.frontier
        .push(CrawlTask::new(config.crawler.start_url.trim(), depth));

    let Some(pagination) = &config.pagination else {
        return;
    };

    match seed_manual(pagination) {
        Ok(tasks) => {
            let count = tasks.len();
            for task in tasks {
                ctx.frontier.push(task);
            }
            ctx.sink
                .log(&format!("[PAGE GEN] Added {} manual pagination URLs", count));
        }
        Err(e) => {
            tracing::warn!("{}", e);
            ctx.sink.log("[WARN] Invalid pagination pattern (missing {n})");
        }
    }
}

pub(crate) async fn run_pipeline(
    config: Arc<CrawlConfig>,
    base_url: Url,
    client: Client,
    cancel: CancellationToken,
    controller: Arc<ControllerInner>,
) -> CrawlReport {
    let _finish = FinishGuard(Arc::clone(&controller));
    let started_at = Utc::now();
    let sink = Arc::clone(&controller.sink);

    let ctx = Arc::new(CrawlContext {
        frontier: Frontier::new(),
        images: ImageSet::new(),
        counters: PageCounters::default(),
        client: client.clone(),
        base_url,
        policy: ScopePolicy::from_config(&config.crawler),
        auto_pagination: config.crawler.auto_pagination,
        page_timeout: Duration::from_secs(config.crawler.page_timeout_secs),
        cancel: cancel.clone(),
        sink: Arc::clone(&sink),
    });

    // ===== Crawl phase =====
    seed(&ctx, &config);
    sink.log(&format!(
        "[START] Crawling {} | depth={} | workers={}",
        config.crawler.start_url, config.crawler.max_depth, config.crawler.workers
    ));

    let claimed = run_workers(Arc::clone(&ctx), config.crawler.workers).await;
    tracing::debug!(
        "Crawl phase finished: {} tasks claimed, {} URLs visited",
        claimed,
        ctx.frontier.visited_count()
    );

    // ===== Download phase =====
    controller.enter_download_phase();
    let options = DownloadOptions::from_config(&config.download);
    let download = download_all(
        ctx.images.snapshot(),
        &options,
        &client,
        &cancel,
        Arc::clone(&sink),
    )
    .await;

    let report = CrawlReport {
        started_at,
        finished_at: Utc::now(),
        pages_fetched: ctx.counters.fetched(),
        page_errors: ctx.counters.errors(),
        non_html: ctx.counters.non_html(),
        visited: ctx.frontier.visited_snapshot().into_iter().collect(),
        images: ctx.images.sorted(),
        download,
        cancelled: cancel.is_cancelled(),
    };

    if config.download.manifest {
        match write_manifest(&report, Path::new(&config.download.output_dir)) {
            Ok(path) => tracing::info!("Wrote manifest to {}", path.display()),
            Err(e) => sink.log(&format!("[ERROR] Failed to write manifest: {}", e)),
        }
    }

    sink.log("[DONE] Crawl complete.");
    report
}
