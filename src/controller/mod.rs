//! Crawl controller: the start/stop surface and phase state machine
//!
//! A [`Controller`] owns at most one running crawl. `start()` validates the
//! configuration, prepares the output directory and spawns the crawl pipeline
//! on the current Tokio runtime; `stop()` requests a cooperative shutdown.
//! The controller is cheap to clone, so a signal handler can hold one copy
//! while the caller awaits the [`CrawlHandle`] with another.

mod pipeline;

use crate::config::{validate, CrawlConfig};
use crate::crawler::build_http_client;
use crate::output::{CrawlReport, EventSink, TracingSink};
use crate::state::CrawlPhase;
use crate::url::parse_http_url;
use crate::{ConfigError, Result, SieveError};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub(crate) struct ControllerInner {
    phase: Mutex<CrawlPhase>,
    cancel: Mutex<CancellationToken>,
    sink: Arc<dyn EventSink>,
}

impl ControllerInner {
    /// Moves Crawling to Downloading; a pending stop keeps Stopping
    pub(crate) fn enter_download_phase(&self) {
        let mut phase = self.phase.lock();
        if *phase == CrawlPhase::Crawling {
            *phase = CrawlPhase::Downloading;
        }
    }

    /// Moves the current run to Done
    pub(crate) fn finish(&self) {
        let mut phase = self.phase.lock();
        match phase.transition(CrawlPhase::Done) {
            Ok(next) => *phase = next,
            Err(e) => {
                tracing::error!("{}; forcing done", e);
                *phase = CrawlPhase::Done;
            }
        }
    }
}

/// Handle to a crawl spawned by [`Controller::start`]
pub struct CrawlHandle {
    join: JoinHandle<CrawlReport>,
}

impl CrawlHandle {
    /// Waits for the crawl to finish and returns its report
    pub async fn wait(self) -> Result<CrawlReport> {
        self.join
            .await
            .map_err(|e| SieveError::Worker(e.to_string()))
    }
}

/// Starts and stops crawls
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl Controller {
    /// Creates an idle controller reporting to `sink`
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                phase: Mutex::new(CrawlPhase::Idle),
                cancel: Mutex::new(CancellationToken::new()),
                sink,
            }),
        }
    }

    /// Returns the current phase
    pub fn phase(&self) -> CrawlPhase {
        *self.inner.phase.lock()
    }

    /// Starts a crawl in the background
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// * `SieveError::AlreadyRunning` - A crawl is crawling, downloading or stopping
    /// * `SieveError::Config` - The configuration failed validation
    /// * `SieveError::OutputDir` - The output directory could not be created
    /// * `SieveError::HttpClient` - The HTTP client could not be built
    ///
    /// A failed attempt leaves the controller in its previous phase.
    pub fn start(&self, config: CrawlConfig) -> Result<CrawlHandle> {
        let current = self.phase();
        if current.is_active() {
            return Err(SieveError::AlreadyRunning { phase: current });
        }

        // Filesystem and client setup run without the phase lock held
        let (base_url, client) = match self.prepare(&config) {
            Ok(p) => p,
            Err(e) => {
                self.inner.sink.log(&format!("[ERROR] {}", e));
                return Err(e);
            }
        };

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SieveError::Worker(format!("no Tokio runtime: {}", e)))?;

        let mut phase = self.inner.phase.lock();
        if phase.is_active() {
            return Err(SieveError::AlreadyRunning { phase: *phase });
        }
        let next = phase.transition(CrawlPhase::Crawling)?;

        let cancel = CancellationToken::new();
        *self.inner.cancel.lock() = cancel.clone();
        *phase = next;
        drop(phase);

        let join = runtime.spawn(pipeline::run_pipeline(
            Arc::new(config),
            base_url,
            client,
            cancel,
            Arc::clone(&self.inner),
        ));

        Ok(CrawlHandle { join })
    }

    fn prepare(&self, config: &CrawlConfig) -> Result<(url::Url, reqwest::Client)> {
        validate(config)?;

        let base_url = parse_http_url(&config.crawler.start_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.crawler.start_url, e)))?;

        std::fs::create_dir_all(&config.download.output_dir).map_err(|source| {
            SieveError::OutputDir {
                path: config.download.output_dir.clone(),
                source,
            }
        })?;

        let client = build_http_client(&config.crawler.user_agent)?;

        Ok((base_url, client))
    }

    /// Requests a graceful stop of the running crawl
    ///
    /// Workers finish their current page, nothing new is dispatched, and the
    /// run proceeds to Done. No effect when idle, done or already stopping.
    pub fn stop(&self) {
        let mut phase = self.inner.phase.lock();
        if !phase.is_stoppable() {
            return;
        }

        self.inner.cancel.lock().cancel();
        *phase = CrawlPhase::Stopping;
        drop(phase);

        self.inner.sink.log("[STOP] Graceful shutdown requested...");
    }

    /// Starts a crawl and waits for it to finish
    pub async fn run(&self, config: CrawlConfig) -> Result<CrawlReport> {
        self.start(config)?.wait().await
    }
}
