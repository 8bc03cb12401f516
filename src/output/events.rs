//! Event sinks for crawl status lines and download progress
//!
//! The controller never prints directly. Every human-readable status line
//! (`[START]`, `[PAGE]`, `[ERR]`, ...) and every download progress update goes
//! through an [`EventSink`], so a CLI, a test or a GUI can observe a crawl the
//! same way.

use tokio::sync::mpsc;

/// Receives status lines and progress updates from a running crawl
///
/// Implementations are called concurrently from worker tasks and must not
/// block for long.
pub trait EventSink: Send + Sync {
    /// Emits one human-readable status line
    fn log(&self, message: &str);

    /// Reports that `completed` of `total` images have been written
    fn progress(&self, completed: usize, total: usize);
}

/// Forwards events to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn progress(&self, completed: usize, total: usize) {
        tracing::info!("[DL] {}/{}", completed, total);
    }
}

/// An event as delivered by [`ChannelSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Log(String),
    Progress { completed: usize, total: usize },
}

/// Forwards events over an unbounded channel
///
/// Sends never block; events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<CrawlEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that observes it
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn log(&self, message: &str) {
        let _ = self.tx.send(CrawlEvent::Log(message.to_string()));
    }

    fn progress(&self, completed: usize, total: usize) {
        let _ = self.tx.send(CrawlEvent::Progress { completed, total });
    }
}
