/// Crawl phase definitions for the controller state machine
///
/// This module defines every phase a crawl can be in and which moves between
/// them are legal.
use crate::SieveError;
use std::fmt;

/// Represents the current phase of the crawl controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    /// No crawl has been started yet
    #[default]
    Idle,

    // ===== Active Phases =====
    /// Workers are draining the frontier
    Crawling,

    /// The image set is being downloaded
    Downloading,

    /// A stop was requested; in-flight work is draining
    Stopping,

    // ===== Terminal Phase =====
    /// The last crawl finished (completely or after a stop)
    Done,
}

impl CrawlPhase {
    /// Returns true while a crawl owns the controller
    ///
    /// `start()` is rejected in any active phase.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Crawling | Self::Downloading | Self::Stopping)
    }

    /// Returns true if a stop request has any effect in this phase
    pub fn is_stoppable(&self) -> bool {
        matches!(self, Self::Crawling | Self::Downloading)
    }

    /// Returns true if moving from `self` to `next` is legal
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::Done, Self::Crawling)
                | (Self::Crawling, Self::Downloading)
                | (Self::Crawling | Self::Downloading, Self::Stopping)
                | (Self::Downloading | Self::Stopping, Self::Done)
        )
    }

    /// Returns `next` if the transition is legal
    pub fn transition(self, next: CrawlPhase) -> Result<CrawlPhase, SieveError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(SieveError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Crawling => "crawling",
            Self::Downloading => "downloading",
            Self::Stopping => "stopping",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
