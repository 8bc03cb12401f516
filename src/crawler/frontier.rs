//! Crawl frontier shared by all workers
//!
//! The frontier owns three pieces of state under a single lock:
//! - The FIFO queue of pending tasks
//! - The visited set of normalized URLs ever enqueued
//! - The count of tasks currently being processed
//!
//! The crawl is exhausted only when the queue is empty AND nothing is in
//! flight. A worker that finds an empty queue while other tasks are still in
//! flight waits on a `Notify` instead of exiting, since those tasks may still
//! push new work.

use crate::url::normalize_url;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// A unit of crawl work: a page URL plus the remaining link depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to fetch (already normalized)
    pub url: String,

    /// How many more link hops may be followed from this page
    ///
    /// Signed because auto-pagination links decrement unconditionally.
    pub remaining_depth: i32,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, remaining_depth: i32) -> Self {
        Self {
            url: url.into(),
            remaining_depth,
        }
    }
}

#[derive(Debug, Default)]
struct FrontierInner {
    queue: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    in_flight: usize,
}

/// Multi-producer multi-consumer work queue with exhaustion detection
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    changed: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a task unless its normalized URL was already seen
    ///
    /// The visited check, the insert and the enqueue happen under one lock, so
    /// two workers discovering the same link concurrently enqueue it once.
    ///
    /// # Returns
    ///
    /// * `true` - The task was new and is now queued
    /// * `false` - The URL was already visited; nothing changed
    pub fn push(&self, task: CrawlTask) -> bool {
        let normalized = normalize_url(&task.url);

        {
            let mut inner = self.inner.lock();
            if !inner.visited.insert(normalized.clone()) {
                return false;
            }
            inner.queue.push_back(CrawlTask {
                url: normalized,
                remaining_depth: task.remaining_depth,
            });
        }

        self.changed.notify_waiters();
        true
    }

    /// Removes the oldest queued task without counting it as in flight
    pub fn pop(&self) -> Option<CrawlTask> {
        self.inner.lock().queue.pop_front()
    }

    /// Counts one more task as being processed
    pub fn mark_in_flight(&self) {
        self.inner.lock().in_flight += 1;
    }

    /// Counts one task as finished and wakes idle workers
    ///
    /// Must be called only after every push the task performs.
    pub fn mark_done(&self) {
        {
            let mut inner = self.inner.lock();
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    /// Pops a task and marks it in flight atomically
    pub fn claim(&self) -> Option<CrawlTask> {
        let mut inner = self.inner.lock();
        let task = inner.queue.pop_front()?;
        inner.in_flight += 1;
        Some(task)
    }

    /// Returns true when no task is queued and none is in flight
    pub fn is_exhausted(&self) -> bool {
        let inner = self.inner.lock();
        inner.queue.is_empty() && inner.in_flight == 0
    }

    /// Waits for the next task to process
    ///
    /// The returned task is already counted as in flight; the caller must call
    /// [`Frontier::mark_done`] once it has finished with it.
    ///
    /// # Returns
    ///
    /// * `Some(task)` - A task was claimed
    /// * `None` - The frontier is exhausted or `cancel` fired
    pub async fn next_task(&self, cancel: &CancellationToken) -> Option<CrawlTask> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }

            // Register interest before inspecting state so a push or
            // mark_done racing with the check below still wakes us.
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock();
                if let Some(task) = inner.queue.pop_front() {
                    inner.in_flight += 1;
                    return Some(task);
                }
                if inner.in_flight == 0 {
                    return None;
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = &mut notified => {}
            }
        }
    }

    /// Number of tasks waiting in the queue
    pub fn queued(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Number of tasks currently being processed
    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight
    }

    /// Number of distinct URLs ever enqueued
    pub fn visited_count(&self) -> usize {
        self.inner.lock().visited.len()
    }

    /// Copies the visited set out
    pub fn visited_snapshot(&self) -> Vec<String> {
        self.inner.lock().visited.iter().cloned().collect()
    }
}
