//! `Scheduler`: an ordered, concurrency-safe container of pending
//! `PageToCrawl` work items.
//!
//! Duplicate suppression is deliberately NOT done here — that's
//! `DecisionMaker`'s job against the shared seen-set. The scheduler is
//! a pure ordered container, polymorphic over `{add, get_next, count}`
//! so an alternative ordering (priority, LIFO) can be dropped in behind
//! the same trait without engine changes, even though only one
//! concrete ordering ships here.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{CrawlError, EngineResult};
use crate::types::PageToCrawl;

/// The capability set the engine depends on. Alternative orderings
/// (priority, LIFO) can be dropped in without touching `CrawlEngine`.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Enqueue `page`. Errors if `page` is absent (mirrors the
    /// contract's "`page` or `page.uri` is absent" guard; this crate's
    /// typed `PageToCrawl` makes a present-but-URI-less page
    /// unrepresentable, so `None` is the only absent case left).
    async fn add(&self, page: Option<PageToCrawl>) -> EngineResult<()>;

    /// Dequeue the oldest still-queued page, or `None` if empty.
    async fn get_next(&self) -> Option<PageToCrawl>;

    /// Number of currently queued pages.
    async fn count(&self) -> usize;
}

/// FIFO scheduler: a `VecDeque` behind a `tokio::sync::Mutex`, safe for
/// concurrent `add` from many workers while the engine drains via
/// `get_next` on its single control-loop thread.
#[derive(Default)]
pub struct FifoScheduler {
    queue: Mutex<std::collections::VecDeque<PageToCrawl>>,
}

impl FifoScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Scheduler for FifoScheduler {
    async fn add(&self, page: Option<PageToCrawl>) -> EngineResult<()> {
        let Some(page) = page else {
            return Err(CrawlError::invalid_argument("page is absent"));
        };
        self.queue.lock().await.push_back(page);
        Ok(())
    }

    async fn get_next(&self) -> Option<PageToCrawl> {
        self.queue.lock().await.pop_front()
    }

    async fn count(&self) -> usize {
        self.queue.lock().await.len()
    }
}
