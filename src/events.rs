//! The four lifecycle events `CrawlEngine` emits to embedders, and the
//! fire-and-forget dispatch facility that delivers them.
//!
//! A closed set of four events — no severity levels, no type-erased
//! `dyn Event`, no subscription filtering, because there is nothing
//! here to filter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::types::{CrawledPage, PageToCrawl};

/// One of the four fixed lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrawlEvent {
    PageCrawlStarting {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        page: PageToCrawl,
    },
    PageCrawlCompleted {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        crawled_page: CrawledPage,
    },
    PageCrawlDisallowed {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        page: PageToCrawl,
        reason: String,
    },
    PageLinksCrawlDisallowed {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        crawled_page: CrawledPage,
        reason: String,
    },
}

impl CrawlEvent {
    pub fn page_crawl_starting(page: PageToCrawl) -> Self {
        Self::PageCrawlStarting {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            page,
        }
    }

    pub fn page_crawl_completed(crawled_page: CrawledPage) -> Self {
        Self::PageCrawlCompleted {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            crawled_page,
        }
    }

    pub fn page_crawl_disallowed(page: PageToCrawl, reason: impl Into<String>) -> Self {
        Self::PageCrawlDisallowed {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            page,
            reason: reason.into(),
        }
    }

    pub fn page_links_crawl_disallowed(crawled_page: CrawledPage, reason: impl Into<String>) -> Self {
        Self::PageLinksCrawlDisallowed {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            crawled_page,
            reason: reason.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PageCrawlStarting { .. } => "PageCrawlStarting",
            Self::PageCrawlCompleted { .. } => "PageCrawlCompleted",
            Self::PageCrawlDisallowed { .. } => "PageCrawlDisallowed",
            Self::PageLinksCrawlDisallowed { .. } => "PageLinksCrawlDisallowed",
        }
    }
}

/// Implemented by embedders that want to observe crawl progress.
#[async_trait]
pub trait CrawlEventHandler: Send + Sync {
    async fn handle(&self, event: &CrawlEvent);
}

/// Built-in handler that logs every event at `info` (or `warn` for the
/// two disallowed variants).
pub struct LoggingEventHandler;

#[async_trait]
impl CrawlEventHandler for LoggingEventHandler {
    async fn handle(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::PageCrawlStarting { page, .. } => {
                tracing::info!(uri = %page.uri, "page crawl starting");
            }
            CrawlEvent::PageCrawlCompleted { crawled_page, .. } => {
                tracing::info!(uri = %crawled_page.uri, bytes = crawled_page.page_size_in_bytes, "page crawl completed");
            }
            CrawlEvent::PageCrawlDisallowed { page, reason, .. } => {
                tracing::warn!(uri = %page.uri, reason, "page crawl disallowed");
            }
            CrawlEvent::PageLinksCrawlDisallowed {
                crawled_page,
                reason,
                ..
            } => {
                tracing::warn!(uri = %crawled_page.uri, reason, "page links crawl disallowed");
            }
        }
    }
}

/// Fans an event out to every registered handler, each dispatched on
/// its own `tokio::spawn`ed task (fire-and-forget). A handler that
/// panics is caught and logged; it never reaches the
/// worker that fired the event.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn CrawlEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, handler: Arc<dyn CrawlEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: CrawlEvent) {
        let event = Arc::new(event);
        for handler in &self.handlers {
            let handler = Arc::clone(handler);
            let event = Arc::clone(&event);
            tokio::spawn(async move {
                if let Err(panic) = std::panic::AssertUnwindSafe(handler.handle(&event))
                    .catch_unwind()
                    .await
                {
                    error!(?panic, event = event.name(), "event subscriber panicked");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::str::FromStr;
    use url::Url;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CrawlEventHandler for CountingHandler {
        async fn handle(&self, _event: &CrawlEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl CrawlEventHandler for PanickingHandler {
        async fn handle(&self, _event: &CrawlEvent) {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_every_subscriber() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Arc::new(CountingHandler {
            count: Arc::clone(&count),
        }));
        dispatcher.subscribe(Arc::new(CountingHandler {
            count: Arc::clone(&count),
        }));

        let page = PageToCrawl::seed(Url::from_str("https://a.com/").unwrap());
        dispatcher.dispatch(CrawlEvent::page_crawl_starting(page));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn events_round_trip_through_json_for_out_of_process_embedders() {
        let page = PageToCrawl::seed(Url::from_str("https://a.com/").unwrap());
        let event = CrawlEvent::page_crawl_disallowed(page, "Link is external");

        let json = serde_json::to_string(&event).expect("event serializes");
        let decoded: CrawlEvent = serde_json::from_str(&json).expect("event deserializes");
        assert_eq!(decoded.name(), event.name());
    }

    #[tokio::test]
    async fn a_panicking_subscriber_does_not_affect_others() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Arc::new(PanickingHandler));
        dispatcher.subscribe(Arc::new(CountingHandler {
            count: Arc::clone(&count),
        }));

        let page = PageToCrawl::seed(Url::from_str("https://a.com/").unwrap());
        dispatcher.dispatch(CrawlEvent::page_crawl_starting(page));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
