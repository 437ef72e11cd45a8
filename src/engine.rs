//! `CrawlEngine`: the control loop that wires every other component
//! together — seed enqueue, dequeue-and-dispatch, the per-page
//! pipeline, and global termination.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};
use url::Url;

use crate::config::CrawlConfiguration;
use crate::decision::DecisionMaker;
use crate::error::{CrawlError, EngineResult};
use crate::events::{CrawlEvent, CrawlEventHandler, EventDispatcher, LoggingEventHandler};
use crate::link_extractor::LinkExtractor;
use crate::requester::PageRequester;
use crate::scheduler::Scheduler;
use crate::types::{CrawlContext, CrawlResult, CrawlStats, PageToCrawl};
use crate::worker_pool::WorkerPool;

/// How long the control loop sleeps when the scheduler is momentarily
/// empty but the pool still has work in flight.
const EMPTY_QUEUE_BACKOFF: Duration = Duration::from_millis(2_500);

struct Counters {
    pages_disallowed: AtomicU64,
    bytes_downloaded: AtomicU64,
}

impl Counters {
    fn new() -> Self {
        Self {
            pages_disallowed: AtomicU64::new(0),
            bytes_downloaded: AtomicU64::new(0),
        }
    }
}

pub struct CrawlEngine {
    scheduler: Arc<dyn Scheduler>,
    requester: Arc<PageRequester>,
    pool: Arc<WorkerPool>,
    link_extractor: Arc<dyn LinkExtractor>,
    dispatcher: EventDispatcher,
    config: CrawlConfiguration,
    counters: Arc<Counters>,
    context: std::sync::Mutex<Option<Arc<CrawlContext>>>,
}

impl CrawlEngine {
    pub fn new(
        config: CrawlConfiguration,
        scheduler: Arc<dyn Scheduler>,
        requester: Arc<PageRequester>,
        link_extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        let pool = Arc::new(WorkerPool::new(config.max_concurrent_threads));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Arc::new(LoggingEventHandler));
        Self {
            scheduler,
            requester,
            pool,
            link_extractor,
            dispatcher,
            config,
            counters: Arc::new(Counters::new()),
            context: std::sync::Mutex::new(None),
        }
    }

    /// Register an embedder callback. Must be called before `crawl`.
    pub fn subscribe(&mut self, handler: Arc<dyn CrawlEventHandler>) {
        self.dispatcher.subscribe(handler);
    }

    /// Snapshot of engine counters for the currently running (or most
    /// recently completed) crawl. Read-only observability; adds no
    /// crawl behavior.
    pub fn get_stats(&self) -> Option<CrawlStats> {
        let context = self.context.lock().unwrap().clone()?;
        Some(CrawlStats {
            pages_admitted: context.total_admitted(),
            pages_disallowed: self.counters.pages_disallowed.load(Ordering::Relaxed),
            bytes_downloaded: self.counters.bytes_downloaded.load(Ordering::Relaxed),
            elapsed: context.elapsed(),
        })
    }

    /// `seed_uri` is `Option` so that an absent seed (the contract's
    /// "invalid-argument when `seed_uri` is absent" case) is
    /// representable without a sentinel `Url`.
    #[instrument(skip(self, seed_uri))]
    pub async fn crawl(&self, seed_uri: Option<Url>) -> EngineResult<CrawlResult> {
        let Some(seed_uri) = seed_uri else {
            return Err(CrawlError::invalid_seed_uri("seed_uri is absent"));
        };

        let context = CrawlContext::new(seed_uri.clone(), self.config.clone());
        *self.context.lock().unwrap() = Some(Arc::clone(&context));

        let seed_page = PageToCrawl::seed(seed_uri.clone());
        self.scheduler
            .add(Some(seed_page))
            .await
            .expect("a freshly-built seed page always carries a URI");

        loop {
            if self.scheduler.count().await > 0 {
                let Some(page) = self.scheduler.get_next().await else {
                    continue;
                };
                self.dispatch_page(page, Arc::clone(&context)).await;
            } else if !self.pool.has_running_work() {
                break;
            } else {
                tokio::time::sleep(EMPTY_QUEUE_BACKOFF).await;
            }
        }

        self.pool.shutdown().await;

        let result = CrawlResult {
            root_uri: context.root_uri.clone(),
            elapsed: context.elapsed(),
        };
        info!(elapsed_secs = result.elapsed.as_secs_f64(), "crawl finished");
        Ok(result)
    }

    /// Submit `page` to the worker pool. Awaits `do_work`'s own
    /// submission (not the page's full processing): `do_work` acquires
    /// a semaphore permit, bumps the in-flight counter, and hands the
    /// actual per-page pipeline to its own spawned task before
    /// returning. Awaiting that submission here — rather than spawning
    /// a detached shim around it — is what lets `do_work` block the
    /// engine thread when the pool is saturated, and it closes a race
    /// where the control loop could observe an empty scheduler and a
    /// not-yet-incremented in-flight counter and terminate early.
    async fn dispatch_page(&self, page: PageToCrawl, context: Arc<CrawlContext>) {
        let scheduler = Arc::clone(&self.scheduler);
        let requester = Arc::clone(&self.requester);
        let link_extractor = Arc::clone(&self.link_extractor);
        let dispatcher = self.dispatcher.clone();
        let counters = Arc::clone(&self.counters);

        self.pool
            .do_work(process_page(
                page,
                context,
                scheduler,
                requester,
                link_extractor,
                dispatcher,
                counters,
            ))
            .await;
    }
}

#[instrument(skip(context, scheduler, requester, link_extractor, dispatcher, counters), fields(uri = %page.uri))]
async fn process_page(
    page: PageToCrawl,
    context: Arc<CrawlContext>,
    scheduler: Arc<dyn Scheduler>,
    requester: Arc<PageRequester>,
    link_extractor: Arc<dyn LinkExtractor>,
    dispatcher: EventDispatcher,
    counters: Arc<Counters>,
) {
    let decision = DecisionMaker::should_crawl_page(Some(&page), Some(&context));
    if !decision.allowed {
        counters.pages_disallowed.fetch_add(1, Ordering::Relaxed);
        dispatcher.dispatch(CrawlEvent::page_crawl_disallowed(page, decision.reason));
        return;
    }

    if !context.try_admit(&page.uri) {
        counters.pages_disallowed.fetch_add(1, Ordering::Relaxed);
        dispatcher.dispatch(CrawlEvent::page_crawl_disallowed(page, "Link already crawled"));
        return;
    }
    if let Some(host) = page.host() {
        context.record_admission(host);
    }

    dispatcher.dispatch(CrawlEvent::page_crawl_starting(page.clone()));

    let context_for_predicate = Arc::clone(&context);
    let crawled = requester
        .make_request(&page, move |crawled| {
            DecisionMaker::should_download_page_content(Some(crawled), Some(&context_for_predicate))
        })
        .await;

    counters
        .bytes_downloaded
        .fetch_add(crawled.page_size_in_bytes as u64, Ordering::Relaxed);
    dispatcher.dispatch(CrawlEvent::page_crawl_completed(crawled.clone()));

    let links_decision = DecisionMaker::should_crawl_page_links(Some(&crawled), Some(&context));
    if !links_decision.allowed {
        dispatcher.dispatch(CrawlEvent::page_links_crawl_disallowed(
            crawled,
            links_decision.reason,
        ));
        return;
    }

    let body = crawled.content_text.clone().unwrap_or_default();
    let links = link_extractor.get_links(&crawled.uri, &body);
    for link in links {
        let child = PageToCrawl::child(link, context.root_uri.clone(), crawled.uri.clone());
        let _ = scheduler.add(Some(child)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_extractor::RegexLinkExtractor;
    use crate::scheduler::FifoScheduler;
    use std::str::FromStr;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn crawls_a_small_site_to_completion() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex("^/$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(r#"<a href="/a">a</a><a href="/b">b</a>"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("^/(a|b)$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<p>leaf</p>"),
            )
            .mount(&server)
            .await;

        let mut config = CrawlConfiguration::default();
        config.max_concurrent_threads = 4;

        let engine = CrawlEngine::new(
            config.clone(),
            Arc::new(FifoScheduler::new()),
            Arc::new(PageRequester::new(&config.user_agent_string)),
            Arc::new(RegexLinkExtractor::new()),
        );

        let seed = Url::from_str(&server.uri()).unwrap();
        let result = engine.crawl(Some(seed.clone())).await.unwrap();

        assert_eq!(result.root_uri, seed);
        let stats = engine.get_stats().unwrap();
        assert_eq!(stats.pages_admitted, 3);
    }

    #[tokio::test]
    async fn crawl_rejects_an_absent_seed_uri() {
        let config = CrawlConfiguration::default();
        let engine = CrawlEngine::new(
            config.clone(),
            Arc::new(FifoScheduler::new()),
            Arc::new(PageRequester::new(&config.user_agent_string)),
            Arc::new(RegexLinkExtractor::new()),
        );

        let result = engine.crawl(None).await;
        assert!(result.is_err());
    }
}
