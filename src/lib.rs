//! # CrawlCore
//!
//! A configurable, multi-threaded web crawl engine core: given a seed
//! URL, it fetches HTML pages, extracts hyperlinks through an injected
//! [`LinkExtractor`], and schedules new links for further fetching
//! under admission and continuation rules, emitting lifecycle events
//! as it goes.
//!
//! ## Architecture
//!
//! Five collaborators, in dependency order:
//! - [`decision`] — the three pure admission/continuation gates
//! - [`scheduler`] — the FIFO frontier of pending pages
//! - [`requester`] — couples an HTTP GET with a content-download predicate
//! - [`worker_pool`] — bounded-parallelism task executor
//! - [`engine`] — the control loop that wires the above together
//!
//! Politeness policies (robots.txt, crawl-delay, rate limiting),
//! content storage, persistence across restarts, distributed
//! coordination, JavaScript execution, and authentication are not part
//! of this core.

pub mod config;
pub mod config_loader;
pub mod decision;
pub mod engine;
pub mod error;
pub mod events;
pub mod link_extractor;
pub mod requester;
pub mod scheduler;
pub mod types;
pub mod worker_pool;

pub use config::{CrawlConfiguration, CrawlPresets};
pub use config_loader::ConfigLoader;
pub use decision::DecisionMaker;
pub use engine::CrawlEngine;
pub use error::{CrawlError, EngineResult};
pub use events::{CrawlEvent, CrawlEventHandler, EventDispatcher, LoggingEventHandler};
pub use link_extractor::{LinkExtractor, RegexLinkExtractor};
pub use requester::{DownloadPredicate, PageRequester};
pub use scheduler::{FifoScheduler, Scheduler};
pub use types::{
    authority_eq, CrawlContext, CrawlDecision, CrawlResult, CrawlStats, CrawledPage, PageToCrawl,
    ResponseMeta,
};
