//! Core data model: `PageToCrawl`, `CrawledPage`, `CrawlContext`,
//! `CrawlDecision`, and the summary `CrawlResult` returned by a crawl.
//!
//! Plain data structs carrying serde derives where their fields allow
//! it, with concurrency-safe shared state (`CrawlContext`) built on
//! `dashmap` rather than `Mutex<HashMap<_>>`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::CrawlConfiguration;

/// A unit of work: a page the engine intends to fetch.
///
/// Created by the engine at enqueue time; consumed and discarded by
/// the worker that processes it. Workers never share ownership of a
/// single `PageToCrawl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageToCrawl {
    /// The URI this page will be fetched from.
    pub uri: Url,
    /// The root URI of the crawl this page belongs to.
    pub root_uri: Url,
    /// The page from which this link was found, or `uri` itself for the seed.
    pub parent_uri: Url,
    /// True iff `uri`'s authority matches `root_uri`'s authority.
    pub is_internal: bool,
    /// Reserved for a future retry extension; never set by the engine today.
    pub is_retry: bool,
}

impl PageToCrawl {
    /// Build the seed page: its own parent and root.
    pub fn seed(uri: Url) -> Self {
        Self {
            root_uri: uri.clone(),
            parent_uri: uri.clone(),
            is_internal: true,
            is_retry: false,
            uri,
        }
    }

    /// Build a page discovered as a link on `parent`.
    pub fn child(uri: Url, root_uri: Url, parent_uri: Url) -> Self {
        let is_internal = authority_eq(&uri, &root_uri);
        Self {
            uri,
            root_uri,
            parent_uri,
            is_internal,
            is_retry: false,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.uri.host_str()
    }
}

/// True iff `a` and `b` share the same authority (host + explicit port).
pub fn authority_eq(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Response metadata captured once HTTP headers are available, before
/// (or instead of) reading the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub status: u16,
    pub content_type: Option<String>,
}

/// The outcome of attempting to fetch a `PageToCrawl`.
///
/// Extends `PageToCrawl` with the results of the fetch. Created by
/// `PageRequester`; `root_uri`/`parent_uri`/`is_retry` are copied over
/// by the engine's `process` pipeline once the page comes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    pub uri: Url,
    pub root_uri: Url,
    pub parent_uri: Url,
    pub is_internal: bool,
    pub is_retry: bool,

    /// Response metadata, or `None` on transport failure ("no response").
    pub response: Option<ResponseMeta>,
    /// Transport-level error (DNS, connect, TLS, read-before-headers).
    pub transport_error: Option<String>,
    /// Raw body bytes, empty when the body was never read.
    pub content_bytes: Vec<u8>,
    /// Decoded text, when the body was read and is valid UTF-8-ish text.
    pub content_text: Option<String>,
    /// Bytes actually read from the body (not `Content-Length`).
    pub page_size_in_bytes: usize,
}

impl CrawledPage {
    /// Build a `CrawledPage` carrying only a transport failure.
    pub fn transport_failure(page: &PageToCrawl, error: impl Into<String>) -> Self {
        Self {
            uri: page.uri.clone(),
            root_uri: page.root_uri.clone(),
            parent_uri: page.parent_uri.clone(),
            is_internal: page.is_internal,
            is_retry: page.is_retry,
            response: None,
            transport_error: Some(error.into()),
            content_bytes: Vec::new(),
            content_text: None,
            page_size_in_bytes: 0,
        }
    }

    /// True when the body is empty or whitespace-only (or was never read).
    pub fn has_no_content(&self) -> bool {
        match &self.content_text {
            None => true,
            Some(text) => text.trim().is_empty(),
        }
    }
}

/// Per-crawl shared state, visible to `DecisionMaker` and mutated
/// (seen-set, per-domain counters) under concurrency-safe semantics.
pub struct CrawlContext {
    pub root_uri: Url,
    pub config: CrawlConfiguration,
    pub start_instant: Instant,
    seen: DashSet<String>,
    per_domain_counts: DashMap<String, u64>,
    total_admitted: std::sync::atomic::AtomicU64,
}

impl CrawlContext {
    pub fn new(root_uri: Url, config: CrawlConfiguration) -> Arc<Self> {
        Arc::new(Self {
            root_uri,
            config,
            start_instant: Instant::now(),
            seen: DashSet::new(),
            per_domain_counts: DashMap::new(),
            total_admitted: std::sync::atomic::AtomicU64::new(0),
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.start_instant.elapsed()
    }

    /// Back-date `start_instant` so tests can simulate an in-progress
    /// crawl without sleeping. Not part of the public contract.
    #[cfg(test)]
    pub(crate) fn age_by(&mut self, duration: Duration) {
        self.start_instant -= duration;
    }

    /// Has this URI already been admitted?
    pub fn has_seen(&self, uri: &Url) -> bool {
        self.seen.contains(uri.as_str())
    }

    /// Atomically admit a URI: returns `true` iff it was not already
    /// present (this is the insert-if-absent primitive §5 requires for
    /// the re-entrant admission race).
    pub fn try_admit(&self, uri: &Url) -> bool {
        self.seen.insert(uri.as_str().to_string())
    }

    pub fn total_admitted(&self) -> u64 {
        self.total_admitted.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Increment and return the new per-domain count for `host`.
    /// Must only be called after a successful admission.
    pub fn record_admission(&self, host: &str) -> u64 {
        self.total_admitted
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let mut entry = self.per_domain_counts.entry(host.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn pages_crawled_for_host(&self, host: &str) -> u64 {
        self.per_domain_counts.get(host).map(|c| *c).unwrap_or(0)
    }
}

/// `{allowed, reason}` returned by every `DecisionMaker` gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlDecision {
    pub allowed: bool,
    pub reason: String,
}

impl CrawlDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Summary of a completed (or timed-out) crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub root_uri: Url,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

/// Read-only snapshot of engine counters, exposed for observability.
/// Pure accessor over state the engine already owns; adds no crawl
/// behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStats {
    pub pages_admitted: u64,
    pub pages_disallowed: u64,
    pub bytes_downloaded: u64,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn seed_page_is_its_own_root_and_parent() {
        let uri = Url::from_str("https://example.com/").unwrap();
        let page = PageToCrawl::seed(uri.clone());
        assert_eq!(page.root_uri, uri);
        assert_eq!(page.parent_uri, uri);
        assert!(page.is_internal);
    }

    #[test]
    fn child_page_is_internal_iff_same_authority() {
        let root = Url::from_str("https://example.com/").unwrap();
        let internal = Url::from_str("https://example.com/about").unwrap();
        let external = Url::from_str("https://other.com/").unwrap();

        let child1 = PageToCrawl::child(internal, root.clone(), root.clone());
        assert!(child1.is_internal);

        let child2 = PageToCrawl::child(external, root.clone(), root);
        assert!(!child2.is_internal);
    }

    #[test]
    fn context_admits_a_uri_exactly_once() {
        let root = Url::from_str("https://example.com/").unwrap();
        let ctx = CrawlContext::new(root.clone(), CrawlConfiguration::default());

        assert!(ctx.try_admit(&root));
        assert!(!ctx.try_admit(&root));
        assert!(ctx.has_seen(&root));
    }

    #[test]
    fn has_no_content_treats_whitespace_as_empty() {
        let root = Url::from_str("https://example.com/").unwrap();
        let page = PageToCrawl::seed(root);
        let mut crawled = CrawledPage::transport_failure(&page, "boom");
        assert!(crawled.has_no_content());

        crawled.content_text = Some("   ".to_string());
        assert!(crawled.has_no_content());

        crawled.content_text = Some("aaaa".to_string());
        assert!(!crawled.has_no_content());
    }
}
