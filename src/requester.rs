//! `PageRequester`: couples an HTTP GET with a caller-supplied
//! content-download predicate.
//!
//! No retry policy or circuit breaker here: the predicate is assumed
//! pure and fast, and politeness/backoff belongs one layer up, not in
//! this core.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::types::{CrawledPage, PageToCrawl, ResponseMeta};

/// The predicate `make_request` consults once response headers are
/// available, before the body is read. Assumed pure and fast.
pub trait DownloadPredicate: Fn(&CrawledPage) -> crate::types::CrawlDecision + Send + Sync {}
impl<T> DownloadPredicate for T where T: Fn(&CrawledPage) -> crate::types::CrawlDecision + Send + Sync {}

pub struct PageRequester {
    client: Client,
}

impl PageRequester {
    pub fn new(user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("static client configuration always builds");

        Self { client }
    }

    /// Issue the GET, consult `predicate` on headers, and drain the
    /// body only if the predicate allows it. Every exit path closes the
    /// response; `reqwest` does this automatically when the `Response`
    /// is dropped, so there is no explicit `close()` call here.
    #[instrument(skip(self, predicate), fields(uri = %page.uri))]
    pub async fn make_request(
        &self,
        page: &PageToCrawl,
        predicate: impl DownloadPredicate,
    ) -> CrawledPage {
        let response = match self.client.get(page.uri.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "transport failure fetching page");
                return CrawledPage::transport_failure(page, e.to_string());
            }
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut partial = CrawledPage {
            uri: page.uri.clone(),
            root_uri: page.root_uri.clone(),
            parent_uri: page.parent_uri.clone(),
            is_internal: page.is_internal,
            is_retry: page.is_retry,
            response: Some(ResponseMeta {
                status,
                content_type,
            }),
            transport_error: None,
            content_bytes: Vec::new(),
            content_text: None,
            page_size_in_bytes: 0,
        };

        let decision = predicate(&partial);
        if !decision.allowed {
            debug!(reason = %decision.reason, "predicate declined to download body");
            drop(response);
            return partial;
        }

        match response.bytes().await {
            Ok(bytes) => {
                partial.page_size_in_bytes = bytes.len();
                partial.content_text = Some(String::from_utf8_lossy(&bytes).into_owned());
                partial.content_bytes = bytes.to_vec();
            }
            Err(e) => {
                warn!(error = %e, "failed reading response body");
                partial.transport_error = Some(e.to_string());
            }
        }

        partial
    }
}
