//! `DecisionMaker`: the three admission/continuation gates.
//!
//! Pure free functions: no I/O, no mutation. Every returned
//! `CrawlDecision::reason` is part of a fixed, tested vocabulary — do
//! not reword any of these strings.

use crate::types::{CrawlContext, CrawlDecision, CrawledPage, PageToCrawl};

/// Null-capable inputs model the "null page" / "null context" guards
/// each gate's contract names first. Every other collaborator in this
/// crate always has a page and a context in hand, so these only bite
/// at the boundary (and in the gate's own unit tests).
pub struct DecisionMaker;

impl DecisionMaker {
    /// Gate 1: should this page be fetched at all?
    ///
    /// Rule order is significant — the first failing rule wins.
    pub fn should_crawl_page(
        page: Option<&PageToCrawl>,
        context: Option<&CrawlContext>,
    ) -> CrawlDecision {
        let Some(page) = page else {
            return CrawlDecision::deny("Null page to crawl");
        };
        let Some(context) = context else {
            return CrawlDecision::deny("Null crawl context");
        };

        if page.uri.scheme() != "http" && page.uri.scheme() != "https" {
            return CrawlDecision::deny("Scheme does not begin with http");
        }

        if context.has_seen(&page.uri) {
            return CrawlDecision::deny("Link already crawled");
        }

        let max_pages = context.config.max_pages_to_crawl;
        if max_pages > 0 && context.total_admitted() >= max_pages {
            return CrawlDecision::deny(format!(
                "MaxPagesToCrawl limit of [{max_pages}] has been reached"
            ));
        } else if max_pages == 0 {
            return CrawlDecision::deny("MaxPagesToCrawl limit of [0] has been reached");
        }

        let timeout = context.config.crawl_timeout_seconds;
        if timeout > 0 && context.elapsed().as_secs() >= timeout {
            return CrawlDecision::deny(format!(
                "Crawl timeout of [{timeout}] seconds has been reached"
            ));
        }

        if !page.is_internal && !context.config.is_external_page_crawling_enabled {
            return CrawlDecision::deny("Link is external");
        }

        let per_domain_limit = context.config.max_pages_to_crawl_per_domain;
        if per_domain_limit > 0 {
            if let Some(host) = page.host() {
                if context.pages_crawled_for_host(host) >= per_domain_limit {
                    return CrawlDecision::deny(format!(
                        "MaxPagesToCrawlPerDomain limit of [{per_domain_limit}] has been reached for domain [{host}]"
                    ));
                }
            }
        }

        CrawlDecision::allow()
    }

    /// Gate 2: once headers are back, should the body be read?
    pub fn should_download_page_content(
        crawled: Option<&CrawledPage>,
        context: Option<&CrawlContext>,
    ) -> CrawlDecision {
        let Some(crawled) = crawled else {
            return CrawlDecision::deny("Null crawled page");
        };
        if context.is_none() {
            return CrawlDecision::deny("Null crawl context");
        }

        let Some(response) = &crawled.response else {
            return CrawlDecision::deny("Null HttpWebResponse");
        };

        if response.status != 200 {
            return CrawlDecision::deny("HttpStatusCode is not 200");
        }

        let content_type_ok = response
            .content_type
            .as_deref()
            .map(|ct| {
                let before_params = ct.split(';').next().unwrap_or("").trim();
                before_params.eq_ignore_ascii_case("text/html")
            })
            .unwrap_or(false);

        if !content_type_ok {
            return CrawlDecision::deny("Content type is not any of the following: text/html");
        }

        CrawlDecision::allow()
    }

    /// Gate 3: once the body has been read, should its links be crawled?
    pub fn should_crawl_page_links(
        crawled: Option<&CrawledPage>,
        context: Option<&CrawlContext>,
    ) -> CrawlDecision {
        let Some(crawled) = crawled else {
            return CrawlDecision::deny("Null crawled page");
        };
        if context.is_none() {
            return CrawlDecision::deny("Null crawl context");
        }

        if crawled.has_no_content() {
            return CrawlDecision::deny("Page has no content");
        }

        if !crawled.is_internal && !context.unwrap().config.is_external_page_links_crawling_enabled
        {
            return CrawlDecision::deny("Link is external");
        }

        CrawlDecision::allow()
    }
}
