//! `PageRequester` tests against a `wiremock::MockServer`:
//! 200+text/html, 403, 200+image/png, and a transport failure.

use std::str::FromStr;

use crawlcore::{CrawlDecision, CrawledPage, PageRequester, PageToCrawl};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn always_allow(_: &CrawledPage) -> CrawlDecision {
    CrawlDecision::allow()
}

#[tokio::test]
async fn html_response_is_allowed_and_body_is_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<html>hello</html>"),
        )
        .mount(&server)
        .await;

    let requester = PageRequester::new("CrawlCore-Test/1.0");
    let page = PageToCrawl::seed(Url::from_str(&server.uri()).unwrap());
    let crawled = requester.make_request(&page, always_allow).await;

    assert_eq!(crawled.response.as_ref().unwrap().status, 200);
    assert_eq!(crawled.content_text.as_deref(), Some("<html>hello</html>"));
    assert_eq!(crawled.page_size_in_bytes, "<html>hello</html>".len());
}

#[tokio::test]
async fn forbidden_response_is_denied_before_body_is_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("content-type", "text/html")
                .set_body_string("<html>forbidden</html>"),
        )
        .mount(&server)
        .await;

    let requester = PageRequester::new("CrawlCore-Test/1.0");
    let page = PageToCrawl::seed(Url::from_str(&server.uri()).unwrap());
    let crawled = requester
        .make_request(&page, |crawled: &CrawledPage| {
            let status = crawled.response.as_ref().map(|r| r.status);
            if status == Some(200) {
                CrawlDecision::allow()
            } else {
                CrawlDecision::deny("HttpStatusCode is not 200")
            }
        })
        .await;

    assert_eq!(crawled.response.as_ref().unwrap().status, 403);
    assert!(crawled.content_bytes.is_empty());
    assert!(crawled.content_text.is_none());
}

#[tokio::test]
async fn non_html_response_is_denied_before_body_is_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0u8; 32]),
        )
        .mount(&server)
        .await;

    let requester = PageRequester::new("CrawlCore-Test/1.0");
    let page = PageToCrawl::seed(Url::from_str(&server.uri()).unwrap());
    let crawled = requester
        .make_request(&page, |_: &CrawledPage| CrawlDecision::deny("not html"))
        .await;

    assert!(crawled.content_bytes.is_empty());
    assert_eq!(crawled.page_size_in_bytes, 0);
    assert!(crawled.content_text.is_none());
}

#[tokio::test]
async fn connection_failure_is_captured_as_a_transport_error() {
    let requester = PageRequester::new("CrawlCore-Test/1.0");
    // Port 1 is reserved and should refuse the connection immediately.
    let page = PageToCrawl::seed(Url::from_str("http://127.0.0.1:1/").unwrap());
    let crawled = requester.make_request(&page, always_allow).await;

    assert!(crawled.response.is_none());
    assert!(crawled.transport_error.is_some());
}
