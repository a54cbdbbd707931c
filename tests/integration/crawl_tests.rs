//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::collections::HashSet;
use std::sync::Arc;
use sumi_scope::config::{Config, UserAgentConfig};
use sumi_scope::crawler::{
    build_http_client, crawl, Coordinator, FetchReply, Fetcher, ResponseParser,
};
use sumi_scope::url::{CrawlScope, Link};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the given URL
fn create_test_config(root: &str) -> Config {
    let mut config = Config::default();
    config.roots = vec![root.to_string()];
    config.crawler.max_tries = 1;
    config.crawler.max_tasks = 4;
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_html(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, route: &str, target: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(301).insert_header("location", target))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{base}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/page1#section">Page 1 again</a>
            <a href="http://other.test/elsewhere">Elsewhere</a>
            </body></html>"#,
            base = base_url
        ),
        1,
    )
    .await;
    mount_html(
        &mock_server,
        "/page1",
        r#"<a href="/">Home</a><a href="/page2">Page 2</a>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&create_test_config(&base_url)).await.unwrap();

    // Each URL fetched exactly once, out-of-scope link never fetched
    assert_eq!(report.outcomes().len(), 3);

    let root = report.outcome_for(&format!("{}/", base_url)).unwrap();
    assert_eq!(root.status(), Some(200));
    assert_eq!(root.link_count(), 2);
    assert_eq!(root.new_link_count(), 2);
    assert_eq!(root.content_type(), Some("text/html"));

    let page1 = report.outcome_for(&format!("{}/page1", base_url)).unwrap();
    assert_eq!(page1.link_count(), 2);
    assert_eq!(page1.new_link_count(), 0);

    let page2 = report.outcome_for(&format!("{}/page2", base_url)).unwrap();
    assert_eq!(page2.status(), Some(404));
    assert_eq!(page2.link_count(), 0);

    let stats = report.statistics();
    assert_eq!(stats.total_urls, 3);
    assert_eq!(stats.failures, 0);
}

#[tokio::test]
async fn test_redirect_chain_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_redirect(&mock_server, "/start", "/middle", 1).await;
    mount_redirect(&mock_server, "/middle", "/end", 1).await;
    mount_html(&mock_server, "/end", "<p>done</p>".to_string(), 1).await;

    let report = crawl(&create_test_config(&format!("{}/start", base_url)))
        .await
        .unwrap();

    assert_eq!(report.outcomes().len(), 3);
    let start = report.outcome_for(&format!("{}/start", base_url)).unwrap();
    assert_eq!(start.status(), Some(301));
    assert_eq!(
        start.next_url(),
        Some(format!("{}/middle", base_url).as_str())
    );
    assert_eq!(report.statistics().redirects, 2);
}

#[tokio::test]
async fn test_redirect_budget_enforced() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_redirect(&mock_server, "/r1", "/r2", 1).await;
    mount_redirect(&mock_server, "/r2", "/r3", 1).await;
    mount_html(&mock_server, "/r3", "<p>unreachable</p>".to_string(), 0).await;

    let mut config = create_test_config(&format!("{}/r1", base_url));
    config.crawler.max_redirect = 1;

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.outcomes().len(), 2);
    assert!(report.outcome_for(&format!("{}/r3", base_url)).is_none());
}

#[tokio::test]
async fn test_exclude_pattern_skips_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/report.pdf">PDF</a><a href="/keep">Keep</a>"#.to_string(),
        1,
    )
    .await;
    mount_html(&mock_server, "/keep", "<p>kept</p>".to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.exclude = Some(r"\.pdf$".to_string());

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.outcomes().len(), 2);
    let root = report.outcome_for(&format!("{}/", base_url)).unwrap();
    assert_eq!(root.link_count(), 1);
}

#[tokio::test]
async fn test_unreachable_root_reported() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut config = create_test_config(&format!("127.0.0.1:{}", port));
    config.crawler.max_tries = 2;

    let report = crawl(&config).await.unwrap();

    assert_eq!(report.outcomes().len(), 1);
    let outcome = &report.outcomes()[0];
    assert_eq!(outcome.status(), None);
    assert!(outcome.failure().is_some());
    assert_eq!(report.statistics().failures, 1);
}

#[tokio::test]
async fn test_single_task_completes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#.to_string(),
        1,
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_html(&mock_server, route, "<p>leaf</p>".to_string(), 1).await;
    }

    let mut config = create_test_config(&base_url);
    config.crawler.max_tasks = 1;

    let report = Coordinator::new(&config).unwrap().run().await;
    assert_eq!(report.outcomes().len(), 4);
}

#[tokio::test]
async fn test_parse_links_from_live_response() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/a">a</a><a href="/b#top">b</a>"#.to_string(),
        1,
    )
    .await;

    let client = build_http_client(&UserAgentConfig::default()).unwrap();
    let fetcher = Fetcher::new(client, 1);
    let scope = CrawlScope::new(&[base_url.as_str()], None, true);
    let parser = ResponseParser::new(Arc::new(scope));

    let url = url::Url::parse(&base_url).unwrap();
    let response = match fetcher.fetch(&url, 10).await {
        FetchReply::Fetched { response, .. } => response,
        FetchReply::Exhausted(outcome) => panic!("fetch failed: {:?}", outcome),
    };

    let seen: HashSet<Link> = [Link::parse(&format!("{}/a", base_url)).unwrap()]
        .into_iter()
        .collect();
    let (outcome, links) = parser.parse_links(response, &seen).await;

    assert_eq!(links.len(), 2);
    assert!(links.contains(&Link::parse(&format!("{}/b", base_url)).unwrap()));
    assert_eq!(outcome.link_count(), 2);
    assert_eq!(outcome.new_link_count(), 1);
    assert_eq!(outcome.encoding(), Some("utf-8"));

    fetcher.close();
}

#[tokio::test]
async fn test_truncated_body_reported_as_unreadable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Promises more bytes than it sends, then closes the connection
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;

        let body = r#"<a href="/a">a</a>"#;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
            body.len() + 500
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(body.as_bytes()).await.unwrap();
    });

    let base_url = format!("http://{}", addr);
    let client = build_http_client(&UserAgentConfig::default()).unwrap();
    let fetcher = Fetcher::new(client, 1);
    let scope = CrawlScope::new(&[base_url.as_str()], None, true);
    let parser = ResponseParser::new(Arc::new(scope));

    let url = url::Url::parse(&base_url).unwrap();
    let response = match fetcher.fetch(&url, 10).await {
        FetchReply::Fetched { response, .. } => response,
        FetchReply::Exhausted(outcome) => panic!("fetch failed: {:?}", outcome),
    };

    let (outcome, links) = parser.parse_links(response, &HashSet::<Link>::new()).await;

    assert!(links.is_empty());
    assert_eq!(outcome.status(), Some(200));
    assert!(outcome.failure().is_some());
    assert_eq!(outcome.size(), 0);
    assert_eq!(outcome.link_count(), 0);
    assert_eq!(outcome.new_link_count(), 0);
    assert!(!outcome.is_success());

    fetcher.close();
}
