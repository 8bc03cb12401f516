//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl-then-download cycle end-to-end.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use sumi_sieve::config::{CrawlConfig, PaginationConfig};
use sumi_sieve::output::MANIFEST_FILE;
use sumi_sieve::{ChannelSink, Controller, CrawlEvent, CrawlPhase, SieveError};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at the mock server root
fn create_test_config(server: &MockServer, dir: &TempDir) -> CrawlConfig {
    let mut config = CrawlConfig::new(format!("{}/", server.uri()), dir.path().to_string_lossy());
    config.crawler.workers = 8;
    config.crawler.page_timeout_secs = 5;
    config.download.timeout_secs = 5;
    config
}

/// A GET mock serving an HTML page
fn html_page(route: &str, body: impl Into<String>) -> Mock {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8"))
}

/// A GET mock serving image bytes
fn image(route: &str, bytes: &[u8], mime: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes.to_vec(), mime))
}

fn controller_with_events() -> (Controller, UnboundedReceiver<CrawlEvent>) {
    let (sink, rx) = ChannelSink::new();
    (Controller::new(Arc::new(sink)), rx)
}

fn drain_logs(rx: &mut UnboundedReceiver<CrawlEvent>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let CrawlEvent::Log(line) = event {
            lines.push(line);
        }
    }
    lines
}

#[tokio::test]
async fn test_cyclic_site_fetches_each_page_once() {
    let server = MockServer::start().await;
    let uri = server.uri();

    html_page("/", r#"<a href="/a">A</a><a href="/b">B</a><img src="/img/1.png">"#)
        .expect(1)
        .mount(&server)
        .await;
    html_page("/a", r#"<a href="/">home</a><a href="/b#frag">B</a><img src="/img/1.png">"#)
        .expect(1)
        .mount(&server)
        .await;
    html_page("/b", r#"<a href="/a">A</a><a href="/">home</a><img src="/img/2.png">"#)
        .expect(1)
        .mount(&server)
        .await;
    image("/img/1.png", b"one", "image/png").mount(&server).await;
    image("/img/2.png", b"two", "image/png").mount(&server).await;

    let dir = TempDir::new().unwrap();
    let controller = Controller::default();
    let report = controller
        .run(create_test_config(&server, &dir))
        .await
        .unwrap();

    let expected_visited: BTreeSet<String> = ["/", "/a", "/b"]
        .iter()
        .map(|p| format!("{}{}", uri, p))
        .collect();
    assert_eq!(report.visited, expected_visited);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.images.len(), 2);
    assert_eq!(report.download.downloaded.len(), 2);
    assert!(!report.cancelled);
    assert_eq!(controller.phase(), CrawlPhase::Done);
}

#[tokio::test]
async fn test_depth_limit_stops_following_links() {
    let server = MockServer::start().await;

    html_page("/", r#"<a href="/d1">1</a>"#).expect(1).mount(&server).await;
    html_page("/d1", r#"<a href="/d2">2</a><img src="/deep.png">"#)
        .expect(1)
        .mount(&server)
        .await;
    html_page("/d2", r#"<a href="/d3">3</a>"#).expect(0).mount(&server).await;
    image("/deep.png", b"deep", "image/png").mount(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.crawler.max_depth = 1;

    let report = Controller::default().run(config).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    // Images on the last level are still harvested
    assert_eq!(report.images.len(), 1);
}

#[tokio::test]
async fn test_slow_page_links_are_not_lost() {
    let server = MockServer::start().await;

    html_page("/", r#"<a href="/slow">slow</a><a href="/fast">fast</a>"#)
        .expect(1)
        .mount(&server)
        .await;
    html_page("/fast", "<p>nothing here</p>").expect(1).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/late">late</a>"#, "text/html")
                .set_delay(Duration::from_millis(600)),
        )
        .expect(1)
        .mount(&server)
        .await;
    html_page("/late", r#"<img src="/late.gif">"#).expect(1).mount(&server).await;
    image("/late.gif", b"GIF89a", "image/gif").expect(1).mount(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.crawler.workers = 4;

    let report = Controller::default().run(config).await.unwrap();

    assert_eq!(report.pages_fetched, 4);
    assert_eq!(report.download.downloaded.len(), 1);
    assert!(dir.path().join("img_0.gif").exists());
}

#[tokio::test]
async fn test_stop_drains_in_flight_and_dispatches_nothing_new() {
    let server = MockServer::start().await;

    html_page(
        "/",
        r#"<img src="/img.png"><a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a><a href="/p4">4</a>"#,
    )
    .expect(1)
    .mount(&server)
    .await;
    for route in ["/p1", "/p2", "/p3", "/p4"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"<a href="/deep">deep</a>"#, "text/html")
                    .set_delay(Duration::from_millis(800)),
            )
            .mount(&server)
            .await;
    }
    html_page("/deep", "<p>never</p>").expect(0).mount(&server).await;
    image("/img.png", b"img", "image/png").expect(0).mount(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.crawler.workers = 2;

    let (controller, mut rx) = controller_with_events();
    let handle = controller.start(config).unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.stop();
    assert_eq!(controller.phase(), CrawlPhase::Stopping);

    // Stopping twice is harmless
    controller.stop();

    let report = tokio::time::timeout(Duration::from_secs(10), handle.wait())
        .await
        .unwrap()
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.download.skipped, 1);
    assert!(report.download.downloaded.is_empty());
    assert_eq!(controller.phase(), CrawlPhase::Done);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/p4"));

    let logs = drain_logs(&mut rx);
    assert_eq!(
        logs.iter()
            .filter(|l| l.as_str() == "[STOP] Graceful shutdown requested...")
            .count(),
        1
    );
    assert_eq!(logs.last().map(String::as_str), Some("[DONE] Crawl complete."));
}

#[tokio::test]
async fn test_result_sets_independent_of_worker_count() {
    let server = MockServer::start().await;

    html_page("/", r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a><img src="/i/0.png">"#)
        .mount(&server)
        .await;
    html_page("/a", r#"<a href="/b">b</a><a href="/d">d</a><img src="/i/1.png"><img src="/i/0.png">"#)
        .mount(&server)
        .await;
    html_page("/b", r#"<a href="/a">a</a><a href="/e">e</a><img src="/i/2.png">"#)
        .mount(&server)
        .await;
    html_page("/c", r#"<a href="/">home</a><img src="/i/3.png">"#)
        .mount(&server)
        .await;
    html_page("/d", r#"<a href="/f">f</a><img src="/i/4.png">"#)
        .mount(&server)
        .await;
    html_page("/e", r#"<img src="/i/5.png"><img src="data:image/png;base64,AAAA">"#)
        .mount(&server)
        .await;
    html_page("/f", r#"<img src="/i/6.png">"#).mount(&server).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"px".to_vec(), "image/png"))
        .mount(&server)
        .await;

    let mut results = Vec::new();
    for workers in [1, 64] {
        let dir = TempDir::new().unwrap();
        let mut config = create_test_config(&server, &dir);
        config.crawler.workers = workers;
        config.crawler.max_depth = 3;

        let report = Controller::default().run(config).await.unwrap();
        results.push((report.visited, report.images));
    }

    assert_eq!(results[0], results[1]);
    // /f sits at depth 3 and is reached with remaining depth 0
    assert_eq!(results[0].0.len(), 7);
    assert_eq!(results[0].1.len(), 7);
}

#[tokio::test]
async fn test_downloads_and_manifest() {
    let server = MockServer::start().await;
    let uri = server.uri();

    html_page(
        "/",
        r#"<img src="/a.png"><img src="/b.gif"><img src="/c"><img src="/missing.png">"#,
    )
    .mount(&server)
    .await;
    image("/a.png", b"png-data", "image/png").expect(1).mount(&server).await;
    image("/b.gif", b"gif-data", "image/gif").expect(1).mount(&server).await;
    image("/c", b"jpeg-data", "image/jpeg").expect(1).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.download.manifest = true;

    let (controller, mut rx) = controller_with_events();
    let report = controller.run(config).await.unwrap();

    assert_eq!(report.download.total, 4);
    assert_eq!(report.download.failed, 1);
    assert_eq!(report.download.downloaded.len(), 3);

    let expected = [
        (format!("{}/a.png", uri), ".png", b"png-data".as_slice()),
        (format!("{}/b.gif", uri), ".gif", b"gif-data".as_slice()),
        (format!("{}/c", uri), ".jpg", b"jpeg-data".as_slice()),
    ];
    for (url, ext, bytes) in &expected {
        let image = report
            .download
            .downloaded
            .iter()
            .find(|d| &d.url == url)
            .unwrap_or_else(|| panic!("{} was not downloaded", url));
        let name = image.path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, format!("img_{}{}", image.index, ext));
        assert_eq!(std::fs::read(&image.path).unwrap(), *bytes);
    }

    // Three images plus the manifest; the failed download left nothing behind
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 4);

    let manifest = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    for image in &report.download.downloaded {
        let name = image.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(manifest.contains(&format!("| {} | {} |", name, image.url)));
    }
    assert!(!manifest.contains("missing.png"));

    let logs = drain_logs(&mut rx);
    assert!(logs.iter().any(|l| l == "[DL] Starting downloads for 4 images"));
    assert!(logs
        .iter()
        .any(|l| l.starts_with(&format!("[DL ERR] {}/missing.png: ", uri))));
    assert!(logs.iter().any(|l| l == "[DL COMPLETE]"));
}

#[tokio::test]
async fn test_external_links_respect_policy() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    html_page("/", format!(r#"<a href="{}/ext">ext</a>"#, external.uri()))
        .mount(&site)
        .await;

    // Same-host only: the external server must not be contacted
    {
        html_page("/ext", "<p>external</p>")
            .expect(0)
            .named("external blocked")
            .mount(&external)
            .await;

        let dir = TempDir::new().unwrap();
        let mut config = create_test_config(&site, &dir);
        config.crawler.include_subdomains = false;

        let report = Controller::default().run(config).await.unwrap();
        assert_eq!(report.visited.len(), 1);
        external.verify().await;
        external.reset().await;
    }

    // External allowed: followed exactly once
    html_page("/ext", "<p>external</p>")
        .expect(1)
        .mount(&external)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&site, &dir);
    config.crawler.include_external = true;

    let report = Controller::default().run(config).await.unwrap();
    assert_eq!(report.visited.len(), 2);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_auto_pagination_ignores_depth() {
    let server = MockServer::start().await;

    html_page("/", r#"<a href="/gallery?page=2">next</a><a href="/other">other</a>"#)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gallery"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="?page=3">next</a><img src="/p2.png">"#, "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gallery"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="?page=2">prev</a><img src="/p3.png">"#, "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    html_page("/other", "<p>other</p>").expect(0).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/p2.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"2".to_vec(), "image/png"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p3.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"3".to_vec(), "image/png"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.crawler.max_depth = 0;
    config.crawler.auto_pagination = true;

    let report = Controller::default().run(config).await.unwrap();

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.images.len(), 2);
}

#[tokio::test]
async fn test_manual_pagination_seeds_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();

    html_page("/", "<p>root</p>").expect(1).mount(&server).await;
    for n in 1..=3 {
        Mock::given(method("GET"))
            .and(path("/list"))
            .and(query_param("page", n.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                format!(r#"<a href="/item{}">item</a>"#, n),
                "text/html",
            ))
            .expect(1)
            .mount(&server)
            .await;
        html_page(&format!("/item{}", n), "<p>item</p>")
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.crawler.max_depth = 0;
    config.pagination = Some(PaginationConfig {
        pattern: format!("{}/list?page={{n}}", uri),
        start: 1,
        end: 3,
    });

    let (controller, mut rx) = controller_with_events();
    let report = controller.run(config).await.unwrap();

    // Root plus three pages plus one hop from each page
    assert_eq!(report.pages_fetched, 7);
    let logs = drain_logs(&mut rx);
    assert!(logs
        .iter()
        .any(|l| l == "[PAGE GEN] Added 3 manual pagination URLs"));
}

#[tokio::test]
async fn test_invalid_pagination_pattern_only_warns() {
    let server = MockServer::start().await;
    html_page("/", "<p>root</p>").expect(1).mount(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.pagination = Some(PaginationConfig {
        pattern: format!("{}/list?page=1", server.uri()),
        start: 1,
        end: 5,
    });

    let (controller, mut rx) = controller_with_events();
    let report = controller.run(config).await.unwrap();

    assert_eq!(report.visited.len(), 1);
    let logs = drain_logs(&mut rx);
    assert!(logs
        .iter()
        .any(|l| l == "[WARN] Invalid pagination pattern (missing {n})"));
}

#[tokio::test]
async fn test_start_rejected_while_running_then_restart_allowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>slow</p>", "text/html")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let controller = Controller::default();

    let handle = controller.start(create_test_config(&server, &dir)).unwrap();
    assert_eq!(controller.phase(), CrawlPhase::Crawling);

    let second = controller.start(create_test_config(&server, &dir));
    assert!(matches!(
        second,
        Err(SieveError::AlreadyRunning {
            phase: CrawlPhase::Crawling
        })
    ));

    let first = handle.wait().await.unwrap();
    assert_eq!(first.pages_fetched, 1);
    assert_eq!(controller.phase(), CrawlPhase::Done);

    // A finished controller accepts a new run with fresh state
    let again = controller
        .run(create_test_config(&server, &dir))
        .await
        .unwrap();
    assert_eq!(again.visited.len(), 1);
    assert!(!again.cancelled);
}

#[tokio::test]
async fn test_fetch_errors_are_reported_not_fatal() {
    let server = MockServer::start().await;

    html_page("/", r#"<a href="/broken">b</a><a href="/ok">ok</a>"#)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    html_page("/ok", "<p>fine</p>").expect(1).mount(&server).await;

    let dir = TempDir::new().unwrap();
    let (controller, mut rx) = controller_with_events();
    let report = controller
        .run(create_test_config(&server, &dir))
        .await
        .unwrap();

    assert_eq!(report.page_errors, 1);
    assert_eq!(report.pages_fetched, 2);

    let logs = drain_logs(&mut rx);
    assert!(logs
        .iter()
        .any(|l| l.starts_with(&format!("[ERR] {}/broken: ", server.uri()))));
    assert!(logs.iter().any(|l| l.starts_with("[START] Crawling ")));
}

#[tokio::test]
async fn test_stop_during_downloads_finishes_dispatched_image() {
    let server = MockServer::start().await;

    html_page("/", r#"<img src="/1.png"><img src="/2.png"><img src="/3.png">"#)
        .expect(1)
        .mount(&server)
        .await;
    for route in ["/1.png", "/2.png", "/3.png"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"img".to_vec(), "image/png")
                    .set_delay(Duration::from_millis(600)),
            )
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &dir);
    config.download.concurrency = 1;

    let controller = Controller::default();
    let handle = controller.start(config).unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.phase() != CrawlPhase::Downloading {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    controller.stop();
    assert_eq!(controller.phase(), CrawlPhase::Stopping);

    let report = tokio::time::timeout(Duration::from_secs(10), handle.wait())
        .await
        .unwrap()
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.download.total, 3);
    assert_eq!(report.download.downloaded.len(), 1);
    assert_eq!(report.download.skipped, 2);
    assert!(report.download.downloaded[0].path.exists());
    assert_eq!(controller.phase(), CrawlPhase::Done);

    let image_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with(".png"))
        .count();
    assert_eq!(image_requests, 1);
}
