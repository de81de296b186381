//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve pages and a temporary SQLite database
//! to run the full fetch → parse → store cycle end-to-end.

use linkscrape::config::{Config, OutputConfig, PipelineConfig, SeedConfig, UserAgentConfig};
use linkscrape::crawler::build_http_client;
use linkscrape::storage::open_store;
use linkscrape::{
    HtmlLinkExtractor, HttpFetcher, Pipeline, PipelineSettings, Report, ScrapeError,
    SqliteLinkStore,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><body><a href="/x">X</a></body></html>"#;

/// A mock server plus an initialized database in a temporary directory
struct TestEnv {
    server: MockServer,
    dir: TempDir,
    store: SqliteLinkStore,
}

impl TestEnv {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&dir.path().join("links.db"))
            .await
            .expect("Failed to open store");
        Self { server, dir, store }
    }

    fn url(&self, page: &str) -> String {
        format!("{}{}", self.server.uri(), page)
    }

    async fn serve_html(&self, page: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "text/html"),
            )
            .mount(&self.server)
            .await;
    }

    fn pipeline(&self, workers: usize, timeout: Duration) -> Pipeline {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30))
            .expect("Failed to build client");
        Pipeline::new(
            Arc::new(HttpFetcher::new(client)),
            Arc::new(HtmlLinkExtractor::default()),
            Arc::new(self.store.clone()),
            PipelineSettings { workers, timeout },
        )
    }

    async fn run(&self, urls: Vec<String>) -> Report {
        self.pipeline(2, Duration::from_secs(30)).run(urls).await
    }
}

#[tokio::test]
async fn test_two_pages_are_stored() {
    let env = TestEnv::new().await;
    env.serve_html("/a", PAGE).await;
    env.serve_html("/b", PAGE).await;

    let config = Config {
        pipeline: PipelineConfig {
            workers: 2,
            ..Default::default()
        },
        output: OutputConfig {
            database_path: env.dir.path().join("links.db").display().to_string(),
        },
        seeds: SeedConfig {
            urls: vec![env.url("/a"), env.url("/b")],
        },
        ..Default::default()
    };
    let pipeline = Pipeline::from_config(&config, env.store.clone()).unwrap();

    let report = pipeline.run(config.seeds.urls.clone()).await;

    assert_eq!(report.successes.len(), 2);
    assert_eq!(report.failures().count(), 0);
    assert_eq!(env.store.count_links().unwrap(), 2);
    for url in [env.url("/a"), env.url("/b")] {
        let links = env.store.links_for(&url).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/x");
        assert_eq!(links[0].text, "X");
    }
}

#[tokio::test]
async fn test_not_found_is_fetch_error() {
    let env = TestEnv::new().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&env.server)
        .await;
    let url = env.url("/missing");

    let report = env.run(vec![url.clone()]).await;

    assert_eq!(report.fetch_failures.len(), 1);
    match report.fetch_failures[0].error() {
        Some(ScrapeError::Fetch(err)) => {
            assert_eq!(err.status_code, 404);
            assert_eq!(err.url, url);
        }
        other => panic!("expected fetch error, got {:?}", other),
    }
    assert_eq!(env.store.count_links_for(&url).unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let env = TestEnv::new().await;
    Mock::given(method("GET"))
        .and(path("/garbled"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x3c, 0x61, 0xff, 0xfe, 0x00, 0xc3])
                .insert_header("content-type", "text/html"),
        )
        .mount(&env.server)
        .await;
    let url = env.url("/garbled");

    let report = env.run(vec![url.clone()]).await;

    assert_eq!(report.parse_failures.len(), 1);
    assert!(matches!(
        report.parse_failures[0].error(),
        Some(ScrapeError::Parse(_))
    ));
    assert_eq!(env.store.count_links_for(&url).unwrap(), 0);
}

#[tokio::test]
async fn test_rejected_insert_rolls_back_whole_page() {
    let env = TestEnv::new().await;
    env.serve_html(
        "/mixed",
        r#"<a href="/x">X</a><a href="/boom">Boom</a><a href="/y">Y</a>"#,
    )
    .await;
    let url = env.url("/mixed");

    // The second insert of the batch fails after the first already succeeded
    let conn = rusqlite::Connection::open(env.dir.path().join("links.db")).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON links
         WHEN NEW.href = '/boom'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();
    drop(conn);

    let report = env.run(vec![url.clone()]).await;

    assert!(report.successes.is_empty());
    assert_eq!(report.storage_failures.len(), 1);
    let result = &report.storage_failures[0];
    assert!(result.links().is_empty());
    assert!(matches!(result.error(), Some(ScrapeError::Storage { .. })));
    assert_eq!(env.store.count_links_for(&url).unwrap(), 0);
}

#[tokio::test]
async fn test_unreachable_host_is_fetch_error() {
    let env = TestEnv::new().await;

    let report = env.run(vec!["http://127.0.0.1:1/".to_string()]).await;

    assert_eq!(report.fetch_failures.len(), 1);
    match report.fetch_failures[0].error() {
        Some(ScrapeError::Fetch(err)) => assert_eq!(err.status_code, 0),
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mixed_outcomes_are_all_reported() {
    let env = TestEnv::new().await;
    env.serve_html("/ok", PAGE).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&env.server)
        .await;

    let report = env
        .run(vec![env.url("/ok"), env.url("/broken"), env.url("/ok")])
        .await;

    assert_eq!(report.total_results(), 3);
    assert_eq!(report.successes.len(), 2);
    assert_eq!(report.fetch_failures.len(), 1);
    assert_eq!(env.store.count_links_for(&env.url("/ok")).unwrap(), 2);
}

#[tokio::test]
async fn test_many_urls_each_reported_once() {
    let env = TestEnv::new().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .insert_header("content-type", "text/html"),
        )
        .mount(&env.server)
        .await;
    let urls: Vec<String> = (0..25).map(|i| env.url(&format!("/page/{}", i))).collect();

    let report = env.pipeline(4, Duration::from_secs(30)).run(urls).await;

    assert_eq!(report.successes.len(), 25);
    assert!(report.not_attempted.is_empty());
    assert_eq!(env.store.count_links().unwrap(), 25);
    assert_eq!(env.store.link_counts_by_url().unwrap().len(), 25);
}

#[tokio::test]
async fn test_deadline_cancels_slow_fetch() {
    let env = TestEnv::new().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&env.server)
        .await;
    let urls: Vec<String> = (0..3).map(|i| env.url(&format!("/slow/{}", i))).collect();

    let started = Instant::now();
    let report = env
        .pipeline(1, Duration::from_millis(300))
        .run(urls)
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.fetch_failures.len(), 1);
    let err = report.fetch_failures[0].error().unwrap();
    assert!(err.is_timeout());
    assert_eq!(report.not_attempted.len(), 2);
    assert_eq!(report.total_urls(), 3);
    assert_eq!(env.store.count_links().unwrap(), 0);
}

#[tokio::test]
async fn test_shutdown_token_stops_run() {
    let env = TestEnv::new().await;
    env.serve_html("/a", PAGE).await;
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let report = env
        .pipeline(2, Duration::from_secs(30))
        .run_until(vec![env.url("/a")], &shutdown)
        .await;

    assert_eq!(report.total_results(), 0);
    assert_eq!(report.not_attempted, vec![env.url("/a")]);
    assert_eq!(env.store.count_links().unwrap(), 0);
}
