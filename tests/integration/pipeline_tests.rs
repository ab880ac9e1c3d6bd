//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve result pages and index documents and
//! check the stores a run leaves behind.

use race_harvest::config::{Config, CourseEntry};
use race_harvest::discovery::UrlDiscovery;
use race_harvest::pipeline::{
    collect_failures, scrape, Fetcher, Pipeline, RandomHeaders, RetryCoordinator,
};
use race_harvest::request::{RaceCode, ScrapeRequest};
use race_harvest::sink::{read_failure_store, read_record_store, StorePaths};
use race_harvest::{Outcome, PageVerdict, TransportErrorKind};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RACE_PAGE: &str = r#"<html><head><title>Result</title></head><body>
    <div class="rp-raceInfo"><ul><li>Class 4</li><li>3yo+</li></ul></div>
    </body></html>"#;

/// Creates a test configuration pointing the site at the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.fetcher.timeout_ms = 300;
    config.fetcher.connect_timeout_ms = 300;
    config.fetcher.max_attempts = 1;
    config.fetcher.concurrency = 3;
    config.fetcher.backoff_base_ms = 10;
    config.fetcher.backoff_max_ms = 50;
    config.site.base_url = server.uri();
    config.site.course_index_url = format!("{}/profile/course/filter/results", server.uri());
    config.courses = vec![CourseEntry {
        id: "11".to_string(),
        name: "Ascot".to_string(),
        region: "gb".to_string(),
    }];
    config
}

fn race_path(race_id: u32) -> String {
    format!("/results/11/ascot/2024-06-18/{}", race_id)
}

fn race_url(server: &MockServer, race_id: u32) -> String {
    format!("{}{}", server.uri(), race_path(race_id))
}

async fn mount_page(server: &MockServer, race_id: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(race_path(race_id)))
        .respond_with(response)
        .mount(server)
        .await;
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_scrape_writes_records_and_failures() {
    let server = MockServer::start().await;
    mount_page(&server, 1, html(RACE_PAGE)).await;
    mount_page(&server, 2, ResponseTemplate::new(404)).await;
    mount_page(
        &server,
        3,
        html(RACE_PAGE).set_delay(Duration::from_secs(2)),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let paths = StorePaths::for_scrape(dir.path(), "2024");
    let urls = vec![race_url(&server, 1), race_url(&server, 2), race_url(&server, 3)];

    let report = scrape(Arc::new(create_test_config(&server)), &urls, &paths)
        .await
        .unwrap();

    assert_eq!(report.counts.attempted, 3);
    assert_eq!(report.counts.succeeded, 1);
    assert_eq!(report.counts.failed, 2);
    assert_eq!(report.counts.skipped, 0);
    assert_eq!(report.counts.failure_kinds.get("http_error"), Some(&1));
    assert_eq!(report.counts.failure_kinds.get("transport_failure"), Some(&1));

    let text = std::fs::read_to_string(&paths.records).unwrap();
    assert!(text.contains("\"Class 4 ||3yo+\""));

    let (header, rows) = read_record_store(&paths.records).unwrap();
    assert_eq!(
        header,
        vec!["date", "course_id", "course", "race_id", "race_info", "url"]
    );
    assert_eq!(
        rows,
        vec![vec![
            "2024-06-18".to_string(),
            "11".to_string(),
            "ascot".to_string(),
            "1".to_string(),
            "Class 4 ||3yo+".to_string(),
            race_url(&server, 1),
        ]]
    );

    let mut failures = read_failure_store(&paths.failures).unwrap();
    failures.sort();
    assert_eq!(failures, vec![race_url(&server, 2), race_url(&server, 3)]);
}

#[tokio::test]
async fn test_retry_pass_recovers_fixed_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // A failure store left by an earlier run
    let scrape_dir = dir.path().join("gb").join("flat");
    std::fs::create_dir_all(&scrape_dir).unwrap();
    std::fs::write(
        scrape_dir.join("errors_2024_extra.csv"),
        format!("url\n{}\n{}\n", race_url(&server, 2), race_url(&server, 3)),
    )
    .unwrap();

    // The 404 has been fixed; the slow page is still slow
    mount_page(&server, 2, html(RACE_PAGE)).await;
    mount_page(
        &server,
        3,
        html(RACE_PAGE).set_delay(Duration::from_secs(2)),
    )
    .await;

    let pipeline = Pipeline::new(Arc::new(create_test_config(&server))).unwrap();
    let retry_dir = dir.path().join("retry");
    let report = RetryCoordinator::new(&pipeline)
        .retry_sources(&[dir.path().to_path_buf()], &retry_dir)
        .await
        .unwrap();

    assert_eq!(report.counts.attempted, 2);
    assert_eq!(report.counts.succeeded, 1);
    assert_eq!(report.records_path, retry_dir.join("retry_results.csv"));

    let (_, rows) = read_record_store(&retry_dir.join("retry_results.csv")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][3], "2");

    let failures = read_failure_store(&retry_dir.join("retry_errors.csv")).unwrap();
    assert_eq!(failures, vec![race_url(&server, 3)]);
}

#[tokio::test]
async fn test_soft_error_and_redirect_pages_fail() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        html("<html><body><h1>Sorry, this page no longer available</h1></body></html>"),
    )
    .await;
    mount_page(
        &server,
        2,
        ResponseTemplate::new(302).insert_header("location", "/error"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(html("<html><body>Something went wrong</body></html>"))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(Arc::new(create_test_config(&server))).unwrap();

    match pipeline.process_url(&race_url(&server, 1)).await {
        Outcome::Failure { reason, .. } => assert_eq!(reason.kind(), "content_indicates_error"),
        other => panic!("expected failure, got {:?}", other),
    }

    let fetch = pipeline.fetcher().fetch(&race_url(&server, 2)).await;
    assert_eq!(
        pipeline.validator().classify(&fetch),
        PageVerdict::RedirectedToError
    );
    assert!(pipeline.process_url(&race_url(&server, 2)).await.is_failure());
}

#[tokio::test]
async fn test_void_race_is_skipped_and_not_stored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        html(r#"<html><body><div class="rp-raceVoid">Race void</div></body></html>"#),
    )
    .await;

    let mut config = create_test_config(&server);
    config.extract.void_markers = vec!["div.rp-raceVoid".to_string()];

    let dir = TempDir::new().unwrap();
    let paths = StorePaths::for_scrape(dir.path(), "2024");
    let report = scrape(Arc::new(config), &[race_url(&server, 1)], &paths)
        .await
        .unwrap();

    assert_eq!(report.counts.skipped, 1);
    assert!(read_record_store(&paths.records).unwrap().1.is_empty());
    assert!(read_failure_store(&paths.failures).unwrap().is_empty());
}

#[tokio::test]
async fn test_every_url_gets_exactly_one_outcome() {
    let server = MockServer::start().await;
    for race_id in 1..=6 {
        mount_page(&server, race_id, html(RACE_PAGE)).await;
    }
    for race_id in 7..=9 {
        mount_page(&server, race_id, ResponseTemplate::new(500)).await;
    }

    let mut urls: Vec<String> = (1..=10).map(|id| race_url(&server, id)).collect();
    urls.push(format!("{}/results/11", server.uri()));

    let dir = TempDir::new().unwrap();
    let paths = StorePaths::for_scrape(dir.path(), "2024");
    let report = scrape(Arc::new(create_test_config(&server)), &urls, &paths)
        .await
        .unwrap();

    let (_, rows) = read_record_store(&paths.records).unwrap();
    let failures = read_failure_store(&paths.failures).unwrap();

    assert_eq!(report.counts.attempted, urls.len());
    assert_eq!(rows.len(), 6);
    // 3 server errors, 1 unmounted page (404), 1 malformed URL
    assert_eq!(failures.len(), 5);
    assert_eq!(rows.len() + failures.len() + report.counts.skipped, urls.len());
}

#[tokio::test]
async fn test_rate_limited_page_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(race_path(1)))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 1, html(RACE_PAGE)).await;

    let mut config = create_test_config(&server);
    config.fetcher.max_attempts = 2;
    let pipeline = Pipeline::new(Arc::new(config)).unwrap();

    let outcome = pipeline.process_url(&race_url(&server, 1)).await;
    assert!(outcome.is_success(), "got {:?}", outcome);
}

#[tokio::test]
async fn test_slow_page_reports_timeout() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        html(RACE_PAGE).set_delay(Duration::from_secs(2)),
    )
    .await;

    let pipeline = Pipeline::new(Arc::new(create_test_config(&server))).unwrap();
    let fetch = pipeline.fetcher().fetch(&race_url(&server, 1)).await;
    assert_eq!(fetch.transport_error, Some(TransportErrorKind::Timeout));
}

#[test]
fn test_collect_failures_across_runs() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("errors_2023_extra.csv");
    let b = dir.path().join("errors_2024_extra.csv");
    std::fs::write(&a, "url\nhttps://x.test/results/1/a/2023-01-01/1\nhttps://x.test/results/1/a/2023-01-01/2\n").unwrap();
    std::fs::write(&b, "url\nhttps://x.test/results/1/a/2023-01-01/2\n\n").unwrap();

    let urls = collect_failures(&[a, b]).unwrap();
    assert_eq!(urls.len(), 2);
}

fn discovery(config: &Config) -> UrlDiscovery {
    let fetcher = Fetcher::new(
        &config.fetcher,
        Arc::new(RandomHeaders::new(&config.headers)),
    )
    .unwrap();
    UrlDiscovery::new(fetcher, config.site.clone()).unwrap()
}

#[tokio::test]
async fn test_discovery_by_course() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/course/filter/results/11/2023/flat/all-races"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data": {"principleRaceResults": [
                {"raceDatetime": "2023-06-20T14:30:00", "raceInstanceUid": 2002},
                {"raceDatetime": "2023-06-20T13:50:00", "raceInstanceUid": 2001}
            ]}}"#,
        ))
        .mount(&server)
        .await;
    // 2024 has no mock and answers 404; that index is skipped

    let config = create_test_config(&server);
    let request =
        ScrapeRequest::for_courses(&config, &["11".to_string()], None, "2023-2024", RaceCode::Flat)
            .unwrap();

    let urls = discovery(&config).discover(&request).await;
    assert_eq!(
        urls,
        vec![
            format!("{}/results/11/Ascot/2023-06-20/2001", server.uri()),
            format!("{}/results/11/Ascot/2023-06-20/2002", server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_discovery_by_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/2024-06-18"))
        .respond_with(html(
            r#"<html><body>
            <a data-test-selector="link-listCourseNameLink" href="/results/11/ascot/2024-06-18/1">Ascot</a>
            <a data-test-selector="link-listCourseNameLink" href="/results/175/leopardstown/2024-06-18/9">Leopardstown</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let request = ScrapeRequest::for_dates(&config, "2024/06/18", "gb", RaceCode::Flat).unwrap();

    let urls = discovery(&config).discover(&request).await;
    assert_eq!(urls, vec![race_url(&server, 1)]);
}

#[test]
fn test_missing_config_halts_before_any_work() {
    let dir = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_race-harvest"))
        .current_dir(dir.path())
        .args([
            "--config",
            "missing-settings.toml",
            "scrape",
            "--region",
            "gb",
            "--years",
            "2023",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Configuration file not found"),
        "stderr: {}",
        stderr
    );
    // No stores or data directories were created
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
