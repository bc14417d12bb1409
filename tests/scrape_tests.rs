//! Integration tests for the scrape engine
//!
//! These tests use wiremock to stand up real HTTP servers and run the full
//! fetch → parse → persist cycle through the public API, with results
//! written to temporary directories.

use kumo::config::{ParseConfig, ParseMode, RunnerConfig, ScrapeConfig};
use kumo::output::JsonSink;
use kumo::parse::parser_from_config;
use kumo::{FetchErrorRecord, HttpFetcher, ParseErrorRecord, RunOutcome, Scraper};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(name: &str, concurrency: usize, output_dir: &TempDir) -> ScrapeConfig {
    ScrapeConfig {
        job: kumo::config::JobConfig {
            name: name.to_string(),
            output_dir: output_dir.path().to_path_buf(),
        },
        runner: RunnerConfig {
            concurrency,
            timeout_secs: 2,
            user_agent: "kumo-test/0.1".to_string(),
        },
        parse: ParseConfig {
            mode: ParseMode::Status,
            selector: None,
        },
        seeds: vec![],
    }
}

fn build_scraper(config: &ScrapeConfig) -> Scraper {
    let fetcher = Arc::new(HttpFetcher::new(&config.runner.user_agent).unwrap());
    let parser = parser_from_config(&config.parse).unwrap();
    let sink = Arc::new(JsonSink::new(config.job.output_dir.clone()));
    Scraper::new(config, fetcher, parser, sink)
}

fn read_data(dir: &TempDir, name: &str) -> Vec<serde_json::Value> {
    let raw = std::fs::read_to_string(dir.path().join(format!("{name}.json"))).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn read_fetch_errors(dir: &TempDir, name: &str) -> Vec<FetchErrorRecord> {
    let raw = std::fs::read_to_string(dir.path().join(format!("{name}_fetch_err.json"))).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn read_parse_errors(dir: &TempDir, name: &str) -> Vec<ParseErrorRecord> {
    let raw = std::fs::read_to_string(dir.path().join(format!("{name}_parse_err.json"))).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_full_scrape_converges_and_persists() {
    let server = MockServer::start().await;
    for page in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = test_config("full", 5, &dir);
    let mut scraper = build_scraper(&config);

    scraper.urls_with([
        format!("{}/a", server.uri()),
        format!("{}/b", server.uri()),
        format!("{}/c", server.uri()),
    ]);
    let report = scraper.run_until_done().await.unwrap();
    scraper.shutdown().await;

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.rounds, 1);
    assert_eq!(report.data, 3);

    let data = read_data(&dir, "full");
    assert_eq!(data.len(), 3);
    assert!(data.iter().all(|record| record["status"] == 200));
    assert!(read_fetch_errors(&dir, "full").is_empty());
    assert!(read_parse_errors(&dir, "full").is_empty());
}

#[tokio::test]
async fn test_http_error_status_is_not_a_fetch_error() {
    // A 404 response is still a response; the status parser records it and
    // the run converges without retries.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config("notfound", 2, &dir);
    let mut scraper = build_scraper(&config);

    scraper.urls_with([format!("{}/missing", server.uri())]);
    let report = scraper.run_until_done().await.unwrap();
    scraper.shutdown().await;

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.rounds, 1);

    let data = read_data(&dir, "notfound");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["status"], 404);
}

#[tokio::test]
async fn test_unreachable_urls_abort_as_stuck_with_errors_persisted() {
    let dir = TempDir::new().unwrap();
    let config = test_config("stuck", 2, &dir);
    let mut scraper = build_scraper(&config);

    // Nothing is listening on these; connections are refused immediately.
    scraper.urls_with([
        "http://127.0.0.1:1/".to_string(),
        "not even a url".to_string(),
    ]);
    let report = scraper.run_until_done().await.unwrap();
    scraper.shutdown().await;

    assert_eq!(report.outcome, RunOutcome::Stuck);
    assert_eq!(report.data, 0);

    let errors = read_fetch_errors(&dir, "stuck");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|record| !record.error.is_empty()));
}

#[tokio::test]
async fn test_mixed_outcomes_account_for_every_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>fine</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config("mixed", 10, &dir);
    let mut scraper = build_scraper(&config);

    scraper.urls_with([
        format!("{}/ok", server.uri()),
        "http://127.0.0.1:1/refused".to_string(),
    ]);
    let report = scraper.run_until_done().await.unwrap();
    scraper.shutdown().await;

    // The reachable job converged; the unreachable one kept the set
    // identical between rounds and ended the run as stuck.
    assert_eq!(report.outcome, RunOutcome::Stuck);
    assert_eq!(read_data(&dir, "mixed").len(), 1);
    assert_eq!(read_fetch_errors(&dir, "mixed").len(), 1);
}

#[tokio::test]
async fn test_selector_parse_errors_are_recorded_with_trace() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>no list items here</p></body></html>"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config("select", 2, &dir);
    config.parse = ParseConfig {
        mode: ParseMode::Select,
        selector: Some("li.result".to_string()),
    };
    let mut scraper = build_scraper(&config);

    scraper.urls_with([format!("{}/items", server.uri())]);
    let report = scraper.run_until_done().await.unwrap();
    scraper.shutdown().await;

    assert_eq!(report.outcome, RunOutcome::Stuck);
    let errors = read_parse_errors(&dir, "select");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].error.contains("li.result"));
    assert!(errors[0].trace.is_some());
}

#[tokio::test]
async fn test_partitioned_runs_reuse_one_scraper() {
    let server = MockServer::start().await;
    for page in ["/p1", "/p2"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = test_config("part_1", 3, &dir);
    let mut scraper = build_scraper(&config);

    scraper.urls_with([format!("{}/p1", server.uri())]);
    let first = scraper.run_until_done().await.unwrap();
    assert_eq!(first.outcome, RunOutcome::Completed);

    scraper
        .name_with("part_2")
        .urls_with([format!("{}/p2", server.uri())]);
    let second = scraper.run_until_done().await.unwrap();
    scraper.shutdown().await;

    assert_eq!(second.outcome, RunOutcome::Completed);
    assert_eq!(read_data(&dir, "part_1").len(), 1);
    assert_eq!(read_data(&dir, "part_2").len(), 1);
}

#[tokio::test]
async fn test_link_parser_emits_absolute_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="/one">One</a>
                <a href="/two">Two</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config("links", 2, &dir);
    config.parse.mode = ParseMode::Links;
    let mut scraper = build_scraper(&config);

    scraper.urls_with([format!("{}/index", server.uri())]);
    let report = scraper.run_until_done().await.unwrap();
    scraper.shutdown().await;

    assert_eq!(report.outcome, RunOutcome::Completed);
    let data = read_data(&dir, "links");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0], format!("{}/one", server.uri()));
    assert_eq!(data[1], format!("{}/two", server.uri()));
}
