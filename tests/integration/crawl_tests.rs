//! Integration tests for the crawl engine
//!
//! These tests use wiremock to stand in for the search API, the raw content
//! host and repository landing pages, and run full crawls against them.

use chrono::{TimeZone, Utc};
use fdio::crawler::staleness::last_update_hours_at;
use fdio::crawler::{crawl, ContributionType, CrawlSettings, Fetcher, ItemSkip, StopReason};
use fdio::storage::{MemorySink, RecordSink, SqliteStorage};
use fdio::{FdioError, TransportErrorKind};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const SHA: &str = "abc123";

/// Matches search requests for the first page, which carry no `page` parameter
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}

fn settings_for(server: &MockServer) -> CrawlSettings {
    CrawlSettings {
        api_endpoint: server.uri(),
        search_path: "/search/code".to_string(),
        html_endpoint: server.uri(),
        raw_endpoint: format!("{}/raw", server.uri()),
        default_branch: "master".to_string(),
        page_delay: Duration::from_millis(10),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        user_agent: "fdio-test/1.0".to_string(),
    }
}

/// One search result item pointing at `owner/repo/<file_path>`
fn search_item(server: &MockServer, owner: &str, repo: &str, file_path: &str) -> Value {
    json!({
        "name": file_path.rsplit('/').next().unwrap_or(file_path),
        "path": file_path,
        "html_url": format!("{}/{}/{}/blob/{}/{}", server.uri(), owner, repo, SHA, file_path),
        "repository": {
            "name": repo,
            "full_name": format!("{}/{}", owner, repo),
            "owner": { "login": owner }
        }
    })
}

fn envelope(items: Vec<Value>) -> Value {
    json!({
        "total_count": items.len(),
        "incomplete_results": false,
        "items": items
    })
}

/// `Link` header whose `last` relation points at `last`
fn link_header(last: u32) -> &'static str {
    match last {
        2 => r#"<https://api.github.com/search/code?q=x&page=2>; rel="next", <https://api.github.com/search/code?q=x&page=2>; rel="last""#,
        3 => r#"<https://api.github.com/search/code?q=x&page=2>; rel="next", <https://api.github.com/search/code?q=x&page=3>; rel="last""#,
        7 => r#"<https://api.github.com/search/code?q=x&page=2>; rel="next", <https://api.github.com/search/code?q=x&page=7>; rel="last""#,
        9 => r#"<https://api.github.com/search/code?q=x&page=3>; rel="next", <https://api.github.com/search/code?q=x&page=9>; rel="last""#,
        other => panic!("no Link fixture for {} pages", other),
    }
}

fn raw_path(owner: &str, repo: &str, file_path: &str) -> String {
    format!("/raw/{}/{}/{}/{}", owner, repo, SHA, file_path)
}

fn repo_page(date: &str) -> String {
    format!(
        r#"<html><body><div class="commit-tease"><span>Latest commit</span><time-ago>{}</time-ago></div></body></html>"#,
        date
    )
}

fn today() -> String {
    Utc::now().format("%b %d, %Y").to_string()
}

async fn mount_first_page(server: &MockServer, body: Value, link: Option<&'static str>) {
    let mut response = ResponseTemplate::new(200).set_body_json(body);
    if let Some(link) = link {
        response = response.insert_header("Link", link);
    }

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(FirstPage)
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: u32, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_content(server: &MockServer, owner: &str, repo: &str, file_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(raw_path(owner, repo, file_path)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_repo_page(server: &MockServer, owner: &str, repo: &str, date: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/{}", owner, repo)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(repo_page(date))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Serves a valid activity file for every raw content request
async fn mount_any_content(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/raw/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "generic",
            "type": "flogo:activity",
            "author": "acme"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_page_crawl_emits_records_in_order() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![
            search_item(&server, "acme", "contrib", "activity/log/activity.json"),
            search_item(&server, "acme", "contrib", "activity/rest/activity.json"),
            search_item(&server, "jane", "mail", "activity.json"),
        ]),
        None,
    )
    .await;

    mount_content(
        &server,
        "acme",
        "contrib",
        "activity/log/activity.json",
        json!({ "name": "log", "type": "flogo:activity", "author": "acme", "description": "Logs a message" }),
    )
    .await;
    mount_content(
        &server,
        "acme",
        "contrib",
        "activity/rest/activity.json",
        json!({ "name": "rest", "type": "flogo:activity" }),
    )
    .await;
    mount_content(
        &server,
        "jane",
        "mail",
        "activity.json",
        json!({ "name": "Send Mail", "type": "flogo:activity", "author": "Jane" }),
    )
    .await;

    // Staleness is disabled, so no repository page may be requested
    mount_repo_page(&server, "jane", "mail", "Jan 02, 2006", 0).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_total, 1);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.records_emitted, 3);
    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(sink.batch_sizes(), &[3]);

    let records = sink.records();
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["log", "rest", "Send Mail"]);

    assert_eq!(records[0].description, "Logs a message");
    assert_eq!(records[0].kind, "activity");
    assert_eq!(
        records[0].url,
        format!("{}/acme/contrib/tree/master/activity/log/", server.uri())
    );

    assert_eq!(records[1].author, "Unknown");
    assert_eq!(records[1].description, "");

    assert_eq!(records[2].url, format!("{}/jane/mail/tree/master/", server.uri()));
    assert_eq!(records[2].dedup_key(), "jane/sendmail");
}

#[tokio::test]
async fn test_unparseable_item_is_skipped_without_aborting() {
    let server = MockServer::start().await;

    let repos = ["one", "two", "three", "four", "five"];
    let items = repos
        .iter()
        .map(|repo| search_item(&server, "acme", repo, "trigger/timer/trigger.json"))
        .collect();
    mount_first_page(&server, envelope(items), None).await;

    for repo in repos {
        if repo == "three" {
            Mock::given(method("GET"))
                .and(path(raw_path("acme", repo, "trigger/timer/trigger.json")))
                .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
                .mount(&server)
                .await;
        } else {
            mount_content(
                &server,
                "acme",
                repo,
                "trigger/timer/trigger.json",
                json!({ "name": format!("timer-{}", repo), "type": "flogo:trigger" }),
            )
            .await;
        }
    }

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Trigger)
        .await
        .expect("Crawl failed");

    let names: Vec<_> = sink.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["timer-one", "timer-two", "timer-four", "timer-five"]);
    assert!(sink.records().iter().all(|r| r.kind == "trigger"));

    assert_eq!(report.records_emitted, 4);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].source.contains("/acme/three/"));
    assert!(matches!(report.skipped[0].reason, ItemSkip::InvalidJson(_)));
}

#[tokio::test]
async fn test_items_without_type_or_name_are_dropped() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![
            search_item(&server, "acme", "a", "activity.json"),
            search_item(&server, "acme", "b", "activity.json"),
            search_item(&server, "acme", "c", "activity.json"),
            json!({ "path": "activity.json" }),
        ]),
        None,
    )
    .await;

    mount_content(&server, "acme", "a", "activity.json", json!({ "name": "no-type" })).await;
    mount_content(&server, "acme", "b", "activity.json", json!({ "type": "flogo:activity" })).await;
    mount_content(
        &server,
        "acme",
        "c",
        "activity.json",
        json!({ "name": "kept", "type": "flogo:activity" }),
    )
    .await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(sink.records().len(), 1);
    assert_eq!(sink.records()[0].name, "kept");

    let reasons: Vec<_> = report.skipped.iter().map(|s| s.reason.clone()).collect();
    assert_eq!(reasons[0], ItemSkip::MissingType);
    assert_eq!(reasons[1], ItemSkip::MissingName);
    assert!(matches!(reasons[2], ItemSkip::InvalidHit(_)));
}

#[tokio::test]
async fn test_missing_content_is_skipped() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "gone", "activity.json")]),
        None,
    )
    .await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(sink.batch_sizes(), &[0]);
    assert_eq!(report.skipped[0].reason, ItemSkip::Status(404));
}

#[tokio::test]
async fn test_paginates_through_all_pages_with_delay() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "p1", "activity.json")]),
        Some(link_header(7)),
    )
    .await;

    for page in 2..=7 {
        let repo = format!("p{}", page);
        mount_page(
            &server,
            page,
            envelope(vec![search_item(&server, "acme", &repo, "activity.json")]),
            1,
        )
        .await;
    }
    mount_any_content(&server).await;

    let mut settings = settings_for(&server);
    settings.page_delay = Duration::from_millis(50);

    let mut sink = MemorySink::new();
    let started = Instant::now();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert!(started.elapsed() >= Duration::from_millis(6 * 50));
    assert_eq!(report.pages_total, 7);
    assert_eq!(report.pages_fetched, 7);
    assert_eq!(sink.batch_sizes(), &[1, 1, 1, 1, 1, 1, 1]);

    let urls: Vec<_> = sink.records().iter().map(|r| r.url.clone()).collect();
    for (index, url) in urls.iter().enumerate() {
        assert!(url.contains(&format!("/acme/p{}/", index + 1)), "{} out of order", url);
    }
}

#[tokio::test]
async fn test_page_count_is_read_from_first_page_only() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "p1", "activity.json")]),
        Some(link_header(2)),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(vec![]))
                .insert_header("Link", link_header(9)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 3, envelope(vec![]), 0).await;
    mount_any_content(&server).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_total, 2);
    assert_eq!(sink.batch_sizes(), &[1, 0]);
}

#[tokio::test]
async fn test_stale_repository_stops_crawl() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![
            search_item(&server, "fresh", "repo", "activity.json"),
            search_item(&server, "old", "repo", "activity/legacy/activity.json"),
        ]),
        Some(link_header(3)),
    )
    .await;
    mount_page(&server, 2, envelope(vec![]), 0).await;
    mount_page(&server, 3, envelope(vec![]), 0).await;
    mount_any_content(&server).await;

    // Only the last record's repository is consulted
    mount_repo_page(&server, "fresh", "repo", &today(), 0).await;
    mount_repo_page(&server, "old", "repo", "Jan 02, 2006", 1).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 24.0, ContributionType::Activity)
        .await
        .expect("Early stop must not be an error");

    assert!(report.stopped_early());
    match &report.stop {
        StopReason::Stale { repository, hours } => {
            assert_eq!(repository, &format!("{}/old/repo", server.uri()));
            assert!(*hours > 24.0);
        }
        other => panic!("unexpected stop reason: {:?}", other),
    }
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(sink.batch_sizes(), &[2]);
}

#[tokio::test]
async fn test_fresh_repositories_let_crawl_continue() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "active", "activity.json")]),
        Some(link_header(2)),
    )
    .await;
    mount_page(
        &server,
        2,
        envelope(vec![search_item(&server, "acme", "active", "other/activity.json")]),
        1,
    )
    .await;
    mount_any_content(&server).await;
    mount_repo_page(&server, "acme", "active", &today(), 2).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 48.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_page_without_records_skips_staleness_check() {
    let server = MockServer::start().await;

    mount_first_page(&server, envelope(vec![]), Some(link_header(3))).await;

    // Page 2 has a hit, but it is dropped, so there is still no last record
    mount_page(
        &server,
        2,
        envelope(vec![search_item(&server, "acme", "broken", "activity.json")]),
        1,
    )
    .await;
    mount_content(&server, "acme", "broken", "activity.json", json!({ "name": "x" })).await;

    mount_page(
        &server,
        3,
        envelope(vec![search_item(&server, "acme", "ok", "activity.json")]),
        1,
    )
    .await;
    mount_content(
        &server,
        "acme",
        "ok",
        "activity.json",
        json!({ "name": "ok", "type": "flogo:activity" }),
    )
    .await;
    mount_repo_page(&server, "acme", "ok", &today(), 1).await;
    mount_repo_page(&server, "acme", "broken", &today(), 0).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 48.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(sink.batch_sizes(), &[0, 0, 1]);
    assert_eq!(report.pages_fetched, 3);
}

#[tokio::test]
async fn test_missing_staleness_marker_is_fatal() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "bare", "activity.json")]),
        Some(link_header(2)),
    )
    .await;
    mount_page(&server, 2, envelope(vec![]), 0).await;
    mount_any_content(&server).await;

    Mock::given(method("GET"))
        .and(path("/acme/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>empty</body></html>"))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let result = crawl(&settings, &HeaderMap::new(), &mut sink, 24.0, ContributionType::Activity).await;

    match result {
        Err(FdioError::StalenessNotFound { url }) => {
            assert_eq!(url, format!("{}/acme/bare", server.uri()));
        }
        other => panic!("expected StalenessNotFound, got {:?}", other.map(|r| r.stop)),
    }
    // The batch was stored before the check ran
    assert_eq!(sink.batch_sizes(), &[1]);
}

#[tokio::test]
async fn test_first_page_failure_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let result = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity).await;

    match result {
        Err(FdioError::EnvelopeParse { page, message, .. }) => {
            assert_eq!(page, 1);
            assert!(message.contains("rate limit"));
        }
        other => panic!("expected EnvelopeParse, got {:?}", other.map(|r| r.stop)),
    }
    assert!(sink.batch_sizes().is_empty());
}

#[tokio::test]
async fn test_later_page_failure_keeps_earlier_batches() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "p1", "activity.json")]),
        Some(link_header(3)),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 3, envelope(vec![]), 0).await;
    mount_any_content(&server).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let result = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity).await;

    assert!(matches!(result, Err(FdioError::EnvelopeParse { page: 2, .. })));
    assert_eq!(sink.batch_sizes(), &[1]);
}

#[tokio::test]
async fn test_search_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(vec![]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.request_timeout = Duration::from_millis(300);

    let mut sink = MemorySink::new();
    let result = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity).await;

    match result {
        Err(FdioError::Transport { kind, .. }) => assert_eq!(kind, TransportErrorKind::Timeout),
        other => panic!("expected a timeout, got {:?}", other.map(|r| r.stop)),
    }
}

#[tokio::test]
async fn test_trigger_query_and_headers_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("q", "filename:trigger.json flogo"))
        .and(query_param("sort", "indexed"))
        .and(header("authorization", "token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![search_item(
            &server,
            "acme",
            "triggers",
            "trigger/rest/trigger.json",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(raw_path("acme", "triggers", "trigger/rest/trigger.json")))
        .and(header("authorization", "token secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "name": "REST", "type": "flogo:trigger" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme/triggers"))
        .and(header("authorization", "token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(repo_page(&today())))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("token secret"));

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &headers, &mut sink, 48.0, ContributionType::from_label("Trigger"))
        .await
        .expect("Crawl failed");

    assert_eq!(report.contribution, ContributionType::Trigger);
    assert_eq!(sink.records()[0].kind, "trigger");
    assert_eq!(
        sink.records()[0].url,
        format!("{}/acme/triggers/tree/master/trigger/rest/", server.uri())
    );
}

#[tokio::test]
async fn test_crawl_into_sqlite_reconciles_duplicates() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![
            search_item(&server, "acme", "fork-a", "activity.json"),
            search_item(&server, "acme", "fork-b", "activity.json"),
        ]),
        None,
    )
    .await;
    mount_any_content(&server).await;

    let settings = settings_for(&server);
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to open DB");
    let report = crawl(&settings, &HeaderMap::new(), &mut storage, 0.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    // Both hits are emitted; the sink keeps one row per dedup key
    assert_eq!(report.records_emitted, 2);
    assert_eq!(storage.count().unwrap(), 1);

    let stored = storage.get_by_key("acme/generic").unwrap().unwrap();
    assert_eq!(stored.url, format!("{}/acme/fork-b/tree/master/", server.uri()));
}

#[tokio::test]
async fn test_relative_last_page_target_is_followed() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![]),
        Some(r#"</search/code?q=x&page=2>; rel="next", </search/code?q=x&page=3>; rel="last""#),
    )
    .await;
    mount_page(&server, 2, envelope(vec![]), 1).await;
    mount_page(&server, 3, envelope(vec![]), 1).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_total, 3);
    assert_eq!(sink.batch_sizes(), &[0, 0, 0]);
}

#[tokio::test]
async fn test_unreadable_last_page_aborts() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "p1", "activity.json")]),
        Some(r#"<https://api.github.com/search/code?q=x&page=2>; rel="next", <https://api.github.com/search/code?q=x&page=>; rel="last""#),
    )
    .await;
    mount_page(&server, 2, envelope(vec![]), 0).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let result = crawl(&settings, &HeaderMap::new(), &mut sink, 0.0, ContributionType::Activity).await;

    match result {
        Err(FdioError::EnvelopeParse { page, message, .. }) => {
            assert_eq!(page, 1);
            assert!(message.contains("page"));
        }
        other => panic!("expected EnvelopeParse, got {:?}", other.map(|r| r.stop)),
    }
    assert!(sink.batch_sizes().is_empty());
}

#[tokio::test]
async fn test_repository_named_tree_is_checked_at_its_landing_page() {
    let server = MockServer::start().await;

    mount_first_page(
        &server,
        envelope(vec![search_item(&server, "acme", "tree", "activity/log/activity.json")]),
        None,
    )
    .await;
    mount_any_content(&server).await;
    mount_repo_page(&server, "acme", "tree", &today(), 1).await;

    let settings = settings_for(&server);
    let mut sink = MemorySink::new();
    let report = crawl(&settings, &HeaderMap::new(), &mut sink, 48.0, ContributionType::Activity)
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn test_last_update_hours_against_fixed_clock() {
    let server = MockServer::start().await;
    mount_repo_page(&server, "acme", "contrib", "Jan 02, 2006", 1).await;

    let settings = settings_for(&server);
    let fetcher = Fetcher::new(&settings).expect("Failed to build fetcher");
    let now = Utc.with_ymd_and_hms(2006, 1, 4, 12, 0, 0).unwrap();

    let hours = last_update_hours_at(
        &fetcher,
        &format!("{}/acme/contrib", server.uri()),
        None,
        now,
    )
    .await
    .expect("Staleness check failed");

    assert_eq!(hours, 60.0);
}
