//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the search endpoint and the
//! community board, and run full crawl runs through the HTTP fetch backend.

use siteseeker::config::{ClassifierConfig, CrawlerConfig, FetchConfig};
use siteseeker::fetch::{CrawlTask, ExtractionHint, FetchError, FetchOutcome, HttpPageFetcher};
use siteseeker::output::{format_markdown_summary, generate_summary};
use siteseeker::storage::{RunStatus, SqliteStorage, TargetStore};
use siteseeker::{CrawlOutcome, KeywordClassifier, LinkType, PageFetcher, Scheduler, SiteType};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/html; charset=utf-8")
}

fn fetch_config(base_url: &str) -> FetchConfig {
    FetchConfig {
        search_url: format!("{}/search?q={{query}}", base_url),
        timeout_ms: 5_000,
        retry_limit: 1,
        retry_delay_ms: 0,
        ..FetchConfig::default()
    }
}

fn crawler_config(seed_domain: &str, seed_keyword: &str) -> CrawlerConfig {
    CrawlerConfig {
        seed_domains: vec![seed_domain.to_string()],
        seed_keywords: vec![seed_keyword.to_string()],
        max_crawl_cycles: 50,
        search_delay_ms: 0,
        batch_delay_ms: 0,
        max_concurrency: 2,
        max_domain_retries: 1,
        domain_discovery_limit: 100,
    }
}

fn classifier() -> KeywordClassifier {
    KeywordClassifier::new(&ClassifierConfig {
        gambling_indicators: vec!["카지노".into(), "casino".into()],
        illegal_server_indicators: vec!["프리섭".into()],
        ad_banner_indicators: vec!["배너".into()],
        chat_invite_indicators: vec!["오픈채팅".into()],
        community_indicators: vec!["커뮤니티".into()],
        chat_invite_hosts: vec!["open.kakao.com".into(), "discord.gg".into()],
        community_hosts: vec![],
    })
}

/// Mounts a search endpoint that always points at one board post, and the post itself
async fn mount_board(mock_server: &MockServer, post_hits: u64) {
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(format!(
            r#"<html><body>
            <a href="{base}/board/view/1"><h3>리니지 프리섭 홍보</h3></a>
            <a href="https://elsewhere.test/post/9"><h3>off-site result</h3></a>
            <a href="{base}/search?q=page2"><h3>Next</h3></a>
            </body></html>"#,
            base = base_url
        )))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/board/view/1"))
        .respond_with(html(
            r#"<html><head><title>리니지 프리섭 홍보</title></head><body>
            <div class="nav"><a href="https://ignored-nav.test/">메뉴</a></div>
            <article>
              <a href="https://www.royal-casino.test/event" title="로얄 카지노">카지노 바로가기</a>
              <a href="https://open.kakao.com/o/abc123">오픈채팅 문의</a>
            </article>
            </body></html>"#,
        ))
        .expect(post_hits)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_discovers_targets_and_keywords() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let domain = url::Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    // Re-expansion searches return the same post; it must be explored only once
    mount_board(&mock_server, 1).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("targets.db");
    let store = Arc::new(SqliteStorage::new(&db_path).expect("Failed to open storage"));

    let fetcher = Arc::new(HttpPageFetcher::new(&fetch_config(&base_url), 2).unwrap());
    let scheduler = Scheduler::new(
        crawler_config(&domain, "리니지"),
        fetcher,
        Arc::new(classifier()),
        store.clone(),
    )
    .with_config_hash("integration");

    let report = scheduler.start().await.expect("Scheduler was idle");

    assert_eq!(report.outcome, CrawlOutcome::Exhausted);
    assert_eq!(report.pending_results, 0);
    assert_eq!(report.stats.pages_explored, 1);
    assert_eq!(report.stats.sites_confirmed, 2);
    assert!(report.stats.expansions >= 1, "new keywords should re-expand the board");

    // Target sites
    let casino = store
        .get_target_site("royal-casino.test")
        .unwrap()
        .expect("casino should be stored");
    assert_eq!(casino.site.site_type, SiteType::Gambling);
    assert_eq!(casino.site.link_type, LinkType::Website);
    assert_eq!(casino.site.site_name.as_deref(), Some("로얄 카지노"));
    assert_eq!(
        casino.site.source_url.as_deref(),
        Some(format!("{}/board/view/1", base_url).as_str())
    );

    let invite = store
        .get_target_site("https://open.kakao.com/o/abc123")
        .unwrap()
        .expect("chat invite should be stored");
    assert_eq!(invite.site.site_type, SiteType::ChatInviteLink);
    assert_eq!(invite.site.link_type, LinkType::OpenChatLink);
    assert_eq!(store.count_target_sites().unwrap(), 2);

    // Frontier growth
    let frontier = &report.frontier;
    assert!(frontier.vocabulary.contains("royal-casino"));
    assert!(frontier.vocabulary.contains("프리섭"));
    assert!(frontier.history.is_applied(&domain, "리니지"));
    assert!(frontier.history.is_applied(&domain, "royal-casino"));
    assert!(frontier.pending_keywords_for(&domain).is_empty());
    assert!(frontier.is_confirmed("royal-casino.test"));

    // Run bookkeeping
    let run = store.get_latest_run().unwrap().expect("run should be recorded");
    assert_eq!(Some(run.id), report.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.sites_confirmed, 2);
    assert_eq!(run.config_hash, "integration");
    assert!(run.finished_at.is_some());
}

#[tokio::test]
async fn test_second_run_skips_already_stored_sites() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let domain = url::Url::parse(&base_url).unwrap().host_str().unwrap().to_string();

    mount_board(&mock_server, 2).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("targets.db");

    for run in 0..2 {
        let store = Arc::new(SqliteStorage::new(&db_path).unwrap());
        let fetcher = Arc::new(HttpPageFetcher::new(&fetch_config(&base_url), 2).unwrap());
        let scheduler = Scheduler::new(
            crawler_config(&domain, "리니지"),
            fetcher,
            Arc::new(classifier()),
            store.clone(),
        );

        let report = scheduler.start().await.unwrap();
        assert_eq!(report.outcome, CrawlOutcome::Exhausted);

        let expected_confirmed = if run == 0 { 2 } else { 0 };
        assert_eq!(report.stats.sites_confirmed, expected_confirmed, "run {}", run);
        assert_eq!(store.count_target_sites().unwrap(), 2);
    }
}

#[tokio::test]
async fn test_summary_after_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let domain = url::Url::parse(&base_url).unwrap().host_str().unwrap().to_string();

    mount_board(&mock_server, 1).await;

    let store = Arc::new(SqliteStorage::new_in_memory().unwrap());
    let fetcher = Arc::new(HttpPageFetcher::new(&fetch_config(&base_url), 2).unwrap());
    let scheduler = Scheduler::new(
        crawler_config(&domain, "리니지"),
        fetcher,
        Arc::new(classifier()),
        store.clone(),
    );
    scheduler.start().await.unwrap();

    let summary = generate_summary(store.as_ref()).unwrap();
    assert_eq!(summary.statistics.total_sites, 2);

    let markdown = format_markdown_summary(&summary);
    assert!(markdown.contains("royal-casino.test"));
    assert!(markdown.contains("https://open.kakao.com/o/abc123"));
}

#[tokio::test]
async fn test_search_request_carries_site_query() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "site:gall.dcinside.com \"프리섭\""))
        .respond_with(html(
            r#"<html><body>
            <a href="/url?q=https://gall.dcinside.com/board/view/?no=7&sa=U"><h3>프리섭 오픈</h3></a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(&fetch_config(&base_url), 1).unwrap();
    let outcome = fetcher
        .execute(CrawlTask::search("gall.dcinside.com", "프리섭"))
        .await
        .unwrap();

    match outcome {
        FetchOutcome::SearchResults(links) => {
            assert_eq!(links.len(), 1);
            assert_eq!(links[0].url, "https://gall.dcinside.com/board/view/?no=7");
            assert_eq!(links[0].hint, ExtractionHint::CommunitySite);
        }
        other => panic!("expected search results, got {:?}", other),
    }
}

#[tokio::test]
async fn test_visit_non_html_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/banner.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(&fetch_config(&mock_server.uri()), 1).unwrap();
    let outcome = fetcher
        .execute(CrawlTask::visit(
            format!("{}/banner.json", mock_server.uri()),
            ExtractionHint::Generic,
        ))
        .await
        .unwrap();

    assert_eq!(outcome, FetchOutcome::Empty);
}

#[tokio::test]
async fn test_server_error_is_retried_then_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(&fetch_config(&mock_server.uri()), 1).unwrap();
    let result = fetcher
        .execute(CrawlTask::visit(
            format!("{}/flaky", mock_server.uri()),
            ExtractionHint::Generic,
        ))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(&fetch_config(&mock_server.uri()), 1).unwrap();
    let result = fetcher
        .execute(CrawlTask::visit(
            format!("{}/gone", mock_server.uri()),
            ExtractionHint::Generic,
        ))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}
