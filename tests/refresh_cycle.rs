//! End-to-end refresh cycles: a real `FeedFetcher` against a mock HTTP server,
//! driven by the `RefreshController` over a directory-backed store.
//!
//! Each test uses its own data directory under the system temp dir.

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use quotewall::feed::{FeedFetcher, FeedSource, Post};
use quotewall::refresh::{RefreshController, RefreshEvent, RefreshSettings, SyncStatus};
use quotewall::storage::{CacheStore, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TWO_POSTS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>notes</title>
    <item>
        <title>first</title>
        <description><![CDATA[<p>Hello #生活哲思</p><img src="https://img.example/1.jpg">]]></description>
        <pubDate>Sat, 01 Jun 2024 07:00:00 GMT</pubDate>
        <link>https://example.com/1</link>
    </item>
    <item>
        <title>second</title>
        <description>plain text</description>
        <link>https://example.com/2</link>
    </item>
</channel></rss>"#;

fn test_store(name: &str) -> Store {
    let dir = std::env::temp_dir().join(format!("quotewall_it_{name}"));
    std::fs::remove_dir_all(&dir).ok();
    Store::open(dir).unwrap()
}

fn settings() -> RefreshSettings {
    RefreshSettings {
        max_retries: 2,
        retry_delay: Duration::from_secs(30),
        auto_refresh_interval: None,
        cache_max_age: Duration::from_secs(30 * 60),
    }
}

fn controller(
    server: &MockServer,
    proxies: &[&str],
    store: &Store,
) -> (
    RefreshController<dyn FeedSource>,
    mpsc::Receiver<RefreshEvent>,
) {
    let fetcher = FeedFetcher::new(
        reqwest::Client::new(),
        format!("{}/feed", server.uri()),
        proxies
            .iter()
            .map(|p| format!("{}{}", server.uri(), p))
            .collect(),
        Duration::from_secs(2),
    );
    let source: Arc<dyn FeedSource> = Arc::new(fetcher);
    let (tx, rx) = mpsc::channel(8);
    (
        RefreshController::new(source, CacheStore::new(store.clone()), settings(), tx),
        rx,
    )
}

fn cached_post(title: &str) -> Post {
    Post {
        title: title.to_string(),
        description: format!("<p>{title}</p>"),
        published_at: None,
        link: String::new(),
    }
}

#[tokio::test]
async fn test_empty_cache_direct_fetch_populates_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_POSTS))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store("direct_fetch");
    let (mut ctl, mut rx) = controller(&server, &["/proxy?u={url}"], &store);
    let now = Utc::now();

    ctl.start(now);
    assert_eq!(ctl.status(), &SyncStatus::Syncing);
    let event = rx.recv().await.unwrap();
    ctl.handle_event(event, now);

    assert_eq!(ctl.posts().len(), 2);
    assert_eq!(ctl.posts()[0].title, "first");
    assert_eq!(
        ctl.posts()[0].published_at,
        Some(Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap())
    );
    assert_eq!(ctl.status().label(), "live sync");
    assert_eq!(ctl.state().retry_count, 0);
    assert!(!ctl.retry_pending());

    let entry = CacheStore::new(store).load().unwrap();
    assert_eq!(entry.posts, ctl.posts());
    assert_eq!(entry.fetched_at.timestamp_millis(), now.timestamp_millis());
}

#[tokio::test]
async fn test_direct_failure_served_by_proxy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/first-proxy"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_POSTS))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store("proxy_fallback");
    let (mut ctl, mut rx) = controller(
        &server,
        &["/first-proxy?url={url}", "/second-proxy?url={url}"],
        &store,
    );

    ctl.start(Utc::now());
    let event = rx.recv().await.unwrap();
    ctl.handle_event(event, Utc::now());

    assert_eq!(ctl.posts().len(), 2);
    assert_eq!(ctl.status(), &SyncStatus::Success { from_cache: false });
}

#[tokio::test]
async fn test_total_failure_falls_back_to_stale_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let store = test_store("stale_fallback");
    let fetched_at = Utc::now() - ChronoDuration::days(3);
    CacheStore::new(store.clone())
        .save_at(&[cached_post("old news")], fetched_at)
        .unwrap();

    let (mut ctl, mut rx) = controller(&server, &["/proxy?u={url}"], &store);
    ctl.start(Utc::now());
    // Three days old is past the freshness window, so a fetch is attempted
    assert_eq!(ctl.status(), &SyncStatus::Syncing);

    let event = rx.recv().await.unwrap();
    ctl.handle_event(event, Utc::now());

    assert_eq!(ctl.posts()[0].title, "old news");
    assert_eq!(ctl.status().label(), "showing cached data");
    let error = ctl.status().error().unwrap();
    assert!(error.contains("all 2 feed attempts failed"), "{error}");
    assert!(error.contains("direct: HTTP status 502"), "{error}");
    assert_eq!(ctl.state().retry_count, 1);
    assert!(ctl.retry_pending());
    assert!(ctl.controls_enabled());
}

#[tokio::test]
async fn test_restart_within_window_uses_cache_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_POSTS))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store("restart_cache");
    let first_run = Utc::now();
    {
        let (mut ctl, mut rx) = controller(&server, &[], &store);
        ctl.start(first_run);
        let event = rx.recv().await.unwrap();
        ctl.handle_event(event, first_run);
        assert_eq!(ctl.posts().len(), 2);
    }

    // Ten minutes later: the cache is fresh, the server is not contacted again
    let (mut ctl, _rx) = controller(&server, &[], &store);
    ctl.start(first_run + ChronoDuration::minutes(10));

    assert_eq!(ctl.status(), &SyncStatus::Success { from_cache: true });
    assert_eq!(ctl.posts().len(), 2);
    assert!(ctl.controls_enabled());
}
