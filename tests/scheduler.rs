//! Integration tests for feed selection fairness and the poll loop.

use std::time::Duration;

use graze::poller::Poller;
use graze::storage::Database;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_db() -> Database {
    Database::open(":memory:").await.unwrap()
}

const ONE_ITEM_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Fixture</title>
    <item>
        <title>Only</title>
        <link>https://example.com/only</link>
        <description>one</description>
        <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
    </item>
</channel></rss>"#;

// ============================================================================
// Selection Fairness
// ============================================================================

#[tokio::test]
async fn selection_is_round_robin_by_recency() {
    let db = test_db().await;
    let user = db.create_user("tester", 0).await.unwrap();

    let mut feed_ids = Vec::new();
    for i in 0..3 {
        let feed = db
            .create_feed(
                &format!("Feed {}", i),
                &format!("https://example.com/{}/rss", i),
                user.id,
                i,
            )
            .await
            .unwrap();
        feed_ids.push(feed.id);
    }

    // Repeatedly select-and-mark with strictly increasing timestamps: the
    // selection order must visit every feed before revisiting any.
    let mut selections = Vec::new();
    for tick in 0..6 {
        let feed = db.next_feed_to_fetch().await.unwrap();
        db.mark_fetched(feed.id, tick).await.unwrap();
        selections.push(feed.id);
    }

    assert_eq!(selections[..3], feed_ids[..], "never-fetched feeds first, in creation order");
    assert_eq!(selections[3..], feed_ids[..], "then a full second rotation");
}

#[tokio::test]
async fn never_fetched_feed_beats_recently_fetched() {
    let db = test_db().await;
    let user = db.create_user("tester", 0).await.unwrap();

    let fetched = db
        .create_feed("Fetched", "https://a.example.com/rss", user.id, 0)
        .await
        .unwrap();
    db.mark_fetched(fetched.id, 1_000_000).await.unwrap();

    let fresh = db
        .create_feed("Fresh", "https://b.example.com/rss", user.id, 0)
        .await
        .unwrap();

    let next = db.next_feed_to_fetch().await.unwrap();
    assert_eq!(next.id, fresh.id);
}

// ============================================================================
// Poll Loop
// ============================================================================

#[tokio::test]
async fn poller_rejects_invalid_interval_before_starting() {
    let db = test_db().await;
    let client = reqwest::Client::new();

    assert!(Poller::new(db.clone(), client.clone(), "soon").is_err());
    assert!(Poller::new(db.clone(), client.clone(), "0s").is_err());
    assert!(Poller::new(db, client, "30s").is_ok());
}

#[tokio::test]
async fn poller_crawls_on_interval_and_stops_on_signal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ITEM_RSS))
        .mount(&server)
        .await;

    let db = test_db().await;
    let user = db.create_user("tester", 0).await.unwrap();
    let feed = db
        .create_feed("Only", &server.uri(), user.id, 0)
        .await
        .unwrap();

    let poller = Poller::new(db.clone(), reqwest::Client::new(), "100ms").unwrap();
    let (stop_tx, stop_rx) = mpsc::channel(1);
    let handle = tokio::spawn(poller.run(stop_rx));

    // Let a few cycles happen against real time (wiremock does real I/O).
    tokio::time::sleep(Duration::from_millis(450)).await;
    stop_tx.send(()).await.unwrap();

    // The loop must wind down promptly after the stop signal.
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("poller did not stop after the stop signal")
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(
        (2..=6).contains(&requests.len()),
        "expected interval-spaced crawls, got {}",
        requests.len()
    );

    // Ingestions never overlapped and never duplicated: one post total.
    let posts = db.posts_for_feed(feed.id).await.unwrap();
    assert_eq!(posts.len(), 1);
    let refreshed = db.feed_by_url(&feed.url).await.unwrap().unwrap();
    assert!(refreshed.last_fetched_at.is_some());
}

#[tokio::test]
async fn poller_keeps_ticking_past_cycle_failures() {
    // Every fetch 500s; the loop must keep running and keep retrying the
    // same highest-priority feed rather than crashing.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let db = test_db().await;
    let user = db.create_user("tester", 0).await.unwrap();
    db.create_feed("Broken", &server.uri(), user.id, 0)
        .await
        .unwrap();

    let poller = Poller::new(db.clone(), reqwest::Client::new(), "100ms").unwrap();
    let (stop_tx, stop_rx) = mpsc::channel(1);
    let handle = tokio::spawn(poller.run(stop_rx));

    tokio::time::sleep(Duration::from_millis(350)).await;
    stop_tx.send(()).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("poller did not stop")
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests.len() >= 2,
        "failed cycles should not stop the scheduler, got {} requests",
        requests.len()
    );
}
