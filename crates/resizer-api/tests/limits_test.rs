//! Server-wide request limits: the connection ceiling and the request timeout.
//!
//! Run with: `cargo test -p resizer-api --test limits_test`

mod helpers;

use helpers::{source_url, spawn_stalled_server};
use std::time::Duration;

async fn wait_for_in_flight(fetcher: &helpers::StalledFetcher, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while fetcher.in_flight() < count {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {} fetches in flight",
            count
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_connection_limit_is_shared_across_routes() {
    let server = spawn_stalled_server(1, 60).await;
    let client = reqwest::Client::new();

    let pending: Vec<_> = ["/", "/resize"]
        .into_iter()
        .map(|path| {
            let request = client
                .get(format!("{}{}", server.base_url, path))
                .query(&[("url", source_url("glyph.png")), ("width", "10".into())]);
            tokio::spawn(async move { request.send().await })
        })
        .collect();

    wait_for_in_flight(&server.fetcher, 1).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(server.fetcher.in_flight(), 1);

    // Health sits behind the same ceiling.
    let health = client
        .get(format!("{}/health", server.base_url))
        .timeout(Duration::from_millis(300))
        .send()
        .await;
    assert!(health.unwrap_err().is_timeout());

    for task in pending {
        task.abort();
    }
}

#[tokio::test]
async fn test_unlimited_when_ceiling_is_zero() {
    let server = spawn_stalled_server(0, 60).await;
    let client = reqwest::Client::new();

    let pending: Vec<_> = ["/", "/resize", "/"]
        .into_iter()
        .map(|path| {
            let request = client
                .get(format!("{}{}", server.base_url, path))
                .query(&[("url", source_url("glyph.png"))]);
            tokio::spawn(async move { request.send().await })
        })
        .collect();

    wait_for_in_flight(&server.fetcher, 3).await;

    let health = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    for task in pending {
        task.abort();
    }
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let server = spawn_stalled_server(0, 1).await;
    let response = reqwest::Client::new()
        .get(format!("{}/resize", server.base_url))
        .query(&[("url", source_url("glyph.png"))])
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::REQUEST_TIMEOUT);
    assert_eq!(server.fetcher.in_flight(), 1);
}
