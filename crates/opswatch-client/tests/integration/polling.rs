//! Integration tests for status polling over HTTP.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use opswatch_client::Error;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{TestHarness, basic_body, legacy_detailed_body};

#[tokio::test]
async fn test_anonymous_poll_publishes_basic_snapshot() {
    let h = TestHarness::new().await;
    h.mount_status(basic_body("X", true), legacy_detailed_body("X"))
        .await;

    let snapshot = h.poller.poll_once().await.unwrap();

    assert!(!snapshot.is_detailed());
    assert!(snapshot.is_healthy());
    let status = snapshot.status();
    assert_eq!(status.name, "X");
    assert_eq!(status.support, vec!["ops@example.com".to_string()]);
    assert_eq!(status.build_date.timestamp_millis(), 1_000_000);
    assert_eq!(h.requested_paths().await, vec!["/ops/api/status"]);
}

#[tokio::test]
async fn test_logged_in_poll_normalizes_trackers() {
    let h = TestHarness::new().await;
    h.mount_identity().await;
    h.mount_status(basic_body("X", true), legacy_detailed_body("X"))
        .await;
    h.store.login().await.unwrap();

    let snapshot = h.poller.poll_once().await.unwrap();
    assert!(snapshot.is_detailed());
    assert!(!snapshot.is_healthy());

    let trackers = snapshot.trackers().unwrap();
    let names: Vec<_> = trackers.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["k3s", "traefik", "storage"]);

    assert_eq!(trackers[0].problems["node:ready"], "not ready");
    assert!(trackers[0].warnings.is_empty());
    assert!(trackers[1].problems.is_empty());
    assert_eq!(trackers[1].warnings["cert:expiry"], "12 days");
    assert_eq!(trackers[2].problems["disk:/var"], "95%");

    let unhealthy: Vec<_> = snapshot.unhealthy_trackers().map(|t| t.name.clone()).collect();
    assert_eq!(unhealthy, vec!["k3s", "storage"]);
}

#[tokio::test]
async fn test_logout_returns_poller_to_basic_endpoint() {
    let h = TestHarness::new().await;
    h.mount_identity().await;
    h.mount_status(basic_body("X", true), legacy_detailed_body("X"))
        .await;

    h.store.login().await.unwrap();
    assert!(h.poller.poll_once().await.unwrap().is_detailed());

    let pending = h.store.logout();
    assert!(!h.poller.poll_once().await.unwrap().is_detailed());
    pending.await.unwrap();

    let mut paths = h.requested_paths().await;
    assert_eq!(paths[..2], ["/ops/api/login", "/ops/api/status/detailed"]);
    // The logout notification runs on its own task alongside the poll.
    paths[2..].sort();
    assert_eq!(paths[2..], ["/ops/api/logout", "/ops/api/status"]);
}

#[tokio::test]
async fn test_server_error_keeps_last_snapshot() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/ops/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(basic_body("X", true)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ops/api/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    let first = h.poller.poll_once().await.unwrap();
    let err = h.poller.poll_once().await.unwrap_err();

    assert!(matches!(err, Error::Status { status: 503, .. }));
    assert!(err.is_transient());
    assert!(h.poller.is_known());
    assert_eq!(h.poller.latest(), Some(first));
}

#[tokio::test]
async fn test_malformed_payload_is_not_published() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/ops/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "status"])))
        .mount(&h.server)
        .await;

    assert!(h.poller.poll_once().await.is_err());
    assert!(!h.bus.is_status_known());
}

#[tokio::test]
async fn test_scheduled_polls_reach_subscribers() {
    let h = TestHarness::new().await;
    h.mount_status(basic_body("X", true), legacy_detailed_body("X"))
        .await;

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let _sub = h.bus.subscribe_status(move |snapshot| {
        assert_eq!(snapshot.status().name, "X");
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut rx = h.bus.status().watch();
    let handle = h.poller.start();
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("first poll should publish")
        .unwrap();
    handle.shutdown();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
