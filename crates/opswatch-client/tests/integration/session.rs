//! Integration tests for identity, login, logout and the route guard.

use opswatch_auth::{AuthError, Route};
use opswatch_core::Identity;

use crate::common::{TestHarness, USERNAME};

#[tokio::test]
async fn test_startup_probe_resolves_anonymous() {
    let h = TestHarness::new().await;
    h.mount_identity().await;

    assert!(!h.store.is_ready());
    let identity = h.store.probe_identity().await.unwrap();

    assert_eq!(identity, Identity::anonymous());
    assert!(h.store.is_ready());
    assert!(!h.backend.has_session());
}

#[tokio::test]
async fn test_login_then_probe_uses_session() {
    let h = TestHarness::new().await;
    h.mount_identity().await;

    let identity = h.store.login().await.unwrap();
    assert_eq!(identity.username(), Some(USERNAME));
    assert_eq!(h.history.current(), Some(Route::Dashboard));

    // The probe now carries the cached credentials.
    let probed = h.store.probe_identity().await.unwrap();
    assert_eq!(probed.username(), Some(USERNAME));
}

#[tokio::test]
async fn test_login_without_credentials_fails() {
    let h = TestHarness::anonymous_only().await;
    h.mount_identity().await;

    let err = h.store.login().await.unwrap_err();
    assert!(matches!(err, AuthError::MissingCredentials));
    assert!(!h.store.is_authenticated());
    assert!(h.requested_paths().await.is_empty());
}

#[tokio::test]
async fn test_logout_clears_identity_and_session() {
    let h = TestHarness::new().await;
    h.mount_identity().await;
    h.store.login().await.unwrap();

    let pending = h.store.logout();
    assert!(!h.store.is_authenticated());
    assert_eq!(h.history.current(), Some(Route::PublicRoot));

    // The server answers 401, which still counts as a completed logout.
    pending.await.unwrap();
    assert!(!h.backend.has_session());

    let probed = h.store.probe_identity().await.unwrap();
    assert_eq!(probed, Identity::anonymous());

    let requests = h.server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.url.path(), "/ops/api/me");
    assert!(last.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_probe_between_logout_and_await_stays_anonymous() {
    let h = TestHarness::new().await;
    h.mount_identity().await;
    h.store.login().await.unwrap();

    let pending = h.store.logout();
    let probed = h.store.probe_identity().await.unwrap();
    pending.await.unwrap();

    assert_eq!(probed, Identity::anonymous());
    assert_eq!(h.store.identity(), Identity::anonymous());
}

#[tokio::test]
async fn test_dropped_logout_still_notifies_backend() {
    let h = TestHarness::new().await;
    h.mount_identity().await;
    h.store.login().await.unwrap();

    drop(h.store.logout());
    assert!(!h.backend.has_session());

    let probed = h.store.probe_identity().await.unwrap();
    assert_eq!(probed, Identity::anonymous());
    assert!(!h.store.is_authenticated());

    let mut seen_logout = false;
    for _ in 0..50 {
        if h.requested_paths().await.iter().any(|p| p == "/ops/api/logout") {
            seen_logout = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(seen_logout);
}

#[tokio::test]
async fn test_guard_allows_after_login() {
    let h = TestHarness::new().await;
    h.mount_identity().await;
    h.store.probe_identity().await.unwrap();
    h.store.login().await.unwrap();

    assert_eq!(h.router.activate("/dashboard/traefik").await, Route::Traefik);
    assert_eq!(h.router.activate("/dashboard/kubernetes").await, Route::Kubernetes);
}

#[tokio::test]
async fn test_guard_denies_anonymous() {
    let h = TestHarness::new().await;
    h.mount_identity().await;
    h.store.probe_identity().await.unwrap();

    assert_eq!(h.router.activate("/dashboard").await, Route::Unauthorized);
    assert_eq!(h.history.current(), Some(Route::Unauthorized));
}

#[tokio::test]
async fn test_guard_waits_for_probe() {
    let h = TestHarness::new().await;
    h.mount_identity().await;

    let router = h.router.clone();
    let pending = tokio::spawn(async move { router.activate("/dashboard").await });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(!pending.is_finished());

    h.store.probe_identity().await.unwrap();
    assert_eq!(pending.await.unwrap(), Route::Unauthorized);
}

#[tokio::test]
async fn test_public_routes_skip_guard() {
    let h = TestHarness::new().await;

    assert_eq!(h.router.activate("/status").await, Route::Status);
    assert_eq!(h.router.activate("/somewhere/else").await, Route::Status);
    assert!(h.requested_paths().await.is_empty());
}
