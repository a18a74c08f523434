//! Storage policy setter tests against a local S3-compatible endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::put;
use axum::Router;
use parlor_recording::StoragePolicySetter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockStore {
    policy_calls: AtomicUsize,
    last_bucket: Mutex<Option<String>>,
}

async fn put_bucket_policy(
    State(state): State<Arc<MockStore>>,
    Path(bucket): Path<String>,
) -> StatusCode {
    state.policy_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_bucket.lock().unwrap() = Some(bucket);
    StatusCode::NO_CONTENT
}

async fn spawn_mock(state: Arc<MockStore>) -> String {
    let app = Router::new()
        .route("/{bucket}", put(put_bucket_policy))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn repeated_application_builds_one_client() {
    let mock = Arc::new(MockStore::default());
    let url = spawn_mock(mock.clone()).await;
    let mut setter = StoragePolicySetter::with_endpoint("AK", "SK", &url);

    assert!(!setter.client_initialized());

    setter
        .ensure_public_access("recordings", "fra1")
        .await
        .expect("first application");
    assert!(setter.client_initialized());

    setter
        .ensure_public_access("recordings", "fra1")
        .await
        .expect("second application");
    setter
        .ensure_public_access("recordings", "fra1")
        .await
        .expect("third application");

    // The client is reused; every call still reapplies the (idempotent)
    // policy against the same bucket path.
    assert_eq!(mock.policy_calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        mock.last_bucket.lock().unwrap().as_deref(),
        Some("recordings")
    );
}

#[tokio::test]
async fn unreachable_endpoint_surfaces_as_storage_error() {
    // Nothing listens on this port.
    let mut setter = StoragePolicySetter::with_endpoint("AK", "SK", "http://127.0.0.1:1");

    let result = setter.ensure_public_access("recordings", "fra1").await;
    assert!(result.is_err(), "expected a storage error");
}
