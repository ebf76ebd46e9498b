//! Integration tests for the envelope client against the mock master.

use opsdash_devkit::{MockMaster, RecordingNotifier};
use opsdash_sync::models::AlertEventsSnapshot;
use opsdash_sync::{
    ApiError, EnvelopeClient, Method, NoticeLevel, Notifier, SyncConfig, NOTICE_TIMEOUT,
};
use serde_json::{json, Value};
use std::sync::Arc;

async fn setup() -> (MockMaster, EnvelopeClient, Arc<RecordingNotifier>) {
    let master = MockMaster::start().await.unwrap();
    let notifier = RecordingNotifier::new();
    let sink: Notifier = notifier.clone();
    let cfg = SyncConfig {
        api_base: master.base_url(),
        token: "test-token".into(),
        ..Default::default()
    };
    let client = EnvelopeClient::new(&cfg, sink).unwrap();
    (master, client, notifier)
}

#[tokio::test]
async fn success_envelope_resolves_with_unwrapped_data() {
    let (master, client, notifier) = setup().await;
    master.respond_enveloped("/api/widgets", json!({"x": 1}));

    let data = client.call(Method::GET, "/api/widgets", None).await.unwrap();
    assert_eq!(data, json!({"x": 1}));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn business_failure_errors_and_notifies_once() {
    let (master, client, notifier) = setup().await;
    master.respond_business_error("/api/deploy", 30003, "bad");

    let err = client.call(Method::POST, "/api/deploy", None).await.unwrap_err();
    match &err {
        ApiError::Business { code, msg } => {
            assert_eq!(*code, 30003);
            assert_eq!(msg, "bad");
        }
        other => panic!("expected business error, got {other:?}"),
    }

    let notices = notifier.containing("bad");
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].timeout, Some(NOTICE_TIMEOUT));
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn legacy_body_without_code_passes_through_silently() {
    let (master, client, notifier) = setup().await;
    let legacy = json!({"rows": [1, 2, 3], "total": 3});
    master.respond_json("/api/legacy/list", 200, legacy.clone());

    let body = client.call(Method::GET, "/api/legacy/list", None).await.unwrap();
    assert_eq!(body, legacy);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn http_status_maps_to_fixed_message() {
    let (_master, client, notifier) = setup().await;

    // Unregistered path: the mock answers 404.
    let err = client.call(Method::GET, "/api/nope", None).await.unwrap_err();
    match &err {
        ApiError::Transport { msg } => assert!(msg.contains("(404)"), "got: {msg}"),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn unreachable_master_is_a_network_failure() {
    let notifier = RecordingNotifier::new();
    let sink: Notifier = notifier.clone();
    let cfg = SyncConfig {
        // Nothing listens here.
        api_base: "http://127.0.0.1:1".into(),
        ..Default::default()
    };
    let client = EnvelopeClient::new(&cfg, sink).unwrap();

    let err = client.call(Method::GET, "/api/widgets", None).await.unwrap_err();
    match &err {
        ApiError::Transport { msg } => assert_eq!(msg, "network connection failed"),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn binary_passthrough_skips_envelope() {
    let (master, client, notifier) = setup().await;
    master.respond_binary("/api/packages/download", "application/octet-stream", vec![0xde, 0xad]);

    let raw = client.call_raw(Method::GET, "/api/packages/download", None).await.unwrap();
    assert_eq!(raw.status.as_u16(), 200);
    assert_eq!(raw.body, vec![0xde, 0xad]);
    assert_eq!(
        raw.headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/octet-stream")
    );
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn binary_passthrough_still_classifies_bad_status() {
    let (_master, client, notifier) = setup().await;

    let err = client.call_raw(Method::GET, "/api/packages/missing", None).await.unwrap_err();
    match &err {
        ApiError::Transport { msg } => assert!(msg.contains("(404)"), "got: {msg}"),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn bearer_credential_is_attached_to_every_call() {
    let (master, client, _notifier) = setup().await;
    master.respond_enveloped("/api/widgets", Value::Null);

    client.call(Method::GET, "/api/widgets", None).await.unwrap();
    assert_eq!(master.last_auth_header(), Some("Bearer test-token".into()));
}

#[tokio::test]
async fn post_body_round_trips() {
    let (master, client, _notifier) = setup().await;
    master.respond_enveloped("/api/nodes/add", Value::Null);

    let body = json!({"ip": "10.0.0.1", "name": "web-01"});
    let data = client.call(Method::POST, "/api/nodes/add", Some(&body)).await.unwrap();
    assert_eq!(data, Value::Null);
}

#[tokio::test]
async fn typed_fetch_decodes_alert_snapshot() {
    let (master, client, _notifier) = setup().await;
    master.set_active_alerts(vec![
        json!({"id": 1, "rule_name": "cpu-high", "status": "firing"}),
        json!({"id": 2, "rule_name": "disk-full", "status": "firing"}),
    ]);

    let snap: AlertEventsSnapshot = client.get_json("/api/alerts/events").await.unwrap();
    assert_eq!(snap.active.len(), 2);
    assert_eq!(snap.active[0].rule_name, "cpu-high");
    assert!(snap.history.is_empty());
}
