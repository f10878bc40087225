use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};
use usage_tracker::{
    config::UsageTrackerConfig,
    contract::model::{ActivityEvent, NewActivity, NewRegistration, User},
    domain::repo::RecordStore,
    domain::service::{Service, ServiceConfig},
    infra::storage::JsonFileStore,
    UsageTracker,
};

/// Fresh JSON store in its own temp dir; keep the `TempDir` alive for the test.
async fn create_test_store() -> (TempDir, Arc<JsonFileStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = JsonFileStore::new(dir.path().join("data"));
    store.init().await.expect("Failed to init store");
    (dir, Arc::new(store))
}

async fn create_test_service() -> (TempDir, Arc<JsonFileStore>, Arc<Service>) {
    let (dir, store) = create_test_store().await;
    let service = Arc::new(Service::new(store.clone(), ServiceConfig::default()));
    (dir, store, service)
}

/// Usage tracker routes behind the full ingress stack
fn create_test_router(service: Arc<Service>) -> Router {
    let routes = usage_tracker::api::rest::routes::register_routes(Router::new(), service);
    ApiIngress::new(ApiIngressConfig::default(), None).build_router(routes)
}

fn registration(id: &str, email: &str) -> NewRegistration {
    NewRegistration {
        id: Some(id.into()),
        username: Some(format!("user-{id}")),
        email: Some(email.into()),
        ..Default::default()
    }
}

fn activity(user_id: &str, action: &str, messages: u64) -> NewActivity {
    NewActivity {
        user_id: Some(user_id.into()),
        action: Some(action.into()),
        messages_sent: Some(messages),
        ..Default::default()
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// ---------- domain service over the JSON store ----------

#[tokio::test]
async fn test_register_is_idempotent_by_id() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;

    let first = service.register(registration("u1", "a@example.com")).await?;
    assert!(first.is_created());

    let second = service.register(registration("u1", "other@example.com")).await?;
    assert!(!second.is_created());
    assert_eq!(second.user(), first.user());

    assert_eq!(store.load_users().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_register_is_idempotent_by_email() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;

    service.register(registration("u1", "same@example.com")).await?;
    let repeat = service.register(registration("u2", "same@example.com")).await?;

    assert!(!repeat.is_created());
    assert_eq!(repeat.user().id, "u1");
    assert_eq!(store.load_users().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_register_defaults_version_and_keeps_given_registration_time() -> Result<()> {
    let (_dir, _store, service) = create_test_service().await;
    let registered_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    let user = service
        .register(NewRegistration {
            registered_at: Some(registered_at),
            ..registration("u1", "a@example.com")
        })
        .await?
        .into_user();

    assert_eq!(user.version, "1.0.0");
    assert_eq!(user.registered_at, registered_at);
    Ok(())
}

#[tokio::test]
async fn test_validation_failures_do_not_touch_storage() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;
    let users_before = tokio::fs::read(store.users_path()).await?;
    let activity_before = tokio::fs::read(store.activity_path()).await?;

    let missing_email = NewRegistration {
        email: None,
        ..registration("u1", "a@example.com")
    };
    let err = service.register(missing_email).await.unwrap_err();
    assert!(err.is_validation());

    let missing_action = NewActivity {
        action: None,
        ..activity("u1", "start", 0)
    };
    let err = service.record_activity(missing_action).await.unwrap_err();
    assert!(err.is_validation());

    assert_eq!(tokio::fs::read(store.users_path()).await?, users_before);
    assert_eq!(tokio::fs::read(store.activity_path()).await?, activity_before);
    Ok(())
}

#[tokio::test]
async fn test_activity_updates_last_active() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;
    service.register(registration("u1", "a@example.com")).await?;

    let at = Utc::now() + Duration::minutes(5);
    service
        .record_activity(NewActivity {
            timestamp: Some(at),
            ..activity("u1", "start", 0)
        })
        .await?;

    let users = store.load_users().await;
    assert_eq!(users[0].last_active, at);
    Ok(())
}

#[tokio::test]
async fn test_activity_for_unknown_user_is_stored() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;

    let event = service.record_activity(activity("ghost", "stop", 3)).await?;

    assert_eq!(event.user_id, "ghost");
    assert!(store.load_users().await.is_empty());
    assert_eq!(store.load_activity().await, vec![event]);
    Ok(())
}

#[tokio::test]
async fn test_activity_retention_drops_oldest() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;

    for n in 0..1005 {
        service
            .record_activity(activity(&format!("user-{n}"), "start", n))
            .await?;
    }

    let events = store.load_activity().await;
    assert_eq!(events.len(), 1000);
    for n in 0..5 {
        let evicted = format!("user-{n}");
        assert!(
            events.iter().all(|e| e.user_id != evicted),
            "{evicted} should have been evicted"
        );
    }
    assert_eq!(events.first().map(|e| e.user_id.as_str()), Some("user-5"));
    assert_eq!(events.last().map(|e| e.user_id.as_str()), Some("user-1004"));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_registrations_are_not_lost() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;

    let tasks: Vec<_> = (0..20)
        .map(|n| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .register(registration(&format!("u{n}"), &format!("u{n}@example.com")))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await??;
    }

    assert_eq!(store.load_users().await.len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_stats_over_stored_records() -> Result<()> {
    let (_dir, _store, service) = create_test_service().await;
    service.register(registration("u1", "a@example.com")).await?;
    service.register(registration("u2", "b@example.com")).await?;

    // u2 was last seen yesterday
    service
        .record_activity(NewActivity {
            timestamp: Some(Utc::now() - Duration::days(1)),
            ..activity("u2", "start", 99)
        })
        .await?;
    service.record_activity(activity("u1", "stop", 5)).await?;

    let stats = service.stats().await;
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.active_today, 1);
    assert_eq!(stats.total_messages, 5);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_files_read_as_empty() -> Result<()> {
    let (_dir, store, service) = create_test_service().await;
    tokio::fs::write(store.users_path(), b"{not json").await?;
    tokio::fs::write(store.activity_path(), b"").await?;

    assert!(service.list_users().await.is_empty());
    assert!(service.list_activity().await.is_empty());

    // next write replaces the corrupt file
    service.register(registration("u1", "a@example.com")).await?;
    assert_eq!(store.load_users().await.len(), 1);
    Ok(())
}

// ---------- module wiring ----------

#[tokio::test]
async fn test_module_init_resolves_data_dir_under_home() -> Result<()> {
    let home = TempDir::new()?;
    let cfg = UsageTrackerConfig {
        data_dir: "store".into(),
        ..Default::default()
    };

    let tracker = UsageTracker::init(&cfg, home.path()).await?;

    assert!(home.path().join("store").join("users.json").is_file());
    assert!(home.path().join("store").join("activity.json").is_file());
    assert!(tracker.service().list_users().await.is_empty());
    Ok(())
}

// ---------- REST API ----------

#[tokio::test]
async fn test_register_then_list_users() {
    let (_dir, _store, service) = create_test_service().await;
    let router = create_test_router(service);

    let (status, body) = send(
        &router,
        "POST",
        "/api/register",
        Some(json!({
            "id": "u1",
            "username": "alice",
            "email": "alice@example.com",
            "registeredAt": "2024-01-01T00:00:00Z",
            "version": "2.1.0"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["id"], "u1");
    assert_eq!(body["user"]["version"], "2.1.0");
    assert!(body.get("message").is_none());

    let (status, body) = send(&router, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], "u1");
    assert!(users[0].get("registeredAt").is_some());
    assert!(users[0].get("lastActive").is_some());
}

#[tokio::test]
async fn test_repeat_registration_returns_message() {
    let (_dir, _store, service) = create_test_service().await;
    let router = create_test_router(service);
    let payload = json!({"id": "u1", "username": "alice", "email": "alice@example.com"});

    send(&router, "POST", "/api/register", Some(payload.clone())).await;
    let (status, body) = send(&router, "POST", "/api/register", Some(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User already registered");
    assert_eq!(body["user"]["id"], "u1");
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn test_missing_field_is_a_problem_response() {
    let (_dir, store, service) = create_test_service().await;
    let router = create_test_router(service);

    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header("content-type", "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from(json!({"id": "u1", "username": "alice"}).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(body["code"], "USAGE_VALIDATION");
    assert_eq!(body["instance"], "/api/register");
    assert_eq!(body["request_id"], "req-42");
    assert_eq!(body["errors"][0]["pointer"], "/email");

    assert!(store.load_users().await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (_dir, _store, service) = create_test_service().await;
    let router = create_test_router(service);

    let request = Request::builder()
        .method("POST")
        .uri("/api/activity")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"userId": "u1", "action": "start", "messagesSent": "many"}"#))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        "POST",
        "/api/activity",
        Some(json!({"userId": "u1", "action": "start", "timestamp": "yesterday"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USAGE_INVALID_BODY");
}

#[tokio::test]
async fn test_activity_endpoints_and_stats() {
    let (_dir, _store, service) = create_test_service().await;
    let router = create_test_router(service);

    send(
        &router,
        "POST",
        "/api/register",
        Some(json!({"id": "u1", "username": "alice", "email": "alice@example.com"})),
    )
    .await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/activity",
        Some(json!({"userId": "u1", "action": "stop", "messagesSent": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, body) = send(
        &router,
        "POST",
        "/api/activity",
        Some(json!({"userId": "u1", "action": "start"})),
    )
    .await;
    assert_eq!(body["success"], true);

    let (status, body) = send(&router, "GET", "/api/activity", None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body["activity"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["action"], "stop");
    assert_eq!(events[1]["messagesSent"], 0);

    let (status, body) = send(&router, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"totalUsers": 1, "activeToday": 1, "totalMessages": 5})
    );
}

#[tokio::test]
async fn test_every_required_field_is_checked() {
    let (_dir, store, service) = create_test_service().await;
    let router = create_test_router(service);
    let users_before = tokio::fs::read(store.users_path()).await.unwrap();
    let activity_before = tokio::fs::read(store.activity_path()).await.unwrap();

    let register = json!({"id": "u1", "username": "alice", "email": "alice@example.com"});
    let activity = json!({"userId": "u1", "action": "start"});
    let cases = [
        ("/api/register", &register, "id"),
        ("/api/register", &register, "username"),
        ("/api/register", &register, "email"),
        ("/api/activity", &activity, "userId"),
        ("/api/activity", &activity, "action"),
    ];

    for (uri, full, field) in cases {
        let mut payload = full.clone();
        payload.as_object_mut().unwrap().remove(field);

        let (status, body) = send(&router, "POST", uri, Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} without {field}");
        assert_eq!(body["code"], "USAGE_VALIDATION", "{uri} without {field}");
        assert_eq!(body["errors"][0]["pointer"], format!("/{field}"));
    }

    assert_eq!(tokio::fs::read(store.users_path()).await.unwrap(), users_before);
    assert_eq!(tokio::fs::read(store.activity_path()).await.unwrap(), activity_before);
}

#[tokio::test]
async fn test_stats_survive_huge_message_counts() {
    let (_dir, _store, service) = create_test_service().await;
    let router = create_test_router(service);

    for _ in 0..2 {
        let (status, _) = send(
            &router,
            "POST",
            "/api/activity",
            Some(json!({"userId": "u1", "action": "stop", "messagesSent": u64::MAX})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&router, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalMessages"], json!(u64::MAX));
}

#[tokio::test]
async fn test_dashboard_is_served_as_html() {
    let (_dir, _store, service) = create_test_service().await;
    let router = create_test_router(service);

    let request = Request::builder()
        .uri("/dashboard")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
}

// ---------- storage failures ----------

/// Store whose loads succeed (empty) and whose saves always fail.
struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn load_users(&self) -> Vec<User> {
        Vec::new()
    }

    async fn save_users(&self, _users: &[User]) -> Result<()> {
        anyhow::bail!("disk full")
    }

    async fn load_activity(&self) -> Vec<ActivityEvent> {
        Vec::new()
    }

    async fn save_activity(&self, _events: &[ActivityEvent]) -> Result<()> {
        anyhow::bail!("disk full")
    }
}

#[tokio::test]
async fn test_storage_failure_is_internal_error_without_details() {
    let service = Arc::new(Service::new(Arc::new(FailingStore), ServiceConfig::default()));
    let router = create_test_router(service);

    let (status, body) = send(
        &router,
        "POST",
        "/api/register",
        Some(json!({"id": "u1", "username": "alice", "email": "alice@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "USAGE_STORAGE");
    assert!(!body.to_string().contains("disk full"));
}
