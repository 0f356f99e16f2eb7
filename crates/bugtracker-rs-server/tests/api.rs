use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use bugtracker_rs_config::{Environment, ServerConfig, TrackerConfig};
use bugtracker_rs_protocol::{BugPriority, BugStatus};
use bugtracker_rs_server::{ServiceContext, router};
use bugtracker_rs_store::{BugStore, MemoryBugStore};
use bugtracker_rs_test_utils::{FailingStore, RecordingStore, bug_body, bug_record, record_id};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(store: Arc<dyn BugStore>, environment: Environment) -> Router {
    let config = TrackerConfig::builder()
        .server(ServerConfig {
            environment,
            ..ServerConfig::default()
        })
        .build();
    router(ServiceContext::with_store(config, store))
}

fn app() -> Router {
    app_with(Arc::new(MemoryBugStore::new()), Environment::Test)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn create_get_delete_flow() {
    let app = app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/bugs",
        Some(json!({"title":"Crash","description":"On save","reporter":"alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "open");
    assert_eq!(created["priority"], "medium");
    assert_eq!(created["tags"], json!([]));
    assert_eq!(created["createdAt"], created["updatedAt"]);
    let id = created["_id"].as_str().expect("id").to_string();
    assert_eq!(id.len(), 24);

    let (status, fetched) = send(&app, Method::GET, &format!("/api/bugs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, deleted) = send(&app, Method::DELETE, &format!("/api/bugs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"message": "Bug deleted successfully"}));

    let (status, missing) = send(&app, Method::GET, &format!("/api/bugs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing, json!({"error": "Bug not found"}));
}

#[tokio::test]
async fn create_sanitizes_before_storing() {
    let app = app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/bugs",
        Some(json!({
            "title": "  Crash  ",
            "description": " On save ",
            "reporter": " alice ",
            "assignee": "  ",
            "tags": ["  tag1  ", "", "  tag2  ", 123],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Crash");
    assert_eq!(created["reporter"], "alice");
    assert_eq!(created["tags"], json!(["tag1", "tag2"]));
    assert!(created.get("assignee").is_none());
}

#[tokio::test]
async fn create_rejects_invalid_body() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bugs",
        Some(json!({"title": "x".repeat(101), "description": "d", "status": "pending"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "error": "Validation failed",
            "details": [
                "Title cannot exceed 100 characters",
                "Status must be one of: open, in-progress, resolved, closed",
                "Reporter is required and must be a string",
            ],
        })
    );
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/bugs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body, json!({"error": "Invalid JSON payload"}));
}

#[tokio::test]
async fn invalid_ids_are_rejected() {
    let app = app();
    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/api/bugs/invalid-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid bug ID format"}));
    }
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/bugs/invalid-id",
        Some(json!({"status": "closed"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_only_update_skips_validation() {
    let store = Arc::new(RecordingStore::with_records([bug_record(
        1,
        "Crash",
        BugStatus::Open,
        BugPriority::High,
    )]));
    let app = app_with(store.clone(), Environment::Test);
    let id = record_id(1);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/bugs/{id}"),
        Some(json!({"status": "resolved"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "resolved");
    assert_eq!(updated["title"], "Crash");
    assert_ne!(updated["updatedAt"], updated["createdAt"]);

    let patches = store.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].1.title, None);
    assert_eq!(patches[0].1.status, Some(BugStatus::Resolved));
}

#[tokio::test]
async fn status_only_update_with_unknown_status_fails() {
    let store = Arc::new(MemoryBugStore::with_records([bug_record(
        1,
        "Crash",
        BugStatus::Open,
        BugPriority::High,
    )]));
    let app = app_with(store, Environment::Test);
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/bugs/{}", record_id(1)),
        Some(json!({"status": "pending"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn full_update_is_validated() {
    let store = Arc::new(MemoryBugStore::with_records([bug_record(
        1,
        "Crash",
        BugStatus::Open,
        BugPriority::High,
    )]));
    let app = app_with(store, Environment::Test);
    let uri = format!("/api/bugs/{}", record_id(1));

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"status": "closed", "priority": "low"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0], "Title is required and must be a string");

    let mut full = bug_body("Renamed");
    full["assignee"] = json!("bob");
    let (status, body) = send(&app, Method::PUT, &uri, Some(full)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["assignee"], "bob");
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/bugs/507f1f77bcf86cd799439011",
        Some(json!({"status": "closed"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Bug not found"}));
}

#[tokio::test]
async fn list_filters_sorts_and_paginates() {
    let records = (1..=12).map(|n| {
        let status = if n % 2 == 0 {
            BugStatus::Open
        } else {
            BugStatus::Closed
        };
        bug_record(n, &format!("bug {n}"), status, BugPriority::Medium)
    });
    let app = app_with(
        Arc::new(MemoryBugStore::with_records(records)),
        Environment::Test,
    );

    let (status, body) = send(&app, Method::GET, "/api/bugs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["pagination"],
        json!({"page": 1, "limit": 10, "total": 12, "pages": 2})
    );
    assert_eq!(body["bugs"][0]["title"], "bug 12");

    let (_, body) = send(&app, Method::GET, "/api/bugs?status=open&page=2&limit=4", None).await;
    assert_eq!(
        body["pagination"],
        json!({"page": 2, "limit": 4, "total": 6, "pages": 2})
    );
    let titles: Vec<_> = body["bugs"]
        .as_array()
        .expect("bugs")
        .iter()
        .map(|bug| bug["title"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(titles, vec!["bug 4", "bug 2"]);

    let (_, body) = send(&app, Method::GET, "/api/bugs?limit=abc&page=0", None).await;
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["pagination"]["page"], 1);

    let (_, body) = send(&app, Method::GET, "/api/bugs?priority=urgent", None).await;
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["bugs"], json!([]));
}

#[tokio::test]
async fn list_passes_typed_criteria_to_store() {
    let store = Arc::new(RecordingStore::new());
    let app = app_with(store.clone(), Environment::Test);
    send(&app, Method::GET, "/bugs?status=in-progress&limit=500", None).await;
    let queries = store.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].status, Some(BugStatus::InProgress));
    assert_eq!(queries[0].page.limit, 100);
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["uptime"].as_f64().is_some());
    assert!(body["timestamp"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Route not found"}));
}

#[tokio::test]
async fn internal_errors_expose_detail_only_in_development() {
    let dev = app_with(Arc::new(FailingStore), Environment::Development);
    let (status, body) = send(&dev, Method::GET, "/api/bugs", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("simulated store failure"))
    );

    let prod = app_with(Arc::new(FailingStore), Environment::Production);
    let (status, body) = send(&prod, Method::GET, "/api/bugs", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn default_config_masks_internal_errors() {
    let app = router(ServiceContext::with_store(
        TrackerConfig::default(),
        Arc::new(FailingStore),
    ));
    let (status, body) = send(&app, Method::GET, "/api/bugs", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn huge_page_returns_empty_page() {
    let app = app();
    send(&app, Method::POST, "/api/bugs", Some(bug_body("Crash"))).await;
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/bugs?page=18446744073709551615&limit=100",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bugs"], json!([]));
    assert_eq!(body["pagination"]["total"], 1);
}
