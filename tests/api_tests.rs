// tests/api_tests.rs
//! HTTP API tests driving the router in-process.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use credential_registry::services::api_server::{ApiServer, CALLER_HEADER};
use credential_registry::storage::ipfs_client::InMemoryStorage;
use credential_registry::utils::clock::ManualClock;
use credential_registry::{Identity, RegistryService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const OWNER: &str = "0x00000000000000000000000000000000000000aa";
const ISSUER: &str = "0x0000000000000000000000000000000000000001";
const SUBJECT: &str = "0x0000000000000000000000000000000000000002";
const STRANGER: &str = "0x0000000000000000000000000000000000000099";

fn app() -> (Router, RegistryService) {
    let owner: Identity = OWNER.parse().unwrap();
    let registry = RegistryService::with_clock(owner, Arc::new(ManualClock::new(1_000))).unwrap();
    let router = ApiServer::new(registry.clone(), Arc::new(InMemoryStorage::new())).router();
    (router, registry)
}

async fn send(app: &Router, method: &str, uri: &str, caller: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn with_issuer() -> (Router, RegistryService) {
    let (app, registry) = app();
    let (status, body) = send(
        &app,
        "POST",
        "/issuers",
        Some(OWNER),
        Some(json!({"id": ISSUER, "name": "Example University", "country": "NL"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    (app, registry)
}

#[tokio::test]
async fn issue_verify_revoke_flow() {
    let (app, _registry) = with_issuer().await;

    let (status, body) = send(
        &app,
        "POST",
        "/credentials",
        Some(ISSUER),
        Some(json!({"subject": SUBJECT, "content_ref": "bafy-doc", "credential_type": "degree"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["credential_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/credentials/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["issuer"], ISSUER);
    assert_eq!(body["expiry_date"], 0);

    let (status, _) = send(&app, "POST", &format!("/credentials/{}/revoke", id), Some(STRANGER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", &format!("/credentials/{}/revoke", id), Some(ISSUER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "POST", &format!("/credentials/{}/revoke", id), Some(ISSUER), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_revoked");

    let (_, body) = send(&app, "GET", &format!("/credentials/{}/status", id), None, None).await;
    assert_eq!(body["status"], "revoked");

    let (_, body) = send(&app, "GET", &format!("/subjects/{}/credentials", SUBJECT), None, None).await;
    assert_eq!(body["credentials"], json!([id]));
}

#[tokio::test]
async fn document_upload_and_fetch() {
    let (app, _registry) = with_issuer().await;
    let (status, body) = send(
        &app,
        "POST",
        "/documents",
        Some(ISSUER),
        Some(json!({"document": {"degree": "BSc"}, "subject": SUBJECT, "credential_type": "degree"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["credential_id"].as_str().unwrap().to_string();
    assert!(body["content_ref"].as_str().unwrap().starts_with("sha256-"));

    let (status, body) = send(&app, "GET", &format!("/credentials/{}/document", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document"]["degree"], "BSc");
    assert_eq!(body["metadata"]["issuer"], ISSUER);
}

#[tokio::test]
async fn pause_returns_service_unavailable_but_reads_work() {
    let (app, registry) = with_issuer().await;
    let id = registry
        .issue_credential(ISSUER.parse().unwrap(), SUBJECT.parse().unwrap(), "bafy-doc", "degree", 0)
        .unwrap();

    let (status, _) = send(&app, "POST", "/pause", Some(STRANGER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "POST", "/pause", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "POST",
        "/credentials",
        Some(ISSUER),
        Some(json!({"subject": SUBJECT, "content_ref": "bafy-2", "credential_type": "degree"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "system_paused");

    let (status, body) = send(&app, "GET", &format!("/credentials/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], true);

    let (_, body) = send(&app, "GET", "/registry", None, None).await;
    assert_eq!(body["paused"], true);
    assert_eq!(body["total_credentials"], 1);
}

#[tokio::test]
async fn removing_issuer_over_http_invalidates_credentials() {
    let (app, registry) = with_issuer().await;
    let id = registry
        .issue_credential(ISSUER.parse().unwrap(), SUBJECT.parse().unwrap(), "bafy-doc", "degree", 0)
        .unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/issuers/{}", ISSUER), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", &format!("/credentials/{}/report", id), None, None).await;
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["status"], "issuer_deauthorized");

    let (_, body) = send(&app, "GET", &format!("/issuers/{}", ISSUER), None, None).await;
    assert_eq!(body["active"], false);
    assert_eq!(body["issued_count"], 1);
}

#[tokio::test]
async fn request_errors() {
    let (app, _registry) = with_issuer().await;

    let (status, body) = send(&app, "POST", "/pause", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_caller");

    let (status, _) = send(&app, "POST", "/pause", Some("not-hex"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/credentials/0x1234", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = format!("0x{}", "00".repeat(32));
    let (status, body) = send(&app, "GET", &format!("/credentials/{}", unknown), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(
        &app,
        "POST",
        "/issuers",
        Some(OWNER),
        Some(json!({"id": ISSUER, "name": "Again", "country": "NL"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn event_feed_is_paged_by_sequence() {
    let (app, _registry) = with_issuer().await;
    send(&app, "POST", "/pause", Some(OWNER), None).await;
    send(&app, "POST", "/unpause", Some(OWNER), None).await;

    let (_, body) = send(&app, "GET", "/events", None, None).await;
    let kinds: Vec<_> = body.as_array().unwrap().iter().map(|e| e["kind"].clone()).collect();
    assert_eq!(kinds, vec![json!("issuer_added"), json!("paused"), json!("unpaused")]);

    let (_, body) = send(&app, "GET", "/events?since=2", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["sequence"], 2);
}

#[tokio::test]
async fn malformed_bodies_and_queries_get_json_errors() {
    let (app, registry) = app();

    let (status, body) = send(
        &app,
        "POST",
        "/issuers",
        Some(OWNER),
        Some(json!({"id": "0x1234", "name": "Example University", "country": "NL"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
    assert!(body["message"].is_string());
    assert!(registry.list_issuers().is_empty());

    let (status, body) = send(&app, "POST", "/credentials", Some(ISSUER), Some(json!({"subject": SUBJECT}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, body) = send(&app, "GET", "/events?since=-1", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn subject_reports_cover_every_credential() {
    let (app, _registry) = with_issuer().await;
    for content_ref in ["bafy-one", "bafy-two"] {
        let (status, _) = send(
            &app,
            "POST",
            "/credentials",
            Some(ISSUER),
            Some(json!({"subject": SUBJECT, "content_ref": content_ref, "credential_type": "degree"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, "DELETE", &format!("/issuers/{}", ISSUER), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/subjects/{}/reports", SUBJECT), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    for report in reports {
        assert_eq!(report["status"], "issuer_deauthorized");
        assert_eq!(report["is_valid"], false);
    }
}
