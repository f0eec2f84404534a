use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;
use uuid::Uuid;

use tracking_api::{build_router, AppState};
use tracking_storage::{StorageConfig, TrackingStore};

async fn test_app(dir: &TempDir) -> Router {
    let path = dir.path().join("tracking.db");
    let store = TrackingStore::connect(&StorageConfig::new(path.to_str().unwrap()))
        .await
        .expect("connect store");
    build_router(AppState::new(store))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bare_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn transfer_json(ubid: Uuid) -> Value {
    json!({
        "UBID": ubid,
        "fileName": "20211119-100533941568.xml",
        "origName": "D1-619133013-20211119-100423.xml",
        "SMScount": 4,
        "documents": 2
    })
}

fn documents_json(ubid: Uuid, ids: &[&str]) -> Value {
    json!({
        "UBID": ubid,
        "documents": ids.iter().map(|id| json!({
            "uniqueId": id,
            "SMScount": 2,
            "data": {"source": "DentalCare", "refId": id}
        })).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn create_transfer_echoes_payload() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let ubid = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tracking/sms_transfers",
            transfer_json(ubid),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["UBID"], json!(ubid));
    assert_eq!(body["fileName"], json!("20211119-100533941568.xml"));

    let response = app
        .oneshot(bare_request("GET", "/tracking/sms_transfers"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["state"], json!("INIT"));
    assert_eq!(listed[0]["fallbackCount"], json!(0));
}

#[tokio::test]
async fn create_transfer_rejects_invalid_payload() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let mut bad = transfer_json(Uuid::new_v4());
    bad["SMScount"] = json!(0);
    let response = app
        .oneshot(json_request("POST", "/tracking/sms_transfers", bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_transfer_state_returns_refreshed_row() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let ubid = Uuid::new_v4();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/tracking/sms_transfers",
            transfer_json(ubid),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(bare_request(
            "PUT",
            &format!("/tracking/sms_transfers/{ubid}/SENT"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["state"], json!("SENT"));
    assert_eq!(body["UBID"], json!(ubid.to_string()));

    let response = app
        .oneshot(bare_request(
            "PUT",
            &format!("/tracking/sms_transfers/{}/SENT", Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_transfer_then_not_found() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let ubid = Uuid::new_v4();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/tracking/sms_transfers",
            transfer_json(ubid),
        ))
        .await
        .unwrap();

    let uri = format!("/tracking/sms_transfers/{ubid}");
    let response = app.clone().oneshot(bare_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(bare_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn document_flow_counts_and_updates() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let ubid = Uuid::new_v4();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/tracking/sms_transfers",
            transfer_json(ubid),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tracking/sms_documents",
            documents_json(ubid, &["1", "2", "3"]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(body["result"].as_str().unwrap().contains("Inserted 3"));

    let response = app
        .clone()
        .oneshot(bare_request(
            "GET",
            &format!("/tracking/sms_documents/{ubid}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["result"].as_str().unwrap().contains("Found 3"));

    let response = app
        .oneshot(bare_request(
            "PUT",
            &format!("/tracking/sms_documents/{ubid}/SENT"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["result"].as_str().unwrap().contains("Updated state to 'SENT' in 3 row(s)"));
}

#[tokio::test]
async fn documents_for_unknown_transfer_are_unprocessable() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;
    let unknown = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tracking/sms_documents",
            documents_json(unknown, &["1"]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains(&unknown.to_string()));

    // nothing was written for the rejected batch
    let response = app
        .oneshot(bare_request(
            "GET",
            &format!("/tracking/sms_documents/{unknown}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_probe_is_live() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let response = app.oneshot(bare_request("GET", "/health/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("live"));
}
