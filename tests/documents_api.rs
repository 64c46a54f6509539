//! Application document attachments over multipart.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use common::{body_bytes, body_json, build_test_app, request, TestApp};
use kr_portal::portal::models::BrokerRole;
use serde_json::json;

const BOUNDARY: &str = "kr-test-boundary";

fn multipart(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &TestApp, token: &str, application_id: &str, body: Vec<u8>) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/portal/applications/{}/documents", application_id))
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

async fn application(app: &TestApp, token: &str) -> String {
    let client = body_json(app.post_json("/api/portal/clients", token, json!({"full_name": "Jane"})).await).await;
    let created = app
        .post_json(
            "/api/portal/applications",
            token,
            json!({"client_id": client["data"]["id"], "loan_amount": 250000}),
        )
        .await;
    body_json(created).await["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn upload_list_download_delete() {
    let app = build_test_app();
    let (broker, token) = app.broker("Sam", BrokerRole::Broker).await;
    let app_id = application(&app, &token).await;

    let response = upload(&app, &token, &app_id, multipart("file", "pay stub.pdf", "application/pdf", b"%PDF-1.4 stub")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let doc = body_json(response).await["data"].clone();
    assert_eq!(doc["file_name"], "pay_stub.pdf");
    assert_eq!(doc["size_bytes"], 13);
    assert_eq!(doc["uploaded_by"], broker.id.to_string());
    let doc_id = doc["id"].as_str().unwrap().to_string();
    let key = doc["storage_path"].as_str().unwrap().to_string();
    assert_eq!(key, format!("applications/{}/{}/pay_stub.pdf", app_id, doc_id));
    assert!(app.blobs.contains(&key).await);

    let list = body_json(app.get(&format!("/api/portal/applications/{}/documents", app_id), Some(&token)).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let download = app
        .get(&format!("/api/portal/applications/{}/documents/{}", app_id, doc_id), Some(&token))
        .await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(download.headers()[CONTENT_TYPE], "application/pdf");
    assert_eq!(download.headers()[CONTENT_DISPOSITION], "attachment; filename=\"pay_stub.pdf\"");
    assert_eq!(body_bytes(download).await, b"%PDF-1.4 stub".to_vec());

    let deleted = app
        .send(request(
            Method::DELETE,
            &format!("/api/portal/applications/{}/documents/{}", app_id, doc_id),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(!app.blobs.contains(&key).await);

    let gone = app
        .get(&format!("/api/portal/applications/{}/documents/{}", app_id, doc_id), Some(&token))
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_rejects_missing_field_and_unknown_application() {
    let app = build_test_app();
    let (_, token) = app.broker("Sam", BrokerRole::Broker).await;
    let app_id = application(&app, &token).await;

    let wrong_field = upload(&app, &token, &app_id, multipart("attachment", "a.txt", "text/plain", b"hi")).await;
    assert_eq!(wrong_field.status(), StatusCode::BAD_REQUEST);

    let empty = upload(&app, &token, &app_id, multipart("file", "a.txt", "text/plain", b"")).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let missing = upload(&app, &token, &uuid::Uuid::new_v4().to_string(), multipart("file", "a.txt", "text/plain", b"hi")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = build_test_app();
    let (_, token) = app.broker("Sam", BrokerRole::Broker).await;
    let app_id = application(&app, &token).await;

    // The test config allows 1 KiB per file.
    let response = upload(&app, &token, &app_id, multipart("file", "big.bin", "application/octet-stream", &[7u8; 4096])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn documents_are_scoped_to_their_application() {
    let app = build_test_app();
    let (_, token) = app.broker("Sam", BrokerRole::Broker).await;
    let first = application(&app, &token).await;
    let second = application(&app, &token).await;

    let doc = body_json(upload(&app, &token, &first, multipart("file", "a.txt", "text/plain", b"hi")).await).await;
    let doc_id = doc["data"]["id"].as_str().unwrap();

    let cross = app
        .get(&format!("/api/portal/applications/{}/documents/{}", second, doc_id), Some(&token))
        .await;
    assert_eq!(cross.status(), StatusCode::NOT_FOUND);
}
