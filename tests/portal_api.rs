//! Protected portal routes: clients, applications, lenders and `me`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app};
use kr_portal::portal::models::BrokerRole;
use serde_json::json;

#[tokio::test]
async fn portal_requires_a_token() {
    let app = build_test_app();

    let response = app.get("/api/portal/clients", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let response = app.get("/api/portal/clients", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_profile_is_forbidden() {
    let app = build_test_app();
    let (broker, _) = app.broker("Ghost", BrokerRole::Broker).await;
    let mut stranger = broker.clone();
    stranger.id = uuid::Uuid::new_v4();

    let response = app.get("/api/portal/clients", Some(&app.token_for(&stranger))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Broker profile not found");
}

#[tokio::test]
async fn create_search_and_update_client() {
    let app = build_test_app();
    let (broker, token) = app.broker("Sam Lee", BrokerRole::Broker).await;

    let created = app
        .post_json("/api/portal/clients", &token, json!({"full_name": "Jane Doe", "phone": "555-1234"}))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let client = body_json(created).await["data"].clone();
    assert_eq!(client["broker_id"], broker.id.to_string());
    assert_eq!(client["status"], "lead");
    let id = client["id"].as_str().unwrap().to_string();

    for q in ["jane", "555-1234"] {
        let json = body_json(app.get(&format!("/api/portal/clients?q={}", q), Some(&token)).await).await;
        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1, "query {q}");
        assert_eq!(rows[0]["id"], id.as_str());
    }
    let none = body_json(app.get("/api/portal/clients?q=zzz", Some(&token)).await).await;
    assert!(none["data"].as_array().unwrap().is_empty());

    let updated = app
        .put_json(
            &format!("/api/portal/clients/{}", id),
            &token,
            json!({"full_name": "Jane Smith", "phone": "555-1234", "status": "active"}),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let client = body_json(updated).await["data"].clone();
    assert_eq!(client["id"], id.as_str());
    assert_eq!(client["full_name"], "Jane Smith");
    assert_eq!(client["status"], "active");
    assert_eq!(client["broker_id"], broker.id.to_string());
}

#[tokio::test]
async fn update_keeps_owner_when_another_broker_saves() {
    let app = build_test_app();
    let (owner, owner_token) = app.broker("Owner", BrokerRole::Broker).await;
    let (_, other_token) = app.broker("Other", BrokerRole::Broker).await;

    let created = body_json(
        app.post_json("/api/portal/clients", &owner_token, json!({"full_name": "Pat"}))
            .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let updated = body_json(
        app.put_json(
            &format!("/api/portal/clients/{}", id),
            &other_token,
            json!({"full_name": "Pat Q", "broker_id": uuid::Uuid::new_v4()}),
        )
        .await,
    )
    .await;
    assert_eq!(updated["data"]["broker_id"], owner.id.to_string());
}

#[tokio::test]
async fn validation_and_malformed_requests() {
    let app = build_test_app();
    let (_, token) = app.broker("Sam", BrokerRole::Broker).await;

    let missing_name = app.post_json("/api/portal/clients", &token, json!({"email": "x@kr.test"})).await;
    assert_eq!(missing_name.status(), StatusCode::BAD_REQUEST);
    let json = body_json(missing_name).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Full name is required");

    let bad_id = app.get("/api/portal/clients/not-a-uuid", Some(&token)).await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .get(&format!("/api/portal/clients/{}", uuid::Uuid::new_v4()), Some(&token))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn application_detail_joins_client_and_lender() {
    let app = build_test_app();
    let (_, token) = app.broker("Sam", BrokerRole::Broker).await;

    let client = body_json(app.post_json("/api/portal/clients", &token, json!({"full_name": "Jane"})).await).await;
    let lender = body_json(app.post_json("/api/portal/lenders", &token, json!({"name": "First Bank", "region": "ca"})).await).await;
    assert_eq!(lender["data"]["is_active"], true);

    let created = app
        .post_json(
            "/api/portal/applications",
            &token,
            json!({
                "client_id": client["data"]["id"],
                "lender_id": lender["data"]["id"],
                "loan_amount": "450000.00",
                "loan_type": "refinance"
            }),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = body_json(created).await["data"]["id"].as_str().unwrap().to_string();

    let detail = body_json(app.get(&format!("/api/portal/applications/{}", id), Some(&token)).await).await;
    assert_eq!(detail["data"]["application"]["status"], "new");
    assert_eq!(detail["data"]["client"]["full_name"], "Jane");
    assert_eq!(detail["data"]["lender"]["name"], "First Bank");
}

#[tokio::test]
async fn application_with_unknown_client_or_lender_is_rejected() {
    let app = build_test_app();
    let (_, token) = app.broker("Sam", BrokerRole::Broker).await;

    let response = app
        .post_json(
            "/api/portal/applications",
            &token,
            json!({"client_id": uuid::Uuid::new_v4(), "loan_amount": "1000"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Referenced client does not exist");

    let client = body_json(app.post_json("/api/portal/clients", &token, json!({"full_name": "Jane"})).await).await;
    let response = app
        .post_json(
            "/api/portal/applications",
            &token,
            json!({
                "client_id": client["data"]["id"],
                "lender_id": uuid::Uuid::new_v4(),
                "loan_amount": "1000"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Referenced lender does not exist");

    let listed = body_json(app.get("/api/portal/applications", Some(&token)).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn lenders_list_by_name() {
    let app = build_test_app();
    let (_, token) = app.broker("Sam", BrokerRole::Broker).await;
    for name in ["Zeta Credit", "alpha trust", "Midland"] {
        app.post_json("/api/portal/lenders", &token, json!({ "name": name })).await;
    }

    let json = body_json(app.get("/api/portal/lenders", Some(&token)).await).await;
    let names: Vec<_> = json["data"].as_array().unwrap().iter().map(|l| l["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["alpha trust", "Midland", "Zeta Credit"]);
}

#[tokio::test]
async fn me_returns_profile_and_region() {
    let app = build_test_app();
    let (broker, token) = app.broker("Sam Lee", BrokerRole::Broker).await;

    let json = body_json(app.get("/us/api/portal/me", Some(&token)).await).await;
    assert_eq!(json["data"]["broker"]["id"], broker.id.to_string());
    assert_eq!(json["data"]["locale"]["region"], "us");
}
