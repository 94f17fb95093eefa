//! End-to-end login flows over real HTTP.

#![allow(clippy::unwrap_used)]

use secrecy::ExposeSecret;
use tradewind_client::LoginClient;
use tradewind_integration_tests::settings_for;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn authenticate_extracts_token_from_login_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login-api/login"))
        .and(query_param("projectId", "login-it"))
        .and(body_json(serde_json::json!({
            "username": "alice",
            "password": "hunter2",
            "remember_me": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "login_url": "https://game.example/callback?token=jwt-e2e"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LoginClient::new(settings_for(&server));
    let data = client
        .authenticate_user("alice", "hunter2", false)
        .await
        .unwrap();

    assert_eq!(data.token.expose_secret(), "jwt-e2e");
    assert_eq!(
        client.login_data().unwrap().token.expose_secret(),
        "jwt-e2e"
    );
}

#[tokio::test]
async fn registration_posts_to_user_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login-api/user"))
        .and(query_param("projectId", "login-it"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = LoginClient::new(settings_for(&server));
    client
        .register_user("alice", "hunter2", "alice@example.test")
        .await
        .unwrap();
}

#[tokio::test]
async fn attribute_fetch_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login-api/attributes/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"key": "level", "permission": "public", "value": "12"}
        ])))
        .mount(&server)
        .await;

    let client = LoginClient::new(settings_for(&server));
    let attributes = client
        .fetch_user_attributes("tok", "", &[])
        .await
        .unwrap();

    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0].key, "level");
    assert_eq!(client.user_attributes(), attributes);
}

#[tokio::test]
async fn auth_error_body_classifies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login-api/login"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "statusCode": 422,
            "errorCode": 3001,
            "errorMessage": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let client = LoginClient::new(settings_for(&server));
    let err = client
        .authenticate_user("alice", "wrong", false)
        .await
        .unwrap_err();

    assert_eq!(err.error_code, 3001);
    assert_eq!(err.message, "Invalid credentials");
    assert!(client.login_data().is_none());
}
