//! End-to-end store flows over real HTTP.

#![allow(clippy::unwrap_used)]

use tradewind_client::StoreClient;
use tradewind_core::OrderStatus;
use tradewind_integration_tests::settings_for;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn catalog_fetch_populates_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/project/proj-it/items/virtual_items"))
        .and(query_param("engine", "rust"))
        .and(query_param("sdk", "store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {
                    "sku": "sword",
                    "name": "Sword",
                    "price": {"amount": 9.99, "currency": "USD"},
                    "groups": [{"external_id": "weapons", "name": "Weapons"}]
                },
                {"sku": "apple", "name": "Apple", "is_free": true}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StoreClient::new(settings_for(&server));
    client.fetch_virtual_items().await.unwrap();

    let items = client.virtual_items("");
    assert_eq!(items.len(), 2);
    assert_eq!(client.virtual_items("weapons").len(), 1);
    assert!(client.items_data().group_ids.contains("weapons"));
}

#[tokio::test]
async fn inventory_fetch_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/project/proj-it/user/inventory/items"))
        .and(header("Authorization", "Bearer session-tok"))
        .and(header("X-SDK", "STORE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"sku": "potion", "quantity": 4}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StoreClient::new(settings_for(&server));
    client.fetch_inventory("session-tok").await.unwrap();

    assert_eq!(client.inventory().items.len(), 1);
}

#[tokio::test]
async fn cart_flow_create_add_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/project/proj-it/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/project/proj-it/cart/42/item/sword"))
        .and(body_json(serde_json::json!({"quantity": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/project/proj-it/cart/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cart_id": 42,
            "items": [{"sku": "sword", "quantity": 2, "price": {"amount": 9.99, "currency": "USD"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StoreClient::new(settings_for(&server));

    client.create_cart("tok").await.unwrap();
    assert_eq!(client.cart().cart_id, 42);

    client.add_to_cart("tok", "sword", 2).await.unwrap();
    client.refresh_cart("tok").await.unwrap();

    let cart = client.cart();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].sku, "sword");
    assert_eq!(cart.items[0].quantity, 2);
}

#[tokio::test]
async fn structured_error_body_surfaces_triple() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/project/proj-it/user/inventory/items"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "statusCode": 403,
            "errorCode": 1204,
            "errorMessage": "Token not found"
        })))
        .mount(&server)
        .await;

    let client = StoreClient::new(settings_for(&server));
    let err = client.fetch_inventory("bad-token").await.unwrap_err();

    assert_eq!(err.http_status, 403);
    assert_eq!(err.error_code, 1204);
    assert_eq!(err.message, "Token not found");
}

#[tokio::test]
async fn order_status_maps_leniently() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/project/proj-it/order/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "order_id": 7,
            "status": "pending_review"
        })))
        .mount(&server)
        .await;

    let client = StoreClient::new(settings_for(&server));
    let order = client.check_order("tok", 7).await.unwrap();

    assert_eq!(order.order_id, 7);
    assert_eq!(order.status, OrderStatus::Unknown);
}

#[tokio::test]
async fn payment_token_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/project/proj-it/payment/item/sword"))
        .and(body_json(serde_json::json!({"sandbox": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "pay-abc",
            "order_id": 99
        })))
        .mount(&server)
        .await;

    let client = StoreClient::new(settings_for(&server));
    let token = client
        .fetch_payment_token("tok", "sword", &Default::default())
        .await
        .unwrap();

    assert_eq!(token.token, "pay-abc");
    assert_eq!(token.order_id, 99);
    assert!(
        client
            .payment_url(&token.token)
            .starts_with("https://secure.tradewind.games/payment?access_token=pay-abc")
    );
}

#[tokio::test]
async fn transport_failure_classifies_as_no_response() {
    let server = MockServer::start().await;
    let settings = settings_for(&server);
    // Shut the server down so the connection is refused.
    drop(server);

    let client = StoreClient::new(settings);
    let err = client.fetch_virtual_items().await.unwrap_err();

    assert_eq!(err.http_status, 204);
    assert_eq!(err.error_code, 0);
    assert_eq!(err.message, "No response");
}
