use serde_json::json;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use payment_cell::api::{PaymentGateway, RazorpayGateway};
use shared_utils::test_utils::TestConfig;

fn gateway_for(mock_server: &MockServer) -> RazorpayGateway {
    let mut config = TestConfig::default().to_app_config();
    config.razorpay_base_url = mock_server.uri();
    RazorpayGateway::new(&config)
}

#[tokio::test]
async fn create_order_posts_amount_and_notes() {
    let mock_server = MockServer::start().await;
    let gateway = gateway_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(header_exists("authorization"))
        .and(body_partial_json(json!({
            "amount": 55000,
            "currency": "INR",
            "receipt": "appointment_42",
            "notes": { "patientName": "Ravi Kumar" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_abc",
            "amount": 55000,
            "currency": "INR",
            "receipt": "appointment_42",
            "status": "created"
        })))
        .mount(&mock_server)
        .await;

    let order = gateway
        .create_order(
            55000,
            "INR",
            "appointment_42",
            json!({ "patientName": "Ravi Kumar" }),
        )
        .await
        .unwrap();

    assert_eq!(order.id, "order_abc");
    assert_eq!(order.amount, 55000);
    assert_eq!(order.currency, "INR");
}

#[tokio::test]
async fn create_order_surfaces_gateway_errors() {
    let mock_server = MockServer::start().await;
    let gateway = gateway_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "description": "Authentication failed" }
        })))
        .mount(&mock_server)
        .await;

    let result = gateway.create_order(100, "INR", "r", json!({})).await;
    assert!(result.is_err());
}
