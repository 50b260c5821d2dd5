use actix_web::{http::StatusCode, test::TestRequest};

use super::helpers::{call, test_config, TEST_API_SECRET};
use crate::{
    helpers::calculate_hmac,
    webhook_routes::{WebhookTopic, SHOPIFY_HMAC_HEADER},
};

fn signed_post(path: &str, body: &'static str) -> TestRequest {
    // the digest is computed over the exact bytes that go on the wire

    let digest = calculate_hmac(TEST_API_SECRET, body.as_bytes());
    TestRequest::post()
        .uri(path)
        .insert_header(("Content-Type", "application/json"))
        .insert_header((SHOPIFY_HMAC_HEADER, digest))
        .set_payload(body)
}

#[actix_web::test]
async fn a_correctly_signed_uninstall_webhook_is_acknowledged() {
    let config = test_config();
    let req = signed_post("/webhooks/app/uninstalled", r#"{"shop_domain":"acme.myshopify.com"}"#);
    let (status, _, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn altering_one_character_of_the_signature_is_unauthorized() {
    let config = test_config();
    let body = r#"{"shop_domain":"acme.myshopify.com"}"#;
    let digest = calculate_hmac(TEST_API_SECRET, body.as_bytes());
    let mut altered: Vec<char> = digest.chars().collect();
    altered[0] = if altered[0] == 'A' { 'B' } else { 'A' };
    let altered: String = altered.into_iter().collect();
    let req = TestRequest::post()
        .uri("/webhooks/app/uninstalled")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((SHOPIFY_HMAC_HEADER, altered))
        .set_payload(body);
    let (status, _, res_body) = call(&config, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(res_body, "Unauthorized");
}

#[actix_web::test]
async fn a_webhook_without_a_signature_header_is_unauthorized() {
    let config = test_config();
    let req = TestRequest::post()
        .uri("/webhooks/customers/redact")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"shop_domain":"acme.myshopify.com"}"#);
    let (status, _, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Unauthorized");
}

#[actix_web::test]
async fn a_signature_over_different_bytes_is_unauthorized() {
    let config = test_config();
    // signed over a re-serialized (whitespace-stripped) copy of the wire body
    let wire_body = r#"{"shop_domain": "acme.myshopify.com"}"#;
    let digest = calculate_hmac(TEST_API_SECRET, br#"{"shop_domain":"acme.myshopify.com"}"#);
    let req = TestRequest::post()
        .uri("/webhooks/shop/redact")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((SHOPIFY_HMAC_HEADER, digest))
        .set_payload(wire_body);
    let (status, _, _) = call(&config, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn every_compliance_topic_is_registered_and_acknowledges() {
    let config = test_config();
    let body = r#"{
        "shop_id": 954889,
        "shop_domain": "acme.myshopify.com",
        "customer": { "id": 191167, "email": "jane@example.com" },
        "orders_requested": [299938],
        "orders_to_redact": [299938]
    }"#;
    for topic in WebhookTopic::ALL {
        let path = format!("/webhooks{}", topic.route());
        let req = signed_post(&path, body);
        let (status, _, res_body) = call(&config, req).await;
        assert_eq!(status, StatusCode::OK, "topic {topic} was not acknowledged");
        assert_eq!(res_body, "OK");
    }
}

#[actix_web::test]
async fn an_authentic_but_malformed_payload_is_a_server_error() {
    let config = test_config();
    let req = signed_post("/webhooks/app/uninstalled", "this is not json");
    let (status, _, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[actix_web::test]
async fn disabling_hmac_checks_lets_unsigned_webhooks_through() {
    let mut config = test_config();
    config.hmac_checks = false;
    let req = TestRequest::post()
        .uri("/webhooks/app/uninstalled")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"shop_domain":"acme.myshopify.com"}"#);
    let (status, _, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
