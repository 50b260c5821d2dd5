use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::Value;

use super::helpers::{call, location, test_config, TEST_API_KEY};

#[actix_web::test]
async fn health_reports_the_full_surface() {
    let config = test_config();
    let (status, _, body) = call(&config, TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["status"], "OK");
    assert!(!report["timestamp"].as_str().unwrap().is_empty());
    let webhooks: Vec<&str> = report["webhooks"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(webhooks, vec!["customers/data_request", "customers/redact", "shop/redact", "app/uninstalled"]);
    let oauth: Vec<&str> = report["oauth"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(oauth, vec!["/auth", "/auth/callback"]);
}

#[actix_web::test]
async fn landing_page_is_served() {
    let config = test_config();
    let (status, _, body) = call(&config, TestRequest::get().uri("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("LogoForge"));
}

#[actix_web::test]
async fn landing_page_redirects_install_requests_to_auth() {
    let config = test_config();
    let uri = "/?shop=acme.myshopify.com&hmac=deadbeef&host=YWNtZQ&timestamp=1700000000";
    let (status, headers, _) = call(&config, TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::FOUND);
    let target = location(&headers);
    assert!(target.starts_with("/auth?"), "was: {target}");
    assert!(target.contains("shop=acme.myshopify.com"));
    assert!(target.contains("timestamp=1700000000"));
}

#[actix_web::test]
async fn landing_page_ignores_partial_install_queries() {
    let config = test_config();
    // no timestamp, so this is not an install request
    let uri = "/?shop=acme.myshopify.com&hmac=deadbeef&host=YWNtZQ";
    let (status, _, body) = call(&config, TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("LogoForge"));
}

#[actix_web::test]
async fn app_view_requires_shop_and_host() {
    let config = test_config();
    let (status, _, body) = call(&config, TestRequest::get().uri("/app")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("shop"), "was: {body}");

    let (status, _, body) = call(&config, TestRequest::get().uri("/app?shop=acme.myshopify.com")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("host"), "was: {body}");
}

#[actix_web::test]
async fn app_view_renders_the_dashboard() {
    let config = test_config();
    let (status, _, body) = call(&config, TestRequest::get().uri("/app?shop=acme.myshopify.com&host=YWNtZQ")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("acme.myshopify.com"));
    assert!(body.contains(TEST_API_KEY));
}

#[actix_web::test]
async fn app_bridge_script_redirects_to_the_cdn() {
    let config = test_config();
    let (status, headers, _) = call(&config, TestRequest::get().uri("/app-bridge.js")).await;
    assert_eq!(status, StatusCode::FOUND);
    assert!(location(&headers).contains("cdn.shopify.com"));
}
