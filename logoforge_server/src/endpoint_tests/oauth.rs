use actix_web::{cookie::Cookie, http::StatusCode, test::TestRequest};

use super::helpers::{call, location, state_cookie, test_config};
use crate::oauth_routes::OAUTH_STATE_COOKIE;

#[actix_web::test]
async fn auth_without_a_shop_is_a_client_error() {
    let config = test_config();
    let (status, headers, body) = call(&config, TestRequest::get().uri("/auth")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("shop"), "was: {body}");
    assert!(location(&headers).is_empty(), "a rejected install request must not redirect");
}

#[actix_web::test]
async fn auth_redirects_to_the_consent_screen() {
    let config = test_config();
    let (status, headers, _) = call(&config, TestRequest::get().uri("/auth?shop=foo")).await;
    assert_eq!(status, StatusCode::FOUND);
    let target = location(&headers);
    // the bare handle is normalized before the redirect is built
    assert!(target.starts_with("https://foo.myshopify.com/admin/oauth/authorize?"), "was: {target}");
    assert!(target.contains("client_id=test_api_key"));
    assert!(target.contains("response_type=code"));
    assert!(target.contains("redirect_uri=https%3A%2F%2Fbridge.example.com%2Fauth%2Fcallback"));
}

#[actix_web::test]
async fn auth_mints_a_state_token_and_stores_it_in_the_cookie() {
    let config = test_config();
    let (_, headers, _) = call(&config, TestRequest::get().uri("/auth?shop=foo")).await;
    let state = state_cookie(&headers).expect("state cookie should be set");
    assert_eq!(state.len(), 32);
    assert!(location(&headers).contains(&format!("state={state}")));
}

#[actix_web::test]
async fn auth_with_a_code_already_present_goes_straight_to_the_app() {
    let config = test_config();
    let uri = "/auth?shop=foo.myshopify.com&code=xyz&host=YWNtZQ";
    let (status, headers, _) = call(&config, TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location(&headers), "/app?shop=foo.myshopify.com&host=YWNtZQ");
}

#[actix_web::test]
async fn callback_without_a_shop_is_a_fault() {
    let config = test_config();
    let req = TestRequest::get()
        .uri("/auth/callback?code=xyz&state=st4t3")
        .cookie(Cookie::new(OAUTH_STATE_COOKIE, "st4t3"));
    let (status, headers, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("shop domain"), "was: {body}");
    assert!(location(&headers).is_empty());
}

#[actix_web::test]
async fn callback_with_a_mismatched_state_is_rejected_before_any_exchange() {
    let config = test_config();
    let req = TestRequest::get()
        .uri("/auth/callback?shop=acme.myshopify.com&code=xyz&state=tampered")
        .cookie(Cookie::new(OAUTH_STATE_COOKIE, "expected"));
    let (status, headers, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("state token"), "was: {body}");
    assert!(location(&headers).is_empty());
}

#[actix_web::test]
async fn callback_without_the_state_cookie_is_rejected() {
    let config = test_config();
    let req = TestRequest::get().uri("/auth/callback?shop=acme.myshopify.com&code=xyz&state=st4t3");
    let (status, _, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("state token"), "was: {body}");
}

#[actix_web::test]
async fn callback_without_a_code_is_a_fault() {
    let config = test_config();
    let req = TestRequest::get()
        .uri("/auth/callback?shop=acme.myshopify.com&state=st4t3")
        .cookie(Cookie::new(OAUTH_STATE_COOKIE, "st4t3"));
    let (status, _, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("authorization code"), "was: {body}");
}

#[actix_web::test]
async fn callback_with_a_failed_exchange_renders_the_failure_page() {
    let config = test_config();
    // Nothing listens on port 1, so the exchange fails with a transport error without leaving the machine
    let req = TestRequest::get()
        .uri("/auth/callback?shop=127.0.0.1:1&code=xyz&state=st4t3")
        .cookie(Cookie::new(OAUTH_STATE_COOKIE, "st4t3"));
    let (status, headers, body) = call(&config, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Could not connect your store"), "was: {body}");
    assert!(location(&headers).is_empty(), "a failed exchange must never redirect to the app");
}
