use actix_web::{
    body::MessageBody,
    http::{header, header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    App,
};
use lfb_common::Secret;
use shopify_oauth::{ShopifyConfig, ShopifyOAuthApi};

use crate::{config::ServerConfig, server::configure_app};

pub const TEST_API_KEY: &str = "test_api_key";
pub const TEST_API_SECRET: &str = "test_api_secret";

// A test `ServerConfig`. The credentials are make-believe; no request in these tests ever reaches Shopify.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        shopify_config: ShopifyConfig {
            api_key: TEST_API_KEY.to_string(),
            api_secret: Secret::new(TEST_API_SECRET.to_string()),
            scopes: "write_products,read_products".to_string(),
            public_url: "https://bridge.example.com".to_string(),
        },
        ..ServerConfig::default()
    }
}

/// Assembles the full app exactly as the real server does and runs a single request through it.
pub async fn call(config: &ServerConfig, req: TestRequest) -> (StatusCode, HeaderMap, String) {
    let _ = env_logger::try_init().ok();
    let api = ShopifyOAuthApi::new(config.shopify_config.clone()).expect("client should build");
    let app = test::init_service(App::new().configure(|cfg| configure_app(cfg, config, &api))).await;
    // The running server turns a service-level `Error` into its HTTP response at the framework
    // boundary; `test::call_service` instead panics on `Err`, so reproduce that conversion here.
    match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => {
            let (_req, res) = res.into_parts();
            let status = res.status();
            let headers = res.headers().clone();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, headers, body)
        }
        Err(err) => {
            let res = err.error_response();
            let status = res.status();
            let headers = res.headers().clone();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, headers, body)
        }
    }
}

pub fn location(headers: &HeaderMap) -> String {
    headers.get(header::LOCATION).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string()
}

/// The value of the OAuth state cookie set on the response, if any.
pub fn state_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(crate::oauth_routes::OAUTH_STATE_COOKIE))
        .and_then(|v| v.split(';').next())
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
}
