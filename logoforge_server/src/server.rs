use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use shopify_oauth::ShopifyOAuthApi;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::HmacMiddlewareFactory,
    oauth_routes,
    routes,
    webhook_routes::{compliance_webhook, WebhookTopic, SHOPIFY_HMAC_HEADER},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let srv = create_server_instance(config)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Registers the shared state and every route on `cfg`. The same assembly backs the real server and the endpoint
/// tests.
pub fn configure_app(cfg: &mut web::ServiceConfig, config: &ServerConfig, oauth_api: &ShopifyOAuthApi) {
    let options = ServerOptions::from_config(config);
    let hmac = HmacMiddlewareFactory::new(
        SHOPIFY_HMAC_HEADER,
        config.shopify_config.api_secret.clone(),
        config.hmac_checks,
    );
    let mut webhooks = web::scope("/webhooks");
    for topic in WebhookTopic::ALL {
        webhooks = webhooks
            .service(web::resource(topic.route()).app_data(web::Data::new(topic)).route(web::post().to(compliance_webhook)));
    }
    cfg.app_data(web::Data::new(oauth_api.clone()))
        .app_data(web::Data::new(options))
        .service(routes::health)
        .service(routes::index)
        .service(oauth_routes::auth_begin)
        .service(oauth_routes::auth_callback)
        .service(routes::app_dashboard)
        .service(routes::app_bridge)
        .service(webhooks.wrap(hmac));
}

pub fn create_server_instance(config: ServerConfig) -> Result<Server, ServerError> {
    let oauth_api = ShopifyOAuthApi::new(config.shopify_config.clone())?;
    let app_config = config.clone();
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lfb::access_log"))
            .configure(|cfg| configure_app(cfg, &app_config, &oauth_api))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("🛍️️ Webhook endpoints ready under /webhooks for: {}", topics_csv());
    info!("🔑️ OAuth endpoints ready: /auth, /auth/callback");
    Ok(srv)
}

fn topics_csv() -> String {
    WebhookTopic::ALL.iter().map(WebhookTopic::as_str).collect::<Vec<_>>().join(", ")
}
