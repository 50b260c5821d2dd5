//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate
//! module — the OAuth flow lives in [`crate::oauth_routes`] and the compliance webhooks in
//! [`crate::webhook_routes`]. Keep this module neat and tidy 🙏

use actix_web::{get, http::header, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use serde::Deserialize;
use serde_json::json;
use shopify_oauth::ShopifyOAuthApi;

use crate::{errors::ServerError, helpers::html_escape, webhook_routes::WebhookTopic};

const LANDING_PAGE: &str = include_str!("templates/landing.html");
const DASHBOARD_PAGE: &str = include_str!("templates/dashboard.html");

/// Shopify hosts the canonical copy of the embedding script; we only redirect to it.
const APP_BRIDGE_CDN: &str = "https://cdn.shopify.com/shopifycloud/app-bridge.js";

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "webhooks": WebhookTopic::ALL.iter().map(WebhookTopic::as_str).collect::<Vec<_>>(),
        "oauth": ["/auth", "/auth/callback"],
    }))
}

// ----------------------------------------------   Landing  ----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct InstallProbe {
    shop: Option<String>,
    hmac: Option<String>,
    host: Option<String>,
    timestamp: Option<String>,
}

impl InstallProbe {
    /// Shopify opens the app's root URL with this query quartet when a merchant starts an installation.
    fn is_install_request(&self) -> bool {
        self.shop.is_some() && self.hmac.is_some() && self.host.is_some() && self.timestamp.is_some()
    }
}

#[get("/")]
pub async fn index(req: HttpRequest, query: web::Query<InstallProbe>) -> HttpResponse {
    if query.is_install_request() {
        info!("🔑️ Install request detected on the landing page. Redirecting to /auth.");
        let target = format!("/auth?{}", req.query_string());
        return HttpResponse::Found().append_header((header::LOCATION, target)).finish();
    }
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(LANDING_PAGE)
}

// ----------------------------------------------   Embedded app  -----------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct AppParams {
    shop: Option<String>,
    host: Option<String>,
}

/// The dashboard rendered inside the Shopify admin. Everything dynamic happens client-side through the embedding
/// script; the server only interpolates the identifiers the script needs.
#[get("/app")]
pub async fn app_dashboard(
    query: web::Query<AppParams>,
    api: web::Data<ShopifyOAuthApi>,
) -> Result<HttpResponse, ServerError> {
    let params = query.into_inner();
    let (shop, host) = match (params.shop, params.host) {
        (Some(shop), Some(host)) => (shop, host),
        (None, _) => {
            warn!("🔑️ App view requested without a shop parameter");
            return Err(ServerError::MissingParameter("shop".to_string()));
        },
        (_, None) => {
            warn!("🔑️ App view requested without a host parameter");
            return Err(ServerError::MissingParameter("host".to_string()));
        },
    };
    debug!("🔑️ Rendering dashboard for {shop}");
    let page = DASHBOARD_PAGE
        .replace("{{api_key}}", &html_escape(&api.config().api_key))
        .replace("{{shop}}", &html_escape(&shop))
        .replace("{{host}}", &html_escape(&host));
    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(page))
}

#[get("/app-bridge.js")]
pub async fn app_bridge() -> HttpResponse {
    HttpResponse::Found().append_header((header::LOCATION, APP_BRIDGE_CDN)).finish()
}
