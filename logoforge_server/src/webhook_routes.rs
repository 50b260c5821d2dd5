//----------------------------------------------   Compliance webhooks  ------------------------------------------------
//
// All four mandatory compliance topics run the same verify-then-acknowledge sequence. Verification happens in the
// HMAC middleware wrapping the `/webhooks` scope, so by the time the handler runs the delivery is authentic. The
// handler parses a per-topic summary for the logs and acknowledges; Shopify redelivers anything that does not get
// a 2xx, which is safe because the handler has no side effects.

use std::fmt;

use actix_web::{web, HttpRequest, HttpResponse};
use log::*;

use crate::{config::ServerOptions, data_objects::CompliancePayload, helpers::get_remote_ip};

/// The header Shopify uses to deliver the webhook digest.
pub const SHOPIFY_HMAC_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// The four compliance topics Shopify requires every public app to subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookTopic {
    DataRequest,
    CustomersRedact,
    ShopRedact,
    AppUninstalled,
}

impl WebhookTopic {
    pub const ALL: [WebhookTopic; 4] =
        [WebhookTopic::DataRequest, WebhookTopic::CustomersRedact, WebhookTopic::ShopRedact, WebhookTopic::AppUninstalled];

    /// The topic name as Shopify spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataRequest => "customers/data_request",
            Self::CustomersRedact => "customers/redact",
            Self::ShopRedact => "shop/redact",
            Self::AppUninstalled => "app/uninstalled",
        }
    }

    /// The route for this topic, relative to the `/webhooks` scope.
    pub fn route(&self) -> &'static str {
        match self {
            Self::DataRequest => "/customers/data_request",
            Self::CustomersRedact => "/customers/redact",
            Self::ShopRedact => "/shop/redact",
            Self::AppUninstalled => "/app/uninstalled",
        }
    }

    /// The per-topic log summary. This is the only place the topics differ.
    fn summarize(&self, payload: &CompliancePayload) -> String {
        match self {
            Self::DataRequest => format!(
                "shop: {}, customer: {}, orders requested: {}",
                payload.shop_domain,
                payload.customer_email(),
                payload.orders_requested.len()
            ),
            Self::CustomersRedact => format!(
                "shop: {}, customer: {}, orders to redact: {}",
                payload.shop_domain,
                payload.customer_email(),
                payload.orders_to_redact.len()
            ),
            Self::ShopRedact | Self::AppUninstalled => format!("shop: {}", payload.shop_domain),
        }
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single handler behind all four compliance routes. The topic is attached to each route as app data when the
/// webhook scope is assembled.
pub async fn compliance_webhook(
    req: HttpRequest,
    body: web::Bytes,
    topic: web::Data<WebhookTopic>,
    options: web::Data<ServerOptions>,
) -> HttpResponse {
    let topic = **topic;
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "<unknown peer>".to_string());
    trace!("🛍️️ Received {topic} webhook from {peer}");
    match serde_json::from_slice::<CompliancePayload>(&body) {
        Ok(payload) => {
            info!("🛍️️ {topic} acknowledged. {}", topic.summarize(&payload));
            HttpResponse::Ok().body("OK")
        },
        Err(e) => {
            // The signature checked out, so this is a malformed-but-authentic delivery
            error!("🛍️️ Could not parse {topic} payload. {e}");
            HttpResponse::InternalServerError().body("Internal Server Error")
        },
    }
}
