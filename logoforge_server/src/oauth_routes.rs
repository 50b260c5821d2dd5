//----------------------------------------------   OAuth installation flow  --------------------------------------------
//
// The install handshake is stateless on the server apart from the CSRF state token, which travels in a short-lived
// cookie: `/auth` mints it alongside the redirect to the consent screen, and `/auth/callback` requires the query
// `state` to match it before the code is exchanged. The access token obtained in the exchange is used only to
// decide the redirect and is dropped; this service keeps no shop records.

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    get,
    http::{header, StatusCode},
    web,
    HttpRequest,
    HttpResponse,
};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde::Deserialize;
use shopify_oauth::{normalize_shop_domain, ShopifyOAuthApi};

use crate::{errors::ServerError, helpers::html_escape};

const AUTH_FAILED_PAGE: &str = include_str!("templates/auth_failed.html");

pub const OAUTH_STATE_COOKIE: &str = "lfb_oauth_state";
const STATE_TOKEN_LEN: usize = 32;
const STATE_COOKIE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthParams {
    shop: Option<String>,
    code: Option<String>,
    host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    shop: Option<String>,
    host: Option<String>,
    state: Option<String>,
}

/// Starts the installation flow: normalizes the shop, mints a state token and redirects the merchant to the
/// counterparty's consent screen.
#[get("/auth")]
pub async fn auth_begin(
    query: web::Query<AuthParams>,
    api: web::Data<ShopifyOAuthApi>,
) -> Result<HttpResponse, ServerError> {
    let params = query.into_inner();
    let shop = match params.shop {
        Some(shop) if !shop.is_empty() => shop,
        _ => {
            warn!("🔑️ Install request is missing the shop parameter");
            return Err(ServerError::MissingParameter("shop".to_string()));
        },
    };
    if params.code.is_some() {
        // Shopify sometimes loops a completed authorization back to /auth instead of the registered callback.
        // The code has already been consumed in that case, so send the merchant straight to the app.
        info!("🔑️ Install request for {shop} already carries an authorization code. Redirecting to the app view.");
        let target = format!("/app?shop={shop}&host={host}", host = params.host.as_deref().unwrap_or(""));
        return Ok(HttpResponse::Found().append_header((header::LOCATION, target)).finish());
    }
    let shop = normalize_shop_domain(&shop);
    let state: String = thread_rng().sample_iter(&Alphanumeric).take(STATE_TOKEN_LEN).map(char::from).collect();
    let authorize_url = api.authorize_url(&shop, &state)?;
    let state_cookie = Cookie::build(OAUTH_STATE_COOKIE, state)
        .path("/auth")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(STATE_COOKIE_TTL_MINUTES))
        .finish();
    info!("🔑️ Starting install flow for {shop}");
    Ok(HttpResponse::Found()
        .cookie(state_cookie)
        .append_header((header::LOCATION, authorize_url.to_string()))
        .finish())
}

/// Finishes the installation flow: validates the state token, exchanges the authorization code and redirects to
/// the embedded app view. Every failure is terminal for this request; the merchant restarts from the app.
#[get("/auth/callback")]
pub async fn auth_callback(
    req: HttpRequest,
    query: web::Query<CallbackParams>,
    api: web::Data<ShopifyOAuthApi>,
) -> HttpResponse {
    let params = query.into_inner();
    let shop = match params.shop {
        Some(shop) if !shop.is_empty() => shop,
        _ => {
            error!("🛑️ OAuth callback did not include a shop domain");
            return failure_page(StatusCode::INTERNAL_SERVER_ERROR, "The callback did not include a shop domain.");
        },
    };
    let query_state = params.state.as_deref().unwrap_or_default();
    let state_matches = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| !c.value().is_empty() && c.value() == query_state)
        .unwrap_or(false);
    if !state_matches {
        warn!("🔑️ OAuth state mismatch on the callback for {shop}. Rejecting without exchanging the code.");
        return failure_page(
            StatusCode::BAD_REQUEST,
            "The state token does not match the one issued when the installation started.",
        );
    }
    let code = match params.code {
        Some(code) if !code.is_empty() => code,
        _ => {
            error!("🛑️ OAuth callback for {shop} did not include an authorization code");
            return failure_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "The callback did not include an authorization code.",
            );
        },
    };
    match api.exchange_code(&shop, &code).await {
        Ok(grant) => {
            info!("🔑️ Store {shop} connected. Granted scope: {}", grant.scope);
            let target = format!("/app?shop={shop}&host={host}", host = params.host.as_deref().unwrap_or(""));
            HttpResponse::Found()
                .cookie(expired_state_cookie())
                .append_header((header::LOCATION, target))
                .finish()
        },
        Err(e) => {
            error!("🛑️ Token exchange for {shop} failed. {e}");
            let mut response = failure_page(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
            // The state token is single-use, even on a failed exchange
            if let Err(e) = response.add_cookie(&expired_state_cookie()) {
                warn!("🔑️ Could not clear the state cookie. {e}");
            }
            response
        },
    }
}

fn expired_state_cookie() -> Cookie<'static> {
    let mut expired = Cookie::new(OAUTH_STATE_COOKIE, "");
    expired.set_path("/auth");
    expired.make_removal();
    expired
}

fn failure_page(status: StatusCode, reason: &str) -> HttpResponse {
    let body = AUTH_FAILED_PAGE.replace("{{reason}}", &html_escape(reason));
    HttpResponse::build(status).content_type("text/html; charset=utf-8").body(body)
}
