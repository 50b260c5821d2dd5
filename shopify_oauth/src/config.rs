use lfb_common::Secret;
use log::*;

use crate::ShopifyOAuthError;

const DEFAULT_OAUTH_SCOPES: &str = "write_products,read_products";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Default)]
pub struct ShopifyConfig {
    /// The app's API key (the OAuth client id).
    pub api_key: String,
    /// The app's API secret. Also the key used to sign compliance webhooks.
    pub api_secret: Secret<String>,
    /// Comma-separated list of access scopes requested during installation.
    pub scopes: String,
    /// The public base URL of this server, used to build the OAuth redirect URI.
    pub public_url: String,
}

impl ShopifyConfig {
    /// Loads the Shopify app credentials from the environment. The API key and secret have no usable defaults,
    /// so startup fails if they are not set.
    pub fn try_from_env() -> Result<Self, ShopifyOAuthError> {
        let api_key = std::env::var("LFB_SHOPIFY_API_KEY").map_err(|_| {
            ShopifyOAuthError::Configuration(
                "LFB_SHOPIFY_API_KEY is not set. Set it to the API key of your Shopify app.".to_string(),
            )
        })?;
        let api_secret = std::env::var("LFB_SHOPIFY_API_SECRET").map_err(|_| {
            ShopifyOAuthError::Configuration(
                "LFB_SHOPIFY_API_SECRET is not set. Set it to the API secret of your Shopify app.".to_string(),
            )
        })?;
        let api_secret = Secret::new(api_secret);
        let scopes = std::env::var("LFB_OAUTH_SCOPES").unwrap_or_else(|_| {
            info!("LFB_OAUTH_SCOPES not set, requesting '{DEFAULT_OAUTH_SCOPES}'");
            DEFAULT_OAUTH_SCOPES.to_string()
        });
        let public_url = std::env::var("LFB_PUBLIC_URL").unwrap_or_else(|_| {
            warn!("LFB_PUBLIC_URL not set, using {DEFAULT_PUBLIC_URL}. Shopify will refuse to redirect here in production.");
            DEFAULT_PUBLIC_URL.to_string()
        });
        let public_url = public_url.trim_end_matches('/').to_string();
        Ok(Self { api_key, api_secret, scopes, public_url })
    }

    /// The redirect URI registered with Shopify. The authorization server sends the merchant back here after
    /// the consent screen.
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.public_url)
    }
}
