use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{Client, Url};

use crate::{
    config::ShopifyConfig,
    data_objects::{AccessTokenGrant, TokenExchangeRequest},
    helpers::normalize_shop_domain,
    ShopifyOAuthError,
};

/// Shopify must answer the token exchange within this window, or the installation attempt is abandoned.
const TOKEN_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ShopifyOAuthApi {
    config: ShopifyConfig,
    client: Arc<Client>,
}

impl ShopifyOAuthApi {
    pub fn new(config: ShopifyConfig) -> Result<Self, ShopifyOAuthError> {
        let client = Client::builder()
            .timeout(TOKEN_EXCHANGE_TIMEOUT)
            .build()
            .map_err(|e| ShopifyOAuthError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &ShopifyConfig {
        &self.config
    }

    /// Builds the URL of the counterparty's consent screen for the given shop. The `state` token must be verified
    /// again when the callback comes in.
    pub fn authorize_url(&self, shop: &str, state: &str) -> Result<Url, ShopifyOAuthError> {
        let shop = normalize_shop_domain(shop);
        let redirect_uri = self.config.redirect_uri();
        let url = Url::parse_with_params(&format!("https://{shop}/admin/oauth/authorize"), &[
            ("client_id", self.config.api_key.as_str()),
            ("scope", self.config.scopes.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("state", state),
            ("response_type", "code"),
        ])
        .map_err(|e| ShopifyOAuthError::InvalidAuthorizeUrl(e.to_string()))?;
        Ok(url)
    }

    /// Swaps the authorization code for an access token. A connect error or timeout is retried exactly once;
    /// an HTTP error status is never retried, since resubmitting a rejected code cannot succeed.
    pub async fn exchange_code(&self, shop: &str, code: &str) -> Result<AccessTokenGrant, ShopifyOAuthError> {
        let shop = normalize_shop_domain(shop);
        let url = format!("https://{shop}/admin/oauth/access_token");
        let request = TokenExchangeRequest::new(&self.config, code);
        trace!("Exchanging authorization code at {url}");
        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                warn!("Transient error reaching the token endpoint of {shop}, retrying once. {e}");
                self.client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| ShopifyOAuthError::TokenRequestError(e.to_string()))?
            },
            Err(e) => return Err(ShopifyOAuthError::TokenRequestError(e.to_string())),
        };
        if response.status().is_success() {
            let grant =
                response.json::<AccessTokenGrant>().await.map_err(|e| ShopifyOAuthError::JsonError(e.to_string()))?;
            debug!("Token exchange for {shop} succeeded. Granted scope: {}", grant.scope);
            Ok(grant)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ShopifyOAuthError::TokenRequestError(e.to_string()))?;
            Err(ShopifyOAuthError::TokenEndpointError { status, message })
        }
    }
}

#[cfg(test)]
mod test {
    use lfb_common::Secret;

    use super::*;

    fn test_config() -> ShopifyConfig {
        ShopifyConfig {
            api_key: "test_api_key".to_string(),
            api_secret: Secret::new("test_api_secret".to_string()),
            scopes: "write_products,read_products".to_string(),
            public_url: "https://bridge.example.com".to_string(),
        }
    }

    #[test]
    fn authorize_url_targets_the_normalized_shop() {
        let api = ShopifyOAuthApi::new(test_config()).unwrap();
        let url = api.authorize_url("acme", "st4t3").unwrap();
        assert_eq!(url.host_str(), Some("acme.myshopify.com"));
        assert_eq!(url.path(), "/admin/oauth/authorize");
    }

    #[test]
    fn authorize_url_carries_the_full_parameter_set() {
        let api = ShopifyOAuthApi::new(test_config()).unwrap();
        let url = api.authorize_url("acme.myshopify.com", "st4t3").unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("client_id".to_string(), "test_api_key".to_string())));
        assert!(params.contains(&("scope".to_string(), "write_products,read_products".to_string())));
        assert!(params.contains(&("redirect_uri".to_string(), "https://bridge.example.com/auth/callback".to_string())));
        assert!(params.contains(&("state".to_string(), "st4t3".to_string())));
        assert!(params.contains(&("response_type".to_string(), "code".to_string())));
    }

    #[test]
    fn redirect_uri_is_percent_encoded_in_the_query_string() {
        let api = ShopifyOAuthApi::new(test_config()).unwrap();
        let url = api.authorize_url("acme", "st4t3").unwrap();
        assert!(url.as_str().contains("redirect_uri=https%3A%2F%2Fbridge.example.com%2Fauth%2Fcallback"));
    }
}
