use lfb_common::Secret;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ShopifyConfig;

/// The body of the server-to-server call that swaps an authorization code for an access token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenExchangeRequest {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
}

impl TokenExchangeRequest {
    pub fn new(config: &ShopifyConfig, code: &str) -> Self {
        Self {
            client_id: config.api_key.clone(),
            client_secret: config.api_secret.reveal().clone(),
            code: code.to_string(),
        }
    }
}

/// A successful token exchange response. The token lives only as long as the callback request that received it;
/// nothing in this system persists it.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenGrant {
    #[serde(deserialize_with = "secret_string")]
    pub access_token: Secret<String>,
    #[serde(default)]
    pub scope: String,
}

fn secret_string<'de, D>(deserializer: D) -> Result<Secret<String>, D::Error>
where D: Deserializer<'de> {
    String::deserialize(deserializer).map(Secret::new)
}

#[cfg(test)]
mod test {
    use super::AccessTokenGrant;

    #[test]
    fn access_token_is_redacted_after_parsing() {
        let raw = r#"{"access_token":"shpat_0123456789abcdef","scope":"write_products,read_products"}"#;
        let grant: AccessTokenGrant = serde_json::from_str(raw).unwrap();
        assert_eq!(grant.scope, "write_products,read_products");
        assert_eq!(grant.access_token.reveal(), "shpat_0123456789abcdef");
        assert!(!format!("{grant:?}").contains("shpat_"));
    }

    #[test]
    fn scope_is_optional() {
        let grant: AccessTokenGrant = serde_json::from_str(r#"{"access_token":"shpat_x"}"#).unwrap();
        assert!(grant.scope.is_empty());
    }
}
