use std::env;

use log::*;
use shopify_oauth::ShopifyConfig;

use crate::errors::ServerError;

const DEFAULT_LFB_HOST: &str = "0.0.0.0";
const DEFAULT_LFB_PORT: u16 = 3000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// When false, webhook HMAC verification is skipped and every webhook call is accepted. Local development only.
    pub hmac_checks: bool,
    /// Shopify app credentials and OAuth settings.
    pub shopify_config: ShopifyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LFB_HOST.to_string(),
            port: DEFAULT_LFB_PORT,
            use_x_forwarded_for: false,
            use_forwarded: false,
            hmac_checks: true,
            shopify_config: ShopifyConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the full server configuration from the environment. Host, port and the proxy/HMAC switches have
    /// sensible defaults; the Shopify credentials do not, and their absence is a startup error.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("LFB_HOST").ok().unwrap_or_else(|| DEFAULT_LFB_HOST.into());
        let port = env::var("LFB_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for LFB_PORT. {e} Using the default, {DEFAULT_LFB_PORT}, instead."
                    );
                    DEFAULT_LFB_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LFB_PORT);
        let use_x_forwarded_for =
            env::var("LFB_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let use_forwarded = env::var("LFB_USE_FORWARDED").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let hmac_checks = env::var("LFB_SHOPIFY_HMAC_CHECKS").map(|s| &s != "0" && &s != "false").unwrap_or(true);
        if !hmac_checks {
            warn!(
                "🚨️ Webhook HMAC checks are disabled. Anyone can POST to the compliance endpoints. Never run a \
                 production instance like this."
            );
        }
        let shopify_config = ShopifyConfig::try_from_env().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        Ok(Self { host, port, use_x_forwarded_for, use_forwarded, hmac_checks, shopify_config })
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is handed to request handlers. Kept as small as possible, and excludes
/// secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
