mod api;
mod config;
mod error;
mod helpers;

mod data_objects;

pub use api::ShopifyOAuthApi;
pub use config::ShopifyConfig;
pub use data_objects::{AccessTokenGrant, TokenExchangeRequest};
pub use error::ShopifyOAuthError;
pub use helpers::normalize_shop_domain;
