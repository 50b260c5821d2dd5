use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyOAuthError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid OAuth configuration: {0}")]
    Configuration(String),
    #[error("Could not build the authorization URL: {0}")]
    InvalidAuthorizeUrl(String),
    #[error("Could not reach the token endpoint: {0}")]
    TokenRequestError(String),
    #[error("Token exchange failed. Error {status}. {message}")]
    TokenEndpointError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
}
