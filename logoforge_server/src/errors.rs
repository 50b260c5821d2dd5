use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shopify_oauth::ShopifyOAuthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),
    #[error("Token exchange with Shopify failed. {0}")]
    TokenExchangeFailed(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TokenExchangeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<ShopifyOAuthError> for ServerError {
    fn from(e: ShopifyOAuthError) -> Self {
        match e {
            ShopifyOAuthError::Configuration(s) => Self::ConfigurationError(s),
            ShopifyOAuthError::Initialization(s) => Self::InitializeError(s),
            ShopifyOAuthError::InvalidAuthorizeUrl(s) => Self::Unspecified(s),
            other => Self::TokenExchangeFailed(other.to_string()),
        }
    }
}
