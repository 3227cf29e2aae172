//! HTTP error responses for the chat backend.
//!
//! Every failure leaves the server as `{ "error": "<fixed message>" }` with a
//! status chosen from the error category. Provider details are logged here and
//! never sent to the client.

use crate::common::api::ErrorBody;
use crate::core::error::ProviderError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use tracing::{error, warn};

pub const INVALID_MESSAGE: &str = "Oops! Please send a valid message.";
pub const MESSAGE_TOO_LONG: &str = "That message is a bit too long for me to handle!";
pub const PROVIDER_AUTH: &str = "Looks like there might be an issue with the API key";
pub const PROVIDER_RATE_LIMITED: &str = "Slow down! Too many requests at once";
pub const PROVIDER_FAILED: &str = "Something unexpected happened, but I'm working on fixing it!";
pub const NOT_FOUND: &str = "Not Found - The requested endpoint does not exist";
pub const CLIENT_RATE_LIMITED: &str = "Too many requests, please try again later.";

/// Handler-level errors with HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
    /// Rejected input; carries the user-facing message.
    Validation(&'static str),
    Provider(ProviderError),
    NotFound,
    /// The local per-client limiter tripped.
    RateLimited { retry_after: Duration },
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Provider(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(ProviderError::Auth) => StatusCode::UNAUTHORIZED,
            ApiError::Provider(ProviderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Provider(ProviderError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Validation(message) => *message,
            ApiError::Provider(ProviderError::Auth) => PROVIDER_AUTH,
            ApiError::Provider(ProviderError::RateLimited) => PROVIDER_RATE_LIMITED,
            ApiError::Provider(ProviderError::Unavailable(_)) => PROVIDER_FAILED,
            ApiError::NotFound => NOT_FOUND,
            ApiError::RateLimited { .. } => CLIENT_RATE_LIMITED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Provider(err) => error!("Chat request failed: {}", err),
            ApiError::RateLimited { retry_after } => {
                warn!("Client rate limit exceeded; retry in {:?}", retry_after)
            }
            _ => {}
        }

        let status = self.status();
        let body = Json(ErrorBody {
            error: self.message().to_string(),
        });
        let mut response = (status, body).into_response();
        if let ApiError::RateLimited { retry_after } = self {
            // Whole seconds, rounded up.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
