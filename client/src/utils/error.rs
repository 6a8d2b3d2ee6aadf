use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::utils::response::ApiErrorBody;

const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
const SERVER_MESSAGE: &str = "Something went wrong on our end. Please try again later";
const UNAUTHORIZED_MESSAGE: &str = "Your session has expired. Please log in again";
const SIGN_IN_MESSAGE: &str = "Please log in to continue";

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<Value>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not read the server response: {0}")]
    Decode(String),

    #[error("The request timed out")]
    Timeout,

    #[error("Payment failed: {0}")]
    Payment(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Normalizes a non-2xx response. 401/403/404/5xx get generic messages,
    /// everything else carries the server's own body through.
    pub fn from_status(status: StatusCode, body: Option<ApiErrorBody>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()),
            StatusCode::FORBIDDEN => ApiError::Forbidden(FORBIDDEN_MESSAGE.to_string()),
            StatusCode::NOT_FOUND => ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()),
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                message: SERVER_MESSAGE.to_string(),
            },
            s => {
                let body = body.unwrap_or_else(|| ApiErrorBody {
                    code: "HTTP_ERROR".to_string(),
                    message: s
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string(),
                    details: None,
                });
                ApiError::Api {
                    status: s.as_u16(),
                    code: body.code,
                    message: body.message,
                    details: body.details,
                }
            }
        }
    }

    /// 401 for a request sent without a session, e.g. wrong credentials at
    /// login. Nothing expired, so the server's own message is kept.
    pub fn credentials_rejected(body: Option<ApiErrorBody>) -> Self {
        ApiError::Unauthorized(
            body.map(|b| b.message)
                .unwrap_or_else(|| SIGN_IN_MESSAGE.to_string()),
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status, .. } | ApiError::Api { status, .. } => Some(*status),
            ApiError::Validation(_)
            | ApiError::Network(_)
            | ApiError::Decode(_)
            | ApiError::Timeout
            | ApiError::Payment(_) => None,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "AUTH_ERROR",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Server { .. } => "SERVER_ERROR",
            ApiError::Api { code, .. } => code,
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::Timeout => "TIMEOUT",
            ApiError::Payment(_) => "PAYMENT_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Api { message, .. } | ApiError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    pub(crate) fn log(&self) {
        match self {
            ApiError::Server { status, message } => {
                error!(status = *status, message = %message, "API server error");
            }
            ApiError::Network(msg) | ApiError::Decode(msg) => {
                error!(error = ?self, message = %msg, "API transport error");
            }
            ApiError::Timeout => error!("API request timed out"),
            ApiError::Validation(msg) => {
                warn!(message = %msg, "Client-side validation failed");
            }
            other => {
                warn!(status = ?other.status(), code = other.code(), message = %other.message(), "API error");
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ApiError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ApiError::Timeout
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
