/// Unified error handling module
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Generic error body: `error` is populated only outside test mode
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("External API error: {0}")]
    ExternalApi(#[from] reqwest::Error),

    #[error("Upstream responded with status {status}")]
    Upstream { status: u16, body: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::ExternalApi(_) | ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ExternalApi(e) => match e.status() {
                Some(status) => upstream_code(status.as_u16()),
                None => "UPSTREAM_ERROR",
            },
            ApiError::Upstream { status, .. } => upstream_code(*status),
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Upstream { status, body } if !body.is_empty() => {
                format!("status {}: {}", status, body)
            }
            other => other.to_string(),
        }
    }
}

fn upstream_code(status: u16) -> &'static str {
    match status {
        403 => "UPSTREAM_403",
        404 => "UPSTREAM_404",
        429 => "UPSTREAM_429",
        500..=599 => "UPSTREAM_5XX",
        _ => "UPSTREAM_ERROR",
    }
}

/// Converts errors into responses, deciding once whether details are exposed
#[derive(Clone, Copy, Debug)]
pub struct ErrorResponder {
    expose_detail: bool,
}

impl ErrorResponder {
    pub fn new(expose_detail: bool) -> Self {
        Self { expose_detail }
    }

    pub fn respond(&self, error: ApiError) -> ErrorReply {
        ErrorReply {
            error,
            expose_detail: self.expose_detail,
        }
    }
}

/// An [`ApiError`] bound to a responder policy, ready to be returned from a handler
#[derive(Debug)]
pub struct ErrorReply {
    error: ApiError,
    expose_detail: bool,
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        let error = self.expose_detail.then(|| ErrorDetail {
            code: self.error.code().to_string(),
            detail: self.error.detail(),
        });

        let body = ErrorResponse {
            message: self.error.to_string(),
            error,
        };

        (self.error.status(), Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
