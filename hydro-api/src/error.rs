use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hydro_store::StoreError;
use serde::Serialize;

/// A request parameter that failed validation. Rendered as HTTP 422.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid parameter '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Reuse the field and message of a store-level parameter error; anything
    /// else is attributed to `field`.
    pub fn from_store(field: &str, err: StoreError) -> Self {
        match err {
            StoreError::InvalidParameter { field, message } => Self { field, message },
            other => Self::new(field, other.to_string()),
        }
    }
}

impl From<QueryRejection> for ValidationError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new("query", rejection.body_text())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_client_error() {
            ApiError::Validation(ValidationError::from_store("query", err))
        } else {
            ApiError::Store(err)
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(ValidationError { field, message }) => {
                tracing::warn!(field = %field, details = %message, "rejected request parameter");
                metrics::counter!("validation_rejected_total", "field" => field.clone()).increment(1);
                let body = ErrorBody {
                    error: "invalid_parameter",
                    field: Some(field),
                    message,
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store query failed");
                let body = ErrorBody {
                    error: "internal_error",
                    field: None,
                    message: "Internal server error".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
