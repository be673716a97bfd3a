//! Service and API error types.
//!
//! [`ServiceError`] is what the orchestration layer returns; [`ApiError`] is
//! what handlers return and knows how to render itself as an HTTP response.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use sinibeli_core::{
    DomainError, Entity, ErrorKind, VALID_PAYMENT_STATUSES, VALID_TAX_TYPES,
    VALID_TRANSACTION_TYPES,
};
use sinibeli_store::StoreError;

// ============================================================================
// Service errors
// ============================================================================

/// Classification used for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Caller input rejected.
    BadRequest,
    /// Referenced entity missing.
    NotFound,
    /// Entity already exists.
    Conflict,
    /// Anything else.
    Internal,
}

/// Errors returned by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A validation or business rule failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            Self::Domain(e) => match e.kind() {
                ErrorKind::BadRequest => ServiceErrorKind::BadRequest,
                ErrorKind::NotFound => ServiceErrorKind::NotFound,
            },
            Self::Store(StoreError::NotFound) => ServiceErrorKind::NotFound,
            Self::Store(StoreError::AlreadyExists { .. }) => ServiceErrorKind::Conflict,
            Self::Store(_) => ServiceErrorKind::Internal,
        }
    }

    /// Treat a store-level "no rows" as a missing `entity`.
    #[must_use]
    pub fn missing_as(self, entity: Entity) -> Self {
        match self {
            Self::Store(StoreError::NotFound) => Self::Domain(DomainError::NotFound(entity)),
            other => other,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(e) => Self::Domain(e),
            other => Self::Store(other),
        }
    }
}

// ============================================================================
// API errors
// ============================================================================

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or invalid input.
    #[error("{message}")]
    BadRequest {
        /// Primary message.
        message: String,
        /// Extra explanation.
        details: Option<String>,
        /// A well-formed value.
        example: Option<String>,
    },

    /// Invalid transaction payload. The response lists the accepted enum values.
    #[error("{message}")]
    TransactionValidation {
        /// Primary message.
        message: String,
        /// Extra explanation.
        details: Option<String>,
    },

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("{message}")]
    Unauthorized {
        /// Machine-readable reason.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Internal server error. The message is passed through.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// A 400 with only a message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
            example: None,
        }
    }

    /// A 400 with a message and details.
    pub fn bad_request_with(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: Some(details.into()),
            example: None,
        }
    }

    /// Attach an example of a valid value.
    #[must_use]
    pub fn with_example(self, value: impl Into<String>) -> Self {
        match self {
            Self::BadRequest {
                message, details, ..
            } => Self::BadRequest {
                message,
                details,
                example: Some(value.into()),
            },
            other => other,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::TransactionValidation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Default, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_transaction_types: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_payment_statuses: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_tax_types: Option<&'static [&'static str]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest {
                message,
                details,
                example,
            } => ErrorResponse {
                error: message,
                details,
                example,
                ..ErrorResponse::default()
            },
            Self::TransactionValidation { message, details } => ErrorResponse {
                error: message,
                details,
                valid_transaction_types: Some(&VALID_TRANSACTION_TYPES),
                valid_payment_statuses: Some(&VALID_PAYMENT_STATUSES),
                valid_tax_types: Some(&VALID_TAX_TYPES),
                ..ErrorResponse::default()
            },
            Self::NotFound(message) | Self::Conflict(message) => ErrorResponse {
                error: message,
                ..ErrorResponse::default()
            },
            Self::Unauthorized { code, message } => ErrorResponse {
                error: code.to_string(),
                message: Some(message),
                ..ErrorResponse::default()
            },
            Self::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                ErrorResponse {
                    error: message,
                    ..ErrorResponse::default()
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ServiceError::Domain(err).into()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ServiceErrorKind::BadRequest => match err {
                ServiceError::Domain(e) if e.is_transaction_field_error() => {
                    Self::TransactionValidation {
                        message,
                        details: None,
                    }
                }
                _ => Self::bad_request(message),
            },
            ServiceErrorKind::NotFound => Self::NotFound(message),
            ServiceErrorKind::Conflict => Self::Conflict(message),
            ServiceErrorKind::Internal => Self::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Map an unparseable `:id` segment to a 400 naming the entity.
pub fn invalid_id(entity: Entity) -> impl FnOnce(PathRejection) -> ApiError {
    move |_| ApiError::bad_request(format!("invalid {entity} ID"))
}
