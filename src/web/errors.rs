//! HTTP error envelope.
//!
//! Every failure leaves the API as `{"error": {"code", "message"}}` with a
//! stable machine-readable code. Internal faults surface a generic message
//! only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::constants::codes;
use crate::error::ServiceError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// The standard error body, reusable where a handler composes its own
    /// response around it.
    pub fn body(&self) -> serde_json::Value {
        json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        })
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, codes::INVALID_REQUEST, message)
            }
            ServiceError::NotFound(message) => {
                Self::new(StatusCode::NOT_FOUND, codes::TASK_NOT_FOUND, message)
            }
            ServiceError::Conflict { code, message } => {
                Self::new(StatusCode::CONFLICT, code, message)
            }
            ServiceError::PaymentRejected(message) => Self::new(
                StatusCode::PAYMENT_REQUIRED,
                codes::PAYMENT_UNVERIFIED,
                message,
            ),
            ServiceError::Upstream(message) => {
                Self::new(StatusCode::BAD_GATEWAY, codes::UPSTREAM_ERROR, message)
            }
            ServiceError::Internal => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL_ERROR,
                "internal error",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body();
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_preserves_its_specific_code() {
        let err: ApiError =
            ServiceError::conflict(codes::AMOUNT_MISMATCH, "expected amount 100").into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, codes::AMOUNT_MISMATCH);
        assert_eq!(err.body()["error"]["code"], codes::AMOUNT_MISMATCH);
    }

    #[test]
    fn internal_fault_is_generic() {
        let err: ApiError = ServiceError::Internal.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal error");
    }

    #[test]
    fn rejected_payment_maps_to_402() {
        let err: ApiError = ServiceError::PaymentRejected("too low".to_string()).into();
        assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.code, codes::PAYMENT_UNVERIFIED);
    }
}
