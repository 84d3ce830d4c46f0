use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A use-case error that maps onto a 4xx status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Server errors are logged here and reach the client without detail.
    pub fn from_status(status: StatusCode, err: impl Display) -> Self {
        if status.is_server_error() {
            error!(status = %status, error = %err, "request failed");
            AppError::Internal(anyhow::anyhow!(err.to_string()))
        } else {
            AppError::Rejected {
                status,
                message: err.to_string(),
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Rejected { status, message } => (status, message),
            AppError::Internal(_) => {
                // Don't leak internal error detail to client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

/// Wires a use-case error enum with a `status_code()` into `AppError`.
macro_rules! impl_app_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for AppError {
                fn from(err: $error) -> Self {
                    AppError::from_status(err.status_code(), err)
                }
            }
        )+
    };
}

impl_app_error!(
    crate::usecases::admin::AdminError,
    crate::usecases::coupons::CouponError,
    crate::usecases::estimates::EstimateError,
    crate::usecases::gift_cards::GiftCardError,
    crate::usecases::orders::OrderError,
    crate::usecases::products::ProductError,
    crate::usecases::whatsapp_webhook::WebhookError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::from_status(StatusCode::CONFLICT, "gift card belongs to another account");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn server_errors_are_masked() {
        let err = AppError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "db password is hunter2");
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
