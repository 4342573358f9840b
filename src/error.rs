use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing resource, or one owned by another user. Both read the same.
    #[error("Not Found")]
    NotFound,

    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock { product_id: Uuid },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transaction failed")]
    TransactionFailure(#[from] sea_orm::DbErr),

    #[error("Transaction timed out")]
    TransactionTimeout,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            AppError::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TransactionFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TransactionTimeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable identifier carried in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::EmptyCart => "empty_cart",
            AppError::Validation(_) => "validation_error",
            AppError::TransactionFailure(_) => "transaction_failure",
            AppError::TransactionTimeout => "transaction_failure",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<Uuid>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::TransactionFailure(err) => {
                tracing::error!(error = %err, "storage transaction failed");
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
            }
            _ => {}
        }

        let product_id = match &self {
            AppError::InsufficientStock { product_id } => Some(*product_id),
            _ => None,
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                code: self.code(),
                product_id,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
