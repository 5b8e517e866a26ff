use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Insufficient inventory for product ID {product_id}. Available: {available}, Requested: {requested}")]
    InsufficientInventory {
        product_id: i32,
        available: i32,
        requested: i32,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("Storage operation failed: {0}")]
    TransactionFailure(sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientInventory { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TransactionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The reason string handed to callers. Storage details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::TransactionFailure(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(format!(
                    "Referenced record does not exist ({})",
                    db_err.constraint().unwrap_or("foreign key")
                ))
            }
            other => AppError::TransactionFailure(other),
        }
    }
}

// Extractor rejections answer with the same `{"error": ...}` body as
// everything else.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::TransactionFailure(ref e) = self {
            log::error!("Database error: {:?}", e);
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_inventory_names_the_product() {
        let err = AppError::InsufficientInventory { product_id: 5, available: 85, requested: 90 };
        assert_eq!(
            err.to_string(),
            "Insufficient inventory for product ID 5. Available: 85, Requested: 90"
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_failures_are_not_exposed() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::TransactionFailure(_)));
        assert_eq!(err.public_message(), "Internal storage error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = AppError::invalid("Valid quantity is required");
        assert_eq!(err.public_message(), "Valid quantity is required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
