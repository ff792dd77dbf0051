use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Service-wide error taxonomy. Ledger operations and CRUD handlers all
/// funnel through this type; the `IntoResponse` impl is the single place
/// where failures become HTTP statuses.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("not enough seats available: requested {requested}, available {available}")]
    InsufficientSeats { requested: i32, available: i32 },

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InsufficientSeats { .. } => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            // Unique/FK violations come from user input (duplicate email,
            // deleting a referenced row), not from us.
            Error::Database(sqlx::Error::Database(db))
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                StatusCode::CONFLICT
            }
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {:?}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            Error::NotFound("booking").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn insufficient_seats_maps_to_409() {
        let err = Error::InsufficientSeats {
            requested: 80,
            available: 70,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.to_string(),
            "not enough seats available: requested 80, available 70"
        );
    }

    #[test]
    fn validation_maps_to_400() {
        let err = Error::Validation("seat count must be greater than zero".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn opaque_database_error_maps_to_500() {
        let err = Error::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
