use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage unavailable: {0}")]
    Connection(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::ConnectionAcquire(e) => Self::Connection(e.to_string()),
            DbErr::Conn(e) => Self::Connection(e.to_string()),
            _ => match err.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                    Self::Validation(format!("referenced record does not exist ({msg})"))
                }
                _ => Self::Database(err),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::Connection(msg) => {
                tracing::error!("Storage unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage unavailable".to_string(),
                )
            }
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Database(e) => {
                tracing::error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::Connection("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::Internal("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Database(DbErr::Custom("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn generic_db_errors_stay_database_errors() {
        let err = AppError::from(DbErr::Custom("boom".into()));
        assert!(matches!(err, AppError::Database(_)));
    }
}
