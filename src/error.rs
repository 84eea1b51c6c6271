//! Error taxonomy and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Defects in an entity's field descriptor, caught at startup before any
/// DDL or query is built.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("entity '{table}' declares no fields")]
    NoFields { table: &'static str },
    #[error("entity '{table}' declares field '{field}' more than once")]
    DuplicateField {
        table: &'static str,
        field: &'static str,
    },
    #[error("entity '{table}' has no '{id}' field")]
    MissingId {
        table: &'static str,
        id: &'static str,
    },
    #[error("entity '{table}' id field '{id}' must be an integer kind")]
    IdKind {
        table: &'static str,
        id: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field '{field}' expects {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },
    #[error("operator '{operator}' requires {requirement}")]
    Filter {
        operator: &'static str,
        requirement: &'static str,
    },
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("internal: {0}")]
    Internal(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Schema(e) => {
                tracing::error!(error = %e, "schema error surfaced in a request");
                (StatusCode::INTERNAL_SERVER_ERROR, "schema_error")
            }
            AppError::Config(e) => {
                tracing::error!(error = %e, "config error surfaced in a request");
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::UnknownField(_) => (StatusCode::BAD_REQUEST, "unknown_field"),
            AppError::FieldType { .. } => (StatusCode::BAD_REQUEST, "invalid_value"),
            AppError::Filter { .. } => (StatusCode::BAD_REQUEST, "invalid_filter"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Csv(_) => (StatusCode::BAD_REQUEST, "invalid_sheet"),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    tracing::error!(error = %e, "database error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "db_error")
                }
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
