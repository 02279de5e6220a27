//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Build-time descriptor failures. A failing type stays unusable until its
/// field declarations are fixed; nothing is cached for it.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("field '{field}' on {type_name}: required cannot be combined with accept-null")]
    NullPolicyConflict {
        type_name: &'static str,
        field: &'static str,
    },
}

/// Call-time merge failures. A per-field failure is wrapped with the type and
/// field it occurred on and aborts the rest of that update call.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("merge {type_name}.{field}: {source}")]
    Field {
        type_name: &'static str,
        field: &'static str,
        source: Box<MergeError>,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<DescriptorError> for AppError {
    fn from(e: DescriptorError) -> Self {
        AppError::Merge(MergeError::Descriptor(e))
    }
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
            AppError::Merge(_) => (StatusCode::INTERNAL_SERVER_ERROR, "merge_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
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
