//! API handlers module
//!
//! Thin Axum adapters over [`crate::controller::RecordController`]. They
//! translate extractor rejections into `InvalidRequest` and controller
//! results into status codes.

pub mod health;
pub mod proofs;
pub mod records;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pandamonium_common::errors::AppError;
use serde::Serialize;

/// Malformed query strings, path segments and bodies are bad requests
pub(crate) fn rejected(rejection: impl std::fmt::Display) -> AppError {
    AppError::invalid_request(rejection.to_string())
}

/// 200 with the value, or an empty 404
pub(crate) fn found<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
