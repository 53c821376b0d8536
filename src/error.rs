//! HTTP error envelope shared by every API route.
//!
//! Services return their own `thiserror` enums; routes translate those into
//! `ApiError`, which renders as `{ "error": "E_...", "message": "..." }` with
//! the message already localized for the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::locale::{Locale, Msg};

/// Stable machine-readable code for a domain error.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    #[must_use]
    pub fn from_msg(status: StatusCode, code: &'static str, msg: Msg, locale: Locale) -> Self {
        Self::new(status, code, msg.text(locale))
    }

    #[must_use]
    pub fn unauthorized(locale: Locale) -> Self {
        Self::from_msg(StatusCode::UNAUTHORIZED, "E_UNAUTHORIZED", Msg::Unauthorized, locale)
    }

    #[must_use]
    pub fn forbidden(locale: Locale) -> Self {
        Self::from_msg(StatusCode::FORBIDDEN, "E_FORBIDDEN", Msg::Forbidden, locale)
    }

    #[must_use]
    pub fn not_found(locale: Locale) -> Self {
        Self::from_msg(StatusCode::NOT_FOUND, "E_NOT_FOUND", Msg::NotFound, locale)
    }

    #[must_use]
    pub fn bad_request(locale: Locale) -> Self {
        Self::from_msg(StatusCode::BAD_REQUEST, "E_BAD_REQUEST", Msg::BadRequest, locale)
    }

    /// Internal failures never leak details to the caller; log before calling.
    #[must_use]
    pub fn internal(locale: Locale) -> Self {
        Self::from_msg(StatusCode::INTERNAL_SERVER_ERROR, "E_INTERNAL", Msg::Internal, locale)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.code, message: &self.message };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
