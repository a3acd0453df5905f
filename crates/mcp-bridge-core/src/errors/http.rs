// ABOUTME: Axum response conversion for AppError
// ABOUTME: Renders only the canonical status phrase so internal details never leak
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::AppError;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

impl AppError {
    /// Status code as an `http` type, falling back to 500 for unknown values
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, error = %self, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, error = %self, "Request rejected");
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_not_found_renders_reason_phrase() {
        let response = AppError::not_found("Session 123").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_every_code_has_valid_status() {
        for code in [
            ErrorCode::InvalidInput,
            ErrorCode::InvalidFormat,
            ErrorCode::MethodNotAllowed,
            ErrorCode::PayloadTooLarge,
            ErrorCode::ResourceNotFound,
            ErrorCode::ResourceUnavailable,
            ErrorCode::ExternalServiceError,
            ErrorCode::ConfigInvalid,
            ErrorCode::InternalError,
            ErrorCode::DeliveryFailed,
            ErrorCode::IoError,
        ] {
            let error = AppError::new(code, "test");
            assert_eq!(error.status_code().as_u16(), code.http_status());
        }
    }
}
