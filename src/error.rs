use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::auth::gate::GateError;
use crate::services::ServiceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Rate Limited: retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Internal Error: {0}")]
    Internal(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AppError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            AppError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
            AppError::Service(err) => (service_status(err), err.code()),
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::EmailAlreadyExists | ServiceError::CompanyAlreadyExists => {
            StatusCode::CONFLICT
        }
        ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ServiceError::UserNotFound | ServiceError::CompanyNotFound => StatusCode::NOT_FOUND,
        ServiceError::RoleNotFound => StatusCode::BAD_REQUEST,
        ServiceError::Forbidden | ServiceError::AdminUserNotFound => StatusCode::FORBIDDEN,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Unauthenticated(msg)
            | AppError::InvalidToken(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::TokenExpired => "Token expired".to_string(),
            AppError::RateLimited { .. } => "Too many requests, please try again later".to_string(),
            AppError::Internal(msg) | AppError::Service(ServiceError::Internal(msg)) => {
                tracing::error!("Internal error: {msg}");
                "Internal server error".to_string()
            }
            AppError::Service(err) => err.to_string(),
        };

        let body = json!({ "error": message, "code": code });
        let mut response = (status, axum::Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthenticated => {
                AppError::Unauthenticated("Missing or malformed bearer token".to_string())
            }
            GateError::InvalidToken => AppError::InvalidToken("Invalid token".to_string()),
            GateError::TokenExpired => AppError::TokenExpired,
            GateError::Forbidden => {
                AppError::Forbidden("You do not have permission for this action".to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn gate_errors_map_to_expected_statuses() {
        assert_eq!(status(GateError::Unauthenticated.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GateError::InvalidToken.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GateError::TokenExpired.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GateError::Forbidden.into()), StatusCode::FORBIDDEN);
    }

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let cases = [
            (ServiceError::EmailAlreadyExists, StatusCode::CONFLICT),
            (ServiceError::CompanyAlreadyExists, StatusCode::CONFLICT),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::UserNotFound, StatusCode::NOT_FOUND),
            (ServiceError::CompanyNotFound, StatusCode::NOT_FOUND),
            (ServiceError::RoleNotFound, StatusCode::BAD_REQUEST),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (ServiceError::AdminUserNotFound, StatusCode::FORBIDDEN),
            (
                ServiceError::Internal("db down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(status(err.into()), expected);
        }
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = AppError::RateLimited { retry_after: 12 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
