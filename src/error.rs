use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::warning;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No session, or the session holds no refresh credential.
    #[error("not authenticated")]
    Unauthenticated,

    #[error("missing authorization code")]
    MissingCode,

    #[error("authorization code exchange failed: {0}")]
    AuthExchange(String),

    #[error("access token refresh failed: {0}")]
    Refresh(String),

    #[error("failed to fetch album library: {0}")]
    LibraryFetch(String),

    #[error("session store error: {0}")]
    Session(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("a reload is already in progress")]
    Busy,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthenticated | Error::Refresh(_) | Error::AuthExchange(_) => {
                StatusCode::UNAUTHORIZED
            }
            Error::MissingCode => StatusCode::BAD_REQUEST,
            Error::LibraryFetch(_) => StatusCode::BAD_GATEWAY,
            Error::Busy => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Error::Unauthenticated => "UNAUTHENTICATED",
            Error::MissingCode => "MISSING_CODE",
            Error::AuthExchange(_) => "AUTH_EXCHANGE_FAILED",
            Error::Refresh(_) => "REFRESH_FAILED",
            Error::LibraryFetch(_) => "LIBRARY_FETCH_FAILED",
            Error::Busy => "BUSY",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // The client only needs the status to decide to show the login.
            Error::Unauthenticated | Error::Refresh(_) => {
                if let Error::Refresh(reason) = &self {
                    warning!("Refresh rejected upstream: {}", reason);
                }
                status.into_response()
            }
            Error::MissingCode | Error::AuthExchange(_) | Error::LibraryFetch(_) | Error::Busy => {
                warning!("{}", self);
                let body = ErrorResponse {
                    error: self.to_string(),
                    code: self.code().to_string(),
                };
                (status, Json(body)).into_response()
            }
            other => {
                warning!("Internal server error: {}", other);
                let body = ErrorResponse {
                    error: "internal server error".to_string(),
                    code: other.code().to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_unauthorized() {
        assert_eq!(Error::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::Refresh("invalid_grant".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::AuthExchange("bad code".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn missing_code_is_a_bad_request() {
        assert_eq!(Error::MissingCode.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn library_failures_map_to_bad_gateway() {
        assert_eq!(
            Error::LibraryFetch("offset 50".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::Session("disk full".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
