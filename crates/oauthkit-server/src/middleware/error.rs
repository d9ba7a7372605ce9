//! Error responses for errors that leave the protocol engine.
//!
//! Handler errors that could not be redirected or rendered by the engine,
//! and bearer authentication failures, end up here.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{AuthError, ErrorKind};
use crate::oauth::error_response::describe;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, description) = error_details(&self);

        let mut headers = HeaderMap::new();
        if matches!(
            self.root_kind(),
            Some(ErrorKind::InvalidAccessToken | ErrorKind::ExpiredAccessToken)
        ) {
            let challenge = build_www_authenticate_header(error, &description);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        let body = json!({
            "error": error,
            "error_description": description,
        });

        (status, headers, Json(body)).into_response()
    }
}

/// Returns (HTTP status, OAuth error code, description).
fn error_details(error: &AuthError) -> (StatusCode, &'static str, String) {
    match error {
        AuthError::Protocol { kind, .. } => match kind {
            ErrorKind::InvalidAccessToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "The access token is invalid".to_string(),
            ),
            ErrorKind::ExpiredAccessToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "The access token has expired".to_string(),
            ),
            kind => match describe(*kind) {
                Some((description, status)) => (status, kind.as_str(), description.to_string()),
                None => server_error(),
            },
        },
        AuthError::NoPermission { .. } => (
            StatusCode::FORBIDDEN,
            ErrorKind::AccessDenied.as_str(),
            error.to_string(),
        ),
        AuthError::RedirectUri(e) => (
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidRequest.as_str(),
            format!("Invalid redirect_uri: {e}"),
        ),
        AuthError::Internal { .. } => server_error(),
    }
}

fn server_error() -> (StatusCode, &'static str, String) {
    let (description, status) = describe(ErrorKind::ServerError)
        .unwrap_or(("", StatusCode::INTERNAL_SERVER_ERROR));
    (status, ErrorKind::ServerError.as_str(), description.to_string())
}

/// Format: `Bearer error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped = description.replace('"', "\\\"");
    format!("Bearer error=\"{error}\", error_description=\"{escaped}\"")
}
