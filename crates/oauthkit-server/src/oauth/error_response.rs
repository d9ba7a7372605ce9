//! OAuth 2.0 error responses.
//!
//! Protocol error kinds map to a fixed description and HTTP status through a
//! table built once per process. Everything else goes through the
//! internal-error hook and falls back to `server_error`.

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::http::{HeaderMap, StatusCode};
use serde_json::{Map, Value};

use crate::error::{AuthError, ErrorKind};
use crate::oauth::service::AuthorizationServer;

static ERROR_TABLE: LazyLock<HashMap<ErrorKind, (&'static str, StatusCode)>> =
    LazyLock::new(|| {
        HashMap::from([
            (
                ErrorKind::InvalidRequest,
                (
                    "The request is missing a required parameter, includes an invalid parameter value, includes a parameter more than once, or is otherwise malformed",
                    StatusCode::BAD_REQUEST,
                ),
            ),
            (
                ErrorKind::UnauthorizedClient,
                (
                    "The client is not authorized to request an authorization code using this method",
                    StatusCode::UNAUTHORIZED,
                ),
            ),
            (
                ErrorKind::AccessDenied,
                (
                    "The resource owner or authorization server denied the request",
                    StatusCode::FORBIDDEN,
                ),
            ),
            (
                ErrorKind::UnsupportedResponseType,
                (
                    "The authorization server does not support obtaining an authorization code using this method",
                    StatusCode::UNAUTHORIZED,
                ),
            ),
            (
                ErrorKind::InvalidScope,
                (
                    "The requested scope is invalid, unknown, or malformed",
                    StatusCode::BAD_REQUEST,
                ),
            ),
            (
                ErrorKind::ServerError,
                (
                    "The authorization server encountered an unexpected condition that prevented it from fulfilling the request",
                    StatusCode::INTERNAL_SERVER_ERROR,
                ),
            ),
            (
                ErrorKind::TemporarilyUnavailable,
                (
                    "The authorization server is currently unable to handle the request due to a temporary overloading or maintenance of the server",
                    StatusCode::SERVICE_UNAVAILABLE,
                ),
            ),
            (
                ErrorKind::InvalidClient,
                ("Client authentication failed", StatusCode::UNAUTHORIZED),
            ),
            (
                ErrorKind::InvalidGrant,
                (
                    "The provided authorization grant (e.g., authorization code, resource owner credentials) or refresh token is invalid, expired, revoked, does not match the redirection URI used in the authorization request, or was issued to another client",
                    StatusCode::UNAUTHORIZED,
                ),
            ),
            (
                ErrorKind::UnsupportedGrantType,
                (
                    "The authorization grant type is not supported by the authorization server",
                    StatusCode::UNAUTHORIZED,
                ),
            ),
        ])
    });

/// Returns the description and status of a protocol error kind.
///
/// Token-manager kinds are not in the table and return `None`.
#[must_use]
pub fn describe(kind: ErrorKind) -> Option<(&'static str, StatusCode)> {
    ERROR_TABLE.get(&kind).copied()
}

/// A rendered OAuth 2.0 error.
#[derive(Debug, Clone, Default)]
pub struct ErrorResponse {
    /// Error kind, rendered as the `error` field.
    pub error: Option<ErrorKind>,
    /// Application specific numeric code (`error_code`).
    pub error_code: Option<i64>,
    /// Human readable description (`error_description`).
    pub description: String,
    /// Link to an error page (`error_uri`).
    pub uri: String,
    /// HTTP status; 500 when unset.
    pub status_code: Option<StatusCode>,
    /// Extra headers added to JSON error responses.
    pub headers: HeaderMap,
}

impl ErrorResponse {
    /// Creates a response for `kind`, filling description and status from
    /// the protocol table when the kind is listed there.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        let (description, status_code) = match describe(kind) {
            Some((description, status)) => (description.to_string(), Some(status)),
            None => (String::new(), None),
        };
        Self {
            error: Some(kind),
            description,
            status_code,
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Returns the HTTP status, defaulting to 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the wire fields of the error. Empty values are omitted.
    #[must_use]
    pub fn fields(&self) -> Map<String, Value> {
        let mut data = Map::new();
        if let Some(kind) = self.error {
            data.insert("error".into(), Value::from(kind.as_str()));
        }
        if let Some(code) = self.error_code.filter(|c| *c != 0) {
            data.insert("error_code".into(), Value::from(code));
        }
        if !self.description.is_empty() {
            data.insert("error_description".into(), Value::from(self.description.as_str()));
        }
        if !self.uri.is_empty() {
            data.insert("error_uri".into(), Value::from(self.uri.as_str()));
        }
        data
    }
}

impl AuthorizationServer {
    /// Maps an error to its OAuth 2.0 response.
    ///
    /// Lookup uses the root kind, so context added along the way does not
    /// change the mapping.
    #[must_use]
    pub fn build_error_response(&self, err: &AuthError) -> ErrorResponse {
        let mut response = match err.root_kind().filter(|k| describe(*k).is_some()) {
            Some(kind) => ErrorResponse::new(kind),
            None => {
                let mapped = self
                    .handlers()
                    .internal_error
                    .as_ref()
                    .and_then(|hook| hook.internal_error(err))
                    .filter(|r| r.error.is_some());

                mapped.unwrap_or_else(|| {
                    tracing::warn!(error = %err, "Unmapped authorization error");
                    ErrorResponse::new(ErrorKind::ServerError)
                })
            }
        };

        if let Some(hook) = &self.handlers().response_error {
            hook.response_error(&mut response);
        }

        response
    }
}
