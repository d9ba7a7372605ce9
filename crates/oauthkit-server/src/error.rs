//! Authorization server error types.
//!
//! Errors carry a machine-readable [`ErrorKind`] plus optional free-form
//! context. The kind is what the error mapper looks up; the context is only
//! ever used for logging.

use std::fmt;

use serde::{Deserialize, Serialize};

/// OAuth 2.0 error kinds.
///
/// The first group are the protocol error codes of RFC 6749 sections 4.1.2.1
/// and 5.2. The second group are token-manager conditions that the engine
/// translates before they reach a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request is missing a required parameter or is otherwise malformed.
    InvalidRequest,
    /// The client is not authorized to use this method.
    UnauthorizedClient,
    /// The resource owner or authorization server denied the request.
    AccessDenied,
    /// The response type is not supported.
    UnsupportedResponseType,
    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,
    /// Unexpected server-side condition.
    ServerError,
    /// The server is temporarily overloaded or under maintenance.
    TemporarilyUnavailable,
    /// Client authentication failed.
    InvalidClient,
    /// The grant or refresh token is invalid, expired, or revoked.
    InvalidGrant,
    /// The grant type is not supported.
    UnsupportedGrantType,

    /// The redirect URI does not match the client registration.
    InvalidRedirectUri,
    /// The authorization code is unknown or already used.
    InvalidAuthorizeCode,
    /// The access token is unknown.
    InvalidAccessToken,
    /// The refresh token is unknown.
    InvalidRefreshToken,
    /// The access token has expired.
    ExpiredAccessToken,
    /// The refresh token has expired.
    ExpiredRefreshToken,
}

impl ErrorKind {
    /// Returns the wire identifier of this kind (the `error` response field).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidRedirectUri => "invalid_redirect_uri",
            Self::InvalidAuthorizeCode => "invalid_authorize_code",
            Self::InvalidAccessToken => "invalid_access_token",
            Self::InvalidRefreshToken => "invalid_refresh_token",
            Self::ExpiredAccessToken => "expired_access_token",
            Self::ExpiredRefreshToken => "expired_refresh_token",
        }
    }

    /// Returns `true` for the refresh-token conditions that are reported to
    /// clients as `invalid_grant`.
    #[must_use]
    pub fn is_refresh_token_error(&self) -> bool {
        matches!(self, Self::InvalidRefreshToken | Self::ExpiredRefreshToken)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors produced by the authorization server and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A protocol-level error, optionally wrapped with context.
    #[error("{}", render_protocol(kind, context.as_deref()))]
    Protocol {
        /// Root error kind used for the response lookup.
        kind: ErrorKind,
        /// Context accumulated while the error propagated.
        context: Option<String>,
    },

    /// The user has no permission to use the requesting application.
    ///
    /// This bypasses the OAuth 2.0 error model: the authorization endpoint
    /// answers with an application redirect, the token endpoint hands the
    /// error back to the caller.
    #[error("no permission to the app")]
    NoPermission {
        /// Redirect target overriding the configured no-permission path.
        redirect: Option<String>,
    },

    /// The redirect URI could not be parsed.
    #[error("invalid redirect uri: {0}")]
    RedirectUri(#[from] url::ParseError),

    /// An unexpected failure inside a collaborator.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

fn render_protocol(kind: &ErrorKind, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("{context}: {kind}"),
        None => kind.to_string(),
    }
}

impl From<ErrorKind> for AuthError {
    fn from(kind: ErrorKind) -> Self {
        Self::Protocol {
            kind,
            context: None,
        }
    }
}

impl AuthError {
    /// Creates a protocol error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        kind.into()
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request() -> Self {
        ErrorKind::InvalidRequest.into()
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client() -> Self {
        ErrorKind::InvalidClient.into()
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant() -> Self {
        ErrorKind::InvalidGrant.into()
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope() -> Self {
        ErrorKind::InvalidScope.into()
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client() -> Self {
        ErrorKind::UnauthorizedClient.into()
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied() -> Self {
        ErrorKind::AccessDenied.into()
    }

    /// Creates the no-permission error using the configured redirect path.
    #[must_use]
    pub fn no_permission() -> Self {
        Self::NoPermission { redirect: None }
    }

    /// Creates the no-permission error with its own redirect target.
    #[must_use]
    pub fn no_permission_redirect(redirect: impl Into<String>) -> Self {
        Self::NoPermission {
            redirect: Some(redirect.into()),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wraps the error with additional context, keeping its kind.
    ///
    /// Only protocol errors accumulate context; other variants are returned
    /// unchanged.
    #[must_use]
    pub fn context(self, message: impl Into<String>) -> Self {
        match self {
            Self::Protocol { kind, context } => {
                let message = message.into();
                let context = match context {
                    Some(inner) => format!("{message}: {inner}"),
                    None => message,
                };
                Self::Protocol {
                    kind,
                    context: Some(context),
                }
            }
            other => other,
        }
    }

    /// Returns the root protocol kind, if this is a protocol error.
    #[must_use]
    pub fn root_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Protocol { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` if the root kind equals `kind`.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.root_kind() == Some(kind)
    }

    /// Returns `true` for the no-permission escape hatch.
    #[must_use]
    pub fn is_no_permission(&self) -> bool {
        matches!(self, Self::NoPermission { .. })
    }
}
