//! Bearer token extraction (RFC 6750).

use axum::http::header::AUTHORIZATION;

use crate::AuthResult;
use crate::error::{AuthError, ErrorKind};
use crate::oauth::service::AuthorizationServer;
use crate::request::OAuthRequest;
use crate::types::TokenInfo;

const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the access token from a request.
///
/// An `Authorization: Bearer` header takes precedence over the
/// `access_token` form parameter, even when its value is empty.
#[must_use]
pub fn extract_bearer_token(request: &OAuthRequest) -> Option<String> {
    let token = match request
        .header(AUTHORIZATION)
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
    {
        Some(token) => token,
        None => request.form_value("access_token"),
    };

    (!token.is_empty()).then(|| token.to_string())
}

impl AuthorizationServer {
    /// Resolves the bearer token of a request through the token manager.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccessToken` when the request carries no token,
    /// otherwise the token manager's error unchanged.
    pub async fn validate_bearer_token(
        &self,
        request: &OAuthRequest,
    ) -> AuthResult<Box<dyn TokenInfo>> {
        let token = extract_bearer_token(request)
            .ok_or_else(|| AuthError::new(ErrorKind::InvalidAccessToken))?;
        self.manager().load_access_token(&token).await
    }
}
