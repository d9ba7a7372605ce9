//! Bearer token extractors for resource endpoints.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::AuthError;
use crate::oauth::bearer::extract_bearer_token;
use crate::oauth::service::AuthorizationServer;
use crate::request::OAuthRequest;
use crate::types::TokenInfo;

/// Axum extractor resolving the request's bearer token through the token
/// manager.
///
/// The token is read from the `Authorization: Bearer` header or the
/// `access_token` query parameter.
///
/// # Errors
///
/// Rejects with `InvalidAccessToken` when no token is present, or with the
/// token manager's error.
///
/// # Example
///
/// ```ignore
/// async fn profile(BearerAuth(token): BearerAuth) -> String {
///     format!("Hello, {}!", token.user_id())
/// }
/// ```
pub struct BearerAuth(pub Box<dyn TokenInfo>);

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("client_id", &self.0.client_id())
            .field("user_id", &self.0.user_id())
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    Arc<AuthorizationServer>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let server = Arc::<AuthorizationServer>::from_ref(state);
        let request = OAuthRequest::from_parts(parts, &[]);

        let token = server.validate_bearer_token(&request).await.map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            e
        })?;

        Ok(Self(token))
    }
}

/// Like [`BearerAuth`], but yields `None` when the request carries no token.
///
/// A token that is present but invalid is still rejected.
pub struct OptionalBearerAuth(pub Option<Box<dyn TokenInfo>>);

impl<S> FromRequestParts<S> for OptionalBearerAuth
where
    S: Send + Sync,
    Arc<AuthorizationServer>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request = OAuthRequest::from_parts(parts, &[]);
        let Some(token) = extract_bearer_token(&request) else {
            return Ok(Self(None));
        };

        let server = Arc::<AuthorizationServer>::from_ref(state);
        let info = server.manager().load_access_token(&token).await?;
        Ok(Self(Some(info)))
    }
}
