//! Token manager trait.
//!
//! The token manager is the storage and generation authority for clients,
//! authorization codes and tokens. Implementations are provided by the
//! embedding application; the engine only delegates to it.

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::token::TokenGenerateRequest;
use crate::types::{Client, GrantType, ResponseType, TokenInfo};

/// Storage and generation operations for codes and tokens.
///
/// Errors should use the token-manager kinds of
/// [`ErrorKind`](crate::ErrorKind) (`InvalidAuthorizeCode`,
/// `InvalidRefreshToken`, `ExpiredRefreshToken`, ...) so the engine can
/// translate them into protocol errors.
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Looks up a registered client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the client is unknown.
    async fn get_client(&self, client_id: &str) -> AuthResult<Client>;

    /// Issues an authorization code (`code`) or an access token (`token`)
    /// on the authorization endpoint.
    async fn generate_auth_token(
        &self,
        response_type: ResponseType,
        request: &TokenGenerateRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>>;

    /// Issues an access token on the token endpoint.
    ///
    /// # Errors
    ///
    /// For the authorization code grant, returns `InvalidAuthorizeCode` for
    /// unknown or expired codes and `InvalidClient` for client mismatches.
    async fn generate_access_token(
        &self,
        grant_type: GrantType,
        request: &TokenGenerateRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>>;

    /// Exchanges a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRefreshToken` or `ExpiredRefreshToken`.
    async fn refresh_access_token(
        &self,
        request: &TokenGenerateRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>>;

    /// Loads the token a refresh token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRefreshToken` or `ExpiredRefreshToken`.
    async fn load_refresh_token(&self, refresh: &str) -> AuthResult<Box<dyn TokenInfo>>;

    /// Loads the token an access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccessToken` or `ExpiredAccessToken`.
    async fn load_access_token(&self, access: &str) -> AuthResult<Box<dyn TokenInfo>>;
}
