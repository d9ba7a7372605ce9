//! Pluggable capability handlers supplied by the embedding application.
//!
//! Each capability is a single-purpose trait. Every trait is implemented for
//! plain closures of the matching shape, so simple policies can be written
//! inline while handlers that need I/O implement the async trait directly.
//!
//! All capabilities are optional except client info, user authorization
//! and password authorization, which always have a value in [`Handlers`].
//! Their defaults read HTTP Basic credentials and deny every user.
//!
//! # Example
//!
//! ```ignore
//! use oauthkit_server::{AuthResult, Handlers, GrantType};
//!
//! let handlers = Handlers::default()
//!     .with_client_info(oauthkit_server::handlers::client_form_handler)
//!     .with_client_authorized(|_client_id: &str, grant: GrantType| -> AuthResult<bool> {
//!         Ok(grant != GrantType::Password)
//!     });
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{Map, Value};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::error_response::ErrorResponse;
use crate::request::OAuthRequest;
use crate::types::{GrantType, TokenInfo};

/// Extra fields contributed to a token response.
pub type ExtensionFields = Map<String, Value>;

// =============================================================================
// Capability Traits
// =============================================================================

/// Resolves the client id and secret of a token request.
#[async_trait]
pub trait ClientInfoHandler: Send + Sync {
    /// Returns `(client_id, client_secret)`.
    async fn client_info(&self, request: &OAuthRequest) -> AuthResult<(String, String)>;
}

/// Decides whether a client may use a grant type.
#[async_trait]
pub trait ClientAuthorizedHandler: Send + Sync {
    /// Returns `true` if the client may use `grant_type`.
    async fn client_authorized(&self, client_id: &str, grant_type: GrantType) -> AuthResult<bool>;
}

/// Decides whether a client may request a scope.
#[async_trait]
pub trait ClientScopeHandler: Send + Sync {
    /// Returns `true` if the client may request `scope`.
    async fn client_scope(&self, client_id: &str, scope: &str) -> AuthResult<bool>;
}

/// Outcome of the user authorization step.
#[derive(Debug)]
pub enum UserAuthorization {
    /// The user is authenticated and authorized the request. An empty user
    /// id is treated as a denial.
    Authorized(String),
    /// The handler answers the user-agent itself (login page, consent
    /// form, ...). The authorization request stops here.
    Pending(Response),
}

/// Authenticates the resource owner on the authorization endpoint.
#[async_trait]
pub trait UserAuthorizationHandler: Send + Sync {
    /// Authenticates the user behind `request`.
    async fn authorize_user(&self, request: &OAuthRequest) -> AuthResult<UserAuthorization>;
}

/// Verifies resource owner credentials for the password grant.
#[async_trait]
pub trait PasswordAuthorizationHandler: Send + Sync {
    /// Returns the user id, or `None` when the credentials are wrong.
    async fn authorize_password(&self, username: &str, password: &str)
    -> AuthResult<Option<String>>;
}

/// Checks that a user may use a client application.
///
/// Return [`AuthError::NoPermission`] to leave the OAuth 2.0 error model.
#[async_trait]
pub trait UserPermissionHandler: Send + Sync {
    /// Fails when `user_id` may not use `client_id`.
    async fn check_user_permission(&self, user_id: &str, client_id: &str) -> AuthResult<()>;
}

/// Decides whether a refresh request may change the token scope.
#[async_trait]
pub trait RefreshingScopeHandler: Send + Sync {
    /// Returns `true` if `new_scope` is acceptable given `old_scope`.
    async fn refreshing_scope(&self, new_scope: &str, old_scope: &str) -> AuthResult<bool>;
}

/// Overrides the access token lifetime on the authorization endpoint.
#[async_trait]
pub trait AccessTokenExpHandler: Send + Sync {
    /// Returns the access token lifetime for `request`.
    async fn access_token_exp(&self, request: &OAuthRequest) -> AuthResult<Duration>;
}

/// Overrides the granted scope on the authorization endpoint.
#[async_trait]
pub trait AuthorizeScopeHandler: Send + Sync {
    /// Returns the scope to grant; an empty string keeps the requested one.
    async fn authorize_scope(&self, request: &OAuthRequest) -> AuthResult<String>;
}

/// Adds fields to successful token responses.
pub trait ExtensionFieldsHandler: Send + Sync {
    /// Returns the extra fields. Core fields are never overwritten.
    fn extension_fields(&self, token: &dyn TokenInfo) -> ExtensionFields;
}

/// Last chance to adjust an error response before it is rendered.
pub trait ResponseErrorHandler: Send + Sync {
    /// Mutates the response in place.
    fn response_error(&self, response: &mut ErrorResponse);
}

/// Maps errors outside the protocol table to a custom response.
pub trait InternalErrorHandler: Send + Sync {
    /// Returns a response, or `None` to fall back to `server_error`.
    fn internal_error(&self, err: &AuthError) -> Option<ErrorResponse>;
}

// =============================================================================
// Closure Implementations
// =============================================================================

#[async_trait]
impl<F> ClientInfoHandler for F
where
    F: Fn(&OAuthRequest) -> AuthResult<(String, String)> + Send + Sync,
{
    async fn client_info(&self, request: &OAuthRequest) -> AuthResult<(String, String)> {
        self(request)
    }
}

#[async_trait]
impl<F> ClientAuthorizedHandler for F
where
    F: Fn(&str, GrantType) -> AuthResult<bool> + Send + Sync,
{
    async fn client_authorized(&self, client_id: &str, grant_type: GrantType) -> AuthResult<bool> {
        self(client_id, grant_type)
    }
}

#[async_trait]
impl<F> ClientScopeHandler for F
where
    F: Fn(&str, &str) -> AuthResult<bool> + Send + Sync,
{
    async fn client_scope(&self, client_id: &str, scope: &str) -> AuthResult<bool> {
        self(client_id, scope)
    }
}

#[async_trait]
impl<F> UserAuthorizationHandler for F
where
    F: Fn(&OAuthRequest) -> AuthResult<UserAuthorization> + Send + Sync,
{
    async fn authorize_user(&self, request: &OAuthRequest) -> AuthResult<UserAuthorization> {
        self(request)
    }
}

#[async_trait]
impl<F> PasswordAuthorizationHandler for F
where
    F: Fn(&str, &str) -> AuthResult<Option<String>> + Send + Sync,
{
    async fn authorize_password(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<Option<String>> {
        self(username, password)
    }
}

#[async_trait]
impl<F> UserPermissionHandler for F
where
    F: Fn(&str, &str) -> AuthResult<()> + Send + Sync,
{
    async fn check_user_permission(&self, user_id: &str, client_id: &str) -> AuthResult<()> {
        self(user_id, client_id)
    }
}

#[async_trait]
impl<F> RefreshingScopeHandler for F
where
    F: Fn(&str, &str) -> AuthResult<bool> + Send + Sync,
{
    async fn refreshing_scope(&self, new_scope: &str, old_scope: &str) -> AuthResult<bool> {
        self(new_scope, old_scope)
    }
}

#[async_trait]
impl<F> AccessTokenExpHandler for F
where
    F: Fn(&OAuthRequest) -> AuthResult<Duration> + Send + Sync,
{
    async fn access_token_exp(&self, request: &OAuthRequest) -> AuthResult<Duration> {
        self(request)
    }
}

#[async_trait]
impl<F> AuthorizeScopeHandler for F
where
    F: Fn(&OAuthRequest) -> AuthResult<String> + Send + Sync,
{
    async fn authorize_scope(&self, request: &OAuthRequest) -> AuthResult<String> {
        self(request)
    }
}

impl<F> ExtensionFieldsHandler for F
where
    F: Fn(&dyn TokenInfo) -> ExtensionFields + Send + Sync,
{
    fn extension_fields(&self, token: &dyn TokenInfo) -> ExtensionFields {
        self(token)
    }
}

impl<F> ResponseErrorHandler for F
where
    F: Fn(&mut ErrorResponse) + Send + Sync,
{
    fn response_error(&self, response: &mut ErrorResponse) {
        self(response)
    }
}

impl<F> InternalErrorHandler for F
where
    F: Fn(&AuthError) -> Option<ErrorResponse> + Send + Sync,
{
    fn internal_error(&self, err: &AuthError) -> Option<ErrorResponse> {
        self(err)
    }
}

// =============================================================================
// Default Handlers
// =============================================================================

/// Reads client credentials from the HTTP Basic `Authorization` header.
///
/// # Errors
///
/// Returns `InvalidClient` when the header is missing or malformed.
pub fn client_basic_handler(request: &OAuthRequest) -> AuthResult<(String, String)> {
    request.basic_auth().ok_or_else(AuthError::invalid_client)
}

/// Reads client credentials from the `client_id` / `client_secret` form
/// parameters.
///
/// # Errors
///
/// Returns `InvalidClient` when `client_id` is missing.
pub fn client_form_handler(request: &OAuthRequest) -> AuthResult<(String, String)> {
    let client_id = request.form_value("client_id");
    if client_id.is_empty() {
        return Err(AuthError::invalid_client());
    }
    Ok((
        client_id.to_string(),
        request.form_value("client_secret").to_string(),
    ))
}

/// Denies every authorization endpoint user.
///
/// # Errors
///
/// Always returns `AccessDenied`.
pub fn deny_user_authorization(_request: &OAuthRequest) -> AuthResult<UserAuthorization> {
    Err(AuthError::access_denied())
}

/// Denies every password grant.
///
/// # Errors
///
/// Always returns `AccessDenied`.
pub fn deny_password_authorization(_username: &str, _password: &str) -> AuthResult<Option<String>> {
    Err(AuthError::access_denied())
}

// =============================================================================
// Handler Registry
// =============================================================================

/// The set of capability handlers used by the authorization server.
#[derive(Clone)]
pub struct Handlers {
    /// Client credential extraction for token requests.
    pub client_info: Arc<dyn ClientInfoHandler>,
    /// Resource owner authentication on the authorization endpoint.
    pub user_authorization: Arc<dyn UserAuthorizationHandler>,
    /// Resource owner authentication for the password grant.
    pub password_authorization: Arc<dyn PasswordAuthorizationHandler>,
    /// Per-client grant type policy.
    pub client_authorized: Option<Arc<dyn ClientAuthorizedHandler>>,
    /// Per-client scope policy.
    pub client_scope: Option<Arc<dyn ClientScopeHandler>>,
    /// User-to-application permission check for the password grant.
    pub user_permission: Option<Arc<dyn UserPermissionHandler>>,
    /// Scope policy for refresh requests.
    pub refreshing_scope: Option<Arc<dyn RefreshingScopeHandler>>,
    /// Access token lifetime override.
    pub access_token_exp: Option<Arc<dyn AccessTokenExpHandler>>,
    /// Granted scope override.
    pub authorize_scope: Option<Arc<dyn AuthorizeScopeHandler>>,
    /// Extra token response fields.
    pub extension_fields: Option<Arc<dyn ExtensionFieldsHandler>>,
    /// Error response mutation hook.
    pub response_error: Option<Arc<dyn ResponseErrorHandler>>,
    /// Mapping for errors outside the protocol table.
    pub internal_error: Option<Arc<dyn InternalErrorHandler>>,
}

impl Default for Handlers {
    fn default() -> Self {
        Self {
            client_info: Arc::new(client_basic_handler),
            user_authorization: Arc::new(deny_user_authorization),
            password_authorization: Arc::new(deny_password_authorization),
            client_authorized: None,
            client_scope: None,
            user_permission: None,
            refreshing_scope: None,
            access_token_exp: None,
            authorize_scope: None,
            extension_fields: None,
            response_error: None,
            internal_error: None,
        }
    }
}

impl Handlers {
    /// Sets the client info handler.
    #[must_use]
    pub fn with_client_info(mut self, handler: impl ClientInfoHandler + 'static) -> Self {
        self.client_info = Arc::new(handler);
        self
    }

    /// Sets the user authorization handler.
    #[must_use]
    pub fn with_user_authorization(
        mut self,
        handler: impl UserAuthorizationHandler + 'static,
    ) -> Self {
        self.user_authorization = Arc::new(handler);
        self
    }

    /// Sets the password authorization handler.
    #[must_use]
    pub fn with_password_authorization(
        mut self,
        handler: impl PasswordAuthorizationHandler + 'static,
    ) -> Self {
        self.password_authorization = Arc::new(handler);
        self
    }

    /// Sets the client grant type policy.
    #[must_use]
    pub fn with_client_authorized(
        mut self,
        handler: impl ClientAuthorizedHandler + 'static,
    ) -> Self {
        self.client_authorized = Some(Arc::new(handler));
        self
    }

    /// Sets the client scope policy.
    #[must_use]
    pub fn with_client_scope(mut self, handler: impl ClientScopeHandler + 'static) -> Self {
        self.client_scope = Some(Arc::new(handler));
        self
    }

    /// Sets the user permission check.
    #[must_use]
    pub fn with_user_permission(mut self, handler: impl UserPermissionHandler + 'static) -> Self {
        self.user_permission = Some(Arc::new(handler));
        self
    }

    /// Sets the refresh scope policy.
    #[must_use]
    pub fn with_refreshing_scope(
        mut self,
        handler: impl RefreshingScopeHandler + 'static,
    ) -> Self {
        self.refreshing_scope = Some(Arc::new(handler));
        self
    }

    /// Sets the access token lifetime override.
    #[must_use]
    pub fn with_access_token_exp(mut self, handler: impl AccessTokenExpHandler + 'static) -> Self {
        self.access_token_exp = Some(Arc::new(handler));
        self
    }

    /// Sets the granted scope override.
    #[must_use]
    pub fn with_authorize_scope(mut self, handler: impl AuthorizeScopeHandler + 'static) -> Self {
        self.authorize_scope = Some(Arc::new(handler));
        self
    }

    /// Sets the token response extension hook.
    #[must_use]
    pub fn with_extension_fields(
        mut self,
        handler: impl ExtensionFieldsHandler + 'static,
    ) -> Self {
        self.extension_fields = Some(Arc::new(handler));
        self
    }

    /// Sets the error response mutation hook.
    #[must_use]
    pub fn with_response_error(mut self, handler: impl ResponseErrorHandler + 'static) -> Self {
        self.response_error = Some(Arc::new(handler));
        self
    }

    /// Sets the internal error mapping.
    #[must_use]
    pub fn with_internal_error(mut self, handler: impl InternalErrorHandler + 'static) -> Self {
        self.internal_error = Some(Arc::new(handler));
        self
    }
}
