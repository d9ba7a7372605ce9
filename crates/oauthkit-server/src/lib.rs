//! # oauthkit-server
//!
//! OAuth 2.0 authorization server protocol engine.
//!
//! This crate provides:
//! - Authorization endpoint handling for the code and implicit flows
//! - Token endpoint handling for the authorization code, password,
//!   client credentials and refresh token grants
//! - Bearer token extraction and validation (RFC 6750)
//! - RFC 6749 error responses
//! - Axum handlers and extractors
//!
//! ## Overview
//!
//! The engine owns no storage. Clients, codes and tokens live behind the
//! [`TokenManager`] trait, and policy decisions (who the user is, which
//! client may use which grant, scope rules) are delegated to the capability
//! handlers registered in [`Handlers`].
//!
//! ## Modules
//!
//! - [`config`] - Server configuration
//! - [`oauth`] - Request validation, grant dispatch and response building
//! - [`handlers`] - Pluggable capability handlers
//! - [`manager`] - Token manager trait
//! - [`http`] - Axum handlers for the authorization and token endpoints
//! - [`middleware`] - Bearer token extractors and error responses
//! - [`request`] - Inbound request view
//! - [`types`] - Grant, client and token types

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod manager;
pub mod middleware;
pub mod oauth;
pub mod request;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, ServerConfig};
pub use error::{AuthError, ErrorKind};
pub use handlers::{Handlers, UserAuthorization};
pub use http::{authorize_handler, token_handler};
pub use manager::TokenManager;
pub use middleware::{BearerAuth, OptionalBearerAuth};
pub use oauth::{
    AuthorizationServer, AuthorizeRequest, ErrorResponse, TokenGenerateRequest,
    extract_bearer_token,
};
pub use request::OAuthRequest;
pub use types::{Client, GrantType, ResponseType, TokenInfo};

/// Type alias for authorization server results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use oauthkit_server::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{ConfigError, ServerConfig};
    pub use crate::error::{AuthError, ErrorKind};
    pub use crate::handlers::{
        AccessTokenExpHandler, AuthorizeScopeHandler, ClientAuthorizedHandler, ClientInfoHandler,
        ClientScopeHandler, ExtensionFieldsHandler, Handlers, InternalErrorHandler,
        PasswordAuthorizationHandler, RefreshingScopeHandler, ResponseErrorHandler,
        UserAuthorization, UserAuthorizationHandler, UserPermissionHandler,
    };
    pub use crate::http::{authorize_handler, token_handler};
    pub use crate::manager::TokenManager;
    pub use crate::middleware::{BearerAuth, OptionalBearerAuth};
    pub use crate::oauth::{
        AuthorizationServer, AuthorizeRequest, ErrorResponse, TokenGenerateRequest,
    };
    pub use crate::request::OAuthRequest;
    pub use crate::types::{Client, GrantType, ResponseType, TokenInfo};
}
