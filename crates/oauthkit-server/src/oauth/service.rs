//! OAuth 2.0 authorization server.
//!
//! [`AuthorizationServer`] ties together the configuration, the token
//! manager and the capability handlers. The protocol operations live in
//! the sibling modules as `impl AuthorizationServer` blocks:
//!
//! - [`authorize`](super::authorize) - authorization request validation and dispatch
//! - [`token`](super::token) - token request validation, dispatch and response data
//! - [`redirect`](super::redirect) - redirect URI construction
//! - [`error_response`](super::error_response) - error mapping
//! - [`bearer`](super::bearer) - bearer token extraction
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use oauthkit_server::{AuthorizationServer, Handlers, ServerConfig};
//!
//! let server = AuthorizationServer::new(
//!     ServerConfig::default(),
//!     Arc::new(my_token_manager),
//!     Handlers::default().with_user_authorization(my_login),
//! );
//! ```

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::handlers::Handlers;
use crate::manager::TokenManager;
use crate::types::{GrantType, ResponseType};

/// The authorization server protocol engine.
///
/// Immutable after construction and safe to share between requests.
pub struct AuthorizationServer {
    /// Server configuration.
    config: ServerConfig,

    /// Storage and generation authority for codes and tokens.
    manager: Arc<dyn TokenManager>,

    /// Capability handlers.
    handlers: Handlers,
}

impl AuthorizationServer {
    /// Creates a new authorization server.
    #[must_use]
    pub fn new(config: ServerConfig, manager: Arc<dyn TokenManager>, handlers: Handlers) -> Self {
        Self {
            config,
            manager,
            handlers,
        }
    }

    /// Creates a server with the default configuration and handlers.
    ///
    /// The default handlers deny every user, so only the client credentials
    /// and refresh token grants work until handlers are configured.
    #[must_use]
    pub fn with_defaults(manager: Arc<dyn TokenManager>) -> Self {
        Self::new(ServerConfig::default(), manager, Handlers::default())
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the token manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<dyn TokenManager> {
        &self.manager
    }

    /// Returns the capability handlers.
    #[must_use]
    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Returns `true` if the response type is allowed.
    #[must_use]
    pub fn check_response_type(&self, response_type: ResponseType) -> bool {
        self.config.is_response_type_allowed(response_type)
    }

    /// Returns `true` if the grant type is allowed.
    #[must_use]
    pub fn check_grant_type(&self, grant_type: GrantType) -> bool {
        self.config.is_grant_type_allowed(grant_type)
    }
}
