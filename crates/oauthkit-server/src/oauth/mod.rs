//! OAuth 2.0 authorization server protocol.
//!
//! This module implements the RFC 6749 authorization and token endpoints
//! independently of the HTTP framework:
//!
//! - Request validation for both endpoints
//! - Grant dispatch to the [`TokenManager`](crate::TokenManager)
//! - Redirect URI and token response construction
//! - Error mapping to protocol error responses
//! - Bearer token extraction (RFC 6750)

pub mod authorize;
pub mod bearer;
pub mod error_response;
pub mod redirect;
pub mod service;
pub mod token;

pub use authorize::AuthorizeRequest;
pub use bearer::extract_bearer_token;
pub use error_response::{ErrorResponse, describe};
pub use service::AuthorizationServer;
pub use token::TokenGenerateRequest;
