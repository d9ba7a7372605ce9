//! HTTP handlers for the OAuth 2.0 endpoints.
//!
//! # Available Handlers
//!
//! - [`authorize`] - Authorization endpoint (RFC 6749 section 3.1)
//! - [`token`] - Token endpoint (RFC 6749 section 3.2)
//!
//! # Router Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{Router, routing::{get, post}};
//! use oauthkit_server::http::{authorize_handler, token_handler};
//!
//! let app = Router::new()
//!     .route("/oauth/authorize", get(authorize_handler).post(authorize_handler))
//!     .route("/oauth/token", post(token_handler))
//!     .with_state(Arc::new(server));
//! ```

pub mod authorize;
pub mod token;

pub use authorize::authorize_handler;
pub use token::token_handler;
