//! Axum integration for resource endpoints.
//!
//! This module provides:
//!
//! - Bearer token extractors backed by the token manager
//! - `IntoResponse` for [`AuthError`](crate::AuthError)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use oauthkit_server::middleware::BearerAuth;
//!
//! async fn profile(BearerAuth(token): BearerAuth) -> String {
//!     format!("Hello, {}!", token.user_id())
//! }
//!
//! let app = Router::new()
//!     .route("/me", get(profile))
//!     .with_state(Arc::new(server));
//! ```

pub mod bearer;
pub mod error;

pub use bearer::{BearerAuth, OptionalBearerAuth};
