//! Common types shared by the validators, the dispatch engine and the
//! response builders.
//!
//! ## Domain Types
//!
//! - [`ResponseType`] / [`GrantType`] - Authorization flows
//! - [`Client`] - Registered client record
//! - [`TokenInfo`] - Issued token view

pub mod client;
pub mod grant;
pub mod token;

pub use client::Client;
pub use grant::{GrantType, ResponseType, UnknownValue};
pub use token::TokenInfo;
