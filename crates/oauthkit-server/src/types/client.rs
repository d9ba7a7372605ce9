//! Registered client record.

use serde::{Deserialize, Serialize};

/// OAuth 2.0 client as returned by the token manager.
///
/// The engine only reads [`Client::domain`], which is used as the redirect
/// target when an authorization request carries no `redirect_uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Client secret for confidential clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Default redirect domain.
    pub domain: String,

    /// Owning user, if the client was registered on behalf of one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Client {
    /// Creates a client with the given id and default redirect domain.
    #[must_use]
    pub fn new(client_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            domain: domain.into(),
            user_id: None,
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }
}
