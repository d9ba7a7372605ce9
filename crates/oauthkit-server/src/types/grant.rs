//! Response types and grant types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Response Type
// =============================================================================

/// Authorization endpoint response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Authorization code flow; the result is written to the query string.
    Code,
    /// Implicit flow; the result is written to the URI fragment.
    Token,
}

impl ResponseType {
    /// Returns the `response_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }

    /// Returns the grant type a client must be authorized for to use this
    /// response type.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::Code => GrantType::AuthorizationCode,
            Self::Token => GrantType::Implicit,
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            "token" => Ok(Self::Token),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    /// Authorization Code grant.
    #[serde(rename = "authorization_code")]
    AuthorizationCode,
    /// Resource Owner Password Credentials grant.
    #[serde(rename = "password")]
    Password,
    /// Client Credentials grant.
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    /// Refresh Token grant.
    #[serde(rename = "refresh_token")]
    RefreshToken,
    /// Implicit grant. Only used for client authorization checks on the
    /// authorization endpoint; never dispatched by the token endpoint.
    #[serde(rename = "__implicit")]
    Implicit,
}

impl GrantType {
    /// Returns the `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::Implicit => "__implicit",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "password" => Ok(Self::Password),
            "client_credentials" => Ok(Self::ClientCredentials),
            "refresh_token" => Ok(Self::RefreshToken),
            "__implicit" => Ok(Self::Implicit),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// A parameter value that does not name a known response or grant type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: '{0}'")]
pub struct UnknownValue(pub String);
