//! Authorization server configuration.
//!
//! The configuration is built once at startup and shared read-only by every
//! request. It can be constructed in code or loaded from TOML.
//!
//! # Example (TOML)
//!
//! ```toml
//! token_type = "Bearer"
//! allowed_response_types = ["code", "token"]
//! allowed_grant_types = ["authorization_code", "refresh_token"]
//! allow_get_access_request = false
//! no_permission_redirect = "/ui/403"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{GrantType, ResponseType};

/// Default path the user-agent is sent to when the user has no permission
/// to use the requesting application.
pub const DEFAULT_NO_PERMISSION_REDIRECT: &str = "/ui/403";

/// Authorization server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Token type label returned in token responses.
    pub token_type: String,

    /// Response types accepted by the authorization endpoint.
    pub allowed_response_types: Vec<ResponseType>,

    /// Grant types accepted by the token endpoint.
    pub allowed_grant_types: Vec<GrantType>,

    /// Accept token requests sent with GET in addition to POST.
    pub allow_get_access_request: bool,

    /// Redirect target for users without permission to the application.
    pub no_permission_redirect: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            token_type: "Bearer".to_string(),
            allowed_response_types: vec![ResponseType::Code, ResponseType::Token],
            allowed_grant_types: vec![
                GrantType::AuthorizationCode,
                GrantType::Password,
                GrantType::ClientCredentials,
                GrantType::RefreshToken,
            ],
            allow_get_access_request: false,
            no_permission_redirect: DEFAULT_NO_PERMISSION_REDIRECT.to_string(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ServerConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown enum
    /// values, and `ConfigError::InvalidValue` if validation fails.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of [`ServerConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&input)?;
        tracing::debug!(path = %path.display(), "Loaded authorization server configuration");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The token type is empty
    /// - The no-permission redirect is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_type.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "token_type cannot be empty".to_string(),
            ));
        }

        if self.no_permission_redirect.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "no_permission_redirect cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns `true` if the response type is allowed.
    #[must_use]
    pub fn is_response_type_allowed(&self, response_type: ResponseType) -> bool {
        self.allowed_response_types.contains(&response_type)
    }

    /// Returns `true` if the grant type is allowed.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.allowed_grant_types.contains(&grant_type)
    }

    /// Restricts the allowed response types.
    #[must_use]
    pub fn with_response_types(mut self, response_types: Vec<ResponseType>) -> Self {
        self.allowed_response_types = response_types;
        self
    }

    /// Restricts the allowed grant types.
    #[must_use]
    pub fn with_grant_types(mut self, grant_types: Vec<GrantType>) -> Self {
        self.allowed_grant_types = grant_types;
        self
    }

    /// Accepts token requests sent with GET.
    #[must_use]
    pub fn allow_get_access_request(mut self) -> Self {
        self.allow_get_access_request = true;
        self
    }
}
