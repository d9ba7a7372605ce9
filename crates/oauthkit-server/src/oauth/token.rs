//! Token endpoint request validation, grant dispatch and response data.
//!
//! Supported grants:
//!
//! - `authorization_code` - exchange an authorization code
//! - `password` - resource owner password credentials
//! - `client_credentials` - client acting on its own behalf
//! - `refresh_token` - exchange a refresh token

use std::time::Duration;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::AuthResult;
use crate::error::{AuthError, ErrorKind};
use crate::oauth::service::AuthorizationServer;
use crate::request::OAuthRequest;
use crate::types::{GrantType, TokenInfo};

/// Parameters handed to the token manager to issue a code or token.
#[derive(Debug, Clone, Default)]
pub struct TokenGenerateRequest<'r> {
    /// Authenticated client.
    pub client_id: String,
    /// Client secret as presented.
    pub client_secret: String,
    /// Resource owner.
    pub user_id: String,
    /// Redirect URI (authorization code grant).
    pub redirect_uri: String,
    /// Requested scope.
    pub scope: String,
    /// Authorization code (authorization code grant).
    pub code: String,
    /// Refresh token (refresh grant).
    pub refresh: String,
    /// Access token lifetime override.
    pub access_token_exp: Option<Duration>,
    /// The originating request.
    pub request: Option<&'r OAuthRequest>,
}

/// Maps refresh token conditions to `InvalidGrant`.
fn translate_refresh_error(err: AuthError) -> AuthError {
    match err.root_kind() {
        Some(kind) if kind.is_refresh_token_error() => {
            AuthError::invalid_grant().context(err.to_string())
        }
        _ => err,
    }
}

impl AuthorizationServer {
    /// Validates a token endpoint request.
    ///
    /// Client credentials come from the client info handler. Password grant
    /// requests are authenticated here, including the optional user
    /// permission check.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for a wrong method or missing grant parameters
    /// - `UnsupportedGrantType` if `grant_type` is missing or unknown
    /// - `InvalidGrant` if the password handler returns no user
    /// - Handler errors, unchanged (including [`AuthError::NoPermission`])
    pub async fn validate_token_request<'r>(
        &self,
        request: &'r OAuthRequest,
    ) -> AuthResult<(GrantType, TokenGenerateRequest<'r>)> {
        let method = request.method();
        let get_allowed = self.config().allow_get_access_request && method == Method::GET;
        if !(method == Method::POST || get_allowed) {
            return Err(AuthError::invalid_request().context("invalid request method"));
        }

        let raw_grant = request.form_value("grant_type");
        if raw_grant.is_empty() {
            return Err(AuthError::new(ErrorKind::UnsupportedGrantType).context("no grant type"));
        }
        let grant_type: GrantType = raw_grant
            .parse()
            .map_err(|e| AuthError::new(ErrorKind::UnsupportedGrantType).context(format!("{e}")))?;

        let (client_id, client_secret) = self.handlers().client_info.client_info(request).await?;

        let mut tgr = TokenGenerateRequest {
            client_id,
            client_secret,
            request: Some(request),
            ..TokenGenerateRequest::default()
        };

        match grant_type {
            GrantType::AuthorizationCode => {
                tgr.redirect_uri = request.form_value("redirect_uri").to_string();
                tgr.code = request.form_value("code").to_string();
                if tgr.redirect_uri.is_empty() || tgr.code.is_empty() {
                    return Err(AuthError::invalid_request().context("missing redirect_uri or code"));
                }
            }
            GrantType::Password => {
                tgr.scope = request.form_value("scope").to_string();
                let username = request.form_value("username");
                let password = request.form_value("password");
                if username.is_empty() || password.is_empty() {
                    return Err(AuthError::invalid_request().context("missing username or password"));
                }

                let user_id = self
                    .handlers()
                    .password_authorization
                    .authorize_password(username, password)
                    .await?
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| AuthError::invalid_grant().context("password authorization"))?;

                if let Some(permission) = &self.handlers().user_permission {
                    permission
                        .check_user_permission(&user_id, &tgr.client_id)
                        .await?;
                }
                tgr.user_id = user_id;
            }
            GrantType::ClientCredentials => {
                tgr.scope = request.form_value("scope").to_string();
            }
            GrantType::RefreshToken => {
                tgr.refresh = request.form_value("refresh_token").to_string();
                tgr.scope = request.form_value("scope").to_string();
                if tgr.refresh.is_empty() {
                    return Err(AuthError::invalid_request().context("missing refresh_token"));
                }
            }
            GrantType::Implicit => {}
        }

        tracing::debug!(
            client_id = %tgr.client_id,
            grant_type = %grant_type,
            "Validated token request"
        );

        Ok((grant_type, tgr))
    }

    /// Dispatches a validated token request to the token manager.
    ///
    /// # Errors
    ///
    /// - `UnauthorizedClient` if the grant is not allowed or the client may
    ///   not use it
    /// - `InvalidGrant` for bad authorization codes and refresh tokens
    /// - `InvalidScope` if a scope handler refuses the scope
    /// - `UnsupportedGrantType` for the implicit grant
    /// - Other token manager and handler errors, unchanged
    pub async fn get_access_token(
        &self,
        grant_type: GrantType,
        tgr: &TokenGenerateRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>> {
        if !self.check_grant_type(grant_type) {
            return Err(
                AuthError::unauthorized_client().context(format!("check grant type {grant_type}"))
            );
        }

        let handlers = self.handlers();

        if let Some(authorized) = &handlers.client_authorized {
            let allowed = authorized
                .client_authorized(&tgr.client_id, grant_type)
                .await
                .map_err(|e| e.context("client authorized"))?;
            if !allowed {
                return Err(AuthError::unauthorized_client().context("client authorized"));
            }
        }

        match grant_type {
            GrantType::AuthorizationCode => self
                .manager()
                .generate_access_token(grant_type, tgr)
                .await
                .map_err(|err| match err.root_kind() {
                    Some(ErrorKind::InvalidAuthorizeCode) => {
                        AuthError::invalid_grant().context(err.to_string())
                    }
                    _ => err,
                }),
            GrantType::Password | GrantType::ClientCredentials => {
                if let Some(scope_check) = &handlers.client_scope {
                    if !scope_check.client_scope(&tgr.client_id, &tgr.scope).await? {
                        return Err(AuthError::invalid_scope().context("client scope"));
                    }
                }
                self.manager().generate_access_token(grant_type, tgr).await
            }
            GrantType::RefreshToken => {
                if let Some(refreshing) = handlers
                    .refreshing_scope
                    .as_ref()
                    .filter(|_| !tgr.scope.is_empty())
                {
                    let previous = self
                        .manager()
                        .load_refresh_token(&tgr.refresh)
                        .await
                        .map_err(translate_refresh_error)?;
                    if !refreshing.refreshing_scope(&tgr.scope, previous.scope()).await? {
                        return Err(AuthError::invalid_scope().context("refreshing scope"));
                    }
                }
                self.manager()
                    .refresh_access_token(tgr)
                    .await
                    .map_err(translate_refresh_error)
            }
            GrantType::Implicit => Err(AuthError::new(ErrorKind::UnsupportedGrantType)),
        }
    }

    /// Builds the token response fields for an issued token.
    ///
    /// `scope` and `refresh_token` are only present when non-empty.
    /// Extension fields never replace the core fields.
    #[must_use]
    pub fn build_token_data(&self, token: &dyn TokenInfo) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("access_token".into(), Value::from(token.access()));
        data.insert("token_type".into(), Value::from(self.config().token_type.as_str()));
        data.insert(
            "expires_in".into(),
            Value::from(token.access_expires_in().as_secs()),
        );

        if !token.scope().is_empty() {
            data.insert("scope".into(), Value::from(token.scope()));
        }
        if !token.refresh().is_empty() {
            data.insert("refresh_token".into(), Value::from(token.refresh()));
        }

        if let Some(extension) = &self.handlers().extension_fields {
            for (key, value) in extension.extension_fields(token) {
                data.entry(key).or_insert(value);
            }
        }

        data
    }
}
