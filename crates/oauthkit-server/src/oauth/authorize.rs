//! Authorization endpoint request validation and token dispatch.
//!
//! Supports the authorization code flow (`response_type=code`) and the
//! implicit flow (`response_type=token`).

use std::time::Duration;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::AuthResult;
use crate::error::{AuthError, ErrorKind};
use crate::oauth::service::AuthorizationServer;
use crate::oauth::token::TokenGenerateRequest;
use crate::request::OAuthRequest;
use crate::types::{ResponseType, TokenInfo};

/// A validated authorization request.
///
/// Field values are copied from the request parameters without
/// normalization. `user_id` is filled in after user authorization.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest<'r> {
    /// Requested response type.
    pub response_type: ResponseType,
    /// Requesting client.
    pub client_id: String,
    /// Redirect target; empty means the client's default domain.
    pub redirect_uri: String,
    /// Opaque client state echoed back on redirect.
    pub state: String,
    /// Requested scope.
    pub scope: String,
    /// Authorizing resource owner.
    pub user_id: String,
    /// Access token lifetime override.
    pub access_token_exp: Option<Duration>,
    /// The originating request.
    pub request: &'r OAuthRequest,
}

impl AuthorizationServer {
    /// Validates an authorization endpoint request.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the method is not GET or POST, or `client_id`
    ///   is missing
    /// - `UnsupportedResponseType` if `response_type` is missing or unknown
    /// - `UnauthorizedClient` if the response type is not allowed
    pub fn validate_authorize_request<'r>(
        &self,
        request: &'r OAuthRequest,
    ) -> AuthResult<AuthorizeRequest<'r>> {
        let method = request.method();
        let client_id = request.form_value("client_id");
        if !(method == Method::GET || method == Method::POST) || client_id.is_empty() {
            return Err(AuthError::invalid_request());
        }

        let response_type: ResponseType = request
            .form_value("response_type")
            .parse()
            .map_err(|e| AuthError::new(ErrorKind::UnsupportedResponseType).context(format!("{e}")))?;

        if !self.check_response_type(response_type) {
            return Err(AuthError::unauthorized_client()
                .context(format!("check response type {response_type}")));
        }

        tracing::debug!(
            client_id = %client_id,
            response_type = %response_type,
            "Validated authorization request"
        );

        Ok(AuthorizeRequest {
            response_type,
            client_id: client_id.to_string(),
            redirect_uri: request.form_value("redirect_uri").to_string(),
            state: request.form_value("state").to_string(),
            scope: request.form_value("scope").to_string(),
            user_id: String::new(),
            access_token_exp: None,
            request,
        })
    }

    /// Issues the authorization code or access token for a validated and
    /// user-authorized request.
    ///
    /// # Errors
    ///
    /// - `UnauthorizedClient` if the client may not use the flow
    /// - `InvalidScope` if the client may not request the scope
    /// - Token manager errors, unchanged
    pub async fn get_authorize_token(
        &self,
        req: &AuthorizeRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>> {
        let handlers = self.handlers();

        if let Some(authorized) = &handlers.client_authorized {
            let grant_type = req.response_type.grant_type();
            match authorized.client_authorized(&req.client_id, grant_type).await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(AuthError::unauthorized_client()
                        .context(format!("client authorized for {grant_type}")));
                }
                Err(e) => {
                    tracing::debug!(client_id = %req.client_id, error = %e, "Client authorization check failed");
                    return Err(AuthError::unauthorized_client().context("client authorized"));
                }
            }
        }

        if let Some(scope_check) = &handlers.client_scope {
            if !scope_check.client_scope(&req.client_id, &req.scope).await? {
                return Err(AuthError::invalid_scope().context("client scope"));
            }
        }

        let tgr = TokenGenerateRequest {
            client_id: req.client_id.clone(),
            user_id: req.user_id.clone(),
            redirect_uri: req.redirect_uri.clone(),
            scope: req.scope.clone(),
            access_token_exp: req.access_token_exp,
            request: Some(req.request),
            ..TokenGenerateRequest::default()
        };

        self.manager()
            .generate_auth_token(req.response_type, &tgr)
            .await
    }

    /// Returns the redirect parameters for an issued authorization.
    ///
    /// The code flow returns `{code}`; the implicit flow returns the token
    /// response data.
    #[must_use]
    pub fn authorize_data(
        &self,
        response_type: ResponseType,
        token: &dyn TokenInfo,
    ) -> Map<String, Value> {
        match response_type {
            ResponseType::Code => {
                let mut data = Map::new();
                data.insert("code".into(), Value::from(token.code()));
                data
            }
            ResponseType::Token => self.build_token_data(token),
        }
    }
}
