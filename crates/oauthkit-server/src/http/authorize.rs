//! Authorization endpoint.
//!
//! Answers with a `302 Found` redirect back to the client, or with whatever
//! response the user authorization handler produces while the user is
//! still logging in.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::AuthResult;
use crate::error::AuthError;
use crate::handlers::UserAuthorization;
use crate::oauth::authorize::AuthorizeRequest;
use crate::oauth::service::AuthorizationServer;
use crate::request::OAuthRequest;

/// Builds a `302 Found` response.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

impl AuthorizationServer {
    /// Handles an authorization endpoint request.
    ///
    /// # Errors
    ///
    /// Returns the error itself when no redirect is possible: validation
    /// failures, scope and lifetime handler failures, and redirect URI
    /// failures. Authorization failures after validation are delivered to
    /// the client as error redirects.
    pub async fn handle_authorize_request(&self, request: &OAuthRequest) -> AuthResult<Response> {
        let mut req = self.validate_authorize_request(request)?;

        match self.handlers().user_authorization.authorize_user(request).await {
            Ok(UserAuthorization::Authorized(user_id)) if user_id.is_empty() => {
                let err = AuthError::access_denied().context("empty user id");
                return self.redirect_error(&mut req, &err).await;
            }
            Ok(UserAuthorization::Authorized(user_id)) => req.user_id = user_id,
            Ok(UserAuthorization::Pending(response)) => {
                debug!(client_id = %req.client_id, "User authorization pending");
                return Ok(response);
            }
            Err(AuthError::NoPermission { redirect }) => {
                let target = redirect.unwrap_or_else(|| self.config().no_permission_redirect.clone());
                info!(client_id = %req.client_id, "User has no permission to the app");
                return Ok(found(&format!("{target}?{}", AuthError::no_permission())));
            }
            Err(err) => return self.redirect_error(&mut req, &err).await,
        }

        if let Some(authorize_scope) = &self.handlers().authorize_scope {
            let scope = authorize_scope.authorize_scope(request).await?;
            if !scope.is_empty() {
                req.scope = scope;
            }
        }

        if let Some(token_exp) = &self.handlers().access_token_exp {
            req.access_token_exp = Some(token_exp.access_token_exp(request).await?);
        }

        let token = match self.get_authorize_token(&req).await {
            Ok(token) => token,
            Err(err) => return self.redirect_error(&mut req, &err).await,
        };

        let data = self.authorize_data(req.response_type, token.as_ref());
        self.redirect(&mut req, &data).await
    }

    async fn redirect_error(
        &self,
        req: &mut AuthorizeRequest<'_>,
        err: &AuthError,
    ) -> AuthResult<Response> {
        debug!(client_id = %req.client_id, error = %err, "Authorization request failed");
        let data = self.build_error_response(err).fields();
        self.redirect(req, &data).await
    }

    async fn redirect(
        &self,
        req: &mut AuthorizeRequest<'_>,
        data: &Map<String, Value>,
    ) -> AuthResult<Response> {
        if req.redirect_uri.is_empty() {
            let client = self.manager().get_client(&req.client_id).await?;
            info!(
                client_id = %req.client_id,
                domain = %client.domain,
                "Redirect URI not provided, using the client domain"
            );
            req.redirect_uri = client.domain;
        }

        let uri = self.build_redirect_uri(req, data)?;
        info!(redirect_uri = %uri, "Redirecting authorization response");
        Ok(found(&uri))
    }
}

/// Axum handler for the authorization endpoint.
///
/// Errors that cannot be redirected are rendered through
/// [`AuthError`]'s `IntoResponse`.
pub async fn authorize_handler(
    State(server): State<Arc<AuthorizationServer>>,
    request: OAuthRequest,
) -> Response {
    match server.handle_authorize_request(&request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::Method;

    use super::*;
    use crate::error::ErrorKind;
    use crate::handlers::Handlers;
    use crate::test_support::{MockManager, MockToken, allow_user};
    use crate::types::Client;

    fn authorize_request(response_type: &str) -> OAuthRequest {
        OAuthRequest::new(Method::GET)
            .with_param("client_id", "c1")
            .with_param("response_type", response_type)
            .with_param("redirect_uri", "https://app/cb")
            .with_param("state", "xyz")
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn server(manager: &Arc<MockManager>, handlers: Handlers) -> AuthorizationServer {
        AuthorizationServer::new(Default::default(), manager.clone(), handlers)
    }

    #[tokio::test]
    async fn test_code_flow_redirect() {
        let manager = Arc::new(MockManager::new());
        manager.set_auth_token(MockToken::code("abc123"));
        let server = server(&manager, Handlers::default().with_user_authorization(allow_user("u1")));

        let response = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "https://app/cb?code=abc123&state=xyz");
        assert_eq!(manager.last_generate_request().unwrap().user_id, "u1");
    }

    #[tokio::test]
    async fn test_token_flow_redirect() {
        let manager = Arc::new(MockManager::new());
        manager.set_auth_token(MockToken::access("tok1", 3600));
        let server = server(&manager, Handlers::default().with_user_authorization(allow_user("u1")));

        let request = authorize_request("token").with_param("state", "");
        let response = server.handle_authorize_request(&request).await.unwrap();
        assert_eq!(
            location(&response),
            "https://app/cb#access_token=tok1&expires_in=3600&token_type=Bearer"
        );
    }

    #[tokio::test]
    async fn test_validation_error_is_returned() {
        let manager = Arc::new(MockManager::new());
        let server = server(&manager, Handlers::default().with_user_authorization(allow_user("u1")));

        let request = OAuthRequest::new(Method::GET).with_param("response_type", "code");
        let err = server.handle_authorize_request(&request).await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidRequest));
    }

    #[tokio::test]
    async fn test_pending_response_passthrough() {
        let manager = Arc::new(MockManager::new());
        let server = server(
            &manager,
            Handlers::default().with_user_authorization(
                |_: &OAuthRequest| -> AuthResult<UserAuthorization> {
                    Ok(UserAuthorization::Pending(found("/login")))
                },
            ),
        );

        let response = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
        assert_eq!(manager.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_permission_redirect() {
        let manager = Arc::new(MockManager::new());
        let server = server(
            &manager,
            Handlers::default().with_user_authorization(
                |_: &OAuthRequest| -> AuthResult<UserAuthorization> { Err(AuthError::no_permission()) },
            ),
        );

        let response = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/ui/403?no permission to the app");
    }

    #[tokio::test]
    async fn test_no_permission_redirect_override() {
        let manager = Arc::new(MockManager::new());
        let server = server(
            &manager,
            Handlers::default().with_user_authorization(
                |_: &OAuthRequest| -> AuthResult<UserAuthorization> {
                    Err(AuthError::no_permission_redirect("/portal/denied"))
                },
            ),
        );

        let response = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/portal/denied?no permission to the app");
    }

    #[tokio::test]
    async fn test_user_denied_redirects_error() {
        let manager = Arc::new(MockManager::new());
        let server = server(&manager, Handlers::default());

        let response = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap();
        let location = location(&response);
        assert!(location.starts_with("https://app/cb?error=access_denied&error_description="));
        assert!(location.ends_with("&state=xyz"));
    }

    #[tokio::test]
    async fn test_empty_user_id_is_denied() {
        let manager = Arc::new(MockManager::new());
        manager.set_auth_token(MockToken::code("abc123"));
        let server = server(&manager, Handlers::default().with_user_authorization(allow_user("")));

        let response = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(location(&response).starts_with("https://app/cb?error=access_denied"));
        assert_eq!(manager.call_count(), 0);
        assert!(manager.last_generate_request().is_none());
    }

    #[tokio::test]
    async fn test_control_characters_in_redirect_uri() {
        let manager = Arc::new(MockManager::new());
        manager.set_auth_token(MockToken::code("abc123"));
        let server = server(&manager, Handlers::default().with_user_authorization(allow_user("u1")));

        let request = authorize_request("code").with_param("redirect_uri", "https://app/spa#/cb\n");
        let err = server.handle_authorize_request(&request).await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidRequest));
    }

    #[tokio::test]
    async fn test_scope_and_exp_overrides() {
        let manager = Arc::new(MockManager::new());
        manager.set_auth_token(MockToken::code("abc123"));
        let handlers = Handlers::default()
            .with_user_authorization(allow_user("u1"))
            .with_authorize_scope(|_: &OAuthRequest| -> AuthResult<String> { Ok("read".to_string()) })
            .with_access_token_exp(|_: &OAuthRequest| -> AuthResult<Duration> {
                Ok(Duration::from_secs(120))
            });
        let server = server(&manager, handlers);

        server
            .handle_authorize_request(&authorize_request("code").with_param("scope", "write"))
            .await
            .unwrap();
        let recorded = manager.last_generate_request().unwrap();
        assert_eq!(recorded.scope, "read");
        assert_eq!(recorded.access_token_exp, Some(Duration::from_secs(120)));
    }

    #[tokio::test]
    async fn test_scope_handler_error_is_returned() {
        let manager = Arc::new(MockManager::new());
        let handlers = Handlers::default()
            .with_user_authorization(allow_user("u1"))
            .with_authorize_scope(|_: &OAuthRequest| -> AuthResult<String> {
                Err(AuthError::internal("consent store down"))
            });
        let server = server(&manager, handlers);

        let err = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal { .. }));
        assert_eq!(manager.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_error_redirects() {
        let manager = Arc::new(MockManager::new());
        let handlers = Handlers::default()
            .with_user_authorization(allow_user("u1"))
            .with_client_scope(|_: &str, _: &str| -> AuthResult<bool> { Ok(false) });
        let server = server(&manager, handlers);

        let response = server
            .handle_authorize_request(&authorize_request("code"))
            .await
            .unwrap();
        assert!(location(&response).starts_with("https://app/cb?error=invalid_scope"));
    }

    #[tokio::test]
    async fn test_default_domain_fallback() {
        let manager = Arc::new(MockManager::new());
        manager.insert_client(Client::new("c1", "https://client.example.com/home"));
        manager.set_auth_token(MockToken::code("abc123"));
        let server = server(&manager, Handlers::default().with_user_authorization(allow_user("u1")));

        let request = authorize_request("code").with_param("redirect_uri", "");
        let response = server.handle_authorize_request(&request).await.unwrap();
        assert_eq!(
            location(&response),
            "https://client.example.com/home?code=abc123&state=xyz"
        );
    }

    #[tokio::test]
    async fn test_default_domain_unknown_client() {
        let manager = Arc::new(MockManager::new());
        manager.set_auth_token(MockToken::code("abc123"));
        let server = server(&manager, Handlers::default().with_user_authorization(allow_user("u1")));

        let request = authorize_request("code").with_param("redirect_uri", "");
        let err = server.handle_authorize_request(&request).await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidClient));
    }
}
