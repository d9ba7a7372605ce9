//! Token endpoint.
//!
//! Successful and failed token requests are both answered with a JSON body
//! and the cache headers of RFC 6749 section 5.1.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::service::AuthorizationServer;
use crate::request::OAuthRequest;

const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Renders a token endpoint JSON response.
///
/// `extra` headers are applied last and replace the defaults.
fn token_response(
    data: Map<String, Value>,
    status: StatusCode,
    extra: &HeaderMap,
) -> Response {
    let mut response = (status, Json(Value::Object(data))).into_response();

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }

    response
}

impl AuthorizationServer {
    /// Handles a token endpoint request.
    ///
    /// # Errors
    ///
    /// Only [`AuthError::NoPermission`] is returned; every other failure is
    /// rendered as an OAuth 2.0 error response.
    pub async fn handle_token_request(&self, request: &OAuthRequest) -> AuthResult<Response> {
        let (grant_type, tgr) = match self.validate_token_request(request).await {
            Ok(validated) => validated,
            Err(err) if err.is_no_permission() => return Err(err),
            Err(err) => {
                warn!(error = %err, "Token request validation failed");
                return Ok(self.token_error(&err));
            }
        };

        match self.get_access_token(grant_type, &tgr).await {
            Ok(token) => {
                info!(
                    client_id = %tgr.client_id,
                    grant_type = %grant_type,
                    "Token issued"
                );
                let data = self.build_token_data(token.as_ref());
                Ok(token_response(data, StatusCode::OK, &HeaderMap::new()))
            }
            Err(err) => {
                warn!(
                    client_id = %tgr.client_id,
                    grant_type = %grant_type,
                    error = %err,
                    "Token request failed"
                );
                Ok(self.token_error(&err))
            }
        }
    }

    fn token_error(&self, err: &AuthError) -> Response {
        let response = self.build_error_response(err);
        token_response(response.fields(), response.status(), &response.headers)
    }
}

/// Axum handler for the token endpoint.
pub async fn token_handler(
    State(server): State<Arc<AuthorizationServer>>,
    request: OAuthRequest,
) -> Response {
    match server.handle_token_request(&request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::Method;
    use axum::http::header::AUTHORIZATION;
    use base64::{Engine, engine::general_purpose::STANDARD};

    use super::*;
    use crate::error::ErrorKind;
    use crate::handlers::Handlers;
    use crate::oauth::error_response::ErrorResponse;
    use crate::test_support::{MockManager, MockToken};

    fn token_request(grant_type: &str) -> OAuthRequest {
        let encoded = STANDARD.encode("c1:secret");
        OAuthRequest::new(Method::POST)
            .with_header(AUTHORIZATION, &format!("Basic {encoded}"))
            .with_param("grant_type", grant_type)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_token_headers(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(headers[header::PRAGMA], "no-cache");
    }

    #[tokio::test]
    async fn test_client_credentials_success() {
        let manager = Arc::new(MockManager::new());
        manager.set_access_token(MockToken::access("tok1", 3600).with_scope("read"));
        let server = AuthorizationServer::new(Default::default(), manager, Handlers::default());

        let response = server
            .handle_token_request(&token_request("client_credentials").with_param("scope", "read"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_token_headers(&response);

        let body = body_json(response).await;
        assert_eq!(body["access_token"], "tok1");
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 3600);
        assert_eq!(body["scope"], "read");
        assert!(body.get("refresh_token").is_none());
    }

    #[tokio::test]
    async fn test_validation_error_rendered() {
        let server = AuthorizationServer::with_defaults(Arc::new(MockManager::new()));

        let response = server
            .handle_token_request(&token_request("authorization_code"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_token_headers(&response);

        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_request");
        assert!(body["error_description"].is_string());
    }

    #[tokio::test]
    async fn test_dispatch_error_rendered() {
        let manager = Arc::new(MockManager::new());
        manager.fail_with(ErrorKind::InvalidAuthorizeCode);
        let server = AuthorizationServer::new(Default::default(), manager, Handlers::default());

        let request = token_request("authorization_code")
            .with_param("code", "used")
            .with_param("redirect_uri", "https://app/cb");
        let response = server.handle_token_request(&request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "invalid_grant");
    }

    #[tokio::test]
    async fn test_no_permission_is_returned() {
        let handlers = Handlers::default()
            .with_password_authorization(|_: &str, _: &str| -> AuthResult<Option<String>> {
                Ok(Some("u1".to_string()))
            })
            .with_user_permission(|_: &str, _: &str| -> AuthResult<()> {
                Err(AuthError::no_permission())
            });
        let server = AuthorizationServer::new(Default::default(), Arc::new(MockManager::new()), handlers);

        let request = token_request("password")
            .with_param("username", "alice")
            .with_param("password", "wonderland");
        let err = server.handle_token_request(&request).await.unwrap_err();
        assert!(err.is_no_permission());
    }

    #[tokio::test]
    async fn test_error_headers_override_defaults() {
        let handlers = Handlers::default().with_response_error(|response: &mut ErrorResponse| {
            response
                .headers
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("private"));
            response
                .headers
                .insert("x-request-id", HeaderValue::from_static("r-1"));
        });
        let server = AuthorizationServer::new(Default::default(), Arc::new(MockManager::new()), handlers);

        let response = server
            .handle_token_request(&token_request(""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "private");
        assert_eq!(response.headers()["x-request-id"], "r-1");
        assert_eq!(body_json(response).await["error"], "unsupported_grant_type");
    }
}
