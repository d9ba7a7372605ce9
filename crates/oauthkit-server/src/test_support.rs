//! In-memory token manager and helpers for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;
use crate::config::ServerConfig;
use crate::error::{AuthError, ErrorKind};
use crate::handlers::{Handlers, UserAuthorization};
use crate::manager::TokenManager;
use crate::oauth::service::AuthorizationServer;
use crate::oauth::token::TokenGenerateRequest;
use crate::request::OAuthRequest;
use crate::types::{Client, GrantType, ResponseType, TokenInfo};

#[derive(Debug, Clone, Default)]
pub struct MockToken {
    pub client_id: String,
    pub user_id: String,
    pub scope: String,
    pub code: String,
    pub access: String,
    pub expires_in: Duration,
    pub refresh: String,
}

impl MockToken {
    pub fn code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..Self::default()
        }
    }

    pub fn access(access: &str, expires_in_secs: u64) -> Self {
        Self {
            access: access.to_string(),
            expires_in: Duration::from_secs(expires_in_secs),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }

    pub fn with_refresh(mut self, refresh: &str) -> Self {
        self.refresh = refresh.to_string();
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }
}

impl TokenInfo for MockToken {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn scope(&self) -> &str {
        &self.scope
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn access(&self) -> &str {
        &self.access
    }

    fn access_expires_in(&self) -> Duration {
        self.expires_in
    }

    fn refresh(&self) -> &str {
        &self.refresh
    }
}

/// Owned copy of a [`TokenGenerateRequest`] seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub client_id: String,
    pub client_secret: String,
    pub user_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub code: String,
    pub refresh: String,
    pub access_token_exp: Option<Duration>,
}

impl From<&TokenGenerateRequest<'_>> for RecordedRequest {
    fn from(tgr: &TokenGenerateRequest<'_>) -> Self {
        Self {
            client_id: tgr.client_id.clone(),
            client_secret: tgr.client_secret.clone(),
            user_id: tgr.user_id.clone(),
            redirect_uri: tgr.redirect_uri.clone(),
            scope: tgr.scope.clone(),
            code: tgr.code.clone(),
            refresh: tgr.refresh.clone(),
            access_token_exp: tgr.access_token_exp,
        }
    }
}

#[derive(Default)]
struct MockState {
    clients: HashMap<String, Client>,
    access_tokens: HashMap<String, MockToken>,
    refresh_tokens: HashMap<String, MockToken>,
    auth_token: Option<MockToken>,
    issued_token: Option<MockToken>,
    failure: Option<ErrorKind>,
    last_request: Option<RecordedRequest>,
}

/// Token manager backed by in-memory maps.
///
/// `generate_*` and `refresh_access_token` return the configured token, or
/// the configured failure when one is set.
#[derive(Default)]
pub struct MockManager {
    state: RwLock<MockState>,
    calls: AtomicUsize,
    refreshes: AtomicUsize,
}

impl MockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_client(&self, client: Client) {
        let mut state = self.state.write().unwrap();
        state.clients.insert(client.client_id.clone(), client);
    }

    pub fn insert_access_token(&self, access: &str, token: MockToken) {
        let mut state = self.state.write().unwrap();
        state.access_tokens.insert(access.to_string(), token);
    }

    pub fn insert_refresh_token(&self, refresh: &str, token: MockToken) {
        let mut state = self.state.write().unwrap();
        state.refresh_tokens.insert(refresh.to_string(), token);
    }

    pub fn set_auth_token(&self, token: MockToken) {
        self.state.write().unwrap().auth_token = Some(token);
    }

    pub fn set_access_token(&self, token: MockToken) {
        self.state.write().unwrap().issued_token = Some(token);
    }

    pub fn fail_with(&self, kind: ErrorKind) {
        self.state.write().unwrap().failure = Some(kind);
    }

    /// Number of token manager calls of any kind.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn last_generate_request(&self) -> Option<RecordedRequest> {
        self.state.read().unwrap().last_request.clone()
    }

    fn record(&self, tgr: &TokenGenerateRequest<'_>) -> Option<ErrorKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().unwrap();
        state.last_request = Some(tgr.into());
        state.failure
    }
}

fn configured(token: Option<MockToken>) -> AuthResult<Box<dyn TokenInfo>> {
    token
        .map(|t| Box::new(t) as Box<dyn TokenInfo>)
        .ok_or_else(|| AuthError::internal("no token configured"))
}

#[async_trait]
impl TokenManager for MockManager {
    async fn get_client(&self, client_id: &str) -> AuthResult<Client> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .read()
            .unwrap()
            .clients
            .get(client_id)
            .cloned()
            .ok_or_else(AuthError::invalid_client)
    }

    async fn generate_auth_token(
        &self,
        _response_type: ResponseType,
        request: &TokenGenerateRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>> {
        if let Some(kind) = self.record(request) {
            return Err(kind.into());
        }
        configured(self.state.read().unwrap().auth_token.clone())
    }

    async fn generate_access_token(
        &self,
        _grant_type: GrantType,
        request: &TokenGenerateRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>> {
        if let Some(kind) = self.record(request) {
            return Err(kind.into());
        }
        configured(self.state.read().unwrap().issued_token.clone())
    }

    async fn refresh_access_token(
        &self,
        request: &TokenGenerateRequest<'_>,
    ) -> AuthResult<Box<dyn TokenInfo>> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.record(request) {
            return Err(kind.into());
        }
        self.state
            .read()
            .unwrap()
            .issued_token
            .clone()
            .map(|t| Box::new(t) as Box<dyn TokenInfo>)
            .ok_or_else(|| ErrorKind::InvalidRefreshToken.into())
    }

    async fn load_refresh_token(&self, refresh: &str) -> AuthResult<Box<dyn TokenInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .read()
            .unwrap()
            .refresh_tokens
            .get(refresh)
            .cloned()
            .map(|t| Box::new(t) as Box<dyn TokenInfo>)
            .ok_or_else(|| ErrorKind::InvalidRefreshToken.into())
    }

    async fn load_access_token(&self, access: &str) -> AuthResult<Box<dyn TokenInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .read()
            .unwrap()
            .access_tokens
            .get(access)
            .cloned()
            .map(|t| Box::new(t) as Box<dyn TokenInfo>)
            .ok_or_else(|| ErrorKind::InvalidAccessToken.into())
    }
}

/// Server with the default configuration and an empty mock manager.
pub fn test_server(handlers: Handlers) -> AuthorizationServer {
    AuthorizationServer::new(ServerConfig::default(), Arc::new(MockManager::new()), handlers)
}

/// User authorization handler accepting every request as `user_id`.
pub fn allow_user(
    user_id: &str,
) -> impl Fn(&OAuthRequest) -> AuthResult<UserAuthorization> + Send + Sync + 'static {
    let user_id = user_id.to_string();
    move |_: &OAuthRequest| Ok(UserAuthorization::Authorized(user_id.clone()))
}
