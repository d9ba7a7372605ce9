//! Inbound request view used by validators and collaborators.
//!
//! [`OAuthRequest`] captures what the engine reads from an HTTP request: the
//! method, the headers, and the merged form parameters. Form-encoded body
//! parameters take precedence over query parameters, and the first value of
//! a repeated key wins.

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Request},
    http::{
        HeaderMap, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE, HeaderName},
        request::Parts,
    },
};
use base64::{Engine, engine::general_purpose::STANDARD};
use url::form_urlencoded;

use crate::error::AuthError;

/// Largest request body read by the extractor.
const MAX_FORM_BYTES: usize = 64 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An inbound authorization, token, or resource request.
#[derive(Debug, Clone, Default)]
pub struct OAuthRequest {
    method: Method,
    headers: HeaderMap,
    form: HashMap<String, String>,
}

impl OAuthRequest {
    /// Creates an empty request with the given method.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Builds the request from HTTP parts and a raw body.
    ///
    /// The body is only parsed for POST, PUT and PATCH requests with a
    /// form-urlencoded content type.
    #[must_use]
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let mut form = HashMap::new();

        if has_form_body(&parts.method, &parts.headers) {
            for (key, value) in form_urlencoded::parse(body) {
                form.entry(key.into_owned()).or_insert_with(|| value.into_owned());
            }
        }

        if let Some(query) = parts.uri.query() {
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                form.entry(key.into_owned()).or_insert_with(|| value.into_owned());
            }
        }

        Self {
            method: parts.method.clone(),
            headers: parts.headers.clone(),
            form,
        }
    }

    /// Sets a header. Values that are not valid header values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets a form parameter, replacing any existing value.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a form parameter, or an empty string when it is absent.
    #[must_use]
    pub fn form_value(&self, key: &str) -> &str {
        self.form.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Returns the HTTP Basic credentials from the `Authorization` header.
    #[must_use]
    pub fn basic_auth(&self) -> Option<(String, String)> {
        self.header(AUTHORIZATION).and_then(parse_basic_auth)
    }
}

fn has_form_body(method: &Method, headers: &HeaderMap) -> bool {
    let body_method = *method == Method::POST || *method == Method::PUT || *method == Method::PATCH;
    body_method
        && headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE))
}

/// Parses "Basic <base64(id:secret)>".
fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let credentials = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(credentials.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, secret) = decoded.split_once(':')?;
    Some((id.to_string(), secret.to_string()))
}

impl<S> FromRequest<S> for OAuthRequest
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let body = axum::body::to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|e| AuthError::invalid_request().context(format!("read request body: {e}")))?;

        Ok(Self::from_parts(&parts, &body))
    }
}
