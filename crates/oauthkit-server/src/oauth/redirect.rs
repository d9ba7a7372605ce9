//! Redirect URI construction for authorization responses.
//!
//! The code flow returns its parameters in the query component, the implicit
//! flow in the fragment (RFC 6749 sections 4.1.2 and 4.2.2). Parameters are
//! serialized sorted by key.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};
use url::{Url, form_urlencoded};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::authorize::AuthorizeRequest;
use crate::oauth::service::AuthorizationServer;
use crate::types::ResponseType;

/// Characters escaped in the implicit flow fragment. Sub-delimiters and
/// `:/?@` stay literal so `k=v&k=v` keeps its shape.
const FRAGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'!')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Multi-valued parameters, ordered by key.
#[derive(Debug, Default)]
struct Params(BTreeMap<String, Vec<String>>);

impl Params {
    fn from_query(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            params
                .0
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        params
    }

    fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), vec![value]);
    }

    /// Form-urlencoded, sorted by key.
    fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.0 {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// `k=v&...` with only fragment-unsafe characters escaped.
    fn encode_fragment(&self) -> String {
        let joined = self
            .0
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| format!("{key}={value}")))
            .collect::<Vec<_>>()
            .join("&");
        utf8_percent_encode(&joined, FRAGMENT_SET).to_string()
    }
}

/// Renders a response value as a parameter string.
fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl AuthorizationServer {
    /// Builds the redirect URI carrying `data` back to the client.
    ///
    /// `state` is added when present. When the registered redirect URI
    /// already contains a fragment, existing query parameters are dropped
    /// and code flow parameters are appended after the raw URI.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RedirectUri`] if the redirect URI is not an
    /// absolute URI, or `InvalidRequest` if it contains control characters.
    pub fn build_redirect_uri(
        &self,
        req: &AuthorizeRequest<'_>,
        data: &Map<String, Value>,
    ) -> AuthResult<String> {
        // The URL parser silently drops tabs and newlines, but the raw string
        // can still end up in a Location header.
        if req.redirect_uri.chars().any(|c| c.is_control()) {
            return Err(
                AuthError::invalid_request().context("redirect uri contains control characters")
            );
        }

        let mut url = Url::parse(&req.redirect_uri)?;
        let has_fragment = req.redirect_uri.contains('#');

        let mut params = if has_fragment {
            Params::default()
        } else {
            Params::from_query(&url)
        };

        if !req.state.is_empty() {
            params.set("state", req.state.clone());
        }
        for (key, value) in data {
            params.set(key, param_value(value));
        }

        match req.response_type {
            ResponseType::Code => {
                let encoded = params.encode();
                if has_fragment {
                    return Ok(format!("{}?{encoded}", req.redirect_uri));
                }
                if encoded.is_empty() {
                    url.set_query(None);
                } else {
                    url.set_query(Some(&encoded));
                }
            }
            ResponseType::Token => {
                url.set_query(None);
                url.set_fragment(Some(&params.encode_fragment()));
            }
        }

        Ok(url.into())
    }
}
