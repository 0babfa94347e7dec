//! Generic request dispatch.
//!
//! One routine turns an `Endpoint` plus arguments into an HTTP call: path
//! substitution, policy-driven query assembly, manual session-cookie attach
//! and capture, envelope decoding, and total error normalization. No retry
//! and no per-request timeout; a call that never answers stalls only itself.

use std::sync::{Mutex, PoisonError};

use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::auth::{AuthState, SESSION_COOKIE, extract_session_token};
use crate::endpoint::{Endpoint, fill_path, query_string};
use crate::error::{ApiError, ApiResult};
use crate::types::decode_envelope;

pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    auth: Mutex<AuthState>,
}

impl Transport {
    pub(crate) fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            auth: Mutex::new(AuthState {
                api_key,
                session_token: None,
            }),
        }
    }

    pub(crate) fn api_key(&self) -> Option<String> {
        self.lock_auth().api_key.clone()
    }

    pub(crate) fn session_token(&self) -> Option<String> {
        self.lock_auth().session_token.clone()
    }

    pub(crate) fn set_api_key(&self, api_key: String) {
        self.lock_auth().api_key = Some(api_key);
    }

    pub(crate) fn clear_session_token(&self) {
        self.lock_auth().session_token = None;
    }

    /// Executes one call described by `endpoint`. Query pairs are attached in
    /// declaration order, with the stored API key appended last when the
    /// endpoint's policy asks for it.
    pub(crate) async fn execute<T, B>(
        &self,
        endpoint: &Endpoint,
        path_params: &[(&str, String)],
        query: &[(&str, Option<String>)],
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let path = fill_path(endpoint.path, path_params);

        let (api_key, session_token) = {
            let auth = self.lock_auth();
            (auth.api_key.clone(), auth.session_token.clone())
        };

        let mut pairs = query.to_vec();
        if endpoint.attach_api_key {
            pairs.push(("apiKey", api_key));
        }
        let query = query_string(&pairs);

        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let json = match body {
            Some(body) => Some(
                serde_json::to_string(body)
                    .map_err(|error| ApiError::Encode(error.to_string()))?,
            ),
            None => None,
        };

        tracing::debug!(method = %endpoint.method, %url, "dispatching request");

        let mut request = self
            .http
            .request(endpoint.method.clone(), url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()));
        if let Some(token) = session_token {
            request = request.header(COOKIE, format!("{SESSION_COOKIE}={token}"));
        }
        if let Some(json) = json {
            request = request.body(json);
        }

        let response = request
            .send()
            .await
            .map_err(|error| ApiError::Request(error.to_string()))?;

        self.capture_session_token(&response);

        let bytes = response
            .bytes()
            .await
            .map_err(|error| ApiError::Request(error.to_string()))?;

        decode_envelope(&bytes)
    }

    /// The sole mechanism that populates the session token after credential
    /// login: any `Set-Cookie` carrying the session cookie overwrites the
    /// stored value.
    fn capture_session_token(&self, response: &reqwest::Response) {
        for header in response.headers().get_all(SET_COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            if let Some(token) = extract_session_token(header) {
                tracing::debug!("captured session token from response");
                self.lock_auth().session_token = Some(token.to_string());
            }
        }
    }

    fn lock_auth(&self) -> std::sync::MutexGuard<'_, AuthState> {
        self.auth.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> Transport {
        Transport::new("http://127.0.0.1:1".to_string(), Some("k1".to_string()))
    }

    #[test]
    fn stored_api_key_is_readable_and_replaceable() {
        let transport = transport();
        assert_eq!(transport.api_key(), Some("k1".to_string()));

        transport.set_api_key("k2".to_string());
        assert_eq!(transport.api_key(), Some("k2".to_string()));
    }

    #[test]
    fn session_token_starts_unset_and_clears_idempotently() {
        let transport = transport();
        assert_eq!(transport.session_token(), None);

        transport.clear_session_token();
        assert_eq!(transport.session_token(), None);
    }
}
