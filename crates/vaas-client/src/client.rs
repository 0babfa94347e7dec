//! The typed endpoint facade.
//!
//! Every method is a thin binding of its arguments to one endpoint const,
//! delegated to the transport. No business logic lives here beyond the
//! default-API-key folding the variable write endpoints ask for.

use serde_json::Value;

use crate::auth::Credentials;
use crate::endpoint;
use crate::error::{ApiError, ApiResult};
use crate::transport::Transport;
use crate::types::{
    CheckoutLinkRequest, CreateVariableRequest, LoginRequest, PatchUserRequest,
    PatchVariableRequest, Quota, RegisterRequest, User, Variable,
};

const NO_BODY: Option<&Value> = None;

/// Construction-time configuration: the server origin and an optional default
/// API key. Both are opaque to the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Client for the Variable-as-a-Service API.
///
/// One instance holds one credential pair; all methods take `&self` and are
/// safe to call from interleaved async tasks, though nothing serializes
/// concurrent calls at the network layer.
pub struct VaasClient {
    transport: Transport,
}

impl VaasClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            transport: Transport::new(base_url, config.api_key),
        })
    }

    /// The API key currently used for authentication.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.transport.api_key()
    }

    /// The session token currently used for authentication, if a credential
    /// login has established one.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.transport.session_token()
    }

    /// Authenticates the client.
    ///
    /// The `ApiKey` arm stores the key without a validation round-trip and
    /// returns `None`. The `EmailPassword` arm performs a login call; the
    /// session token is captured from the response as a side effect.
    pub async fn authenticate(&self, credentials: Credentials) -> ApiResult<Option<User>> {
        match credentials {
            Credentials::ApiKey(api_key) => {
                self.transport.set_api_key(api_key);
                Ok(None)
            }
            Credentials::EmailPassword { email, password } => self
                .login(&LoginRequest { email, password })
                .await
                .map(Some),
        }
    }

    /// Hello message; usable as an availability probe.
    pub async fn hello(&self) -> ApiResult<String> {
        self.transport
            .execute(&endpoint::HELLO, &[], &[], NO_BODY)
            .await
    }

    pub async fn login(&self, body: &LoginRequest) -> ApiResult<User> {
        self.transport
            .execute(&endpoint::LOGIN, &[], &[], Some(body))
            .await
    }

    /// Logs in with the stored session token alone.
    pub async fn login_jwt(&self) -> ApiResult<User> {
        self.transport
            .execute(&endpoint::LOGIN_JWT, &[], &[], NO_BODY)
            .await
    }

    pub async fn register(&self, body: &RegisterRequest) -> ApiResult<User> {
        self.transport
            .execute(&endpoint::REGISTER, &[], &[], Some(body))
            .await
    }

    /// Verifies a user's email with the code they received.
    pub async fn verify(&self, email: &str, code: &str) -> ApiResult<String> {
        self.transport
            .execute(
                &endpoint::VERIFY,
                &[],
                &[
                    ("email", Some(email.to_string())),
                    ("code", Some(code.to_string())),
                ],
                NO_BODY,
            )
            .await
    }

    /// Requests a verification email to be sent.
    pub async fn request_verify(&self, email: &str) -> ApiResult<String> {
        self.transport
            .execute(
                &endpoint::REQUEST_VERIFY,
                &[],
                &[("email", Some(email.to_string()))],
                NO_BODY,
            )
            .await
    }

    /// Logs out the current session. The local session token is dropped
    /// either way; server-side invalidation is the server's side of the call.
    pub async fn logout(&self) -> ApiResult<User> {
        let result = self
            .transport
            .execute(&endpoint::LOGOUT, &[], &[], NO_BODY)
            .await;
        self.transport.clear_session_token();
        result
    }

    pub async fn get_api_key(&self) -> ApiResult<String> {
        self.transport
            .execute(&endpoint::GET_API_KEY, &[], &[], NO_BODY)
            .await
    }

    /// Rotates and returns a fresh API key for the logged-in user.
    pub async fn get_new_api_key(&self) -> ApiResult<String> {
        self.transport
            .execute(&endpoint::GET_NEW_API_KEY, &[], &[], NO_BODY)
            .await
    }

    pub async fn get_variable(&self, id: i64) -> ApiResult<Variable> {
        self.transport
            .execute(&endpoint::GET_VARIABLE, &id_param(id), &[], NO_BODY)
            .await
    }

    /// Patches a variable. A body with no `api_key` set is sent with the
    /// client's stored default key folded in.
    pub async fn update_variable(
        &self,
        id: i64,
        mut body: PatchVariableRequest,
    ) -> ApiResult<Variable> {
        if body.api_key.is_none() {
            body.api_key = self.transport.api_key();
        }
        self.transport
            .execute(&endpoint::UPDATE_VARIABLE, &id_param(id), &[], Some(&body))
            .await
    }

    pub async fn delete_variable(&self, id: i64) -> ApiResult<Variable> {
        self.transport
            .execute(&endpoint::DELETE_VARIABLE, &id_param(id), &[], NO_BODY)
            .await
    }

    /// Creates a variable. A body with no `api_key` set is sent with the
    /// client's stored default key folded in.
    pub async fn create_variable(&self, mut body: CreateVariableRequest) -> ApiResult<Variable> {
        if body.api_key.is_none() {
            body.api_key = self.transport.api_key();
        }
        self.transport
            .execute(&endpoint::CREATE_VARIABLE, &[], &[], Some(&body))
            .await
    }

    pub async fn get_user(&self, id: i64) -> ApiResult<User> {
        self.transport
            .execute(&endpoint::GET_USER, &id_param(id), &[], NO_BODY)
            .await
    }

    pub async fn update_user(&self, id: i64, body: &PatchUserRequest) -> ApiResult<User> {
        self.transport
            .execute(&endpoint::UPDATE_USER, &id_param(id), &[], Some(body))
            .await
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<User> {
        self.transport
            .execute(&endpoint::DELETE_USER, &id_param(id), &[], NO_BODY)
            .await
    }

    /// Requests remaining in the user's current quota window.
    pub async fn get_user_quota(&self, id: i64) -> ApiResult<i64> {
        self.transport
            .execute(&endpoint::GET_USER_QUOTA, &id_param(id), &[], NO_BODY)
            .await
    }

    pub async fn get_user_usage(&self, id: i64) -> ApiResult<Vec<Quota>> {
        self.transport
            .execute(&endpoint::GET_USER_USAGE, &id_param(id), &[], NO_BODY)
            .await
    }

    /// Lists a user's variables. The server strips every value to null.
    pub async fn get_user_variables(&self, id: i64) -> ApiResult<Vec<Variable>> {
        self.transport
            .execute(&endpoint::GET_USER_VARIABLES, &id_param(id), &[], NO_BODY)
            .await
    }

    pub async fn get_stripe_checkout_link(&self, body: &CheckoutLinkRequest) -> ApiResult<String> {
        self.transport
            .execute(&endpoint::STRIPE_CHECKOUT, &[], &[], Some(body))
            .await
    }
}

fn id_param(id: i64) -> [(&'static str, String); 1] {
    [("id", id.to_string())]
}

fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ApiError::InvalidBaseUrl);
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(ApiError::InvalidBaseUrl);
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ApiError::InvalidBaseUrl);
    }
    Ok(trimmed.to_string())
}
