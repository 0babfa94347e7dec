//! Typed client for the Variable-as-a-Service HTTP API.
//!
//! The service stores "variables": typed, permissioned records owned by a
//! user. This crate authenticates (API key or session token), builds and
//! issues the HTTP requests, and decodes the `{success, data|reason}`
//! envelope into [`ApiResult`] values. Every public operation resolves to a
//! result; nothing panics or leaks a foreign error type.

mod auth;
mod client;
mod endpoint;
mod error;
mod transport;
mod types;

pub use auth::{Credentials, SESSION_COOKIE};
pub use client::{ClientConfig, VaasClient};
pub use error::{ApiError, ApiResult};
pub use types::{
    ApiKeyPermissions, CheckoutLinkRequest, CreateVariableRequest, LoginRequest, PatchUserRequest,
    PatchVariableRequest, Quota, RegisterRequest, StripeProduct, User, UserType, Variable,
    VariableType, VariableVisibility,
};
