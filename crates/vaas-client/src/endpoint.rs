//! Static per-operation request metadata.
//!
//! Each remote operation is described by one `Endpoint` const: HTTP method,
//! path template, and whether the stored API key is auto-attached as an
//! `apiKey` query parameter. One dispatch routine in the transport evaluates
//! the policy uniformly for every operation.

use reqwest::Method;

#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub method: Method,
    /// Path template; `{name}` tokens are substituted by `fill_path`.
    pub path: &'static str,
    /// Attach the stored API key as an `apiKey` query parameter.
    pub attach_api_key: bool,
}

macro_rules! endpoint {
    ($name:ident, $method:ident, $path:literal, $attach:literal) => {
        pub(crate) const $name: Endpoint = Endpoint {
            method: Method::$method,
            path: $path,
            attach_api_key: $attach,
        };
    };
}

endpoint!(HELLO, GET, "/api/hello", false);
endpoint!(LOGIN, POST, "/api/auth/login", false);
endpoint!(LOGIN_JWT, GET, "/api/auth/login-jwt", false);
endpoint!(REGISTER, POST, "/api/auth/register", false);
endpoint!(VERIFY, GET, "/api/auth/verify", false);
endpoint!(REQUEST_VERIFY, GET, "/api/auth/request-verify", false);
endpoint!(LOGOUT, GET, "/api/auth/logout", false);
endpoint!(GET_API_KEY, GET, "/api/auth/key", false);
endpoint!(GET_NEW_API_KEY, GET, "/api/auth/new-key", false);
endpoint!(GET_VARIABLE, GET, "/api/var/{id}", true);
endpoint!(UPDATE_VARIABLE, PATCH, "/api/var/{id}", false);
endpoint!(DELETE_VARIABLE, DELETE, "/api/var/{id}", true);
endpoint!(CREATE_VARIABLE, POST, "/api/var/create", false);
endpoint!(GET_USER, GET, "/api/user/{id}", false);
endpoint!(UPDATE_USER, PATCH, "/api/user/{id}", false);
endpoint!(DELETE_USER, DELETE, "/api/user/{id}", false);
endpoint!(GET_USER_QUOTA, GET, "/api/user/{id}/quota", false);
endpoint!(GET_USER_USAGE, GET, "/api/user/{id}/usage", false);
endpoint!(GET_USER_VARIABLES, GET, "/api/user/{id}/variables", false);
endpoint!(STRIPE_CHECKOUT, POST, "/stripe/checkout", false);

/// Substitutes each `(name, value)` pair into its `{name}` token, exactly
/// once per declared parameter.
#[must_use]
pub(crate) fn fill_path(template: &str, params: &[(&str, String)]) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replacen(&format!("{{{name}}}"), value, 1);
    }
    path
}

/// Joins the defined pairs as `name=value` with `&`, in declaration order.
/// Values are not percent-encoded (the service has never specified an
/// encoding) and so must already be transport-safe.
#[must_use]
pub(crate) fn query_string(pairs: &[(&str, Option<String>)]) -> String {
    pairs
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|value| format!("{name}={value}")))
        .collect::<Vec<_>>()
        .join("&")
}
