//! Authentication state and credential handling.
//!
//! The client supports two independent modes: a long-lived API key attached as
//! a query parameter (or body field) where an endpoint's policy asks for it,
//! and a short-lived session token established by credential login and replayed
//! as a cookie. The session token is stored and attached manually; reqwest's
//! automatic cookie jar is never enabled, so this store is the single
//! authoritative session mechanism.

/// Cookie name the service uses for its session token.
pub const SESSION_COOKIE: &str = "jwt";

/// How a caller wants to authenticate.
///
/// `ApiKey` is stored locally without any validation round-trip;
/// `EmailPassword` performs a login call and lets the transport capture the
/// resulting session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    EmailPassword { email: String, password: String },
}

/// The current credential pair. Both fields are independently optional; the
/// server rejects calls that arrive with neither where one is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub api_key: Option<String>,
    pub session_token: Option<String>,
}

/// Pulls the session token out of a `Set-Cookie` header value: the substring
/// between `jwt=` and the next `;` (or the end of the header).
pub(crate) fn extract_session_token(header: &str) -> Option<&str> {
    let start = header.find(&format!("{SESSION_COOKIE}="))? + SESSION_COOKIE.len() + 1;
    let rest = &header[start..];
    Some(rest.split(';').next().unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_extracted_up_to_the_next_semicolon() {
        assert_eq!(
            extract_session_token("jwt=XYZ123;Path=/"),
            Some("XYZ123")
        );
    }

    #[test]
    fn token_without_attributes_extracts_whole_value() {
        assert_eq!(extract_session_token("jwt=abc"), Some("abc"));
    }

    #[test]
    fn unrelated_cookie_yields_nothing() {
        assert_eq!(extract_session_token("theme=dark;Path=/"), None);
    }

    #[test]
    fn token_after_other_cookies_is_still_found() {
        assert_eq!(
            extract_session_token("theme=dark; jwt=tok42; HttpOnly"),
            Some("tok42")
        );
    }
}
