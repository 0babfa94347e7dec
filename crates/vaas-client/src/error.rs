use thiserror::Error;

/// Everything a facade operation can fail with. Remote logical failures keep
/// the server's reason string verbatim; local faults carry a best-effort
/// description. Nothing else ever crosses the public boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with `{success: false}`.
    #[error("{reason}")]
    Api { reason: String },
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),
    /// The request body could not be serialized to JSON.
    #[error("could not encode request body: {0}")]
    Encode(String),
    /// The response body was not a decodable envelope.
    #[error("could not decode response body: {0}")]
    Decode(String),
    #[error("base url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
}

impl ApiError {
    pub(crate) fn from_reason(reason: Option<String>) -> Self {
        ApiError::Api {
            reason: reason.unwrap_or_else(|| "request rejected without a reason".to_string()),
        }
    }

    /// The reason string of a remote `{success: false}` envelope, if that is
    /// what this error is.
    #[must_use]
    pub fn remote_reason(&self) -> Option<&str> {
        match self {
            ApiError::Api { reason } => Some(reason),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_reason_only_for_envelope_failures() {
        let remote = ApiError::from_reason(Some("no such variable".to_string()));
        assert_eq!(remote.remote_reason(), Some("no such variable"));

        let local = ApiError::Request("connection refused".to_string());
        assert_eq!(local.remote_reason(), None);
    }

    #[test]
    fn missing_reason_gets_a_fallback() {
        let error = ApiError::from_reason(None);
        assert_eq!(error.to_string(), "request rejected without a reason");
    }
}
