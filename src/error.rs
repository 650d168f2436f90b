use std::fmt;

/// Error types that can occur when talking to GIF or language-model providers.
#[derive(Debug)]
pub enum HeyMemeError {
    /// HTTP request/response errors
    HttpError(String),
    /// Missing or rejected credentials
    AuthError(String),
    /// Invalid request parameters or format
    InvalidRequest(String),
    /// Errors returned by an upstream provider
    ProviderError(String),
    /// Quota or rate-limit signal from a provider (HTTP 429, RESOURCE_EXHAUSTED)
    RateLimited(String),
    /// JSON serialization/deserialization errors
    JsonError(String),
    /// Catch-all for everything else
    Generic(String),
}

impl HeyMemeError {
    /// Whether this failure class may trigger the automatic provider failover.
    ///
    /// Transport, provider and quota failures fail over to the secondary
    /// provider when one is configured. Credential and request-shape errors
    /// are terminal for the operation.
    pub fn is_failover_eligible(&self) -> bool {
        match self {
            HeyMemeError::HttpError(_)
            | HeyMemeError::ProviderError(_)
            | HeyMemeError::RateLimited(_)
            | HeyMemeError::JsonError(_)
            | HeyMemeError::Generic(_) => true,
            HeyMemeError::AuthError(_) | HeyMemeError::InvalidRequest(_) => false,
        }
    }

    /// Whether this error is a quota/rate-limit signal.
    pub fn is_quota(&self) -> bool {
        matches!(self, HeyMemeError::RateLimited(_))
    }
}

impl fmt::Display for HeyMemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeyMemeError::HttpError(e) => write!(f, "HTTP Error: {}", e),
            HeyMemeError::AuthError(e) => write!(f, "Auth Error: {}", e),
            HeyMemeError::InvalidRequest(e) => write!(f, "Invalid Request: {}", e),
            HeyMemeError::ProviderError(e) => write!(f, "Provider Error: {}", e),
            HeyMemeError::RateLimited(e) => write!(f, "Rate Limited: {}", e),
            HeyMemeError::JsonError(e) => write!(f, "JSON Parse Error: {}", e),
            HeyMemeError::Generic(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HeyMemeError {}

/// Converts reqwest HTTP errors, mapping 429 onto the rate-limit class.
impl From<reqwest::Error> for HeyMemeError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            HeyMemeError::RateLimited(err.to_string())
        } else {
            HeyMemeError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HeyMemeError {
    fn from(err: serde_json::Error) -> Self {
        HeyMemeError::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failover_classification() {
        assert!(HeyMemeError::HttpError("timeout".into()).is_failover_eligible());
        assert!(HeyMemeError::RateLimited("429".into()).is_failover_eligible());
        assert!(HeyMemeError::ProviderError("no candidates".into()).is_failover_eligible());
        assert!(!HeyMemeError::AuthError("bad key".into()).is_failover_eligible());
        assert!(!HeyMemeError::InvalidRequest("bad body".into()).is_failover_eligible());
    }

    #[test]
    fn quota_flag() {
        assert!(HeyMemeError::RateLimited("RESOURCE_EXHAUSTED".into()).is_quota());
        assert!(!HeyMemeError::HttpError("503".into()).is_quota());
    }
}
