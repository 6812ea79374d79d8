//! Error types for the HubSpot OAuth flow
//!
//! Every variant except `Http` and `Store` is a client error: the caller
//! should restart the flow. Display strings of the provider-reported
//! variants are the provider's own text, unmodified.

/// Errors from OAuth flow operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The provider redirected back with `error=...`
    #[error("{0}")]
    ProviderDenied(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid state parameter: {0}")]
    InvalidState(String),

    #[error("State not found")]
    StateNotFound,

    #[error("State does not match")]
    StateMismatch,

    /// Non-success response from the token endpoint; carries its body
    #[error("{0}")]
    TokenExchange(String),

    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("No credentials found")]
    CredentialsNotFound,

    #[error("credential parse error: {0}")]
    CredentialParse(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("state store error: {0}")]
    Store(#[from] kv_store::Error),
}

impl Error {
    /// Whether the failure was caused by the request rather than by infrastructure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Http(_) | Error::Store(_))
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
