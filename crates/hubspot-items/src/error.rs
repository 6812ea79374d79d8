//! Error types for item loading

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Access token missing")]
    MissingAccessToken,

    #[error("invalid credentials: {0}")]
    CredentialParse(String),

    /// Non-success response from the contacts endpoint; carries its body
    #[error("HubSpot API error: {0}")]
    Api(String),

    #[error("invalid contacts response: {0}")]
    InvalidResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl Error {
    /// Whether the failure was caused by the request rather than by infrastructure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Http(_))
    }
}

/// Result alias for item loading.
pub type Result<T> = std::result::Result<T, Error>;
