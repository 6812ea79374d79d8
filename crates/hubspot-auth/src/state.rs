//! Anti-forgery state token
//!
//! The state payload `{state, user_id, org_id}` travels twice: serialized as
//! JSON into the store under a key derived from `(org_id, user_id)`, and
//! base64url-encoded into the `state` query parameter of the authorization
//! URL. HubSpot echoes the parameter back on the callback, which decodes it
//! to find the store key again.

use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{
    GeneralPurpose, GeneralPurposeConfig, URL_SAFE, URL_SAFE_NO_PAD,
};
use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::config::OAuthConfig;
use crate::error::{Error, Result};

/// Accepts the parameter with or without `=` padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Bytes of entropy in each nonce.
const NONCE_BYTES: usize = 32;

/// State record stored server-side and round-tripped through the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePayload {
    /// Random nonce
    #[serde(rename = "state")]
    pub nonce: String,
    pub user_id: String,
    pub org_id: String,
}

impl StatePayload {
    /// Fresh payload with a random nonce.
    pub fn new(user_id: &str, org_id: &str) -> Self {
        Self {
            nonce: generate_nonce(),
            user_id: user_id.to_owned(),
            org_id: org_id.to_owned(),
        }
    }

    /// JSON form written to the store.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::InvalidState(format!("serializing state: {e}")))
    }

    /// Parse the JSON form read back from the store.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidState(format!("stored state: {e}")))
    }

    /// Opaque `state` query parameter: base64url of the JSON form.
    pub fn encode(&self) -> Result<String> {
        Ok(URL_SAFE.encode(self.to_json()?))
    }

    /// Reverse of `encode`.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = URL_SAFE_LENIENT
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidState(format!("not base64url: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidState(format!("not a state payload: {e}")))
    }
}

/// Generate a cryptographically random nonce, URL-safe base64 without padding.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the HubSpot authorization URL carrying `encoded_state`.
pub fn build_authorization_url(config: &OAuthConfig, encoded_state: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&scope={}&state={}",
        config.authorize_endpoint,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&config.scope),
        urlencoding::encode(encoded_state),
    )
}
