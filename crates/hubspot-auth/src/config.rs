//! Client configuration injected into the flow

use common::Secret;

use crate::constants::{AUTHORIZE_ENDPOINT, DEFAULT_SCOPE, TOKEN_ENDPOINT};

/// Registered HubSpot app settings plus endpoint overrides.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// Must match the redirect URL registered for the app
    pub redirect_uri: String,
    pub scope: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    /// Compare the nonce in the returned state against the stored record.
    /// Off by default: the callback only checks that a record exists.
    pub verify_state_nonce: bool,
}

impl OAuthConfig {
    /// Config with HubSpot's production endpoints and the contacts read scope.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Secret<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_owned(),
            authorize_endpoint: AUTHORIZE_ENDPOINT.to_owned(),
            token_endpoint: TOKEN_ENDPOINT.to_owned(),
            verify_state_nonce: false,
        }
    }
}
