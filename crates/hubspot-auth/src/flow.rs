//! The HubSpot authorization code flow over a `KvStore`
//!
//! 1. `begin_authorization` stores a state record and returns the HubSpot URL
//! 2. HubSpot redirects the popup to the callback, handled by `handle_callback`
//! 3. `fetch_credentials` hands the staged token blob to the caller, once
//!
//! Nothing is kept in process between requests; the store owns all state
//! and expires it.

use std::sync::Arc;

use kv_store::KvStore;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::OAuthConfig;
use crate::constants::{CLOSE_WINDOW_HTML, CREDENTIALS_TTL, STATE_TTL, credentials_key, state_key};
use crate::error::{Error, Result};
use crate::state::{StatePayload, build_authorization_url};
use crate::token::exchange_code;

/// Query parameters HubSpot sends to the redirect URI.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// OAuth flow handle. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct HubspotOAuth {
    config: Arc<OAuthConfig>,
    store: Arc<dyn KvStore>,
    http_client: reqwest::Client,
}

impl HubspotOAuth {
    pub fn new(
        config: OAuthConfig,
        store: Arc<dyn KvStore>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            http_client,
        }
    }

    /// Start a flow for `(user_id, org_id)` and return the URL to open in the popup.
    ///
    /// A second call for the same pair replaces the pending state record.
    #[instrument(skip(self))]
    pub async fn begin_authorization(&self, user_id: &str, org_id: &str) -> Result<String> {
        let payload = StatePayload::new(user_id, org_id);
        let encoded = payload.encode()?;

        self.store
            .put(&state_key(org_id, user_id), &payload.to_json()?, STATE_TTL)
            .await?;

        info!("authorization initiated");
        Ok(build_authorization_url(&self.config, &encoded))
    }

    /// Complete the flow from HubSpot's redirect and return the popup-closing document.
    #[instrument(skip_all)]
    pub async fn handle_callback(&self, params: CallbackParams) -> Result<&'static str> {
        if let Some(error) = params.error {
            warn!(error, "authorization denied by provider");
            return Err(Error::ProviderDenied(error));
        }

        let code = params.code.ok_or(Error::MissingParameter("code"))?;
        let encoded_state = params.state.ok_or(Error::MissingParameter("state"))?;
        let payload = StatePayload::decode(&encoded_state)?;
        let (user_id, org_id) = (payload.user_id.as_str(), payload.org_id.as_str());

        let key = state_key(org_id, user_id);
        let Some(saved) = self.store.get(&key).await? else {
            warn!(user_id, org_id, "no pending state record");
            return Err(Error::StateNotFound);
        };

        if self.config.verify_state_nonce {
            let stored = StatePayload::from_json(&saved)?;
            if stored.nonce != payload.nonce {
                warn!(user_id, org_id, "state nonce mismatch");
                return Err(Error::StateMismatch);
            }
        }

        let token = exchange_code(&self.http_client, &self.config, &code).await?;

        let cred_key = credentials_key(org_id, user_id);
        tokio::try_join!(
            self.store.put(&cred_key, token.raw(), CREDENTIALS_TTL),
            self.store.delete(&key),
        )?;

        info!(user_id, org_id, "credentials staged");
        Ok(CLOSE_WINDOW_HTML)
    }

    /// Hand over the staged credential blob. The blob is removed by this call.
    #[instrument(skip(self))]
    pub async fn fetch_credentials(&self, user_id: &str, org_id: &str) -> Result<Value> {
        let raw = self
            .store
            .pop(&credentials_key(org_id, user_id))
            .await?
            .ok_or(Error::CredentialsNotFound)?;

        debug!("staged credentials consumed");
        serde_json::from_str(&raw).map_err(|e| Error::CredentialParse(e.to_string()))
    }
}
