//! HubSpot OAuth authorization code flow
//!
//! Provides the state token codec, the token exchange, and `HubspotOAuth`,
//! which runs the flow against a `kv_store::KvStore`. This crate has no
//! dependency on the HTTP service and can be tested on its own.
//!
//! Flow:
//! 1. `HubspotOAuth::begin_authorization()` stores state, returns the URL
//! 2. The user authorizes in a popup; HubSpot redirects to the callback
//! 3. `HubspotOAuth::handle_callback()` checks state, exchanges the code,
//!    stages the token blob
//! 4. `HubspotOAuth::fetch_credentials()` hands the blob over exactly once

pub mod config;
pub mod constants;
pub mod error;
pub mod flow;
pub mod state;
pub mod token;

pub use config::OAuthConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use flow::{CallbackParams, HubspotOAuth};
pub use state::{StatePayload, build_authorization_url, generate_nonce};
pub use token::{TokenResponse, exchange_code};
