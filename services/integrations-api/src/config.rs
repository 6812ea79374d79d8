//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The client secret is loaded from HUBSPOT_CLIENT_SECRET or
//! client_secret_file, never from the TOML itself.

use common::Secret;
use hubspot_auth::OAuthConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub hubspot: HubspotConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Timeout for outbound calls to HubSpot
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Browser origins allowed to call the API ("*" for any)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// HubSpot app registration and endpoints
#[derive(Debug, Deserialize)]
pub struct HubspotConfig {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to HUBSPOT_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    pub redirect_uri: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub verify_state_nonce: bool,
}

/// Where OAuth state and staged credentials live
#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub redis_url: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    1000
}

fn default_scope() -> String {
    hubspot_auth::DEFAULT_SCOPE.to_owned()
}

fn default_authorize_url() -> String {
    hubspot_auth::AUTHORIZE_ENDPOINT.to_owned()
}

fn default_token_url() -> String {
    hubspot_auth::TOKEN_ENDPOINT.to_owned()
}

fn default_api_base_url() -> String {
    hubspot_items::API_BASE_URL.to_owned()
}

fn require_http_url(name: &str, value: &str) -> common::Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(common::Error::Config(format!(
            "{name} must start with http:// or https://, got: {value}"
        )))
    }
}

fn require_non_empty(name: &str, value: &str) -> common::Result<()> {
    if value.trim().is_empty() {
        Err(common::Error::Config(format!("{name} must not be empty")))
    } else {
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Environment overrides:
    /// - HUBSPOT_CLIENT_ID replaces hubspot.client_id
    /// - HUBSPOT_CLIENT_SECRET, else hubspot.client_secret_file
    /// - REDIS_URL replaces store.redis_url
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(client_id) = std::env::var("HUBSPOT_CLIENT_ID") {
            config.hubspot.client_id = client_id;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            config.store.redis_url = Some(url);
        }

        // Resolve client secret: env var takes precedence over file
        if let Ok(secret) = std::env::var("HUBSPOT_CLIENT_SECRET") {
            config.hubspot.client_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = config.hubspot.client_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read client_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                config.hubspot.client_secret = Some(Secret::new(secret));
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        let hubspot = &self.hubspot;
        require_non_empty("client_id", &hubspot.client_id)?;
        require_non_empty("scope", &hubspot.scope)?;
        require_http_url("redirect_uri", &hubspot.redirect_uri)?;
        require_http_url("authorize_url", &hubspot.authorize_url)?;
        require_http_url("token_url", &hubspot.token_url)?;
        require_http_url("api_base_url", &hubspot.api_base_url)?;

        if hubspot.client_secret.is_none() {
            return Err(common::Error::MissingSecret(
                "set HUBSPOT_CLIENT_SECRET or hubspot.client_secret_file".into(),
            ));
        }

        if self.server.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.store.backend == StoreBackend::Redis && self.store.redis_url.is_none() {
            return Err(common::Error::Config(
                "store.backend = \"redis\" requires store.redis_url or REDIS_URL".into(),
            ));
        }

        Ok(())
    }

    /// OAuth client settings for the flow.
    pub fn oauth_config(&self) -> common::Result<OAuthConfig> {
        let hubspot = &self.hubspot;
        let secret = hubspot.client_secret.clone().ok_or_else(|| {
            common::Error::MissingSecret("client secret was not resolved".into())
        })?;

        let mut oauth = OAuthConfig::new(&hubspot.client_id, secret, &hubspot.redirect_uri);
        oauth.scope = hubspot.scope.clone();
        oauth.authorize_endpoint = hubspot.authorize_url.clone();
        oauth.token_endpoint = hubspot.token_url.clone();
        oauth.verify_state_nonce = hubspot.verify_state_nonce;
        Ok(oauth)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("hubspot-integration.toml")
    }
}
