use crate::error::ConfigError;
use crate::media::MediaQuality;
use consult_core::IceServerConfig;
use consult_core::utils::{
    DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, HEARTBEAT_INTERVAL_MS, MAX_SOFT_RETRIES,
    MEDIA_GRACE_MS, POLL_INTERVAL_MS, PRESENCE_CHECK_INTERVAL_MS, PRESENCE_TIMEOUT_MS,
    RESET_SETTLE_MS, SOFT_RETRY_BASE_MS,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const ENV_RELAY_URL: &str = "CONSULT_RELAY_URL";
pub const ENV_TURN_URL: &str = "CONSULT_TURN_URL";
pub const ENV_TURN_USERNAME: &str = "CONSULT_TURN_USERNAME";
pub const ENV_TURN_CREDENTIAL: &str = "CONSULT_TURN_CREDENTIAL";

/// Client configuration. Every field has a default, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base url of the signaling relay (`POST /signal`, `GET /signals`).
    pub relay_url: String,
    pub ice_servers: Vec<IceServerConfig>,
    pub preferred_quality: MediaQuality,

    pub poll_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub presence_check_interval_ms: u64,
    pub presence_timeout_ms: u64,

    pub max_soft_retries: u32,
    pub soft_retry_base_ms: u64,
    pub media_grace_ms: u64,
    pub reset_settle_ms: u64,

    /// Per-request timeout of the HTTP relay client.
    pub http_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:8080".to_owned(),
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
                username: None,
                credential: None,
            }],
            preferred_quality: MediaQuality::High,
            poll_interval_ms: POLL_INTERVAL_MS,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            presence_check_interval_ms: PRESENCE_CHECK_INTERVAL_MS,
            presence_timeout_ms: PRESENCE_TIMEOUT_MS,
            max_soft_retries: MAX_SOFT_RETRIES,
            soft_retry_base_ms: SOFT_RETRY_BASE_MS,
            media_grace_ms: MEDIA_GRACE_MS,
            reset_settle_ms: RESET_SETTLE_MS,
            http_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    /// Defaults, overlaid with `path` (if any), overlaid with the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay values from an environment lookup. TURN credentials are only
    /// ever taken from here or from the config file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RELAY_URL).filter(|u| !u.is_empty()) {
            debug!("Relay url overridden from environment");
            self.relay_url = url;
        }

        if let Some(url) = lookup(ENV_TURN_URL).filter(|u| !u.is_empty()) {
            let server = IceServerConfig {
                urls: vec![url],
                username: lookup(ENV_TURN_USERNAME),
                credential: lookup(ENV_TURN_CREDENTIAL),
            };
            debug!("TURN server added from environment: {:?}", server.urls);
            self.ice_servers.push(server);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay_url.trim().is_empty() {
            return Err(ConfigError::MissingRelayUrl);
        }
        if !self.ice_servers.iter().any(IceServerConfig::is_stun) {
            return Err(ConfigError::MissingStun);
        }
        if !self.ice_servers.iter().any(IceServerConfig::is_turn) {
            return Err(ConfigError::MissingTurn);
        }

        for server in self.ice_servers.iter().filter(|s| s.is_turn()) {
            let has_user = server.username.as_deref().is_some_and(|u| !u.is_empty());
            let has_cred = server.credential.as_deref().is_some_and(|c| !c.is_empty());
            if !has_user || !has_cred {
                return Err(ConfigError::MissingTurnCredentials(server.urls.join(",")));
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn presence_check_interval(&self) -> Duration {
        Duration::from_millis(self.presence_check_interval_ms)
    }

    pub fn presence_timeout(&self) -> Duration {
        Duration::from_millis(self.presence_timeout_ms)
    }

    pub fn soft_retry_base(&self) -> Duration {
        Duration::from_millis(self.soft_retry_base_ms)
    }

    pub fn media_grace(&self) -> Duration {
        Duration::from_millis(self.media_grace_ms)
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}
