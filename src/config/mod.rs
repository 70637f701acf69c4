//! Configuration module

use serde::Deserialize;

use crate::cloud::TokenKind;
use crate::error::BridgeError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub account: AccountConfig,
    pub cloud: CloudConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Clone, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Nickname of the device to expose, matched exactly at startup
    #[serde(default)]
    pub nickname: String,
    /// Pins the accessory name instead of following the device nickname
    #[serde(default)]
    pub display_name: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("nickname", &self.nickname)
            .field("display_name", &self.display_name)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub devices_url: String,
    /// Overrides the regional identity-provider endpoint
    #[serde(default)]
    pub identity_url: Option<String>,
    #[serde(default)]
    pub token_kind: TokenKind,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CloudConfig {
    pub fn identity_endpoint(&self) -> String {
        match &self.identity_url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("https://cognito-idp.{}.amazonaws.com/", self.region),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    60
}

fn default_enabled() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8582
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("COMPOST_BRIDGE").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Presence checks only; the cloud decides whether the values are right.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let required = [
            ("account.email", &self.account.email),
            ("account.password", &self.account.password),
            ("account.nickname", &self.account.nickname),
            ("cloud.region", &self.cloud.region),
            ("cloud.client_id", &self.cloud.client_id),
            ("cloud.devices_url", &self.cloud.devices_url),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(BridgeError::Config(format!("{} is required", key)));
            }
        }

        url::Url::parse(&self.cloud.devices_url)
            .map_err(|e| BridgeError::Config(format!("cloud.devices_url: {}", e)))?;

        if let Some(ref identity_url) = self.cloud.identity_url {
            if !identity_url.trim().is_empty() {
                url::Url::parse(identity_url)
                    .map_err(|e| BridgeError::Config(format!("cloud.identity_url: {}", e)))?;
            }
        }

        if self.poll.interval_secs == 0 {
            return Err(BridgeError::Config(
                "poll.interval_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config(identity_url: &str, devices_url: &str) -> Config {
    Config {
        account: AccountConfig {
            email: "user@example.com".to_string(),
            password: "hunter2".to_string(),
            nickname: "Kitchen".to_string(),
            display_name: None,
        },
        cloud: CloudConfig {
            region: "us-east-1".to_string(),
            client_id: "test-client".to_string(),
            devices_url: devices_url.to_string(),
            identity_url: Some(identity_url.to_string()),
            token_kind: TokenKind::Id,
            timeout_secs: 5,
        },
        poll: PollConfig::default(),
        server: ServerConfig::default(),
    }
}
