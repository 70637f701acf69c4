//! CloudSession: login + directory with the bearer token held in memory

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cloud::auth::AuthClient;
use crate::cloud::credentials::Credentials;
use crate::cloud::directory::DirectoryClient;
use crate::cloud::models::DeviceEntry;
use crate::config::CloudConfig;
use crate::error::BridgeError;

/// Anything that can produce a full device listing
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>, BridgeError>;
}

pub struct CloudSession {
    auth: AuthClient,
    directory: DirectoryClient,
    token: RwLock<Option<String>>,
}

impl CloudSession {
    pub fn new(auth: AuthClient, directory: DirectoryClient) -> Self {
        Self {
            auth,
            directory,
            token: RwLock::new(None),
        }
    }

    pub fn from_config(cloud: &CloudConfig, credentials: Credentials) -> Self {
        let timeout = Duration::from_secs(cloud.timeout_secs);
        let auth = AuthClient::new(
            cloud.identity_endpoint(),
            &cloud.client_id,
            credentials,
            cloud.token_kind,
            timeout,
        );
        let directory = DirectoryClient::new(&cloud.devices_url, timeout);
        Self::new(auth, directory)
    }

    pub fn credentials(&self) -> &Credentials {
        self.auth.credentials()
    }

    /// Log in and keep the token. A failed login leaves any previous token untouched.
    pub async fn login(&self) -> Result<(), BridgeError> {
        let token = self.auth.login().await?;
        *self.token.write().await = Some(token);
        Ok(())
    }
}

#[async_trait]
impl DeviceSource for CloudSession {
    async fn list_devices(&self) -> Result<Vec<DeviceEntry>, BridgeError> {
        let token = self.token.read().await.clone();
        self.directory.fetch_devices(token.as_deref()).await
    }
}
