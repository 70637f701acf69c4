//! Device directory client
//!
//! Full listing only; the upstream API has no delta endpoint.

use std::time::Duration;

use reqwest::Client;

use crate::cloud::models::{decode_device_list, DeviceEntry};
use crate::error::BridgeError;

pub struct DirectoryClient {
    devices_url: String,
    http_client: Client,
}

impl DirectoryClient {
    pub fn new(devices_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            devices_url: devices_url.into(),
            http_client,
        }
    }

    /// Fetch every device on the account, returned verbatim in listing order
    pub async fn fetch_devices(&self, token: Option<&str>) -> Result<Vec<DeviceEntry>, BridgeError> {
        let token = token.ok_or(BridgeError::NotAuthenticated)?;

        let resp = self
            .http_client
            .get(&self.devices_url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| BridgeError::DirectoryFetch {
                status: None,
                message: format!("request failed: {}", e),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BridgeError::DirectoryFetch {
                status: Some(status.as_u16()),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    body
                },
            });
        }

        let body = resp.text().await.map_err(|e| BridgeError::DirectoryFetch {
            status: Some(status.as_u16()),
            message: format!("reading body failed: {}", e),
        })?;

        let devices = decode_device_list(&body)?;
        tracing::debug!("[Directory] Fetched {} devices", devices.len());

        Ok(devices)
    }
}
