//! Platform startup: login → listing → nickname selection → accessory + poller
//!
//! Startup errors are terminal for this attempt only. The caller logs them and
//! keeps the process alive without an accessory.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::accessory::selector::select_by_nickname;
use crate::accessory::{PollerHandle, PresentationAdapter, StatusPoller};
use crate::cloud::{CloudSession, Credentials, DeviceSource};
use crate::config::Config;
use crate::error::BridgeError;
use crate::host::{accessory_uuid, AccessoryHost, AccessoryIdentity};

/// The single tracked accessory and its refresh loop
pub struct RunningAccessory {
    pub uuid: Uuid,
    handle: PollerHandle,
}

impl RunningAccessory {
    pub fn poller(&self) -> &Arc<StatusPoller> {
        self.handle.poller()
    }

    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

pub struct Platform {
    config: Config,
    host: Arc<dyn AccessoryHost>,
    session: Arc<CloudSession>,
}

impl Platform {
    pub fn new(config: Config, host: Arc<dyn AccessoryHost>) -> Self {
        let credentials = Credentials::from(&config.account);
        let session = Arc::new(CloudSession::from_config(&config.cloud, credentials));
        Self {
            config,
            host,
            session,
        }
    }

    pub async fn start(&self) -> Result<Option<RunningAccessory>, BridgeError> {
        let credentials = self.session.credentials();

        tracing::info!("[Platform] Logging in as {}", credentials.email());
        self.session.login().await?;

        let devices = self.session.list_devices().await?;
        tracing::info!("[Platform] Account has {} devices", devices.len());

        let selected = match select_by_nickname(&devices, credentials.nickname()) {
            Some(entry) => entry.clone(),
            None => {
                tracing::warn!(
                    "[Platform] No device nicknamed {:?}; accessory not created",
                    credentials.nickname()
                );
                return Ok(None);
            }
        };

        let display_name_override = self
            .config
            .account
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty());
        let display_name = display_name_override
            .clone()
            .unwrap_or_else(|| selected.nickname().to_string());

        let uuid = accessory_uuid(selected.device_id());
        let sensor = self.host.get_or_create_sensor(uuid, &display_name).await;
        sensor.set_identity(AccessoryIdentity::from_entry(&selected));

        tracing::info!(
            "[Platform] Tracking device {} ({:?}) as accessory {}",
            selected.device_id(),
            selected.nickname(),
            uuid
        );

        let source: Arc<dyn DeviceSource> = self.session.clone();
        let poller = Arc::new(StatusPoller::new(
            selected.device_id(),
            source,
            PresentationAdapter::new(sensor),
            display_name_override,
        ));
        let handle = poller.spawn(Duration::from_secs(self.config.poll.interval_secs));

        Ok(Some(RunningAccessory { uuid, handle }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::RefreshOutcome;
    use crate::config::test_config;
    use crate::host::AccessoryRegistry;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_login_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AuthenticationResult": {"IdToken": "id-1", "AccessToken": "acc-1", "ExpiresIn": 3600}
            })))
            .mount(server)
            .await;
    }

    async fn mount_devices(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/user-devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn platform(server: &MockServer, registry: Arc<AccessoryRegistry>) -> Platform {
        let config = test_config(
            &format!("{}/", server.uri()),
            &format!("{}/user-devices", server.uri()),
        );
        Platform::new(config, registry)
    }

    async fn wait_for_value(registry: &AccessoryRegistry, uuid: &Uuid) -> Option<i64> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(value) = registry.get(uuid).await.and_then(|s| s.snapshot().value) {
                    return value;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .ok()
    }

    #[tokio::test]
    async fn test_start_creates_accessory_and_applies_first_refresh() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        mount_devices(
            &server,
            serde_json::json!({"result": [
                {"userDevice": {"deviceId": "d1", "nickname": "Kitchen", "cycleTimeRemaining": 125},
                 "device": {"serialNumber": "SN1", "model": "Gen2"}}
            ]}),
        )
        .await;

        let registry = Arc::new(AccessoryRegistry::new());
        let running = platform(&server, registry.clone())
            .start()
            .await
            .unwrap()
            .expect("accessory should be created");

        assert_eq!(running.uuid, accessory_uuid("d1"));
        assert_eq!(wait_for_value(&registry, &running.uuid).await, Some(2));

        let snapshot = registry.get(&running.uuid).await.unwrap().snapshot();
        assert_eq!(snapshot.display_name, "Kitchen");
        assert_eq!(snapshot.identity.serial_number, "SN1");

        running.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_auth_failure_creates_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ChallengeName": "SMS_MFA"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let registry = Arc::new(AccessoryRegistry::new());
        let result = platform(&server, registry.clone()).start().await;

        assert!(matches!(result, Err(BridgeError::Authentication { .. })));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_start_unknown_nickname_is_not_an_error() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        mount_devices(
            &server,
            serde_json::json!({"result": [
                {"userDevice": {"deviceId": "d1", "nickname": "kitchen"}, "device": {}}
            ]}),
        )
        .await;

        let registry = Arc::new(AccessoryRegistry::new());
        let result = platform(&server, registry.clone()).start().await.unwrap();

        assert!(result.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_start_directory_failure_is_terminal() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        Mock::given(method("GET"))
            .and(path("/user-devices"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let registry = Arc::new(AccessoryRegistry::new());
        let result = platform(&server, registry.clone()).start().await;

        assert!(matches!(
            result,
            Err(BridgeError::DirectoryFetch { status: Some(500), .. })
        ));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_display_name_override_used_for_new_accessory() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;
        mount_devices(
            &server,
            serde_json::json!({"result": [
                {"userDevice": {"deviceId": "d1", "nickname": "Kitchen"}, "device": {}}
            ]}),
        )
        .await;

        let registry = Arc::new(AccessoryRegistry::new());
        let mut config = test_config(
            &format!("{}/", server.uri()),
            &format!("{}/user-devices", server.uri()),
        );
        config.account.display_name = Some("Compost Timer".to_string());

        let running = Platform::new(config, registry.clone())
            .start()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(wait_for_value(&registry, &running.uuid).await, Some(0));
        let snapshot = registry.get(&running.uuid).await.unwrap().snapshot();
        assert_eq!(snapshot.display_name, "Compost Timer");

        assert!(matches!(running.poller().refresh().await, RefreshOutcome::Updated(_)));
        running.shutdown().await;
    }
}
