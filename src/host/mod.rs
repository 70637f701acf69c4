//! Accessory host capability
//!
//! The host owns accessory objects and their persistence. The bridge only
//! asks for a sensor by id and pushes identity, value and name updates into it.

pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::cloud::DeviceEntry;

pub use registry::AccessoryRegistry;

const MANUFACTURER: &str = "Compost Bridge";

/// Manufacturer/model/serial block set once when the accessory is created
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccessoryIdentity {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: Option<String>,
}

impl AccessoryIdentity {
    pub fn from_entry(entry: &DeviceEntry) -> Self {
        let device = &entry.device;
        Self {
            manufacturer: MANUFACTURER.to_string(),
            model: device
                .model
                .clone()
                .or_else(|| device.device_type.clone())
                .unwrap_or_else(|| "Composter".to_string()),
            serial_number: device
                .serial_number
                .clone()
                .unwrap_or_else(|| entry.device_id().to_string()),
            firmware_revision: device.firmware_version.clone(),
        }
    }
}

#[async_trait]
pub trait AccessoryHost: Send + Sync {
    /// Existing sensor for `uuid`, or a new one named `display_name`
    async fn get_or_create_sensor(&self, uuid: Uuid, display_name: &str) -> Arc<dyn SensorAccessory>;
}

/// A host-side sensor with a single temperature-style numeric characteristic
pub trait SensorAccessory: Send + Sync {
    fn uuid(&self) -> Uuid;
    fn display_name(&self) -> String;
    fn set_identity(&self, identity: AccessoryIdentity);
    fn set_value(&self, value: i64);
    fn set_display_name(&self, name: &str);
}

/// Stable accessory id derived from the cloud device id
pub fn accessory_uuid(device_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("compost-bridge:{}", device_id).as_bytes())
}
