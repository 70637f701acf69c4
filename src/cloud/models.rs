//! Device directory models
//!
//! Each listing returns fresh snapshots; nothing here is patched in place.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

// ============================================================================
// Device entry
// ============================================================================

/// One account device: mutable per-account state plus hardware metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    pub user_device: UserDevice,
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDevice {
    /// Stable identifier used to track the device across fetches
    pub device_id: String,
    pub nickname: String,
    #[serde(default)]
    pub filter_cycles_remaining: Option<i64>,
    #[serde(default)]
    pub cycles_since_filter_change: Option<i64>,
    /// Seconds left in the running cycle; absent when idle
    #[serde(default)]
    pub cycle_time_remaining: Option<f64>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub removed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub manufacture_date: Option<String>,
}

impl DeviceEntry {
    pub fn device_id(&self) -> &str {
        &self.user_device.device_id
    }

    pub fn nickname(&self) -> &str {
        &self.user_device.nickname
    }

    pub fn cycle_time_remaining(&self) -> Option<f64> {
        self.user_device.cycle_time_remaining
    }
}

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Deserialize)]
struct DevicesEnvelope {
    result: Vec<DeviceEntry>,
}

/// Decode a `{ "result": [...] }` listing body, preserving order and duplicates
pub fn decode_device_list(body: &str) -> Result<Vec<DeviceEntry>, BridgeError> {
    let envelope: DevicesEnvelope = serde_json::from_str(body)
        .map_err(|e| BridgeError::Parse(format!("device list: {}", e)))?;
    Ok(envelope.result)
}

#[cfg(test)]
pub(crate) fn entry(id: &str, nickname: &str, remaining: Option<f64>) -> DeviceEntry {
    DeviceEntry {
        user_device: UserDevice {
            device_id: id.to_string(),
            nickname: nickname.to_string(),
            filter_cycles_remaining: None,
            cycles_since_filter_change: None,
            cycle_time_remaining: remaining,
            version: 1,
            removed: false,
        },
        device: DeviceInfo {
            id: Some(id.to_string()),
            device_type: Some("composter".to_string()),
            serial_number: Some(format!("SN-{}", id)),
            model: Some("Gen2".to_string()),
            firmware_version: Some("1.4.0".to_string()),
            manufacture_date: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_entry() {
        let body = r#"{
            "result": [{
                "userDevice": {
                    "deviceId": "d1",
                    "nickname": "Kitchen",
                    "filterCyclesRemaining": 42,
                    "cyclesSinceFilterChange": 8,
                    "cycleTimeRemaining": 125,
                    "version": 7,
                    "removed": false
                },
                "device": {
                    "id": "hw-1",
                    "type": "composter",
                    "serialNumber": "SN123",
                    "model": "Gen2",
                    "firmwareVersion": "1.4.0",
                    "manufactureDate": "2023-04-01"
                }
            }]
        }"#;

        let entries = decode_device_list(body).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.device_id(), "d1");
        assert_eq!(e.nickname(), "Kitchen");
        assert_eq!(e.cycle_time_remaining(), Some(125.0));
        assert_eq!(e.user_device.version, 7);
        assert_eq!(e.device.device_type.as_deref(), Some("composter"));
        assert_eq!(e.device.serial_number.as_deref(), Some("SN123"));
    }

    #[test]
    fn test_decode_missing_optional_fields() {
        let body = r#"{"result":[{"userDevice":{"deviceId":"d1","nickname":"Kitchen"},"device":{}}]}"#;
        let entries = decode_device_list(body).unwrap();
        assert_eq!(entries[0].cycle_time_remaining(), None);
        assert_eq!(entries[0].user_device.version, 0);
        assert!(!entries[0].user_device.removed);
    }

    #[test]
    fn test_decode_null_cycle_time() {
        let body = r#"{"result":[{"userDevice":{"deviceId":"d1","nickname":"K","cycleTimeRemaining":null},"device":{}}]}"#;
        let entries = decode_device_list(body).unwrap();
        assert_eq!(entries[0].cycle_time_remaining(), None);
    }

    #[test]
    fn test_decode_keeps_duplicates_in_order() {
        let body = r#"{"result":[
            {"userDevice":{"deviceId":"a","nickname":"Kitchen"},"device":{}},
            {"userDevice":{"deviceId":"b","nickname":"Kitchen"},"device":{}}
        ]}"#;
        let ids: Vec<_> = decode_device_list(body)
            .unwrap()
            .iter()
            .map(|e| e.device_id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_shape_mismatch_is_parse_error() {
        let missing_result = r#"{"devices":[]}"#;
        assert!(matches!(
            decode_device_list(missing_result),
            Err(BridgeError::Parse(_))
        ));

        let missing_id = r#"{"result":[{"userDevice":{"nickname":"K"},"device":{}}]}"#;
        assert!(matches!(
            decode_device_list(missing_id),
            Err(BridgeError::Parse(_))
        ));

        assert!(matches!(
            decode_device_list("<html>"),
            Err(BridgeError::Parse(_))
        ));
    }
}
