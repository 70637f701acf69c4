//! Device selection helpers

use crate::cloud::DeviceEntry;

/// First entry whose nickname equals `nickname` exactly (case-sensitive).
/// Used once at startup; tracking afterwards is by device id.
pub fn select_by_nickname<'a>(entries: &'a [DeviceEntry], nickname: &str) -> Option<&'a DeviceEntry> {
    entries.iter().find(|e| e.nickname() == nickname)
}

/// First entry carrying `device_id`
pub fn find_by_device_id<'a>(entries: &'a [DeviceEntry], device_id: &str) -> Option<&'a DeviceEntry> {
    entries.iter().find(|e| e.device_id() == device_id)
}
