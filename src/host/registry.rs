//! In-process accessory registry
//!
//! Stands in for the smart-home host: keeps one record per accessory UUID and
//! serves snapshots to the status API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccessoryHost, AccessoryIdentity, SensorAccessory};

/// Point-in-time view of a registered accessory
#[derive(Debug, Clone, Serialize)]
pub struct AccessorySnapshot {
    pub uuid: Uuid,
    pub display_name: String,
    pub identity: AccessoryIdentity,
    pub value: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct SensorState {
    display_name: String,
    identity: AccessoryIdentity,
    value: Option<i64>,
    updated_at: Option<DateTime<Utc>>,
}

pub struct RegisteredSensor {
    uuid: Uuid,
    created_at: DateTime<Utc>,
    state: Mutex<SensorState>,
}

impl RegisteredSensor {
    fn new(uuid: Uuid, display_name: &str) -> Self {
        Self {
            uuid,
            created_at: Utc::now(),
            state: Mutex::new(SensorState {
                display_name: display_name.to_string(),
                identity: AccessoryIdentity::default(),
                value: None,
                updated_at: None,
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SensorState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    pub fn snapshot(&self) -> AccessorySnapshot {
        self.with_state(|s| AccessorySnapshot {
            uuid: self.uuid,
            display_name: s.display_name.clone(),
            identity: s.identity.clone(),
            value: s.value,
            created_at: self.created_at,
            updated_at: s.updated_at,
        })
    }
}

impl SensorAccessory for RegisteredSensor {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn display_name(&self) -> String {
        self.with_state(|s| s.display_name.clone())
    }

    fn set_identity(&self, identity: AccessoryIdentity) {
        self.with_state(|s| s.identity = identity);
    }

    fn set_value(&self, value: i64) {
        self.with_state(|s| {
            s.value = Some(value);
            s.updated_at = Some(Utc::now());
        });
    }

    fn set_display_name(&self, name: &str) {
        self.with_state(|s| s.display_name = name.to_string());
    }
}

#[derive(Default)]
pub struct AccessoryRegistry {
    accessories: RwLock<HashMap<Uuid, Arc<RegisteredSensor>>>,
}

impl AccessoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, uuid: &Uuid) -> Option<Arc<RegisteredSensor>> {
        self.accessories.read().await.get(uuid).cloned()
    }

    pub async fn list(&self) -> Vec<AccessorySnapshot> {
        let map = self.accessories.read().await;
        let mut snapshots: Vec<_> = map.values().map(|s| s.snapshot()).collect();
        snapshots.sort_by_key(|s| s.created_at);
        snapshots
    }

    pub async fn len(&self) -> usize {
        self.accessories.read().await.len()
    }
}

#[async_trait]
impl AccessoryHost for AccessoryRegistry {
    async fn get_or_create_sensor(&self, uuid: Uuid, display_name: &str) -> Arc<dyn SensorAccessory> {
        let mut map = self.accessories.write().await;

        if let Some(existing) = map.get(&uuid) {
            tracing::debug!("[Registry] Reusing accessory {} ({})", existing.display_name(), uuid);
            let existing: Arc<dyn SensorAccessory> = existing.clone();
            return existing;
        }

        let sensor = Arc::new(RegisteredSensor::new(uuid, display_name));
        map.insert(uuid, sensor.clone());
        tracing::info!("[Registry] Registered accessory {} ({})", display_name, uuid);

        sensor
    }
}
