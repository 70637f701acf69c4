//! StatusPoller: periodic directory refresh for one tracked device
//!
//! Runs in a background tokio task owned by a `PollerHandle`. Each tick does a
//! full listing, finds the device by id and replaces the cached entry wholesale.
//! Fetch errors and missing devices are logged; the last good entry stays.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::accessory::presentation::PresentationAdapter;
use crate::accessory::selector::find_by_device_id;
use crate::cloud::{DeviceEntry, DeviceSource};

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Fresh entry found and applied
    Updated(DeviceEntry),
    /// Fetch failed or the device is no longer listed; cache untouched
    Unavailable,
    /// Another refresh was still running
    Skipped,
}

pub struct StatusPoller {
    device_id: String,
    source: Arc<dyn DeviceSource>,
    adapter: PresentationAdapter,
    display_name_override: Option<String>,
    cached: RwLock<Option<DeviceEntry>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag even when the refresh future is dropped mid-way
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl StatusPoller {
    pub fn new(
        device_id: impl Into<String>,
        source: Arc<dyn DeviceSource>,
        adapter: PresentationAdapter,
        display_name_override: Option<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            source,
            adapter,
            display_name_override,
            cached: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub async fn cached(&self) -> Option<DeviceEntry> {
        self.cached.read().await.clone()
    }

    /// One refresh cycle. Never returns an error: failures downgrade to `Unavailable`.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(
                "[Poller] Refresh for {} still in flight, skipping tick",
                self.device_id
            );
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let devices = match self.source.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!(
                    "[Poller] Device {} refresh failed, keeping last state: {}",
                    self.device_id,
                    e
                );
                return RefreshOutcome::Unavailable;
            }
        };

        let entry = match find_by_device_id(&devices, &self.device_id) {
            Some(entry) => entry.clone(),
            None => {
                tracing::warn!(
                    "[Poller] Device {} not in listing ({} devices); removed or access revoked?",
                    self.device_id,
                    devices.len()
                );
                let cached = self.cached.read().await;
                if cached.is_none() {
                    self.adapter.apply_fallback();
                }
                return RefreshOutcome::Unavailable;
            }
        };

        self.apply(entry.clone()).await;
        RefreshOutcome::Updated(entry)
    }

    async fn apply(&self, entry: DeviceEntry) {
        let mut cached = self.cached.write().await;

        let previous_name = match cached.as_ref() {
            Some(prev) => {
                if prev.user_device.version == entry.user_device.version {
                    tracing::trace!(
                        "[Poller] Device {} unchanged at version {}",
                        self.device_id,
                        entry.user_device.version
                    );
                }
                prev.nickname().to_string()
            }
            None => self.adapter.sensor().display_name(),
        };

        if previous_name != entry.nickname() {
            match self.display_name_override {
                Some(ref pinned) => tracing::info!(
                    "[Poller] Device {} renamed to {:?}; display name stays {:?}",
                    self.device_id,
                    entry.nickname(),
                    pinned
                ),
                None => {
                    tracing::info!(
                        "[Poller] Device {} renamed: {:?} -> {:?}",
                        self.device_id,
                        previous_name,
                        entry.nickname()
                    );
                    self.adapter.sensor().set_display_name(entry.nickname());
                }
            }
        }

        let minutes = self.adapter.apply(&entry);
        tracing::debug!(
            "[Poller] Device {} ({}) synced to accessory {}: {} min remaining",
            self.device_id,
            entry.nickname(),
            self.adapter.sensor().uuid(),
            minutes
        );

        *cached = Some(entry);
    }

    /// Start the periodic loop: first refresh immediately, then every `period`
    pub fn spawn(self: Arc<Self>, period: Duration) -> PollerHandle {
        tracing::info!(
            "[Poller] Starting refresh for {} (interval: {}s)",
            self.device_id,
            period.as_secs()
        );

        let poller = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                poller.refresh().await;
            }
        });

        PollerHandle {
            poller: self,
            task: Some(task),
        }
    }
}

/// Owns the periodic refresh task. Dropping the handle stops the task.
pub struct PollerHandle {
    poller: Arc<StatusPoller>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn poller(&self) -> &Arc<StatusPoller> {
        &self.poller
    }

    /// Stop the loop and wait for the task to wind down
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            tracing::info!("[Poller] Stopped refresh for {}", self.poller.device_id);
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
