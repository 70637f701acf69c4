//! Presentation adapter: cycle time → sensor value

use std::sync::Arc;

use crate::cloud::DeviceEntry;
use crate::host::SensorAccessory;

/// Value pushed when the device reports no running cycle
pub const IDLE_VALUE: i64 = 0;

/// Whole minutes left in the cycle, rounded to nearest with halves away from
/// zero (90s → 2). Missing or non-finite input reads as idle.
pub fn minutes_remaining(seconds: Option<f64>) -> i64 {
    match seconds {
        Some(s) if s.is_finite() => (s / 60.0).round() as i64,
        _ => IDLE_VALUE,
    }
}

pub struct PresentationAdapter {
    sensor: Arc<dyn SensorAccessory>,
}

impl PresentationAdapter {
    pub fn new(sensor: Arc<dyn SensorAccessory>) -> Self {
        Self { sensor }
    }

    pub fn sensor(&self) -> &Arc<dyn SensorAccessory> {
        &self.sensor
    }

    /// Push the entry's remaining minutes. No range checks; that is the host's job.
    pub fn apply(&self, entry: &DeviceEntry) -> i64 {
        let minutes = minutes_remaining(entry.cycle_time_remaining());
        self.sensor.set_value(minutes);
        minutes
    }

    pub fn apply_fallback(&self) -> i64 {
        self.sensor.set_value(IDLE_VALUE);
        IDLE_VALUE
    }
}
