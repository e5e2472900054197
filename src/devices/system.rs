// MIT License - Copyright (c) 2026 Peter Wright
// Cached system status

use chrono::{DateTime, Utc};

use crate::devices::partition::AlarmState;
use crate::devices::sensor::{sensor_summary, Sensor};

/// Latest known status of the account.
///
/// Rebuilt from each successful poll; arm/disarm responses only update
/// `state`. Nothing older than the last poll is kept.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub state: AlarmState,
    pub sensors: Vec<Sensor>,
    /// Time of the last successful poll or command
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn new(state: AlarmState, sensors: Vec<Sensor>) -> Self {
        Self {
            state,
            sensors,
            updated_at: Some(Utc::now()),
        }
    }

    /// Sensor summary, or `None` when no sensors were reported.
    pub fn sensor_status(&self) -> Option<String> {
        if self.sensors.is_empty() {
            None
        } else {
            Some(sensor_summary(&self.sensors))
        }
    }

    /// Forget everything; used when the session is lost.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
