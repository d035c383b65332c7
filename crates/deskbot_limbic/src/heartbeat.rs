//! Heartbeat configuration for the limbic system
//!
//! The heartbeat determines how often the driver is ticked. The driver reads
//! elapsed time from its clock, so the cadence only sets the resolution of
//! dwell and cooldown checks, not their length.

use deskbot_core::HeartbeatSettings;
use std::time::Duration;

/// Configuration for the limbic heartbeat
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// How often to tick the driver (default: 100ms)
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
        }
    }
}

impl HeartbeatConfig {
    pub fn from_settings(settings: &HeartbeatSettings) -> Self {
        Self {
            interval: Duration::from_millis(settings.tick_ms.max(1)),
        }
    }

    /// Very fast heartbeat for testing
    pub fn testing() -> Self {
        Self {
            interval: Duration::from_millis(10),
        }
    }
}
