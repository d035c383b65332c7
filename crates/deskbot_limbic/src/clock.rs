//! Time sources for the driver.
//!
//! The engine never reads a clock. The driver reads one through [`Clock`] so
//! dwell, cooldown and day/night logic can run against a fake in tests.

use chrono::Timelike;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic time since this clock's epoch.
    fn elapsed(&self) -> Duration;

    /// Local hour of day in [0, 24), fractional.
    fn hour_of_day(&self) -> f32;
}

/// Wall clock: `Instant` for elapsed time, local time for the hour.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn hour_of_day(&self) -> f32 {
        let now = chrono::Local::now();
        now.hour() as f32 + now.minute() as f32 / 60.0 + now.second() as f32 / 3600.0
    }
}

#[derive(Debug)]
struct ManualTime {
    elapsed: Duration,
    hour: f32,
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualTime>>,
}

impl ManualClock {
    /// Starts at zero elapsed time, at noon.
    pub fn new() -> Self {
        Self::at_hour(12.0)
    }

    pub fn at_hour(hour: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualTime {
                elapsed: Duration::ZERO,
                hour: hour.rem_euclid(24.0),
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.lock().elapsed += by;
    }

    pub fn set_hour(&self, hour: f32) {
        self.lock().hour = hour.rem_euclid(24.0);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualTime> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    fn hour_of_day(&self) -> f32 {
        self.lock().hour
    }
}

/// Exclusive day window: `start < hour < end`.
pub fn is_day_time(hour: f32, start: f32, end: f32) -> bool {
    hour > start && hour < end
}
