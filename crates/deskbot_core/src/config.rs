use crate::error::{CoreError, CoreResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeskbotConfig {
    pub driver: DriverConfig,
    pub memory: MemoryConfig,
    pub heartbeat: HeartbeatSettings,
}

impl DeskbotConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied and the result is validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: DeskbotConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        config.validate().context("Invalid deskbot config")?;
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                if let Err(e) = cfg.validate() {
                    tracing::warn!("Ignoring env overrides: {}", e);
                    cfg = Self::default();
                }
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DESKBOT_SEED") {
            if let Ok(n) = v.parse() {
                self.driver.seed = Some(n);
            }
        }
        if let Ok(v) = std::env::var("DESKBOT_BASE_DWELL_SECS") {
            if let Ok(n) = v.parse() {
                self.driver.base_dwell_secs = n;
            }
        }
        if let Ok(v) = std::env::var("DESKBOT_COOLDOWN_SECS") {
            if let Ok(n) = v.parse() {
                self.driver.cooldown_secs = n;
            }
        }
        if let Ok(v) = std::env::var("DESKBOT_TICK_MS") {
            if let Ok(n) = v.parse() {
                self.heartbeat.tick_ms = n;
            }
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.driver.validate()?;
        self.memory.validate()?;
        self.heartbeat.validate()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Timing policy of the state driver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Base dwell duration; scaled per state (Idle ×0.5, Sleepy ×2, Excited ×0.3)
    pub base_dwell_secs: f32,
    /// Minimum time between accepted state changes
    pub cooldown_secs: f32,
    /// An interaction counts as "recent" for this long
    pub interaction_window_secs: f32,
    /// Relative dwell jitter; 0.2 means ×[0.8, 1.2)
    pub dwell_jitter: f32,
    /// Day window is `day_start_hour < hour < day_end_hour`
    pub day_start_hour: f32,
    pub day_end_hour: f32,
    /// Fixed seed for the shared generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            base_dwell_secs: 5.0,
            cooldown_secs: 2.0,
            interaction_window_secs: 30.0,
            dwell_jitter: 0.2,
            day_start_hour: 6.0,
            day_end_hour: 22.0,
            seed: None,
        }
    }
}

/// Upper bound for every configured duration: one day.
pub const MAX_DURATION_SECS: f32 = 86_400.0;

/// Seconds to `Duration` without panicking: negatives and NaN become zero,
/// values too large for `Duration` saturate.
pub fn secs_to_duration(secs: f32) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}

impl DriverConfig {
    pub fn base_dwell(&self) -> Duration {
        secs_to_duration(self.base_dwell_secs)
    }

    pub fn cooldown(&self) -> Duration {
        secs_to_duration(self.cooldown_secs)
    }

    pub fn interaction_window(&self) -> Duration {
        secs_to_duration(self.interaction_window_secs)
    }

    fn validate(&self) -> CoreResult<()> {
        let max = MAX_DURATION_SECS;
        if !(self.base_dwell_secs > 0.0 && self.base_dwell_secs <= max) {
            return Err(invalid(
                "driver.base_dwell_secs",
                format!("must be in (0, {}]", max),
            ));
        }
        if !(0.0..=max).contains(&self.cooldown_secs) {
            return Err(invalid("driver.cooldown_secs", format!("must be in [0, {}]", max)));
        }
        if !(0.0..=max).contains(&self.interaction_window_secs) {
            return Err(invalid(
                "driver.interaction_window_secs",
                format!("must be in [0, {}]", max),
            ));
        }
        if !(0.0..1.0).contains(&self.dwell_jitter) {
            return Err(invalid("driver.dwell_jitter", "must be in [0, 1)"));
        }
        if !(0.0..=24.0).contains(&self.day_start_hour)
            || !(0.0..=24.0).contains(&self.day_end_hour)
            || self.day_start_hour >= self.day_end_hour
        {
            return Err(invalid(
                "driver.day_start_hour",
                format!(
                    "day window {}..{} must satisfy 0 <= start < end <= 24",
                    self.day_start_hour, self.day_end_hour
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Per-update lerp factor for activity, play time and favourite spot
    pub adaptation_speed: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            adaptation_speed: 0.01,
        }
    }
}

impl MemoryConfig {
    fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.adaptation_speed) {
            return Err(invalid("memory.adaptation_speed", "must be in [0, 1]"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeartbeatSettings {
    pub tick_ms: u64,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self { tick_ms: 100 }
    }
}

impl HeartbeatSettings {
    fn validate(&self) -> CoreResult<()> {
        if self.tick_ms == 0 {
            return Err(invalid("heartbeat.tick_ms", "must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
