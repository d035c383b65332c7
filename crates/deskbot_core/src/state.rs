//! Behavioral states and the per-decision context record.
//!
//! The state set is closed: five modes, no hierarchy, no sub-states. Every
//! other crate addresses weights and cues by [`BotState`], so the declaration
//! order here is load-bearing (see [`BotState::ALL`]).

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Guard against NaN and Infinity in scalar inputs.
/// If the value is not finite, replace it with the provided fallback.
#[inline]
pub(crate) fn sanitize_f32(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in bot input, resetting to fallback {}", fallback);
        fallback
    }
}

/// Linear interpolation with `t` clamped to [0, 1].
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    from + (to - from) * t
}

/// One of the five behavioral modes of the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotState {
    #[default]
    Idle,
    Curious,
    Excited,
    Sleepy,
    Playful,
}

impl BotState {
    /// Number of states.
    pub const COUNT: usize = 5;

    /// All states in declaration order. Sampling walks weights in exactly
    /// this order, so rounding leftovers always land on later states.
    pub const ALL: [BotState; 5] = [
        BotState::Idle,
        BotState::Curious,
        BotState::Excited,
        BotState::Sleepy,
        BotState::Playful,
    ];

    /// Position of this state in [`BotState::ALL`].
    pub fn index(self) -> usize {
        match self {
            BotState::Idle => 0,
            BotState::Curious => 1,
            BotState::Excited => 2,
            BotState::Sleepy => 3,
            BotState::Playful => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BotState::Idle => "Idle",
            BotState::Curious => "Curious",
            BotState::Excited => "Excited",
            BotState::Sleepy => "Sleepy",
            BotState::Playful => "Playful",
        }
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BotState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownState(s.to_string()))
    }
}

/// External signals consumed by a single decision.
///
/// This is the entire input surface of the engine: it has no clock, no
/// window and no memory of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineContext {
    /// How active the bot should be (0.0 - 1.0), from the activity tracker
    pub activity_level: f32,
    /// Whether the user interacted within the interaction window
    pub recently_interacted: bool,
    /// Whether the external clock falls inside the day window
    pub is_day_time: bool,
}

impl EngineContext {
    pub fn new(activity_level: f32, recently_interacted: bool, is_day_time: bool) -> Self {
        Self {
            activity_level: sanitize_f32(activity_level, 0.5).clamp(0.0, 1.0),
            recently_interacted,
            is_day_time,
        }
    }

    /// Mid activity, no recent interaction, daytime. No context bias applies.
    pub fn neutral() -> Self {
        Self::new(0.5, false, true)
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::neutral()
    }
}
