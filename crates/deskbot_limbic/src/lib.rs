//! # Deskbot Limbic System
//!
//! The behavioral core of the bot:
//!
//! - [`EmotionEngine`]: context-biased, confidence-weighted transition sampling
//! - [`StateDriver`]: dwell timer, cooldown and forced transitions around the engine
//! - [`ActivityTracker`]: slow memory of interaction habits feeding the activity level
//! - [`LimbicSystem`]: confines one driver to a tokio task and publishes [`MoodMarker`]s
//!
//! ## Ownership
//!
//! The engine owns only its confidence. The driver owns the current state, the
//! clock, and the one random generator every draw comes from, so a fixed seed
//! reproduces a whole run.

mod activity;
pub mod clock;
mod driver;
pub mod engine;
mod heartbeat;
mod system;

pub use activity::ActivityTracker;
pub use clock::{is_day_time, Clock, ManualClock, SystemClock};
pub use driver::{
    dwell_multiplier, ChangeCause, DriverStats, InteractionKind, StateChange, StateDriver, Weather,
};
pub use engine::{BaseMatrices, Decision, EmotionEngine};
pub use heartbeat::HeartbeatConfig;
pub use system::{LimbicSystem, MoodMarker, Stimulus};
