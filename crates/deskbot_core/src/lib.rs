//! # Deskbot Core
//!
//! Leaf data model shared by every other deskbot crate:
//!
//! - [`BotState`]: the five closed behavioral modes
//! - [`EngineContext`]: the per-decision signal surface (activity, interaction, day/night)
//! - [`TransitionMatrix`]: a per-source-state distribution over next states
//! - [`PersonalityTraits`]: slowly adapting traits that nudge activity
//! - [`BotSnapshot`]: the round-trippable record handed to an external save system
//! - [`DeskbotConfig`]: TOML configuration with env overrides
//!
//! Nothing in this crate is async and nothing in the matrix math can fail.

pub mod config;
pub mod error;
pub mod matrix;
pub mod personality;
pub mod snapshot;
pub mod state;

pub use config::{
    secs_to_duration, DeskbotConfig, DriverConfig, HeartbeatSettings, MemoryConfig,
    MAX_DURATION_SECS,
};
pub use error::{CoreError, CoreResult};
pub use matrix::TransitionMatrix;
pub use personality::{PersonalityTrait, PersonalityTraits, TraitData};
pub use snapshot::BotSnapshot;
pub use state::{BotState, EngineContext};
