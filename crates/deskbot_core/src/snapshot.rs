//! Round-trippable bot record for an external save system.
//!
//! Only runtime values are captured. Base matrices and biases are rebuilt from
//! code on every start and never persisted.

use crate::error::CoreResult;
use crate::personality::PersonalityTraits;
use crate::state::{sanitize_f32, BotState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSnapshot {
    pub state: BotState,
    pub confidence: f32,
    pub activity_level: f32,
    pub interaction_count: u64,
    pub preferred_play_time: f32,
    /// Most recent spot visits, oldest first
    pub favorite_spots: Vec<[f32; 3]>,
    pub traits: PersonalityTraits,
}

impl Default for BotSnapshot {
    fn default() -> Self {
        Self {
            state: BotState::Idle,
            confidence: 0.5,
            activity_level: 0.5,
            interaction_count: 0,
            preferred_play_time: 0.5,
            favorite_spots: Vec::new(),
            traits: PersonalityTraits::default(),
        }
    }
}

impl BotSnapshot {
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and sanitize: non-finite scalars fall back to defaults and
    /// everything is clamped into range.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let mut snapshot: BotSnapshot = serde_json::from_str(json)?;
        snapshot.sanitize();
        Ok(snapshot)
    }

    pub fn sanitize(&mut self) {
        self.confidence = sanitize_f32(self.confidence, 0.5).clamp(0.0, 1.0);
        self.activity_level = sanitize_f32(self.activity_level, 0.5).clamp(0.0, 1.0);
        self.preferred_play_time = sanitize_f32(self.preferred_play_time, 0.5).clamp(0.0, 1.0);
        self.favorite_spots
            .retain(|spot| spot.iter().all(|c| c.is_finite()));
        self.traits.sanitize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let snapshot = BotSnapshot {
            state: BotState::Sleepy,
            confidence: 0.42,
            interaction_count: 12,
            favorite_spots: vec![[1.0, 0.0, -2.5]],
            ..Default::default()
        };
        let json = snapshot.to_json().unwrap();
        let restored = BotSnapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let restored = BotSnapshot::from_json(r#"{"state":"excited"}"#).unwrap();
        assert_eq!(restored.state, BotState::Excited);
        assert_eq!(restored.confidence, 0.5);
        assert_eq!(restored.interaction_count, 0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let restored =
            BotSnapshot::from_json(r#"{"confidence":4.0,"activity_level":-1.0}"#).unwrap();
        assert_eq!(restored.confidence, 1.0);
        assert_eq!(restored.activity_level, 0.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(BotSnapshot::from_json("{not json").is_err());
        assert!(BotSnapshot::from_json(r#"{"state":"grumpy"}"#).is_err());
    }
}
