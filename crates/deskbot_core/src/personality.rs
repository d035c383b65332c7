//! Personality traits: slow-moving dispositions shaped by interaction.
//!
//! Traits do not enter the transition math directly. They nudge the
//! activity level the driver feeds into [`EngineContext`](crate::EngineContext)
//! and can suggest a preferred state for consumers that want one.

use crate::state::{lerp, sanitize_f32, BotState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    Playful,
    Curious,
    Energetic,
    Calm,
    Adventurous,
    Cautious,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 6] = [
        PersonalityTrait::Playful,
        PersonalityTrait::Curious,
        PersonalityTrait::Energetic,
        PersonalityTrait::Calm,
        PersonalityTrait::Adventurous,
        PersonalityTrait::Cautious,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitData {
    pub kind: PersonalityTrait,
    /// Trait strength (0.0 - 1.0)
    pub value: f32,
    /// Fraction of the gap closed per unit of adaptation
    pub adaptation_rate: f32,
}

impl TraitData {
    fn new(kind: PersonalityTrait) -> Self {
        Self {
            kind,
            value: 0.5,
            adaptation_rate: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    traits: Vec<TraitData>,
}

impl Default for PersonalityTraits {
    fn default() -> Self {
        Self {
            traits: PersonalityTrait::ALL.into_iter().map(TraitData::new).collect(),
        }
    }
}

impl PersonalityTraits {
    pub fn iter(&self) -> impl Iterator<Item = &TraitData> {
        self.traits.iter()
    }

    /// Current value of a trait; 0.5 if it is somehow missing.
    pub fn value(&self, kind: PersonalityTrait) -> f32 {
        self.traits
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.value)
            .unwrap_or(0.5)
    }

    /// Overwrite a trait value (clamped to [0, 1]).
    pub fn set_value(&mut self, kind: PersonalityTrait, value: f32) {
        if let Some(t) = self.traits.iter_mut().find(|t| t.kind == kind) {
            t.value = sanitize_f32(value, 0.5).clamp(0.0, 1.0);
        }
    }

    /// Move a trait toward `target` by `adaptation_rate * amount`.
    pub fn adapt(&mut self, kind: PersonalityTrait, target: f32, amount: f32) {
        if let Some(t) = self.traits.iter_mut().find(|t| t.kind == kind) {
            t.value = lerp(t.value, target.clamp(0.0, 1.0), t.adaptation_rate * amount);
        }
    }

    pub fn on_playful_interaction(&mut self) {
        self.adapt(PersonalityTrait::Playful, 1.0, 0.1);
        self.adapt(PersonalityTrait::Curious, 0.0, 0.05);
    }

    pub fn on_calm_interaction(&mut self) {
        self.adapt(PersonalityTrait::Calm, 1.0, 0.1);
        self.adapt(PersonalityTrait::Energetic, 0.0, 0.05);
    }

    /// Trait with the strictly greatest value. Ties keep the earlier trait;
    /// if every value is 0 the answer is `Playful`.
    pub fn dominant(&self) -> PersonalityTrait {
        let mut dominant = PersonalityTrait::Playful;
        let mut max = 0.0;
        for t in &self.traits {
            if t.value > max {
                max = t.value;
                dominant = t.kind;
            }
        }
        dominant
    }

    pub fn suggested_state(&self) -> BotState {
        match self.dominant() {
            PersonalityTrait::Playful => BotState::Playful,
            PersonalityTrait::Curious => BotState::Curious,
            PersonalityTrait::Energetic => BotState::Excited,
            PersonalityTrait::Calm => BotState::Idle,
            PersonalityTrait::Adventurous | PersonalityTrait::Cautious => BotState::Idle,
        }
    }

    /// Pull an activity level slightly toward the Energetic trait.
    pub fn influence_activity(&self, activity: f32) -> f32 {
        lerp(activity, self.value(PersonalityTrait::Energetic), 0.02)
    }

    /// Clamp every value and rate back into range after deserialization.
    pub fn sanitize(&mut self) {
        for t in self.traits.iter_mut() {
            t.value = sanitize_f32(t.value, 0.5).clamp(0.0, 1.0);
            t.adaptation_rate = sanitize_f32(t.adaptation_rate, 0.01).clamp(0.0, 1.0);
        }
        for kind in PersonalityTrait::ALL {
            if !self.traits.iter().any(|t| t.kind == kind) {
                self.traits.push(TraitData::new(kind));
            }
        }
    }
}
