//! # Deskbot Expression
//!
//! Turns a [`BotState`](deskbot_core::BotState) into what a renderer shows:
//!
//! - [`AnimationCues`]: which procedural animations run (bobbing, spin, ...)
//! - [`MoodIndicator`]: the label and colour of the mood text
//! - [`Effect`]: material colour effects layered on top of the base colour
//!
//! Everything here is a pure function of the state and, for time-varying
//! output, of the seconds elapsed since the state was entered.

mod cues;
mod mood;

pub use cues::{AnimationCues, AnimationSettings};
pub use mood::{Effect, MoodIndicator, Rgb};

use deskbot_core::BotState;
use serde::Serialize;

/// Everything a renderer needs for one state, computed at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Expression {
    pub cues: AnimationCues,
    pub mood: MoodIndicator,
    pub effect: Option<Effect>,
}

impl Expression {
    pub fn for_state(state: BotState) -> Self {
        let expression = Self {
            cues: AnimationCues::for_state(state),
            mood: MoodIndicator::for_state(state),
            effect: Effect::for_state(state),
        };
        tracing::trace!("Expression for {}: {:?}", state, expression);
        expression
    }

    /// Material colour `elapsed_secs` after entering the state.
    pub fn color_at(&self, elapsed_secs: f32) -> Rgb {
        match self.effect {
            Some(effect) => effect.color_at(self.mood.color, elapsed_secs),
            None => self.mood.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_for_every_state() {
        for state in BotState::ALL {
            let expression = Expression::for_state(state);
            assert_eq!(expression.mood.label, state.as_str());
            if let Some(effect) = expression.effect {
                assert!(effect.is_active(state));
            }
        }
    }

    #[test]
    fn test_sleepy_colour_is_static() {
        let expression = Expression::for_state(BotState::Sleepy);
        assert_eq!(expression.color_at(0.0), expression.color_at(12.5));
        assert_eq!(expression.color_at(3.0), Rgb::CYAN);
    }

    #[test]
    fn test_expression_serializes() {
        let json = serde_json::to_string(&Expression::for_state(BotState::Excited)).unwrap();
        assert!(json.contains("\"bounce\":true"));
        assert!(json.contains("\"effect\":\"pulse\""));
    }
}
