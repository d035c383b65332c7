//! Procedural animation cues.
//!
//! The renderer owns the transform; this module only says which animations
//! run for a state and what offset/rotation they produce at a given time.

use deskbot_core::BotState;
use serde::{Deserialize, Serialize};

/// Which procedural animations are enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationCues {
    pub bobbing: bool,
    pub thinking_particles: bool,
    pub bounce: bool,
    pub spin: bool,
    /// Slows the spin down; has no visible effect without `spin`
    pub slow_motion: bool,
}

impl AnimationCues {
    /// Every state starts from all-off and enables its own set.
    pub fn for_state(state: BotState) -> Self {
        let mut cues = Self::default();
        match state {
            BotState::Idle => cues.bobbing = true,
            BotState::Curious => cues.thinking_particles = true,
            BotState::Excited => {
                cues.bounce = true;
                cues.spin = true;
            }
            BotState::Sleepy => cues.slow_motion = true,
            BotState::Playful => {
                cues.spin = true;
                cues.thinking_particles = true;
            }
        }
        cues
    }

    pub fn any(&self) -> bool {
        self.bobbing || self.thinking_particles || self.bounce || self.spin || self.slow_motion
    }

    /// Vertical offset from the rest position at time `t` (seconds).
    /// Bobbing and bounce add up when both are on.
    pub fn vertical_offset(&self, settings: &AnimationSettings, t: f32) -> f32 {
        let phase = t + settings.phase_offset;
        let mut offset = 0.0;
        if self.bobbing {
            offset += (phase * settings.bobbing_speed).sin() * settings.bobbing_height;
        }
        if self.bounce {
            offset += (phase * settings.bounce_frequency).sin().abs() * settings.bounce_height;
        }
        offset
    }

    /// Spin rate in degrees per second, zero when not spinning.
    pub fn spin_rate(&self, settings: &AnimationSettings) -> f32 {
        if !self.spin {
            return 0.0;
        }
        if self.slow_motion {
            settings.spin_speed * settings.slow_motion_factor
        } else {
            settings.spin_speed
        }
    }
}

/// Tuning for the procedural animator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub bobbing_height: f32,
    pub bobbing_speed: f32,
    /// Degrees per second
    pub spin_speed: f32,
    pub bounce_height: f32,
    pub bounce_frequency: f32,
    pub slow_motion_factor: f32,
    /// Start phase so several bots don't move in lockstep
    pub phase_offset: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            bobbing_height: 0.1,
            bobbing_speed: 2.0,
            spin_speed: 180.0,
            bounce_height: 0.2,
            bounce_frequency: 3.0,
            slow_motion_factor: 0.3,
            phase_offset: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cues_per_state() {
        let idle = AnimationCues::for_state(BotState::Idle);
        assert!(idle.bobbing && !idle.spin && !idle.bounce);

        let curious = AnimationCues::for_state(BotState::Curious);
        assert!(curious.thinking_particles && !curious.bobbing);

        let excited = AnimationCues::for_state(BotState::Excited);
        assert!(excited.bounce && excited.spin && !excited.thinking_particles);

        let sleepy = AnimationCues::for_state(BotState::Sleepy);
        assert!(sleepy.slow_motion && !sleepy.spin);

        let playful = AnimationCues::for_state(BotState::Playful);
        assert!(playful.spin && playful.thinking_particles && !playful.bounce);

        assert!(BotState::ALL.iter().all(|s| AnimationCues::for_state(*s).any()));
    }

    #[test]
    fn test_bounce_never_goes_below_rest() {
        let settings = AnimationSettings::default();
        let cues = AnimationCues::for_state(BotState::Excited);
        for i in 0..200 {
            let offset = cues.vertical_offset(&settings, i as f32 * 0.05);
            assert!((0.0..=settings.bounce_height + 1e-6).contains(&offset));
        }
    }

    #[test]
    fn test_bobbing_is_symmetric() {
        let settings = AnimationSettings::default();
        let cues = AnimationCues::for_state(BotState::Idle);
        assert_eq!(cues.vertical_offset(&settings, 0.0), 0.0);
        let quarter = std::f32::consts::FRAC_PI_2 / settings.bobbing_speed;
        assert!((cues.vertical_offset(&settings, quarter) - settings.bobbing_height).abs() < 1e-5);
        assert!(
            (cues.vertical_offset(&settings, 3.0 * quarter) + settings.bobbing_height).abs() < 1e-5
        );
    }

    #[test]
    fn test_spin_rate() {
        let settings = AnimationSettings::default();
        assert_eq!(AnimationCues::for_state(BotState::Excited).spin_rate(&settings), 180.0);
        assert_eq!(AnimationCues::for_state(BotState::Idle).spin_rate(&settings), 0.0);

        let mut sleepy_spin = AnimationCues::for_state(BotState::Sleepy);
        sleepy_spin.spin = true;
        assert!((sleepy_spin.spin_rate(&settings) - 54.0).abs() < 1e-4);
    }
}
