//! Mood label, colour and material effects.

use deskbot_core::BotState;
use serde::{Deserialize, Serialize};

/// Linear RGB colour, channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const GREY: Rgb = Rgb::new(0.5, 0.5, 0.5);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
    pub const YELLOW: Rgb = Rgb::new(1.0, 0.92, 0.016);
    pub const CYAN: Rgb = Rgb::new(0.0, 1.0, 1.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `t` is clamped to [0, 1].
    pub fn lerp(self, to: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb::new(
            self.r + (to.r - self.r) * t,
            self.g + (to.g - self.g) * t,
            self.b + (to.b - self.b) * t,
        )
    }

    /// Fully saturated, full value colour at `hue` (wraps into [0, 1)).
    pub fn from_hue(hue: f32) -> Rgb {
        let h = hue.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let (q, t) = (1.0 - f, f);
        match sector as u8 {
            0 => Rgb::new(1.0, t, 0.0),
            1 => Rgb::new(q, 1.0, 0.0),
            2 => Rgb::new(0.0, 1.0, t),
            3 => Rgb::new(0.0, q, 1.0),
            4 => Rgb::new(t, 0.0, 1.0),
            _ => Rgb::new(1.0, 0.0, q),
        }
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

/// Text shown over the bot and the colour it is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodIndicator {
    pub label: &'static str,
    pub color: Rgb,
}

impl MoodIndicator {
    pub fn for_state(state: BotState) -> Self {
        let color = match state {
            BotState::Idle => Rgb::GREY,
            BotState::Curious => Rgb::BLUE,
            BotState::Excited => Rgb::YELLOW,
            BotState::Sleepy => Rgb::CYAN,
            BotState::Playful => Rgb::GREEN,
        };
        Self {
            label: state.as_str(),
            color,
        }
    }
}

/// Material colour effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Short cyan flicker when something catches the bot's eye
    Blink,
    /// Slow red pulse for as long as the bot is excited
    Pulse,
    /// Hue cycle for as long as the bot is playful
    Rainbow,
}

const BLINK_DURATION_SECS: f32 = 0.5;
const BLINK_RATE: f32 = 4.0;
const PULSE_SPEED: f32 = 0.3;
const RAINBOW_HUE_RATE: f32 = 0.5;

impl Effect {
    pub fn for_state(state: BotState) -> Option<Effect> {
        match state {
            BotState::Curious => Some(Effect::Blink),
            BotState::Excited => Some(Effect::Pulse),
            BotState::Playful => Some(Effect::Rainbow),
            BotState::Idle | BotState::Sleepy => None,
        }
    }

    /// Whether this effect belongs to `state`. Pulse and rainbow stop as soon
    /// as the bot leaves their state.
    pub fn is_active(self, state: BotState) -> bool {
        Effect::for_state(state) == Some(self)
    }

    /// Blink is one-shot; the others run until the state changes.
    pub fn is_running(self, elapsed_secs: f32) -> bool {
        match self {
            Effect::Blink => elapsed_secs < BLINK_DURATION_SECS,
            Effect::Pulse | Effect::Rainbow => true,
        }
    }

    /// Material colour `elapsed_secs` after the effect started over `base`.
    pub fn color_at(self, base: Rgb, elapsed_secs: f32) -> Rgb {
        let t = elapsed_secs.max(0.0);
        match self {
            Effect::Blink if self.is_running(t) => {
                base.lerp(Rgb::CYAN, ping_pong(t * BLINK_RATE, 1.0))
            }
            Effect::Blink => base,
            Effect::Pulse => base.lerp(Rgb::RED, ping_pong(t * PULSE_SPEED, 1.0)),
            Effect::Rainbow => Rgb::from_hue(t * RAINBOW_HUE_RATE),
        }
    }
}

/// Triangle wave over [0, length].
fn ping_pong(t: f32, length: f32) -> f32 {
    length - ((t.rem_euclid(length * 2.0)) - length).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-4 && (a.g - b.g).abs() < 1e-4 && (a.b - b.b).abs() < 1e-4
    }

    #[test]
    fn test_mood_colours() {
        assert_eq!(MoodIndicator::for_state(BotState::Idle).color, Rgb::GREY);
        assert_eq!(MoodIndicator::for_state(BotState::Curious).color, Rgb::BLUE);
        assert_eq!(MoodIndicator::for_state(BotState::Excited).color, Rgb::YELLOW);
        assert_eq!(MoodIndicator::for_state(BotState::Sleepy).color, Rgb::CYAN);
        assert_eq!(MoodIndicator::for_state(BotState::Playful).color, Rgb::GREEN);
        assert_eq!(MoodIndicator::for_state(BotState::Playful).label, "Playful");
    }

    #[test]
    fn test_effect_activity() {
        assert!(Effect::Pulse.is_active(BotState::Excited));
        assert!(!Effect::Pulse.is_active(BotState::Playful));
        assert!(Effect::Rainbow.is_active(BotState::Playful));
        assert!(Effect::Blink.is_active(BotState::Curious));
        assert!(BotState::ALL
            .iter()
            .filter(|s| matches!(s, BotState::Idle | BotState::Sleepy))
            .all(|s| Effect::for_state(*s).is_none()));
    }

    #[test]
    fn test_blink_is_one_shot() {
        let base = Rgb::BLUE;
        assert_eq!(Effect::Blink.color_at(base, 0.0), base);
        // Peak of the first flicker
        assert!(close(Effect::Blink.color_at(base, 0.25), Rgb::CYAN));
        assert!(!Effect::Blink.is_running(0.6));
        assert_eq!(Effect::Blink.color_at(base, 0.6), base);
    }

    #[test]
    fn test_pulse_reaches_red() {
        let base = Rgb::YELLOW;
        assert_eq!(Effect::Pulse.color_at(base, 0.0), base);
        assert!(close(Effect::Pulse.color_at(base, 1.0 / PULSE_SPEED), Rgb::RED));
        assert!(close(Effect::Pulse.color_at(base, 2.0 / PULSE_SPEED), base));
    }

    #[test]
    fn test_rainbow_cycles() {
        assert!(close(Effect::Rainbow.color_at(Rgb::GREEN, 0.0), Rgb::RED));
        // Hue 1/3 after 2/3 s
        assert!(close(Effect::Rainbow.color_at(Rgb::GREEN, 2.0 / 3.0), Rgb::GREEN));
        assert!(close(Effect::Rainbow.color_at(Rgb::GREEN, 2.0), Rgb::RED));
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::RED.to_hex(), "#ff0000");
        assert_eq!(Rgb::GREY.to_hex(), "#808080");
        assert_eq!(Rgb::new(2.0, -1.0, 1.0).to_hex(), "#ff00ff");
    }

    #[test]
    fn test_ping_pong() {
        assert_eq!(ping_pong(0.0, 1.0), 0.0);
        assert_eq!(ping_pong(1.0, 1.0), 1.0);
        assert!((ping_pong(1.5, 1.0) - 0.5).abs() < 1e-6);
        assert_eq!(ping_pong(2.0, 1.0), 0.0);
    }
}
