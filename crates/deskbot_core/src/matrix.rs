//! Transition matrix: one source state's weights over the five destinations.
//!
//! Invariants:
//! - after [`TransitionMatrix::normalize`] the weights sum to 1.0, unless the
//!   sum was ≤ 0, in which case normalization is a no-op
//! - after any mutator ([`set`](TransitionMatrix::set),
//!   [`scale_away_from`](TransitionMatrix::scale_away_from),
//!   [`clamp`](TransitionMatrix::clamp)) every weight lies in [0, 1]
//! - [`add`](TransitionMatrix::add) is plain field arithmetic and clamps nothing
//! - [`clamp_negative`](TransitionMatrix::clamp_negative) only floors at 0
//!
//! Mutators never renormalize; callers normalize before sampling.

use crate::state::BotState;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransitionMatrix {
    /// Weights indexed by [`BotState::index`]
    weights: [f32; BotState::COUNT],
}

impl TransitionMatrix {
    /// Build from weights in declaration order (Idle, Curious, Excited, Sleepy, Playful).
    /// Values are taken as-is; call [`clamp`](Self::clamp) or
    /// [`normalize`](Self::normalize) as needed.
    pub fn from_weights(weights: [f32; BotState::COUNT]) -> Self {
        Self { weights }
    }

    /// Equal mass on every state.
    pub fn uniform() -> Self {
        Self {
            weights: [1.0 / BotState::COUNT as f32; BotState::COUNT],
        }
    }

    pub fn weights(&self) -> [f32; BotState::COUNT] {
        self.weights
    }

    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// True when there is no positive mass left to normalize.
    pub fn is_degenerate(&self) -> bool {
        self.sum() <= 0.0
    }

    /// Divide every weight by the total. No-op when the total is ≤ 0.
    pub fn normalize(&mut self) {
        let total = self.sum();
        if total > 0.0 {
            for w in self.weights.iter_mut() {
                *w /= total;
            }
        }
    }

    /// Weight for a destination state.
    pub fn get(&self, state: BotState) -> f32 {
        self.weights[state.index()]
    }

    /// Overwrite one weight, then clamp all five into [0, 1].
    pub fn set(&mut self, state: BotState, value: f32) {
        self.weights[state.index()] = value;
        self.clamp();
    }

    /// Unclamped additive adjustment. Intermediate values may leave [0, 1].
    pub fn add(&mut self, state: BotState, delta: f32) {
        self.weights[state.index()] += delta;
    }

    /// Shrink every weight except `state` by `(1 - scale)`, then clamp.
    ///
    /// `scale` is clamped to [0, 1]: 0 leaves the matrix untouched, 1 zeroes
    /// every other destination.
    pub fn scale_away_from(&mut self, state: BotState, scale: f32) {
        let factor = 1.0 - scale.clamp(0.0, 1.0);
        let keep = state.index();
        for (i, w) in self.weights.iter_mut().enumerate() {
            if i != keep {
                *w *= factor;
            }
        }
        self.clamp();
    }

    /// Clamp all five weights into [0, 1]. NaN becomes 0.
    pub fn clamp(&mut self) {
        for w in self.weights.iter_mut() {
            *w = if w.is_nan() { 0.0 } else { w.clamp(0.0, 1.0) };
        }
    }

    /// Cut negative weights to 0 and leave the rest alone. NaN becomes 0.
    ///
    /// Weights above 1 survive, so the relative mass produced by additive
    /// biases is kept through the next [`normalize`](Self::normalize).
    pub fn clamp_negative(&mut self) {
        for w in self.weights.iter_mut() {
            *w = if w.is_nan() { 0.0 } else { w.max(0.0) };
        }
    }

    /// Draw the next state.
    ///
    /// Walks the weights in declaration order, subtracting each from a
    /// uniform draw in [0, 1) and returning the first state whose weight
    /// exceeds the remainder. Falls through to `Playful` when nothing
    /// matches (unnormalized or zero-sum matrices).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BotState {
        let mut draw: f32 = rng.gen();
        for state in BotState::ALL {
            let w = self.weights[state.index()];
            if draw < w {
                return state;
            }
            draw -= w;
        }
        BotState::Playful
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn idle_prior() -> TransitionMatrix {
        TransitionMatrix::from_weights([0.3, 0.4, 0.1, 0.15, 0.05])
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let mut m = TransitionMatrix::from_weights([2.0, 1.0, 1.0, 0.0, 0.0]);
        m.normalize();
        assert!((m.sum() - 1.0).abs() < 1e-5);
        assert!((m.get(BotState::Idle) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_idempotent() {
        let mut m = idle_prior();
        m.normalize();
        let once = m;
        m.normalize();
        for state in BotState::ALL {
            assert!((m.get(state) - once.get(state)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normalize_zero_sum_is_noop() {
        let mut m = TransitionMatrix::default();
        m.normalize();
        assert_eq!(m.weights(), [0.0; 5]);

        let mut negative = TransitionMatrix::from_weights([-0.2, 0.1, 0.0, 0.0, 0.0]);
        negative.normalize();
        assert_eq!(negative.weights(), [-0.2, 0.1, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_clamps_every_weight() {
        let mut m = TransitionMatrix::from_weights([-0.5, 1.7, 0.2, 0.0, 0.0]);
        m.set(BotState::Excited, 2.5);
        assert_eq!(m.weights(), [0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_clamp_negative_keeps_large_weights() {
        let mut m = TransitionMatrix::from_weights([0.55, 0.1, -0.55, 1.4, f32::NAN]);
        m.clamp_negative();
        assert_eq!(m.weights(), [0.55, 0.1, 0.0, 1.4, 0.0]);
    }

    #[test]
    fn test_add_does_not_clamp() {
        let mut m = idle_prior();
        m.add(BotState::Playful, -0.4);
        assert!(m.get(BotState::Playful) < 0.0);
    }

    #[test]
    fn test_scale_away_from_keeps_target() {
        let mut m = idle_prior();
        m.scale_away_from(BotState::Curious, 0.5);
        assert!((m.get(BotState::Curious) - 0.4).abs() < 1e-6);
        assert!((m.get(BotState::Idle) - 0.15).abs() < 1e-6);
        assert!((m.get(BotState::Playful) - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_scale_away_from_clamps_scale() {
        let mut m = idle_prior();
        m.scale_away_from(BotState::Idle, 3.0);
        assert_eq!(m.weights(), [0.3, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sample_single_state() {
        let m = TransitionMatrix::from_weights([1.0, 0.0, 0.0, 0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            assert_eq!(m.sample(&mut rng), BotState::Idle);
        }
    }

    #[test]
    fn test_sample_zero_sum_falls_through_to_playful() {
        let m = TransitionMatrix::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(m.sample(&mut rng), BotState::Playful);
        }
    }

    #[test]
    fn test_sample_frequencies_track_weights() {
        let mut m = idle_prior();
        m.normalize();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 5];
        let draws = 20_000;
        for _ in 0..draws {
            counts[m.sample(&mut rng).index()] += 1;
        }
        for state in BotState::ALL {
            let freq = counts[state.index()] as f32 / draws as f32;
            assert!(
                (freq - m.get(state)).abs() < 0.02,
                "{} frequency {} vs weight {}",
                state,
                freq,
                m.get(state)
            );
        }
    }

    #[test]
    fn test_uniform() {
        let m = TransitionMatrix::uniform();
        assert!((m.sum() - 1.0).abs() < 1e-6);
        assert!(!m.is_degenerate());
        assert!(TransitionMatrix::default().is_degenerate());
    }
}
