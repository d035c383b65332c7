//! Emotion engine: context-biased, confidence-weighted state transitions.
//!
//! Each decision starts from a fresh copy of the prior matrix for the current
//! state, layers additive context biases on top, adds persistence bias when the
//! engine is confident, renormalizes and samples. Priors are never written to.
//!
//! The engine is stateless with respect to time. It owns only its confidence
//! scalar; the current state belongs to the driver.

use deskbot_core::state::lerp;
use deskbot_core::{BotState, EngineContext, TransitionMatrix};
use rand::Rng;
use serde::Serialize;

/// Confidence at construction.
const INITIAL_CONFIDENCE: f32 = 0.5;
/// Above this, persistence bias kicks in.
const PERSISTENCE_THRESHOLD: f32 = 0.7;
/// Numerator of the additive persistence bias (`0.4 / confidence`).
const PERSISTENCE_BIAS: f32 = 0.4;

/// Confidence drifts here (slowly) after a change...
const CHANGE_TARGET: f32 = 0.8;
const CHANGE_RATE: f32 = 0.05;
/// ...and here (faster) after staying put.
const STAY_TARGET: f32 = 0.3;
const STAY_RATE: f32 = 0.1;

const LOW_ACTIVITY: f32 = 0.3;
const HIGH_ACTIVITY: f32 = 0.7;

/// Prior transition matrices, one per source state. Normalized on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMatrices {
    rows: [TransitionMatrix; BotState::COUNT],
}

impl BaseMatrices {
    /// Rows indexed by [`BotState::index`]. Each row is normalized.
    pub fn from_rows(mut rows: [TransitionMatrix; BotState::COUNT]) -> Self {
        for row in rows.iter_mut() {
            row.normalize();
        }
        Self { rows }
    }

    /// The tuned defaults.
    pub fn builtin() -> Self {
        Self::from_rows([
            // Idle: mostly drifts into curiosity, rarely excited
            TransitionMatrix::from_weights([0.30, 0.40, 0.10, 0.15, 0.05]),
            // Curious: likely to turn playful
            TransitionMatrix::from_weights([0.20, 0.25, 0.20, 0.05, 0.30]),
            // Excited: winds down to idle
            TransitionMatrix::from_weights([0.40, 0.10, 0.20, 0.05, 0.25]),
            // Sleepy: likely to stay sleepy
            TransitionMatrix::from_weights([0.25, 0.10, 0.05, 0.50, 0.10]),
            // Playful: often tips into excitement
            TransitionMatrix::from_weights([0.20, 0.20, 0.30, 0.05, 0.25]),
        ])
    }

    /// Prior for a source state. Every variant of the closed enum has a row,
    /// so there is no missing-row fallback to take.
    pub fn get(&self, state: BotState) -> TransitionMatrix {
        self.rows[state.index()]
    }
}

impl Default for BaseMatrices {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Outcome of one decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub next: BotState,
    /// Confidence after this decision's update
    pub confidence: f32,
}

#[derive(Debug, Clone)]
pub struct EmotionEngine {
    base: BaseMatrices,
    confidence: f32,
}

impl EmotionEngine {
    pub fn new() -> Self {
        Self::with_base_matrices(BaseMatrices::builtin())
    }

    pub fn with_base_matrices(base: BaseMatrices) -> Self {
        Self {
            base,
            confidence: INITIAL_CONFIDENCE,
        }
    }

    /// Start from a previously saved confidence (clamped to [0, 1]).
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            INITIAL_CONFIDENCE
        };
        self
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn base_matrices(&self) -> &BaseMatrices {
        &self.base
    }

    /// The normalized distribution `decide` would sample from, without
    /// sampling or touching confidence.
    pub fn distribution(&self, current: BotState, ctx: &EngineContext) -> TransitionMatrix {
        let mut adjusted = self.base.get(current);

        apply_context_bias(&mut adjusted, ctx);

        // A confident bot is sticky: boost the current state, shrink the rest
        if self.confidence > PERSISTENCE_THRESHOLD {
            let bias = PERSISTENCE_BIAS / self.confidence;
            adjusted.set(current, adjusted.get(current) + bias);
            adjusted.scale_away_from(current, (1.0 - self.confidence) * 0.5);
        }

        // Biases are applied unclamped; negatives are cut once, here
        adjusted.clamp_negative();
        if adjusted.is_degenerate() {
            tracing::warn!(
                "Degenerate transition distribution from {} ({:?}), falling back to uniform",
                current,
                ctx
            );
            adjusted = TransitionMatrix::uniform();
        }
        adjusted.normalize();

        tracing::trace!(
            "Distribution from {} (confidence={:.3}): {:?}",
            current,
            self.confidence,
            adjusted.weights()
        );
        adjusted
    }

    /// Pick the next state and update confidence.
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        current: BotState,
        ctx: &EngineContext,
        rng: &mut R,
    ) -> Decision {
        let next = self.distribution(current, ctx).sample(rng);
        let before = self.confidence;
        self.confidence = smooth_confidence(self.confidence, next != current);

        tracing::debug!(
            "Decided {} -> {} (activity={:.2}, interacted={}, day={}, confidence {:.3} -> {:.3})",
            current,
            next,
            ctx.activity_level,
            ctx.recently_interacted,
            ctx.is_day_time,
            before,
            self.confidence
        );

        Decision {
            next,
            confidence: self.confidence,
        }
    }
}

impl Default for EmotionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Additive context biases. Order matters: nothing is clamped in between, so
/// each step sees the raw result of the previous one.
fn apply_context_bias(m: &mut TransitionMatrix, ctx: &EngineContext) {
    use BotState::*;

    // Interaction pushes toward excitement
    if ctx.recently_interacted {
        m.add(Excited, 0.3);
        m.add(Playful, 0.2);
        m.add(Idle, -0.3);
        m.add(Sleepy, -0.2);
    }

    // Night pulls toward sleep
    if !ctx.is_day_time {
        m.add(Sleepy, 0.4);
        m.add(Idle, 0.1);
        m.add(Excited, -0.3);
        m.add(Playful, -0.2);
    }

    if ctx.activity_level < LOW_ACTIVITY {
        m.add(Sleepy, 0.5);
        m.add(Idle, 0.2);
        m.add(Excited, -0.3);
        m.add(Playful, -0.4);
    } else if ctx.activity_level > HIGH_ACTIVITY {
        m.add(Curious, 0.2);
        m.add(Playful, 0.3);
        m.add(Excited, 0.1);
    }
}

/// Exponential smoothing toward 0.8 after a change, 0.3 after staying.
fn smooth_confidence(confidence: f32, changed: bool) -> f32 {
    if changed {
        lerp(confidence, CHANGE_TARGET, CHANGE_RATE)
    } else {
        lerp(confidence, STAY_TARGET, STAY_RATE)
    }
}
