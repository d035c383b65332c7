//! State driver: owns the current state and decides *when* to ask the engine.
//!
//! The driver wires the construction graph explicitly (engine, activity
//! tracker, personality, one shared generator) and enforces the timing
//! policy the engine knows nothing about:
//!
//! - a per-state dwell timer with jitter gates every decision
//! - a cooldown suppresses decisions entirely (no confidence update) until it
//!   has elapsed since the last accepted change and the last decision
//! - interactions and weather force a state, bypassing the engine

use crate::activity::ActivityTracker;
use crate::clock::{is_day_time, Clock};
use crate::engine::EmotionEngine;
use deskbot_core::{
    secs_to_duration, BotSnapshot, BotState, DeskbotConfig, DriverConfig, EngineContext,
    PersonalityTraits,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest jitter fraction applied to a dwell, whatever the config says.
const MAX_DWELL_JITTER: f32 = 0.99;

/// What kind of interaction the user had with the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    #[default]
    Plain,
    Playful,
    Calm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
}

impl Weather {
    /// State this weather forces, if any.
    pub fn forced_state(self) -> Option<BotState> {
        match self {
            Weather::Sunny => Some(BotState::Playful),
            Weather::Rainy => Some(BotState::Sleepy),
            Weather::Cloudy | Weather::Stormy | Weather::Snowy => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    Engine,
    Interaction,
    Weather,
}

/// An accepted state change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateChange {
    pub from: BotState,
    pub to: BotState,
    pub cause: ChangeCause,
    /// Engine confidence at the time of the change
    pub confidence: f32,
    /// Clock time of the change
    pub at: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverStats {
    pub ticks: u64,
    /// Calls into the engine
    pub decisions: u64,
    /// Accepted changes of any cause
    pub changes: u64,
    /// Expired dwell timers that hit the cooldown
    pub cooldown_suppressed: u64,
}

pub struct StateDriver<C: Clock> {
    config: DriverConfig,
    adaptation_speed: f32,
    clock: C,
    engine: EmotionEngine,
    tracker: ActivityTracker,
    traits: PersonalityTraits,
    /// Single generator for every random draw (sampling and jitter)
    rng: StdRng,
    state: BotState,
    dwell_remaining: Duration,
    last_tick: Duration,
    last_change_at: Option<Duration>,
    last_decision_at: Option<Duration>,
    last_interaction_at: Option<Duration>,
    stats: DriverStats,
}

impl<C: Clock> StateDriver<C> {
    pub fn new(config: &DeskbotConfig, clock: C) -> Self {
        let rng = match config.driver.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let last_tick = clock.elapsed();
        let mut driver = Self {
            config: config.driver.clone(),
            adaptation_speed: config.memory.adaptation_speed,
            clock,
            engine: EmotionEngine::new(),
            tracker: ActivityTracker::new(config.memory.adaptation_speed),
            traits: PersonalityTraits::default(),
            rng,
            state: BotState::Idle,
            dwell_remaining: Duration::ZERO,
            last_tick,
            last_change_at: None,
            last_decision_at: None,
            last_interaction_at: None,
            stats: DriverStats::default(),
        };
        driver.arm_dwell();
        driver
    }

    /// Swap in a differently tuned engine.
    pub fn with_engine(mut self, engine: EmotionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn confidence(&self) -> f32 {
        self.engine.confidence()
    }

    pub fn activity_level(&self) -> f32 {
        self.tracker.activity_level()
    }

    pub fn interaction_count(&self) -> u64 {
        self.tracker.interaction_count()
    }

    pub fn dwell_remaining(&self) -> Duration {
        self.dwell_remaining
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn traits(&self) -> &PersonalityTraits {
        &self.traits
    }

    pub fn tracker(&self) -> &ActivityTracker {
        &self.tracker
    }

    pub fn engine(&self) -> &EmotionEngine {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Advance by however much time the clock says has passed.
    pub fn tick(&mut self) -> Option<StateChange> {
        let now = self.clock.elapsed();
        let dt = now.saturating_sub(self.last_tick);
        self.last_tick = now;
        self.stats.ticks += 1;

        let recently = self.recently_interacted(now);
        self.tracker.update_activity_level(recently);

        self.dwell_remaining = self.dwell_remaining.saturating_sub(dt);
        if !self.dwell_remaining.is_zero() {
            return None;
        }

        let change = self.determine_next_state(now);
        self.arm_dwell();
        change
    }

    /// Force Excited, bypassing the engine, and restart the dwell timer.
    pub fn record_interaction(&mut self, kind: InteractionKind) -> Option<StateChange> {
        let now = self.clock.elapsed();
        self.last_interaction_at = Some(now);
        self.tracker.record_interaction(self.clock.hour_of_day() / 24.0);
        match kind {
            InteractionKind::Playful => self.traits.on_playful_interaction(),
            InteractionKind::Calm => self.traits.on_calm_interaction(),
            InteractionKind::Plain => {}
        }
        tracing::debug!(
            "Interaction ({:?}), total {}",
            kind,
            self.tracker.interaction_count()
        );
        self.force(BotState::Excited, ChangeCause::Interaction, now)
    }

    /// Sunny weather forces Playful, rain forces Sleepy; the rest is ignored.
    pub fn apply_weather(&mut self, weather: Weather) -> Option<StateChange> {
        let forced = weather.forced_state()?;
        let now = self.clock.elapsed();
        self.force(forced, ChangeCause::Weather, now)
    }

    pub fn record_spot_visit(&mut self, spot: [f32; 3]) {
        self.tracker.record_spot_visit(spot);
    }

    pub fn snapshot(&self) -> BotSnapshot {
        BotSnapshot {
            state: self.state,
            confidence: self.engine.confidence(),
            activity_level: self.tracker.activity_level(),
            interaction_count: self.tracker.interaction_count(),
            preferred_play_time: self.tracker.preferred_play_time(),
            favorite_spots: self.tracker.spot_history(),
            traits: self.traits.clone(),
        }
    }

    /// Resume from a saved snapshot. Timers restart from now.
    pub fn restore(&mut self, snapshot: &BotSnapshot) {
        let mut snapshot = snapshot.clone();
        snapshot.sanitize();
        self.state = snapshot.state;
        self.engine = self.engine.clone().with_confidence(snapshot.confidence);
        self.tracker = ActivityTracker::from_snapshot(&snapshot, self.adaptation_speed);
        self.traits = snapshot.traits;
        self.last_tick = self.clock.elapsed();
        self.last_change_at = None;
        self.last_decision_at = None;
        self.last_interaction_at = None;
        self.arm_dwell();
        tracing::info!(
            "Restored bot in {} (confidence={:.2}, interactions={})",
            self.state,
            self.engine.confidence(),
            self.tracker.interaction_count()
        );
    }

    fn determine_next_state(&mut self, now: Duration) -> Option<StateChange> {
        if self.in_cooldown(now) {
            self.stats.cooldown_suppressed += 1;
            tracing::trace!("Dwell expired during cooldown, skipping decision");
            return None;
        }

        let ctx = self.context(now);
        self.last_decision_at = Some(now);
        self.stats.decisions += 1;

        let decision = self.engine.decide(self.state, &ctx, &mut self.rng);
        if decision.next != self.state {
            Some(self.transition(decision.next, ChangeCause::Engine, now))
        } else {
            None
        }
    }

    fn context(&mut self, now: Duration) -> EngineContext {
        let activity = self.traits.influence_activity(self.tracker.activity_level());
        self.tracker.set_activity_level(activity);
        let is_day = is_day_time(
            self.clock.hour_of_day(),
            self.config.day_start_hour,
            self.config.day_end_hour,
        );
        EngineContext::new(activity, self.recently_interacted(now), is_day)
    }

    fn force(&mut self, to: BotState, cause: ChangeCause, now: Duration) -> Option<StateChange> {
        let change = (to != self.state).then(|| self.transition(to, cause, now));
        self.arm_dwell();
        change
    }

    fn transition(&mut self, to: BotState, cause: ChangeCause, now: Duration) -> StateChange {
        let from = self.state;
        self.state = to;
        self.last_change_at = Some(now);
        self.stats.changes += 1;
        tracing::info!("Bot state changed from {} to {} ({:?})", from, to, cause);
        StateChange {
            from,
            to,
            cause,
            confidence: self.engine.confidence(),
            at: now,
        }
    }

    fn in_cooldown(&self, now: Duration) -> bool {
        let anchor = match (self.last_change_at, self.last_decision_at) {
            (Some(a), Some(b)) => a.max(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => return false,
        };
        now.saturating_sub(anchor) < self.config.cooldown()
    }

    fn recently_interacted(&self, now: Duration) -> bool {
        self.last_interaction_at
            .is_some_and(|at| now.saturating_sub(at) < self.config.interaction_window())
    }

    /// Re-arm the dwell timer for the current state.
    fn arm_dwell(&mut self) {
        let multiplier = dwell_multiplier(self.state);
        // Configs built in code skip validation; keep the factor positive
        let jitter = if self.config.dwell_jitter > 0.0 {
            let j = self.config.dwell_jitter.min(MAX_DWELL_JITTER);
            self.rng.gen_range((1.0 - j)..(1.0 + j))
        } else {
            1.0
        };
        self.dwell_remaining =
            secs_to_duration(self.config.base_dwell_secs * multiplier * jitter);
    }
}

/// Excited burns out fast, Sleepy lingers.
pub fn dwell_multiplier(state: BotState) -> f32 {
    match state {
        BotState::Idle => 0.5,
        BotState::Sleepy => 2.0,
        BotState::Excited => 0.3,
        BotState::Curious | BotState::Playful => 1.0,
    }
}
