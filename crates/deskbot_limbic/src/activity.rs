//! Activity tracker: the bot's slow memory of how lively it should be.
//!
//! Every value moves by exponential smoothing at `adaptation_speed` per update,
//! so a single interaction or visit barely registers while a habit does.

use deskbot_core::state::lerp;
use deskbot_core::BotSnapshot;
use std::collections::VecDeque;

/// How many favourite-spot samples to remember.
const MAX_SPOT_HISTORY: usize = 5;

/// Floor for the activity target when nobody is around.
const MIN_IDLE_ACTIVITY: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct ActivityTracker {
    /// Preferred time to play, as a fraction of the day (0.0 - 1.0)
    preferred_play_time: f32,
    /// How active the bot should be (0.0 - 1.0)
    activity_level: f32,
    interaction_count: u64,
    favorite_spot: [f32; 3],
    /// Favourite spot after each of the last few visits, oldest first
    spot_history: VecDeque<[f32; 3]>,
    adaptation_speed: f32,
}

impl ActivityTracker {
    pub fn new(adaptation_speed: f32) -> Self {
        let preferred_play_time = 0.5;
        Self {
            preferred_play_time,
            activity_level: preferred_play_time,
            interaction_count: 0,
            favorite_spot: [0.0; 3],
            spot_history: VecDeque::with_capacity(MAX_SPOT_HISTORY),
            adaptation_speed: adaptation_speed.clamp(0.0, 1.0),
        }
    }

    /// Rebuild from a snapshot. The favourite spot is the latest history entry.
    pub fn from_snapshot(snapshot: &BotSnapshot, adaptation_speed: f32) -> Self {
        let mut tracker = Self::new(adaptation_speed);
        tracker.preferred_play_time = snapshot.preferred_play_time.clamp(0.0, 1.0);
        tracker.activity_level = snapshot.activity_level.clamp(0.0, 1.0);
        tracker.interaction_count = snapshot.interaction_count;
        let skip = snapshot.favorite_spots.len().saturating_sub(MAX_SPOT_HISTORY);
        tracker.spot_history = snapshot.favorite_spots.iter().skip(skip).copied().collect();
        if let Some(last) = tracker.spot_history.back() {
            tracker.favorite_spot = *last;
        }
        tracker
    }

    pub fn activity_level(&self) -> f32 {
        self.activity_level
    }

    pub fn set_activity_level(&mut self, level: f32) {
        if level.is_finite() {
            self.activity_level = level.clamp(0.0, 1.0);
        }
    }

    pub fn preferred_play_time(&self) -> f32 {
        self.preferred_play_time
    }

    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }

    pub fn favorite_spot(&self) -> [f32; 3] {
        self.favorite_spot
    }

    pub fn spot_history(&self) -> Vec<[f32; 3]> {
        self.spot_history.iter().copied().collect()
    }

    /// Count an interaction and drift the preferred play time toward now.
    pub fn record_interaction(&mut self, day_fraction: f32) {
        self.interaction_count += 1;
        self.preferred_play_time = lerp(
            self.preferred_play_time,
            day_fraction.clamp(0.0, 1.0),
            self.adaptation_speed,
        );
    }

    pub fn record_spot_visit(&mut self, spot: [f32; 3]) {
        if !spot.iter().all(|c| c.is_finite()) {
            tracing::warn!("Ignoring non-finite spot visit {:?}", spot);
            return;
        }
        for (fav, target) in self.favorite_spot.iter_mut().zip(spot) {
            *fav = lerp(*fav, target, self.adaptation_speed);
        }
        if self.spot_history.len() >= MAX_SPOT_HISTORY {
            self.spot_history.pop_front();
        }
        self.spot_history.push_back(self.favorite_spot);
    }

    /// Drift activity toward 1.0 after recent interaction, otherwise toward
    /// the preferred play time (scaled down, never below 0.2).
    pub fn update_activity_level(&mut self, recently_interacted: bool) {
        let target = if recently_interacted {
            1.0
        } else {
            (self.preferred_play_time * 0.8).max(MIN_IDLE_ACTIVITY)
        };
        self.activity_level = lerp(self.activity_level, target, self.adaptation_speed);
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(0.01)
    }
}
