//! Async host for the state driver.
//!
//! The LimbicSystem confines one [`StateDriver`] to a single tokio task:
//! - heartbeat ticks come from a `tokio::time::interval`
//! - stimuli (interactions, weather, spot visits) arrive over an mpsc channel
//! - a [`MoodMarker`] is published on a watch channel after every step
//! - every accepted [`StateChange`] goes out on a broadcast channel
//!
//! The driver is never shared, so it needs no lock of its own.

use crate::clock::Clock;
use crate::driver::{InteractionKind, StateChange, StateDriver, Weather};
use crate::heartbeat::HeartbeatConfig;
use anyhow::Context;
use deskbot_core::{BotSnapshot, BotState};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Changes buffered per subscriber before it starts to lag.
const CHANGE_CAPACITY: usize = 256;

/// External events delivered to the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    Interaction(InteractionKind),
    Weather(Weather),
    SpotVisit([f32; 3]),
}

/// Compressed bot state for presentation consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodMarker {
    pub state: BotState,
    pub confidence: f32,
    pub activity_level: f32,
    pub interaction_count: u64,
    /// Most recent accepted change, if any
    pub last_change: Option<StateChange>,
}

impl MoodMarker {
    fn from_driver<C: Clock>(driver: &StateDriver<C>, last_change: Option<StateChange>) -> Self {
        Self {
            state: driver.state(),
            confidence: driver.confidence(),
            activity_level: driver.activity_level(),
            interaction_count: driver.interaction_count(),
            last_change,
        }
    }
}

pub struct LimbicSystem {
    /// Channel to send stimuli
    stimulus_tx: mpsc::Sender<Stimulus>,

    /// Receiver for marker updates (cloneable)
    state_watch_rx: watch::Receiver<MoodMarker>,

    /// Accepted changes, one message each
    change_tx: broadcast::Sender<StateChange>,

    /// Heartbeat task; yields the final snapshot when the channel closes
    task: JoinHandle<BotSnapshot>,
}

impl LimbicSystem {
    /// Spawn the heartbeat task around `driver`. Must be called inside a tokio runtime.
    pub fn spawn<C: Clock + 'static>(heartbeat: HeartbeatConfig, driver: StateDriver<C>) -> Self {
        let (stimulus_tx, stimulus_rx) = mpsc::channel(64);
        let (state_watch_tx, state_watch_rx) =
            watch::channel(MoodMarker::from_driver(&driver, None));

        let (change_tx, _) = broadcast::channel(CHANGE_CAPACITY);

        let task = tokio::spawn(run_heartbeat(
            heartbeat,
            driver,
            stimulus_rx,
            state_watch_tx,
            change_tx.clone(),
        ));

        Self {
            stimulus_tx,
            state_watch_rx,
            change_tx,
            task,
        }
    }

    /// Send a stimulus to the driver
    pub async fn send(&self, stimulus: Stimulus) -> anyhow::Result<()> {
        self.stimulus_tx
            .send(stimulus)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send stimulus: {}", e))
    }

    /// Latest published marker
    pub fn marker(&self) -> MoodMarker {
        *self.state_watch_rx.borrow()
    }

    /// Subscribe to marker updates
    pub fn subscribe(&self) -> watch::Receiver<MoodMarker> {
        self.state_watch_rx.clone()
    }

    /// Every change accepted after this call, in order. A receiver that falls
    /// more than 256 changes behind gets `RecvError::Lagged`.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StateChange> {
        self.change_tx.subscribe()
    }

    /// Stop the heartbeat and return the final snapshot.
    pub async fn shutdown(self) -> anyhow::Result<BotSnapshot> {
        drop(self.stimulus_tx);
        self.task.await.context("Limbic heartbeat task failed")
    }
}

async fn run_heartbeat<C: Clock>(
    heartbeat: HeartbeatConfig,
    mut driver: StateDriver<C>,
    mut stimulus_rx: mpsc::Receiver<Stimulus>,
    state_watch_tx: watch::Sender<MoodMarker>,
    change_tx: broadcast::Sender<StateChange>,
) -> BotSnapshot {
    let mut interval = tokio::time::interval(heartbeat.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_change = None;

    loop {
        tokio::select! {
            // Regular heartbeat
            _ = interval.tick() => {
                if let Some(change) = driver.tick() {
                    last_change = Some(change);
                    // No subscribers is fine
                    let _ = change_tx.send(change);
                }
            }

            // External stimulus received; a closed channel ends the task
            stimulus = stimulus_rx.recv() => {
                let Some(stimulus) = stimulus else { break };
                tracing::trace!("Processing stimulus: {:?}", stimulus);
                let change = match stimulus {
                    Stimulus::Interaction(kind) => driver.record_interaction(kind),
                    Stimulus::Weather(weather) => driver.apply_weather(weather),
                    Stimulus::SpotVisit(spot) => {
                        driver.record_spot_visit(spot);
                        None
                    }
                };
                if let Some(change) = change {
                    last_change = Some(change);
                    let _ = change_tx.send(change);
                }
            }
        }

        // Broadcast new mood marker
        let _ = state_watch_tx.send(MoodMarker::from_driver(&driver, last_change));
    }

    let stats = driver.stats();
    tracing::info!(
        "Limbic heartbeat stopped after {} ticks ({} decisions, {} changes, {} suppressed)",
        stats.ticks,
        stats.decisions,
        stats.changes,
        stats.cooldown_suppressed
    );
    driver.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use deskbot_core::DeskbotConfig;
    use std::time::Duration;
    use tokio::time::timeout;

    fn seeded_config() -> DeskbotConfig {
        let mut cfg = DeskbotConfig::default();
        cfg.driver.seed = Some(5);
        cfg
    }

    fn spawn_manual() -> (LimbicSystem, ManualClock) {
        let clock = ManualClock::new();
        let driver = StateDriver::new(&seeded_config(), clock.clone());
        (LimbicSystem::spawn(HeartbeatConfig::testing(), driver), clock)
    }

    #[tokio::test]
    async fn test_limbic_system_creation() {
        let (limbic, _clock) = spawn_manual();
        let marker = limbic.marker();
        assert_eq!(marker.state, BotState::Idle);
        assert!((marker.confidence - 0.5).abs() < 1e-6);
        assert!(marker.last_change.is_none());
    }

    #[tokio::test]
    async fn test_interaction_forces_excited() {
        let (limbic, _clock) = spawn_manual();
        let mut rx = limbic.subscribe();

        limbic
            .send(Stimulus::Interaction(InteractionKind::Playful))
            .await
            .unwrap();

        let marker = *timeout(
            Duration::from_secs(2),
            rx.wait_for(|m| m.interaction_count == 1),
        )
        .await
        .expect("marker update timed out")
        .unwrap();

        assert_eq!(marker.state, BotState::Excited);
        let change = marker.last_change.unwrap();
        assert_eq!(change.to, BotState::Excited);
        assert_eq!(change.cause, crate::driver::ChangeCause::Interaction);
    }

    #[tokio::test]
    async fn test_weather_stimulus() {
        let (limbic, _clock) = spawn_manual();
        let mut rx = limbic.subscribe();

        limbic.send(Stimulus::Weather(Weather::Rainy)).await.unwrap();

        let marker = *timeout(
            Duration::from_secs(2),
            rx.wait_for(|m| m.state == BotState::Sleepy),
        )
        .await
        .expect("marker update timed out")
        .unwrap();
        assert_eq!(marker.interaction_count, 0);
    }

    #[tokio::test]
    async fn test_shutdown_returns_snapshot() {
        let (limbic, _clock) = spawn_manual();
        limbic
            .send(Stimulus::Interaction(InteractionKind::Plain))
            .await
            .unwrap();
        limbic.send(Stimulus::SpotVisit([1.0, 0.0, 2.0])).await.unwrap();

        let snapshot = limbic.shutdown().await.unwrap();
        assert_eq!(snapshot.interaction_count, 1);
        assert_eq!(snapshot.state, BotState::Excited);
        assert_eq!(snapshot.favorite_spots.len(), 1);
    }

    #[tokio::test]
    async fn test_heartbeat_drives_decisions() {
        let mut cfg = seeded_config();
        cfg.driver.cooldown_secs = 0.0;
        let clock = ManualClock::new();
        let driver = StateDriver::new(&cfg, clock.clone());
        let limbic = LimbicSystem::spawn(HeartbeatConfig::testing(), driver);

        // Idle dwell is at most 3s; jump well past it and let the heartbeat notice
        clock.advance(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = limbic.shutdown().await.unwrap();
        assert!(
            (snapshot.confidence - 0.5).abs() > 1e-6,
            "a decision should have moved confidence"
        );
    }

    #[tokio::test]
    async fn test_every_change_is_delivered() {
        let (limbic, _clock) = spawn_manual();
        let mut changes = limbic.subscribe_changes();

        // Three forced changes back to back, faster than any marker poll
        limbic
            .send(Stimulus::Interaction(InteractionKind::Plain))
            .await
            .unwrap();
        limbic.send(Stimulus::Weather(Weather::Sunny)).await.unwrap();
        limbic.send(Stimulus::Weather(Weather::Rainy)).await.unwrap();
        let snapshot = limbic.shutdown().await.unwrap();
        assert_eq!(snapshot.state, BotState::Sleepy);

        let mut seen = Vec::new();
        while let Ok(change) = changes.recv().await {
            seen.push((change.from, change.to));
        }
        assert_eq!(
            seen,
            vec![
                (BotState::Idle, BotState::Excited),
                (BotState::Excited, BotState::Playful),
                (BotState::Playful, BotState::Sleepy),
            ]
        );
    }

    #[test]
    fn test_marker_serializes() {
        let driver = StateDriver::new(&seeded_config(), ManualClock::new());
        let marker = MoodMarker::from_driver(&driver, None);
        let json = serde_json::to_string(&marker).unwrap();
        assert!(json.contains("\"state\":\"idle\""));
    }
}
