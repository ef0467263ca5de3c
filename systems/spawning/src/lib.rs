#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn requests.

use std::time::Duration;

use tunnel_hive_core::{CellCoord, Event, HiveState, SpawnSink};

const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_ACTIVE: usize = 15;
const DEFAULT_HIVE_THRESHOLD: u32 = 10;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    spawn_interval: Duration,
    max_active: usize,
    hive_threshold: u32,
}

impl Config {
    /// Creates a new configuration using the provided cadence and limits.
    #[must_use]
    pub const fn new(spawn_interval: Duration, max_active: usize, hive_threshold: u32) -> Self {
        Self {
            spawn_interval,
            max_active,
            hive_threshold,
        }
    }

    /// Minimum simulated time between two spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Largest number of enemies allowed on the field.
    #[must_use]
    pub const fn max_active(&self) -> usize {
        self.max_active
    }

    /// Number of spawns after which the hive opens.
    #[must_use]
    pub const fn hive_threshold(&self) -> u32 {
        self.hive_threshold
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPAWN_INTERVAL,
            DEFAULT_MAX_ACTIVE,
            DEFAULT_HIVE_THRESHOLD,
        )
    }
}

/// World facts the spawning system needs on each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnContext {
    /// Cell new enemies appear on.
    pub hive_cell: CellCoord,
    /// Current stage of the hive.
    pub hive_state: HiveState,
    /// Enemies currently on the field, dying ones included.
    pub active_enemies: usize,
    /// Difficulty-derived scalar for the base enemy speed.
    pub speed_multiplier: f32,
}

/// Pure system that emits one spawn request per elapsed interval while the
/// hive stands.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    accumulator: Duration,
    spawned: u32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    ///
    /// The accumulator starts full so the first tick of a game spawns.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: config.spawn_interval,
            spawned: 0,
        }
    }

    /// Number of spawn requests emitted since the game started.
    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Consumes events and world facts to emit spawn requests into `sink`.
    pub fn handle<S>(&mut self, events: &[Event], context: &SpawnContext, sink: &mut S)
    where
        S: SpawnSink + ?Sized,
    {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::GameStarted { .. } => {
                    self.reset();
                    accumulated = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if self.config.spawn_interval.is_zero() || accumulated.is_zero() {
            return;
        }

        if context.hive_state == HiveState::Destroyed {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator < self.config.spawn_interval
            || context.active_enemies >= self.config.max_active
        {
            return;
        }

        self.accumulator = Duration::ZERO;
        self.spawned = self.spawned.saturating_add(1);
        log::debug!(
            "spawn request {} at {} with multiplier {}",
            self.spawned,
            context.hive_cell,
            context.speed_multiplier
        );
        sink.spawn_enemy(context.hive_cell, context.speed_multiplier);

        if self.spawned == self.config.hive_threshold {
            sink.spawn_threshold_reached(self.spawned);
        }
    }

    fn reset(&mut self) {
        self.accumulator = self.config.spawn_interval;
        self.spawned = 0;
    }
}

impl Default for Spawning {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnel_hive_core::Command;

    fn context(active_enemies: usize) -> SpawnContext {
        SpawnContext {
            hive_cell: CellCoord::new(14, 13),
            hive_state: HiveState::Closed,
            active_enemies,
            speed_multiplier: 0.9,
        }
    }

    #[test]
    fn zero_interval_never_spawns() {
        let mut spawning = Spawning::new(Config::new(Duration::ZERO, 15, 10));
        let mut out: Vec<Command> = Vec::new();
        spawning.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(10),
            }],
            &context(0),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn full_field_defers_the_spawn() {
        let mut spawning = Spawning::default();
        let mut out: Vec<Command> = Vec::new();
        let tick = [Event::TimeAdvanced {
            dt: Duration::from_millis(50),
        }];

        spawning.handle(&tick, &context(15), &mut out);
        assert!(out.is_empty());

        spawning.handle(&tick, &context(14), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(spawning.spawned(), 1);
    }
}
