//! Headless game loop wiring the world to the spawning system.

use tunnel_hive_core::{Command, Event, GameOutcome, MapProvider};
use tunnel_hive_system_spawning::{SpawnContext, Spawning};
use tunnel_hive_world::{self as world, query, World};

use crate::config::RunConfig;

/// A running game plus the systems reacting to its events.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    spawning: Spawning,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            world: World::new(),
            spawning: Spawning::default(),
        }
    }

    pub(crate) const fn world(&self) -> &World {
        &self.world
    }

    /// Applies `command`, lets the spawning system react and applies whatever
    /// it requested. Returns every event in emission order.
    pub(crate) fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        let grid = query::grid(&self.world);
        let context = SpawnContext {
            hive_cell: grid.hive_cell(),
            hive_state: query::hive_state(&self.world),
            active_enemies: query::active_enemy_count(&self.world),
            speed_multiplier: query::difficulty(&self.world).enemy_speed_multiplier(),
        };
        let mut commands: Vec<Command> = Vec::new();
        self.spawning.handle(&events, &context, &mut commands);

        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }
}

/// Plays a full scripted session and returns it for inspection.
///
/// Stops early once the game is over or cleared.
pub(crate) fn play(config: &RunConfig) -> Session {
    let mut session = Session::new();
    report(&session.submit(Command::StartGame {
        difficulty: config.difficulty,
        seed: config.seed,
    }));

    let mut script = config.script.iter().peekable();
    for tick in 0..config.ticks {
        while let Some(entry) = script.next_if(|entry| entry.tick <= tick) {
            log::debug!("tick {tick}: {:?}", entry.action);
            report(&session.submit(entry.action.command()));
        }
        report(&session.submit(Command::Tick { dt: config.tick }));

        if query::outcome(session.world()) != GameOutcome::Running {
            log::info!("session ended after {} ticks", tick + 1);
            break;
        }
    }
    session
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } => {}
            Event::PlayerHit { lives_remaining } => {
                log::warn!("player hit, {lives_remaining} lives left");
            }
            other => log::debug!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tunnel_hive_core::Difficulty;

    fn config(ticks: u32) -> RunConfig {
        RunConfig {
            difficulty: Difficulty::Easy,
            seed: 3,
            ticks,
            tick: Duration::from_millis(50),
            script: Vec::new(),
        }
    }

    #[test]
    fn first_tick_spawns_an_enemy() {
        let session = play(&config(1));
        assert_eq!(query::active_enemy_count(session.world()), 1);
        assert_eq!(query::tick_index(session.world()), 1);
    }

    #[test]
    fn sessions_are_reproducible() {
        let first = play(&config(300));
        let second = play(&config(300));
        assert_eq!(
            query::enemy_view(first.world()).into_vec(),
            query::enemy_view(second.world()).into_vec()
        );
        assert_eq!(
            query::player(first.world()),
            query::player(second.world())
        );
    }

    #[test]
    fn commands_before_start_are_ignored() {
        let mut session = Session::new();
        assert!(session.submit(Command::Tick {
            dt: Duration::from_secs(5),
        })
        .is_empty());
        assert_eq!(query::active_enemy_count(session.world()), 0);
    }
}
