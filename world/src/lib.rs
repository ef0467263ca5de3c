#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tunnel Hive.
//!
//! All mutation flows through [`apply`]; adapters and systems observe the
//! world exclusively through [`query`] and the emitted events.

mod grid;
mod laser;
mod layout;
mod player;

use std::time::Duration;

use tunnel_hive_core::{
    CellCoord, Command, Difficulty, Direction, EnemyId, Event, GameOutcome, HiveState, Hitbox,
    LaserId, LifecycleState, MapProvider, PlayerPositionSource, TilePoint,
};
use tunnel_hive_system_motion::{advance, Advance, Enemy};

pub use grid::GridMap;
pub use layout::{staircase, DEFAULT_COLUMNS, DEFAULT_ROWS, HIVE_CELL, PLAYER_START};

use laser::Laser;
use player::Player;

/// Lives the player starts every game with.
pub const STARTING_LIVES: u32 = 3;
/// Points awarded for a laser hit on a moving enemy.
pub const ENEMY_HIT_POINTS: u32 = 300;
/// Points awarded for destroying the hive.
pub const HIVE_DESTROYED_POINTS: u32 = 1000;
/// Bonus awarded when the field is cleared.
pub const CLEAR_BONUS: u32 = 5000;

/// Represents the authoritative Tunnel Hive world state.
#[derive(Debug)]
pub struct World {
    grid: GridMap,
    player: Player,
    enemies: Vec<Enemy>,
    lasers: Vec<Laser>,
    difficulty: Difficulty,
    score: u32,
    lives: u32,
    outcome: GameOutcome,
    next_enemy_id: u32,
    next_laser_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates an idle world showing the staircase for seed zero.
    ///
    /// Nothing but [`Command::StartGame`] has an effect until a game starts.
    #[must_use]
    pub fn new() -> Self {
        let mut world = Self::with_grid(staircase(0), Difficulty::Medium);
        world.outcome = GameOutcome::Idle;
        world
    }

    /// Creates a running world on a caller-supplied grid.
    #[must_use]
    pub fn with_grid(grid: GridMap, difficulty: Difficulty) -> Self {
        Self {
            grid,
            player: Player::new(),
            enemies: Vec::new(),
            lasers: Vec::new(),
            difficulty,
            score: 0,
            lives: STARTING_LIVES,
            outcome: GameOutcome::Running,
            next_enemy_id: 0,
            next_laser_id: 0,
            tick_index: 0,
        }
    }

    fn reset(&mut self, grid: GridMap, difficulty: Difficulty) {
        *self = Self::with_grid(grid, difficulty);
    }

    fn award(&mut self, points: u32, out_events: &mut Vec<Event>) {
        self.score = self.score.saturating_add(points);
        out_events.push(Event::ScoreChanged { score: self.score });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.player.try_move(direction, &self.grid) {
            out_events.push(Event::PlayerMoved {
                to: self.player.position(),
            });
        }
    }

    fn dig(&mut self, out_events: &mut Vec<Event>) {
        let Some(target) = self.player.dig_target() else {
            out_events.push(Event::DigRejected { cell: None });
            return;
        };
        if target.x() < 0.0 || target.y() < 0.0 {
            out_events.push(Event::DigRejected { cell: None });
            return;
        }

        let cell = target.cell();
        let kind = self.grid.cell_at(cell);
        match (kind, self.grid.dig(cell)) {
            (Ok(kind), Ok(points)) => {
                log::debug!("dug {kind:?} block at {cell} for {points} points");
                self.player.begin_dig();
                out_events.push(Event::BlockDug { cell, kind, points });
                self.award(points, out_events);
            }
            (_, Err(error)) => {
                log::debug!("dig rejected: {error}");
                let cell = self.grid.contains(cell).then_some(cell);
                out_events.push(Event::DigRejected { cell });
            }
            (Err(error), Ok(_)) => log::warn!("dug a cell that could not be read: {error}"),
        }
    }

    fn fire_laser(&mut self, out_events: &mut Vec<Event>) {
        if !self.player.can_fire() {
            return;
        }
        let Some(direction) = self.player.heading() else {
            return;
        };
        let id = LaserId::new(self.next_laser_id);
        self.next_laser_id = self.next_laser_id.wrapping_add(1);
        self.lasers
            .push(Laser::new(id, self.player.position(), direction));
        self.player.start_cooldown(self.difficulty.laser_cooldown());
        out_events.push(Event::LaserFired {
            laser: id,
            direction,
        });
    }

    fn spawn_enemy(&mut self, cell: CellCoord, speed_multiplier: f32, out_events: &mut Vec<Event>) {
        if !self.grid.hive().is_spawning() {
            log::debug!("ignoring spawn at {cell}: the hive is destroyed");
            return;
        }
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        self.enemies.push(Enemy::spawn(id, cell, speed_multiplier));
        log::debug!("enemy {} spawned at {cell}", id.get());
        out_events.push(Event::EnemySpawned { enemy: id, cell });
    }

    fn upgrade_hive(&mut self, out_events: &mut Vec<Event>) {
        if self.grid.upgrade_hive() {
            log::info!("hive opened at {}", self.grid.hive_cell());
            out_events.push(Event::HiveOpened);
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.player.tick(dt);

        if self.resolve_player_collision(out_events) {
            return;
        }
        self.resolve_laser_hits(out_events);
        self.advance_enemies(dt, out_events);
        self.advance_lasers(out_events);

        if self.grid.hive_state() == HiveState::Destroyed
            && self.enemies.is_empty()
        {
            self.award(CLEAR_BONUS, out_events);
            self.outcome = GameOutcome::Cleared;
            log::info!("field cleared with score {}", self.score);
            out_events.push(Event::GameCleared { score: self.score });
        }
    }

    /// Handles a moving enemy touching the player. Returns whether the rest
    /// of the tick must be skipped.
    fn resolve_player_collision(&mut self, out_events: &mut Vec<Event>) -> bool {
        let player = self.player.hitbox();
        let touched = self
            .enemies
            .iter()
            .any(|enemy| enemy.state() == LifecycleState::Moving && enemy.hitbox().overlaps(&player));
        if !touched {
            return false;
        }

        self.lives = self.lives.saturating_sub(1);
        log::info!("player hit, {} lives remaining", self.lives);
        out_events.push(Event::PlayerHit {
            lives_remaining: self.lives,
        });

        if self.lives == 0 {
            self.outcome = GameOutcome::GameOver;
            log::info!("game over with score {}", self.score);
            out_events.push(Event::GameOver { score: self.score });
            return true;
        }

        for enemy in self.enemies.drain(..) {
            out_events.push(Event::EnemyRemoved { enemy: enemy.id() });
        }
        for laser in self.lasers.drain(..) {
            out_events.push(Event::LaserExpired { laser: laser.id() });
        }
        self.player.respawn();
        true
    }

    fn resolve_laser_hits(&mut self, out_events: &mut Vec<Event>) {
        let mut points = 0u32;
        let mut spent: Vec<LaserId> = Vec::new();

        for laser in &self.lasers {
            let hitbox = laser.hitbox();
            let Some(enemy) = self
                .enemies
                .iter_mut()
                .find(|enemy| enemy.state() == LifecycleState::Moving && enemy.hitbox().overlaps(&hitbox))
            else {
                continue;
            };
            match enemy.hit() {
                Ok(true) => {
                    log::debug!("laser {} hit enemy {}", laser.id().get(), enemy.id().get());
                    out_events.push(Event::EnemyHit {
                        enemy: enemy.id(),
                        laser: laser.id(),
                    });
                    points = points.saturating_add(ENEMY_HIT_POINTS);
                    spent.push(laser.id());
                }
                Ok(false) => {}
                Err(error) => log::warn!("laser {} ignored: {error}", laser.id().get()),
            }
        }

        if self.grid.hive_state() == HiveState::Open {
            let hive = Hitbox::at(TilePoint::at_cell(self.grid.hive_cell()));
            let striker = self
                .lasers
                .iter()
                .find(|laser| !spent.contains(&laser.id()) && laser.hitbox().overlaps(&hive))
                .map(Laser::id);
            if let Some(laser) = striker {
                if self.grid.strike_hive() {
                    log::info!("hive destroyed by laser {}", laser.get());
                    out_events.push(Event::HiveDestroyed);
                    points = points.saturating_add(HIVE_DESTROYED_POINTS);
                    spent.push(laser);
                }
            }
        }

        if spent.is_empty() {
            return;
        }
        self.lasers.retain(|laser| !spent.contains(&laser.id()));
        self.award(points, out_events);
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let player_cell = self.player.player_cell();
        let grid = &self.grid;
        self.enemies.retain_mut(|enemy| {
            match advance(enemy, player_cell, grid, dt) {
                Ok(Advance::Moving | Advance::Dying) => true,
                Ok(Advance::Stranded) => {
                    out_events.push(Event::PathNotFound { enemy: enemy.id() });
                    true
                }
                Ok(Advance::Removed) => {
                    out_events.push(Event::EnemyRemoved { enemy: enemy.id() });
                    false
                }
                Err(error) => {
                    log::warn!("dropping enemy {}: {error}", enemy.id().get());
                    out_events.push(Event::EnemyRemoved { enemy: enemy.id() });
                    false
                }
            }
        });
    }

    fn advance_lasers(&mut self, out_events: &mut Vec<Event>) {
        let grid = &self.grid;
        self.lasers.retain_mut(|laser| {
            let alive = laser.fly(grid);
            if !alive {
                out_events.push(Event::LaserExpired { laser: laser.id() });
            }
            alive
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once a game ends, every command except [`Command::StartGame`] is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Command::StartGame { difficulty, seed } = command {
        log::info!("starting {difficulty} game with seed {seed}");
        world.reset(staircase(seed), difficulty);
        out_events.push(Event::GameStarted { difficulty });
        return;
    }

    if world.outcome != GameOutcome::Running {
        log::trace!("ignoring {command:?} outside a running game");
        return;
    }

    match command {
        Command::StartGame { .. } => {}
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.tick(dt, out_events);
        }
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::Dig => world.dig(out_events),
        Command::FireLaser => world.fire_laser(out_events),
        Command::SpawnEnemy {
            cell,
            speed_multiplier,
        } => world.spawn_enemy(cell, speed_multiplier, out_events),
        Command::UpgradeHive => world.upgrade_hive(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{GridMap, World};
    use tunnel_hive_core::{
        Difficulty, EnemyView, GameOutcome, HiveState, LaserSnapshot, MapProvider, PlayerSnapshot,
    };

    /// Provides read-only access to the playfield.
    #[must_use]
    pub fn grid(world: &World) -> &GridMap {
        &world.grid
    }

    /// Running score of the current game.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Lives the player has left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Whether a game is idle, running or finished.
    #[must_use]
    pub fn outcome(world: &World) -> GameOutcome {
        world.outcome
    }

    /// Difficulty of the current game.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Number of ticks processed since the game started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of the enemies on the field.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of enemies on the field, dying ones included.
    #[must_use]
    pub fn active_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Lasers currently in flight, oldest first.
    #[must_use]
    pub fn lasers(world: &World) -> Vec<LaserSnapshot> {
        world.lasers.iter().map(|laser| laser.snapshot()).collect()
    }

    /// Current stage of the hive.
    #[must_use]
    pub fn hive_state(world: &World) -> HiveState {
        world.grid.hive_state()
    }
}
