#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Step movement for enemies chasing the player.
//!
//! Every tick a moving enemy follows its private waypoint list, replanning
//! with [`find_path`] once the list is consumed. Displacement is capped at the
//! enemy's speed and never carries over past a waypoint, except at L-shaped
//! turns where part of the next leg is taken early so the enemy does not stall
//! in the corner. Paths are not invalidated when terrain changes; an enemy
//! finishes its current route before it looks again.

use std::time::Duration;

use tunnel_hive_core::{
    CellCoord, EnemyId, EnemySnapshot, Facing, Hitbox, LifecycleError, LifecycleState,
    MapProvider, TilePoint,
};
use tunnel_hive_system_lifecycle::EnemyLifecycle;
use tunnel_hive_system_pathfinding::{find_path, Path};

/// Speed of an enemy before the difficulty multiplier, in tiles per tick.
pub const BASE_ENEMY_SPEED: f32 = 0.5;

/// Per-axis distance under which a waypoint counts as reached.
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// Share of the speed that may be spent on the following leg at a turn.
const CORNER_BONUS: f32 = 0.5;

const CORNER_THRESHOLD_RANGE: (f32, f32) = (0.0, 0.5);

/// Per-axis window around a turn waypoint inside which the corner is cut.
///
/// Grows with speed so that fast enemies, which land further from the exact
/// waypoint, still catch the turn. Clamped to `[0, 0.5]`.
#[must_use]
pub fn corner_threshold(speed: f32) -> f32 {
    let (min, max) = CORNER_THRESHOLD_RANGE;
    (0.1 + (speed - 0.15) * 0.3).clamp(min, max)
}

/// Result of advancing an enemy by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The enemy followed its path, or stood on the player's cell.
    Moving,
    /// No path to the player exists; the enemy idles and retries next tick.
    Stranded,
    /// The enemy is dying and stays put.
    Dying,
    /// The death finished on this tick; the enemy must be dropped.
    Removed,
}

impl Advance {
    /// Reports whether the caller should remove the enemy now.
    #[must_use]
    pub const fn is_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}

/// A single enemy: continuous position, private path and lifecycle.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    position: TilePoint,
    speed: f32,
    facing: Facing,
    path: Path,
    cursor: usize,
    planned_from: CellCoord,
    stride: u32,
    lifecycle: EnemyLifecycle,
}

impl Enemy {
    /// Creates an enemy on `cell` moving at [`BASE_ENEMY_SPEED`] scaled by
    /// `speed_multiplier`.
    #[must_use]
    pub fn spawn(id: EnemyId, cell: CellCoord, speed_multiplier: f32) -> Self {
        Self::with_speed(id, TilePoint::at_cell(cell), BASE_ENEMY_SPEED * speed_multiplier)
    }

    /// Creates an enemy at an arbitrary position with an explicit speed.
    #[must_use]
    pub fn with_speed(id: EnemyId, position: TilePoint, speed: f32) -> Self {
        Self {
            id,
            position,
            speed,
            facing: Facing::Right,
            path: Path::default(),
            cursor: 0,
            planned_from: position.cell(),
            stride: 0,
            lifecycle: EnemyLifecycle::new(),
        }
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Fractional position.
    #[must_use]
    pub const fn position(&self) -> TilePoint {
        self.position
    }

    /// Cell containing the enemy, rounding down.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        self.position.cell()
    }

    /// Distance travelled per tick.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Horizontal facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Current route.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Index of the waypoint being approached.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ticks spent moving, for walk-cycle selection.
    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    /// Lifecycle stage.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Lifecycle of the enemy.
    #[must_use]
    pub const fn lifecycle(&self) -> &EnemyLifecycle {
        &self.lifecycle
    }

    /// Unit collision box anchored at the enemy's position.
    #[must_use]
    pub const fn hitbox(&self) -> Hitbox {
        Hitbox::at(self.position)
    }

    /// Registers a laser hit; see [`EnemyLifecycle::hit`].
    ///
    /// # Errors
    ///
    /// Propagates [`LifecycleError::InvalidStateTransition`] for removed enemies.
    pub fn hit(&mut self) -> Result<bool, LifecycleError> {
        self.lifecycle.hit()
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            cell: self.cell(),
            facing: self.facing,
            state: self.state(),
            death_progress: self.lifecycle.death_progress(),
            stride: self.stride,
            hitbox: self.hitbox(),
        }
    }

    fn path_consumed(&self) -> bool {
        self.cursor >= self.path.len()
    }

    /// Cell the enemy was heading away from when it approached `cursor`.
    fn previous_waypoint(&self) -> CellCoord {
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.path.get(index))
            .unwrap_or(self.planned_from)
    }
}

/// Advances `enemy` by a single tick toward `player_cell`.
///
/// Moving enemies walk; dying enemies stay frozen while their death timer
/// consumes `dt`.
///
/// # Errors
///
/// Advancing an enemy that was already removed reports
/// [`LifecycleError::InvalidStateTransition`].
pub fn advance<M>(
    enemy: &mut Enemy,
    player_cell: CellCoord,
    map: &M,
    dt: Duration,
) -> Result<Advance, LifecycleError>
where
    M: MapProvider + ?Sized,
{
    match enemy.lifecycle.state() {
        LifecycleState::Moving => Ok(walk(enemy, player_cell, map)),
        LifecycleState::Dying => {
            if enemy.lifecycle.tick(dt)? {
                Ok(Advance::Removed)
            } else {
                Ok(Advance::Dying)
            }
        }
        LifecycleState::Removed => Err(LifecycleError::InvalidStateTransition {
            state: LifecycleState::Removed,
            action: "advance",
        }),
    }
}

fn walk<M>(enemy: &mut Enemy, player_cell: CellCoord, map: &M) -> Advance
where
    M: MapProvider + ?Sized,
{
    if enemy.path_consumed() {
        let start = enemy.cell();
        enemy.cursor = 0;
        enemy.planned_from = start;
        match find_path(start, player_cell, map) {
            Ok(path) => {
                log::debug!(
                    "enemy {} planned {} waypoints from {start}",
                    enemy.id.get(),
                    path.len()
                );
                enemy.path = path;
            }
            Err(error) => {
                log::debug!("enemy {} idles: {error}", enemy.id.get());
                enemy.path = Path::default();
                return Advance::Stranded;
            }
        }
    }

    let Some(waypoint) = enemy.path.get(enemy.cursor) else {
        return Advance::Moving;
    };
    let mut target = TilePoint::at_cell(waypoint);
    let origin = enemy.position;
    let distance = origin.distance(target);

    if distance > 0.0 {
        let travel = enemy.speed.min(distance);
        let mut dx = (target.x() - origin.x()) / distance * travel;
        let mut dy = (target.y() - origin.y()) / distance * travel;
        let landing = origin.offset(dx, dy);

        if let Some(following) = enemy.path.get(enemy.cursor + 1) {
            let threshold = corner_threshold(enemy.speed);
            if is_turn(enemy.previous_waypoint(), following)
                && (landing.x() - target.x()).abs() < threshold
                && (landing.y() - target.y()).abs() < threshold
            {
                enemy.cursor += 1;
                target = TilePoint::at_cell(following);
                let remaining = landing.distance(target);
                if remaining > 0.0 {
                    let bonus = (enemy.speed * CORNER_BONUS).min(remaining);
                    dx += (target.x() - landing.x()) / remaining * bonus;
                    dy += (target.y() - landing.y()) / remaining * bonus;
                }
            }
        }

        enemy.position = origin.offset(dx, dy);
        enemy.facing = enemy.facing.toward(dx);
        enemy.stride = enemy.stride.wrapping_add(1);
    }

    // After a cut `target` is the waypoint following the turn.
    if (enemy.position.x() - target.x()).abs() < ARRIVAL_EPSILON
        && (enemy.position.y() - target.y()).abs() < ARRIVAL_EPSILON
    {
        enemy.cursor += 1;
    }

    Advance::Moving
}

/// A waypoint is a turn when the cells on either side of it differ on both axes.
fn is_turn(previous: CellCoord, following: CellCoord) -> bool {
    previous.column().abs_diff(following.column()) == 1
        && previous.row().abs_diff(following.row()) == 1
}
