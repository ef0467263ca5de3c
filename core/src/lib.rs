#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tunnel Hive engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the simulation systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically.
//!
//! Positions come in two flavours: [`CellCoord`] addresses a whole grid tile
//! while [`TilePoint`] carries fractional tile-space coordinates used for
//! smooth motion.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points credited for digging a [`CellKind::Normal`] block.
pub const NORMAL_BLOCK_POINTS: u32 = 100;
/// Points credited for digging a [`CellKind::Special`] block.
pub const SPECIAL_BLOCK_POINTS: u32 = 300;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Regenerates the map and resets every piece of game state.
    StartGame {
        /// Difficulty that selects enemy speed and laser cooldown.
        difficulty: Difficulty,
        /// Seed used to scatter special blocks across the layout.
        seed: u64,
    },
    /// Advances the simulation by one tick covering the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player move half a tile in the given direction.
    MovePlayer {
        /// Direction of travel.
        direction: Direction,
    },
    /// Requests that the player dig the block in front of them.
    Dig,
    /// Requests that the player fire a laser in their current heading.
    FireLaser,
    /// Requests creation of an enemy at the provided cell.
    SpawnEnemy {
        /// Cell the enemy appears on, normally the hive.
        cell: CellCoord,
        /// Difficulty-derived scalar applied to the base enemy speed.
        speed_multiplier: f32,
    },
    /// Requests that a closed hive open up and become targetable.
    UpgradeHive,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh game began.
    GameStarted {
        /// Difficulty selected for the game.
        difficulty: Difficulty,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player changed position.
    PlayerMoved {
        /// Position after the move.
        to: TilePoint,
    },
    /// Confirms that a block was dug out of the grid.
    BlockDug {
        /// Cell that became empty.
        cell: CellCoord,
        /// Kind of block that was removed.
        kind: CellKind,
        /// Points credited for the block.
        points: u32,
    },
    /// Reports that a dig request found nothing to dig.
    DigRejected {
        /// Cell the dig was aimed at, if it lies inside the grid.
        cell: Option<CellCoord>,
    },
    /// Confirms that a laser left the player.
    LaserFired {
        /// Identifier allocated to the laser.
        laser: LaserId,
        /// Heading of the laser.
        direction: Direction,
    },
    /// Reports that a laser left the grid or struck a block.
    LaserExpired {
        /// Identifier of the expired laser.
        laser: LaserId,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Cell the enemy occupies after spawning.
        cell: CellCoord,
    },
    /// Reports that an enemy could not find a path and idled this tick.
    PathNotFound {
        /// Identifier of the idle enemy.
        enemy: EnemyId,
    },
    /// Confirms that a laser struck a moving enemy.
    EnemyHit {
        /// Identifier of the enemy that started dying.
        enemy: EnemyId,
        /// Laser consumed by the hit.
        laser: LaserId,
    },
    /// Confirms that an enemy left the active set.
    EnemyRemoved {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// Announces that the hive opened and may now be destroyed.
    HiveOpened,
    /// Announces that the hive was destroyed.
    HiveDestroyed,
    /// Reports that an enemy reached the player.
    PlayerHit {
        /// Lives left after the hit.
        lives_remaining: u32,
    },
    /// Reports the running score after it changed.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Announces that the player ran out of lives.
    GameOver {
        /// Final score.
        score: u32,
    },
    /// Announces that the hive fell and every enemy is gone.
    GameCleared {
        /// Final score including the clear bonus.
        score: u32,
    },
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open tunnel that can be walked.
    Empty,
    /// Ordinary diggable block.
    Normal,
    /// Rare diggable block worth more points.
    Special,
}

impl CellKind {
    /// Decodes the numeric layout code used by map literals (`0`, `1`, `2`).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Normal),
            2 => Some(Self::Special),
            _ => None,
        }
    }

    /// Numeric layout code of the cell kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Normal => 1,
            Self::Special => 2,
        }
    }

    /// Points awarded for digging the block, or `None` when nothing is there.
    #[must_use]
    pub const fn points(self) -> Option<u32> {
        match self {
            Self::Empty => None,
            Self::Normal => Some(NORMAL_BLOCK_POINTS),
            Self::Special => Some(SPECIAL_BLOCK_POINTS),
        }
    }

    /// Reports whether the cell holds a block.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// Stage of the enemy spawn structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HiveState {
    /// The hive is gone and no longer spawns.
    Destroyed,
    /// The hive spawns but cannot be damaged.
    Closed,
    /// The hive spawns and can be destroyed by a laser.
    Open,
}

/// Cardinal directions used for player movement, digging and lasers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit offset of the direction as `(column, row)` deltas.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Horizontal facing reported to renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Sprite faces toward decreasing columns.
    Left,
    /// Sprite faces toward increasing columns.
    #[default]
    Right,
}

impl Facing {
    /// Derives the facing from a horizontal displacement, keeping `self` when
    /// the displacement is zero.
    #[must_use]
    pub fn toward(self, dx: f32) -> Self {
        if dx > 0.0 {
            Self::Right
        } else if dx < 0.0 {
            Self::Left
        } else {
            self
        }
    }
}

/// Difficulty levels selectable when a game starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Slow enemies and a short laser cooldown.
    Easy,
    /// Balanced settings.
    #[default]
    Medium,
    /// Fast enemies and a long laser cooldown.
    Hard,
}

impl Difficulty {
    /// Scalar applied to the base enemy speed.
    #[must_use]
    pub const fn enemy_speed_multiplier(self) -> f32 {
        match self {
            Self::Easy => 0.3,
            Self::Medium => 0.9,
            Self::Hard => 1.2,
        }
    }

    /// Minimum simulated time between two laser shots.
    #[must_use]
    pub const fn laser_cooldown(self) -> Duration {
        match self {
            Self::Easy => Duration::from_millis(2_500),
            Self::Medium => Duration::from_millis(3_500),
            Self::Hard => Duration::from_millis(4_500),
        }
    }

    /// Lowercase name of the difficulty.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(value.to_owned())),
        }
    }
}

/// Error returned when a string names no known difficulty.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown difficulty `{0}`, expected easy, medium or hard")]
pub struct ParseDifficultyError(String);

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a laser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaserId(u32);

impl LaserId {
    /// Creates a new laser identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring cell one step in `direction`, or `None` below zero.
    ///
    /// Upper bounds are not checked; callers validate against their grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(CellCoord::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Fractional position measured in tile units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TilePoint {
    x: f32,
    y: f32,
}

impl TilePoint {
    /// Creates a new tile-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point located at the integer origin of `cell`.
    #[must_use]
    pub fn at_cell(cell: CellCoord) -> Self {
        Self::new(cell.column() as f32, cell.row() as f32)
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Cell containing the point, rounding each axis down.
    ///
    /// Negative coordinates collapse onto the zero row or column.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        CellCoord::new(floor_to_index(self.x), floor_to_index(self.y))
    }

    /// Returns the point translated by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: TilePoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

fn floor_to_index(value: f32) -> u32 {
    if value <= 0.0 || !value.is_finite() {
        0
    } else {
        value.floor() as u32
    }
}

/// Unit-tile axis-aligned box anchored at an entity's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    origin: TilePoint,
}

impl Hitbox {
    /// Creates a unit hitbox whose upper-left corner sits at `origin`.
    #[must_use]
    pub const fn at(origin: TilePoint) -> Self {
        Self { origin }
    }

    /// Upper-left corner of the box.
    #[must_use]
    pub const fn origin(&self) -> TilePoint {
        self.origin
    }

    /// Reports whether two unit boxes overlap with positive area.
    #[must_use]
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        (self.origin.x - other.origin.x).abs() < 1.0
            && (self.origin.y - other.origin.y).abs() < 1.0
    }
}

/// Coarse lifecycle stage of an enemy as observed from outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// The enemy walks toward the player.
    Moving,
    /// The enemy was hit and plays out its death.
    Dying,
    /// The enemy left the simulation.
    Removed,
}

/// What the player is currently doing, for animation purposes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// Walking or standing.
    #[default]
    Idle,
    /// Swinging at a block.
    Digging,
}

/// Overall state of the current game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// No game has started yet.
    #[default]
    Idle,
    /// A game is in progress.
    Running,
    /// The player ran out of lives.
    GameOver,
    /// The hive fell and every enemy is gone.
    Cleared,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Fractional position of the enemy.
    pub position: TilePoint,
    /// Cell containing the enemy's position.
    pub cell: CellCoord,
    /// Horizontal facing.
    pub facing: Facing,
    /// Lifecycle stage.
    pub state: LifecycleState,
    /// Fraction of the death animation elapsed, present while dying.
    pub death_progress: Option<f32>,
    /// Number of ticks the enemy spent moving, for walk-cycle selection.
    pub stride: u32,
    /// Unit box used for collision tests.
    pub hitbox: Hitbox,
}

/// Read-only snapshot describing all enemies in the grid.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Fractional position of the player.
    pub position: TilePoint,
    /// Horizontal facing.
    pub facing: Facing,
    /// Current action.
    pub action: PlayerAction,
    /// Fraction of the dig swing elapsed, present while digging.
    pub dig_progress: Option<f32>,
    /// Heading used for the next dig or laser, if the player has moved.
    pub heading: Option<Direction>,
}

/// Immutable representation of a laser in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaserSnapshot {
    /// Identifier of the laser.
    pub id: LaserId,
    /// Fractional position of the laser.
    pub position: TilePoint,
    /// Heading of the laser.
    pub direction: Direction,
}

/// Grid queries and mutations consumed by pathfinding and the game loop.
pub trait MapProvider {
    /// Grid dimensions as `(columns, rows)`.
    fn dimensions(&self) -> (u32, u32);

    /// Contents of `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when `cell` lies outside the grid.
    fn cell_at(&self, cell: CellCoord) -> Result<CellKind, GridError>;

    /// Reports whether `cell` can be walked over.
    fn is_passable(&self, cell: CellCoord) -> bool;

    /// Clears the block at `cell`, returning the points it was worth.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotDiggable`] for empty or out-of-bounds cells.
    fn dig(&mut self, cell: CellCoord) -> Result<u32, GridError>;

    /// Cell occupied by the hive.
    fn hive_cell(&self) -> CellCoord;

    /// Current stage of the hive.
    fn hive_state(&self) -> HiveState;
}

/// Source of the player's position for choosing pathfinding goals.
pub trait PlayerPositionSource {
    /// Cell containing the player, truncated toward zero.
    fn player_cell(&self) -> CellCoord;
}

/// Receiver of spawn requests produced by the spawning system.
pub trait SpawnSink {
    /// An enemy should be created at `cell` with the given speed multiplier.
    fn spawn_enemy(&mut self, cell: CellCoord, speed_multiplier: f32);

    /// The number of recorded spawns reached the hive upgrade threshold.
    fn spawn_threshold_reached(&mut self, spawned: u32);
}

impl SpawnSink for Vec<Command> {
    fn spawn_enemy(&mut self, cell: CellCoord, speed_multiplier: f32) {
        self.push(Command::SpawnEnemy {
            cell,
            speed_multiplier,
        });
    }

    fn spawn_threshold_reached(&mut self, _spawned: u32) {
        self.push(Command::UpgradeHive);
    }
}

/// Failures raised by grid queries and mutations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The coordinate lies outside the grid.
    #[error("cell {0} lies outside the grid")]
    OutOfBounds(CellCoord),
    /// The cell holds nothing that can be dug.
    #[error("cell {0} holds no diggable block")]
    NotDiggable(CellCoord),
    /// A layout literal contained an unknown cell code.
    #[error("unknown cell code {code} at {cell}")]
    InvalidCellCode {
        /// Offending code.
        code: u8,
        /// Location of the code within the layout.
        cell: CellCoord,
    },
    /// A layout literal was empty or ragged.
    #[error("layout rows must be non-empty and equally long")]
    InvalidDimensions,
}

/// Failures raised by the path finder.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The open set was exhausted before reaching the goal.
    #[error("no path from {start} to {goal}")]
    NotFound {
        /// Cell the search started from.
        start: CellCoord,
        /// Cell the search tried to reach.
        goal: CellCoord,
    },
}

/// Failures raised when a lifecycle is driven out of order.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The requested action is not valid in the current state.
    #[error("cannot {action} an enemy in state {state:?}")]
    InvalidStateTransition {
        /// State the entity was in.
        state: LifecycleState,
        /// Action that was attempted.
        action: &'static str,
    },
}
