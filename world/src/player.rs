use std::time::Duration;

use tunnel_hive_core::{
    CellCoord, Direction, Facing, Hitbox, MapProvider, PlayerAction, PlayerPositionSource,
    PlayerSnapshot, TilePoint,
};

use crate::{layout::PLAYER_START, GridMap};

/// Distance covered by a single move request, in tiles.
pub(crate) const PLAYER_STEP: f32 = 0.5;
/// Time the player stays busy after digging a block.
pub(crate) const DIG_DURATION: Duration = Duration::from_millis(500);

/// Player avatar: half-tile movement, digging and laser cooldown.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Player {
    position: TilePoint,
    facing: Facing,
    heading: Option<Direction>,
    digging: Option<Duration>,
    cooldown: Duration,
}

impl Player {
    pub(crate) fn new() -> Self {
        Self {
            position: TilePoint::at_cell(PLAYER_START),
            facing: Facing::Right,
            heading: None,
            digging: None,
            cooldown: Duration::ZERO,
        }
    }

    pub(crate) const fn position(&self) -> TilePoint {
        self.position
    }

    pub(crate) const fn heading(&self) -> Option<Direction> {
        self.heading
    }

    pub(crate) const fn hitbox(&self) -> Hitbox {
        Hitbox::at(self.position)
    }

    /// Moves half a tile toward `direction` when the grid allows it.
    ///
    /// The heading (and the facing, for horizontal requests) changes even
    /// when the move is refused. Returns whether the position changed.
    pub(crate) fn try_move(&mut self, direction: Direction, grid: &GridMap) -> bool {
        self.heading = Some(direction);
        match direction {
            Direction::East => self.facing = Facing::Right,
            Direction::West => self.facing = Facing::Left,
            Direction::North | Direction::South => {}
        }

        let max_x = grid.columns().saturating_sub(1) as f32;
        let max_y = grid.rows().saturating_sub(1) as f32;
        let within = match direction {
            Direction::North => self.position.y() > 0.0,
            Direction::South => self.position.y() < max_y,
            Direction::West => self.position.x() > 0.0,
            Direction::East => self.position.x() < max_x,
        };
        if !within {
            return false;
        }

        let (dx, dy) = direction.delta();
        let target = self
            .position
            .offset(dx as f32 * PLAYER_STEP, dy as f32 * PLAYER_STEP);
        if !grid.is_passable(target.cell()) {
            return false;
        }
        self.position = target;
        true
    }

    /// Point one tile ahead along the heading, if the player ever moved.
    pub(crate) fn dig_target(&self) -> Option<TilePoint> {
        let (dx, dy) = self.heading?.delta();
        Some(self.position.offset(dx as f32, dy as f32))
    }

    pub(crate) fn begin_dig(&mut self) {
        self.digging = Some(Duration::ZERO);
    }

    pub(crate) fn can_fire(&self) -> bool {
        self.heading.is_some() && self.cooldown.is_zero()
    }

    pub(crate) fn start_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    /// Advances the dig swing and the laser cooldown.
    pub(crate) fn tick(&mut self, dt: Duration) {
        self.cooldown = self.cooldown.saturating_sub(dt);
        if let Some(elapsed) = self.digging {
            let elapsed = elapsed.saturating_add(dt);
            self.digging = (elapsed < DIG_DURATION).then_some(elapsed);
        }
    }

    /// Returns the player to the start cell after losing a life.
    pub(crate) fn respawn(&mut self) {
        self.position = TilePoint::at_cell(PLAYER_START);
        self.digging = None;
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        let (action, dig_progress) = match self.digging {
            Some(elapsed) => (
                PlayerAction::Digging,
                Some(elapsed.as_secs_f32() / DIG_DURATION.as_secs_f32()),
            ),
            None => (PlayerAction::Idle, None),
        };
        PlayerSnapshot {
            position: self.position,
            facing: self.facing,
            action,
            dig_progress,
            heading: self.heading,
        }
    }
}

impl PlayerPositionSource for Player {
    fn player_cell(&self) -> CellCoord {
        self.position.cell()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnel_hive_core::CellKind;

    fn corridor() -> GridMap {
        GridMap::from_rows(&[[0u8, 0, 1], [0, 1, 0]], CellCoord::new(2, 1)).expect("valid layout")
    }

    #[test]
    fn moves_in_half_tiles_until_blocked() {
        let grid = corridor();
        let mut player = Player::new();
        assert!(player.try_move(Direction::East, &grid));
        assert_eq!(player.position(), TilePoint::new(0.5, 0.0));
        assert!(player.try_move(Direction::East, &grid));
        assert!(player.try_move(Direction::East, &grid));
        assert_eq!(player.position(), TilePoint::new(1.5, 0.0));
        assert!(!player.try_move(Direction::East, &grid));
        assert_eq!(player.player_cell(), CellCoord::new(1, 0));
    }

    #[test]
    fn edges_refuse_moves_but_keep_the_heading() {
        let grid = corridor();
        let mut player = Player::new();
        assert!(!player.try_move(Direction::West, &grid));
        assert!(!player.try_move(Direction::North, &grid));
        assert_eq!(player.heading(), Some(Direction::North));
        assert_eq!(player.snapshot().facing, Facing::Left);
        assert_eq!(player.position(), TilePoint::at_cell(PLAYER_START));
    }

    #[test]
    fn dig_swing_lasts_half_a_second() {
        let mut player = Player::new();
        player.begin_dig();
        player.tick(Duration::from_millis(250));
        let snapshot = player.snapshot();
        assert_eq!(snapshot.action, PlayerAction::Digging);
        assert_eq!(snapshot.dig_progress, Some(0.5));
        player.tick(Duration::from_millis(250));
        assert_eq!(player.snapshot().action, PlayerAction::Idle);
    }

    #[test]
    fn firing_needs_a_heading_and_an_idle_cooldown() {
        let grid = GridMap::filled(3, 3, CellKind::Empty, CellCoord::new(2, 2)).expect("grid");
        let mut player = Player::new();
        assert!(!player.can_fire());
        let _ = player.try_move(Direction::South, &grid);
        assert!(player.can_fire());
        player.start_cooldown(Duration::from_millis(100));
        assert!(!player.can_fire());
        player.tick(Duration::from_millis(100));
        assert!(player.can_fire());
    }
}
