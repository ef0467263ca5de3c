use tunnel_hive_core::{Direction, Hitbox, LaserId, LaserSnapshot, MapProvider, TilePoint};

use crate::GridMap;

/// Distance a laser travels per tick, in tiles.
pub(crate) const LASER_SPEED: f32 = 0.3;

/// Projectile fired by the player along a cardinal direction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Laser {
    id: LaserId,
    position: TilePoint,
    direction: Direction,
}

impl Laser {
    pub(crate) const fn new(id: LaserId, position: TilePoint, direction: Direction) -> Self {
        Self {
            id,
            position,
            direction,
        }
    }

    pub(crate) const fn id(&self) -> LaserId {
        self.id
    }

    pub(crate) const fn hitbox(&self) -> Hitbox {
        Hitbox::at(self.position)
    }

    /// Moves the laser one tick along its direction.
    ///
    /// Returns `false` once the laser left the grid or entered a solid
    /// block, in which case it must be dropped.
    pub(crate) fn fly(&mut self, grid: &GridMap) -> bool {
        let (dx, dy) = self.direction.delta();
        self.position = self
            .position
            .offset(dx as f32 * LASER_SPEED, dy as f32 * LASER_SPEED);

        let max_x = grid.columns().saturating_sub(1) as f32;
        let max_y = grid.rows().saturating_sub(1) as f32;
        let (x, y) = (self.position.x(), self.position.y());
        if !(0.0..=max_x).contains(&x) || !(0.0..=max_y).contains(&y) {
            return false;
        }
        !grid
            .cell_at(self.position.cell())
            .map_or(true, |kind| kind.is_solid())
    }

    pub(crate) const fn snapshot(&self) -> LaserSnapshot {
        LaserSnapshot {
            id: self.id,
            position: self.position,
            direction: self.direction,
        }
    }
}
