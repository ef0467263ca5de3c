//! Seeded generation of the default staircase playfield.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tunnel_hive_core::{CellCoord, CellKind};

use crate::GridMap;

/// Number of columns in the default playfield.
pub const DEFAULT_COLUMNS: u32 = 15;
/// Number of rows in the default playfield.
pub const DEFAULT_ROWS: u32 = 14;
/// Cell the hive occupies on the default playfield.
pub const HIVE_CELL: CellCoord = CellCoord::new(14, 13);
/// Cell the player starts on and returns to after losing a life.
pub const PLAYER_START: CellCoord = CellCoord::new(0, 0);

const SPECIAL_CHANCE: f64 = 0.3;

/// Generates the default playfield for `seed`.
///
/// Row `r` is open at columns `r` and `r + 1`, carving a diagonal staircase
/// from the player start down to the hive. Every other cell is a normal
/// block, turned special with a fixed probability. The same seed always
/// yields the same grid.
#[must_use]
pub fn staircase(seed: u64) -> GridMap {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cells = Vec::with_capacity((DEFAULT_COLUMNS * DEFAULT_ROWS) as usize);
    for row in 0..DEFAULT_ROWS {
        for column in 0..DEFAULT_COLUMNS {
            let kind = if column == row || column == row + 1 {
                CellKind::Empty
            } else if rng.gen_bool(SPECIAL_CHANCE) {
                CellKind::Special
            } else {
                CellKind::Normal
            };
            cells.push(kind);
        }
    }
    log::debug!("generated {DEFAULT_COLUMNS}x{DEFAULT_ROWS} staircase from seed {seed}");
    GridMap::from_cells(DEFAULT_COLUMNS, DEFAULT_ROWS, cells, HIVE_CELL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnel_hive_core::MapProvider;

    #[test]
    fn staircase_is_open_along_the_diagonal() {
        let grid = staircase(7);
        for row in 0..DEFAULT_ROWS {
            for column in 0..DEFAULT_COLUMNS {
                let kind = grid
                    .cell_at(CellCoord::new(column, row))
                    .expect("inside the grid");
                let open = column == row || column == row + 1;
                assert_eq!(kind == CellKind::Empty, open, "cell ({column}, {row})");
            }
        }
        assert_eq!(grid.hive_cell(), HIVE_CELL);
        assert!(grid.is_passable(PLAYER_START));
    }

    #[test]
    fn seeds_reproduce_the_same_blocks() {
        assert_eq!(staircase(42), staircase(42));
    }

    #[test]
    fn special_blocks_appear_at_roughly_the_configured_rate() {
        let mut solid = 0u32;
        let mut special = 0u32;
        for seed in 0..20 {
            let grid = staircase(seed);
            for row in 0..DEFAULT_ROWS {
                for kind in grid.row(row).expect("row exists") {
                    match kind {
                        CellKind::Special => {
                            special += 1;
                            solid += 1;
                        }
                        CellKind::Normal => solid += 1,
                        CellKind::Empty => {}
                    }
                }
            }
        }
        let ratio = f64::from(special) / f64::from(solid);
        assert!((0.2..0.4).contains(&ratio), "special ratio {ratio}");
    }
}
