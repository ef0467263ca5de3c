//! Plain-text rendering of the playfield.

use std::fmt::Write as _;

use tunnel_hive_core::{CellCoord, CellKind, HiveState, LifecycleState, MapProvider};
use tunnel_hive_world::{query, World};

/// Draws the grid one character per cell, followed by a status line.
///
/// Lasers draw over enemies, enemies over the player, and the player over
/// the terrain.
pub(crate) fn board(world: &World) -> String {
    let grid = query::grid(world);
    let columns = grid.columns() as usize;
    let mut canvas: Vec<Vec<char>> = (0..grid.rows())
        .map(|row| {
            grid.row(row)
                .unwrap_or_default()
                .iter()
                .map(|kind| terrain(*kind))
                .collect()
        })
        .collect();

    let mut plot = |cell: CellCoord, glyph: char| {
        if let Some(slot) = canvas
            .get_mut(cell.row() as usize)
            .and_then(|row| row.get_mut(cell.column() as usize))
        {
            *slot = glyph;
        }
    };

    plot(
        grid.hive_cell(),
        match grid.hive_state() {
            HiveState::Closed => 'H',
            HiveState::Open => 'O',
            HiveState::Destroyed => 'x',
        },
    );
    plot(query::player(world).position.cell(), '@');
    for enemy in query::enemy_view(world).iter() {
        let glyph = match enemy.state {
            LifecycleState::Moving => 'e',
            LifecycleState::Dying | LifecycleState::Removed => '+',
        };
        plot(enemy.cell, glyph);
    }
    for laser in query::lasers(world) {
        plot(laser.position.cell(), '*');
    }

    let mut out = String::with_capacity((columns + 1) * canvas.len() + 64);
    for row in canvas {
        out.extend(row);
        out.push('\n');
    }
    let _ = write!(
        out,
        "score {} | lives {} | hive {:?} | enemies {} | {:?}",
        query::score(world),
        query::lives(world),
        query::hive_state(world),
        query::active_enemy_count(world),
        query::outcome(world),
    );
    out
}

const fn terrain(kind: CellKind) -> char {
    match kind {
        CellKind::Empty => '.',
        CellKind::Normal => '#',
        CellKind::Special => '$',
    }
}
