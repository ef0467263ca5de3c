use pathfinding::prelude::bfs;
use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;
use tunnel_hive_core::{CellCoord, CellKind, Direction, GridError, HiveState, MapProvider};
use tunnel_hive_system_pathfinding::find_path;

#[derive(Clone, Debug)]
struct Maze {
    columns: u32,
    rows: u32,
    blocked: Vec<bool>,
    start: CellCoord,
    goal: CellCoord,
}

impl Maze {
    fn offset(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            Some((cell.row() * self.columns + cell.column()) as usize)
        } else {
            None
        }
    }

    fn neighbors(&self, cell: &CellCoord) -> Vec<CellCoord> {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
        .into_iter()
        .filter_map(|direction| cell.step(direction))
        .filter(|neighbor| self.is_passable(*neighbor))
        .collect()
    }
}

impl MapProvider for Maze {
    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn cell_at(&self, cell: CellCoord) -> Result<CellKind, GridError> {
        let offset = self.offset(cell).ok_or(GridError::OutOfBounds(cell))?;
        Ok(if self.blocked[offset] {
            CellKind::Normal
        } else {
            CellKind::Empty
        })
    }

    fn is_passable(&self, cell: CellCoord) -> bool {
        matches!(self.cell_at(cell), Ok(CellKind::Empty))
    }

    fn dig(&mut self, cell: CellCoord) -> Result<u32, GridError> {
        Err(GridError::NotDiggable(cell))
    }

    fn hive_cell(&self) -> CellCoord {
        CellCoord::new(self.columns, self.rows)
    }

    fn hive_state(&self) -> HiveState {
        HiveState::Destroyed
    }
}

impl Arbitrary for Maze {
    fn arbitrary(g: &mut Gen) -> Self {
        let columns = u32::from(u8::arbitrary(g) % 7) + 2;
        let rows = u32::from(u8::arbitrary(g) % 7) + 2;
        let count = (columns * rows) as usize;
        let mut blocked: Vec<bool> = (0..count).map(|_| u8::arbitrary(g) % 10 < 3).collect();
        let start_offset = usize::arbitrary(g) % count;
        let goal_offset = usize::arbitrary(g) % count;
        blocked[start_offset] = false;
        blocked[goal_offset] = false;
        let cell_at = |offset: usize| {
            CellCoord::new(offset as u32 % columns, offset as u32 / columns)
        };
        Self {
            columns,
            rows,
            blocked,
            start: cell_at(start_offset),
            goal: cell_at(goal_offset),
        }
    }
}

#[quickcheck]
fn path_steps_are_unit_moves_over_passable_cells(maze: Maze) -> TestResult {
    let Ok(path) = find_path(maze.start, maze.goal, &maze) else {
        return TestResult::discard();
    };

    let mut previous = maze.start;
    for &cell in path.waypoints() {
        if previous.manhattan_distance(cell) != 1 || !maze.is_passable(cell) {
            return TestResult::failed();
        }
        previous = cell;
    }
    TestResult::from_bool(previous == maze.goal)
}

#[quickcheck]
fn path_length_matches_breadth_first_search(maze: Maze) -> bool {
    let oracle = bfs(&maze.start, |cell| maze.neighbors(cell), |cell| *cell == maze.goal);
    match (find_path(maze.start, maze.goal, &maze), oracle) {
        (Ok(path), Some(route)) => path.len() == route.len() - 1,
        (Err(_), None) => true,
        _ => false,
    }
}

#[quickcheck]
fn repeated_searches_agree(maze: Maze) -> bool {
    find_path(maze.start, maze.goal, &maze) == find_path(maze.start, maze.goal, &maze)
}

#[test]
fn open_grid_path_spans_manhattan_distance() {
    let maze = Maze {
        columns: 15,
        rows: 14,
        blocked: vec![false; 15 * 14],
        start: CellCoord::new(14, 13),
        goal: CellCoord::new(0, 0),
    };
    let path = find_path(maze.start, maze.goal, &maze).expect("open grid is connected");
    assert_eq!(path.len(), 27);
    assert_eq!(path.waypoints().last(), Some(&maze.goal));
}
