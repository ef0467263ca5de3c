#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid A* search used by enemies to chase the player.
//!
//! The search is 4-connected with a uniform step cost and a Manhattan
//! heuristic. Entries sharing the same `f` score leave the open set in the
//! order they were discovered, tracked by an explicit sequence counter, so a
//! given grid always produces the same path.

use std::{cmp::Ordering, collections::BinaryHeap};

use tunnel_hive_core::{CellCoord, Direction, MapProvider, PathError};

/// Expansion order for neighbours of a cell.
const NEIGHBOR_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::North,
    Direction::South,
];

/// Ordered waypoints leading from a start cell toward a goal.
///
/// The start cell itself is not included; the final waypoint is the goal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    waypoints: Vec<CellCoord>,
}

impl Path {
    /// Creates a path from an explicit waypoint list.
    #[must_use]
    pub fn from_waypoints(waypoints: Vec<CellCoord>) -> Self {
        Self { waypoints }
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Waypoint stored at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.waypoints.get(index).copied()
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path holds no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Searches for the shortest 4-connected route from `start` to `goal`.
///
/// Returns an empty [`Path`] when `start == goal`. Only cells for which
/// [`MapProvider::is_passable`] holds are entered; the start cell is never
/// tested, so an enemy standing on the hive can still leave it.
///
/// # Errors
///
/// Returns [`PathError::NotFound`] when the open set is exhausted without
/// reaching the goal, including when either endpoint lies outside the map.
pub fn find_path<M>(start: CellCoord, goal: CellCoord, map: &M) -> Result<Path, PathError>
where
    M: MapProvider + ?Sized,
{
    if start == goal {
        return Ok(Path::default());
    }

    let (columns, rows) = map.dimensions();
    let not_found = PathError::NotFound { start, goal };
    let width = usize::try_from(columns).map_err(|_| not_found)?;
    let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).map_err(|_| not_found)?;

    let Some(start_index) = index(width, columns, rows, start) else {
        return Err(not_found);
    };
    if index(width, columns, rows, goal).is_none() {
        return Err(not_found);
    }

    let mut g_score = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut open = BinaryHeap::new();
    let mut sequence: u64 = 0;
    let mut expanded: usize = 0;

    g_score[start_index] = 0;
    open.push(OpenNode {
        f: start.manhattan_distance(goal),
        g: 0,
        sequence,
        cell: start,
    });

    while let Some(node) = open.pop() {
        if node.cell == goal {
            log::trace!(
                "path {} -> {} found after expanding {expanded} nodes",
                start,
                goal
            );
            return Ok(reconstruct(&came_from, width, columns, rows, start, goal));
        }

        let Some(current_index) = index(width, columns, rows, node.cell) else {
            continue;
        };
        if node.g > g_score[current_index] {
            continue;
        }
        expanded += 1;

        let tentative = node.g.saturating_add(1);
        for direction in NEIGHBOR_ORDER {
            let Some(neighbor) = node.cell.step(direction) else {
                continue;
            };
            let Some(neighbor_index) = index(width, columns, rows, neighbor) else {
                continue;
            };
            if !map.is_passable(neighbor) {
                continue;
            }
            if tentative >= g_score[neighbor_index] {
                continue;
            }

            g_score[neighbor_index] = tentative;
            came_from[neighbor_index] = Some(node.cell);
            sequence += 1;
            open.push(OpenNode {
                f: tentative.saturating_add(neighbor.manhattan_distance(goal)),
                g: tentative,
                sequence,
                cell: neighbor,
            });
        }
    }

    log::trace!("no path {} -> {} after expanding {expanded} nodes", start, goal);
    Err(not_found)
}

fn reconstruct(
    came_from: &[Option<CellCoord>],
    width: usize,
    columns: u32,
    rows: u32,
    start: CellCoord,
    goal: CellCoord,
) -> Path {
    let mut waypoints = Vec::new();
    let mut current = goal;
    while current != start {
        waypoints.push(current);
        let previous = index(width, columns, rows, current)
            .and_then(|offset| came_from.get(offset).copied().flatten());
        match previous {
            Some(cell) => current = cell,
            None => break,
        }
    }
    waypoints.reverse();
    Path { waypoints }
}

fn index(width: usize, columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= columns || cell.row() >= rows {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

/// Open-set entry ordered so the heap yields the lowest `f`, then the
/// earliest discovery.
///
/// Equality follows the ordering, so `g` and `cell` do not take part in it.
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    sequence: u64,
    cell: CellCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnel_hive_core::{CellKind, GridError, HiveState};

    struct Blocks {
        columns: u32,
        rows: u32,
        walls: Vec<CellCoord>,
    }

    impl MapProvider for Blocks {
        fn dimensions(&self) -> (u32, u32) {
            (self.columns, self.rows)
        }

        fn cell_at(&self, cell: CellCoord) -> Result<CellKind, GridError> {
            if cell.column() >= self.columns || cell.row() >= self.rows {
                return Err(GridError::OutOfBounds(cell));
            }
            Ok(if self.walls.contains(&cell) {
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

    fn open(columns: u32, rows: u32) -> Blocks {
        Blocks {
            columns,
            rows,
            walls: Vec::new(),
        }
    }

    #[test]
    fn start_equal_to_goal_yields_empty_path() {
        let map = open(3, 3);
        let cell = CellCoord::new(1, 1);
        assert_eq!(find_path(cell, cell, &map), Ok(Path::default()));
    }

    #[test]
    fn straight_corridor_is_walked_in_order() {
        let map = open(4, 1);
        let path = find_path(CellCoord::new(0, 0), CellCoord::new(3, 0), &map).expect("path");
        assert_eq!(
            path.waypoints(),
            &[
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0)
            ]
        );
    }

    #[test]
    fn walls_force_a_detour() {
        let map = Blocks {
            columns: 3,
            rows: 3,
            walls: vec![CellCoord::new(1, 0), CellCoord::new(1, 1)],
        };
        let path = find_path(CellCoord::new(0, 0), CellCoord::new(2, 0), &map).expect("path");
        assert_eq!(path.len(), 6);
        assert!(path.waypoints().iter().all(|cell| map.is_passable(*cell)));
        assert_eq!(path.get(path.len() - 1), Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let goal = CellCoord::new(2, 2);
        let map = Blocks {
            columns: 5,
            rows: 5,
            walls: vec![
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
                CellCoord::new(3, 2),
                CellCoord::new(2, 3),
            ],
        };
        let start = CellCoord::new(0, 0);
        assert_eq!(
            find_path(start, goal, &map),
            Err(PathError::NotFound { start, goal })
        );
    }

    #[test]
    fn out_of_bounds_goal_is_unreachable() {
        let map = open(2, 2);
        assert!(find_path(CellCoord::new(0, 0), CellCoord::new(5, 0), &map).is_err());
    }

    #[test]
    fn start_cell_need_not_be_passable() {
        let start = CellCoord::new(0, 0);
        let map = Blocks {
            columns: 2,
            rows: 1,
            walls: vec![start],
        };
        let path = find_path(start, CellCoord::new(1, 0), &map).expect("path");
        assert_eq!(path.waypoints(), &[CellCoord::new(1, 0)]);
    }

    #[test]
    fn ties_resolve_in_discovery_order() {
        let map = open(2, 2);
        let path = find_path(CellCoord::new(0, 0), CellCoord::new(1, 1), &map).expect("path");
        // East is discovered before South, so the route turns after the first column step.
        assert_eq!(
            path.waypoints(),
            &[CellCoord::new(1, 0), CellCoord::new(1, 1)]
        );
    }

    #[test]
    fn heap_prefers_lower_score_then_earlier_sequence() {
        let mut heap = BinaryHeap::new();
        let cell = CellCoord::new(0, 0);
        for (f, sequence) in [(3, 0), (2, 2), (2, 1), (5, 3)] {
            heap.push(OpenNode {
                f,
                g: 0,
                sequence,
                cell,
            });
        }
        let order: Vec<_> = std::iter::from_fn(|| heap.pop())
            .map(|node| (node.f, node.sequence))
            .collect();
        assert_eq!(order, vec![(2, 1), (2, 2), (3, 0), (5, 3)]);
    }

    #[test]
    fn node_equality_agrees_with_ordering() {
        let node = OpenNode {
            f: 4,
            g: 1,
            sequence: 7,
            cell: CellCoord::new(0, 0),
        };
        let same_slot = OpenNode {
            g: 3,
            cell: CellCoord::new(2, 1),
            ..node
        };
        let later = OpenNode {
            sequence: 8,
            ..node
        };

        assert_eq!(node.cmp(&same_slot), Ordering::Equal);
        assert_eq!(node, same_slot);
        assert_ne!(node, later);
    }
}
