//! Cell storage for the playfield and the hive standing on it.

use tunnel_hive_core::{CellCoord, CellKind, GridError, HiveState, MapProvider};
use tunnel_hive_system_lifecycle::HiveLifecycle;

/// Rectangular grid of cells plus the hive located on one of them.
///
/// Cells are stored row-major. The hive cell is never passable and never
/// diggable, whatever its stored kind and stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    hive_cell: CellCoord,
    hive: HiveLifecycle,
}

impl GridMap {
    /// Builds a grid from rows of cell codes (`0` empty, `1` normal, `2`
    /// special), with a closed hive on `hive_cell`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for empty or ragged rows,
    /// [`GridError::InvalidCellCode`] for an unknown code and
    /// [`GridError::OutOfBounds`] when the hive lies outside the grid.
    pub fn from_rows<R>(rows: &[R], hive_cell: CellCoord) -> Result<Self, GridError>
    where
        R: AsRef<[u8]>,
    {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if width == 0 || rows.iter().any(|row| row.as_ref().len() != width) {
            return Err(GridError::InvalidDimensions);
        }
        let columns = u32::try_from(width).map_err(|_| GridError::InvalidDimensions)?;
        let height = u32::try_from(rows.len()).map_err(|_| GridError::InvalidDimensions)?;

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row_index, row) in (0..height).zip(rows) {
            for (column_index, &code) in (0..columns).zip(row.as_ref()) {
                let kind = CellKind::from_code(code).ok_or(GridError::InvalidCellCode {
                    code,
                    cell: CellCoord::new(column_index, row_index),
                })?;
                cells.push(kind);
            }
        }

        if hive_cell.column() >= columns || hive_cell.row() >= height {
            return Err(GridError::OutOfBounds(hive_cell));
        }

        Ok(Self::from_cells(columns, height, cells, hive_cell))
    }

    /// Builds a grid whose every cell holds `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for a zero dimension and
    /// [`GridError::OutOfBounds`] when the hive lies outside the grid.
    pub fn filled(
        columns: u32,
        rows: u32,
        kind: CellKind,
        hive_cell: CellCoord,
    ) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::InvalidDimensions);
        }
        if hive_cell.column() >= columns || hive_cell.row() >= rows {
            return Err(GridError::OutOfBounds(hive_cell));
        }
        let count = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| GridError::InvalidDimensions)?;
        Ok(Self::from_cells(
            columns,
            rows,
            vec![kind; count],
            hive_cell,
        ))
    }

    /// Assembles a grid from already validated parts.
    pub(crate) fn from_cells(
        columns: u32,
        rows: u32,
        cells: Vec<CellKind>,
        hive_cell: CellCoord,
    ) -> Self {
        debug_assert_eq!(cells.len() as u64, u64::from(columns) * u64::from(rows));
        Self {
            columns,
            rows,
            cells,
            hive_cell,
            hive: HiveLifecycle::new(),
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether `cell` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Cells of a single row, left to right.
    #[must_use]
    pub fn row(&self, row: u32) -> Option<&[CellKind]> {
        if row >= self.rows {
            return None;
        }
        let width = self.columns as usize;
        let start = row as usize * width;
        self.cells.get(start..start + width)
    }

    /// Lifecycle of the hive standing on this grid.
    #[must_use]
    pub const fn hive(&self) -> &HiveLifecycle {
        &self.hive
    }

    /// Opens a closed hive. Returns whether the state changed.
    pub(crate) fn upgrade_hive(&mut self) -> bool {
        self.hive.upgrade()
    }

    /// Destroys an open hive. Returns whether the state changed.
    pub(crate) fn strike_hive(&mut self) -> bool {
        self.hive.strike()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.row() as usize * self.columns as usize + cell.column() as usize)
    }
}

impl MapProvider for GridMap {
    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn cell_at(&self, cell: CellCoord) -> Result<CellKind, GridError> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(GridError::OutOfBounds(cell))
    }

    fn is_passable(&self, cell: CellCoord) -> bool {
        cell != self.hive_cell && self.cell_at(cell) == Ok(CellKind::Empty)
    }

    fn dig(&mut self, cell: CellCoord) -> Result<u32, GridError> {
        if cell == self.hive_cell {
            return Err(GridError::NotDiggable(cell));
        }
        let slot = self
            .index(cell)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(GridError::NotDiggable(cell))?;
        let points = slot.points().ok_or(GridError::NotDiggable(cell))?;
        *slot = CellKind::Empty;
        Ok(points)
    }

    fn hive_cell(&self) -> CellCoord {
        self.hive_cell
    }

    fn hive_state(&self) -> HiveState {
        self.hive.state()
    }
}
