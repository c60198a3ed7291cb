#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for Endless Dungeon.
//!
//! A [`Grid`] is assembled once, normally by the generation system, and is
//! read-only afterwards. Consumers inspect it through accessor methods and
//! the [`query`] module; nothing in this crate mutates a grid after it has
//! been handed out.

mod navigation;

use endless_dungeon_core::{CellCoord, CellRect, CellRectSize, GridError, TerrainCode};
use serde::{Deserialize, Serialize};

pub use navigation::ReachabilityField;

/// Dense, row-major matrix of terrain codes.
///
/// Deserialized grids pass through the same checks as [`Grid::from_cells`]
/// and [`Grid::with_structure`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridSnapshot")]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<TerrainCode>,
    structure: Option<CellRect>,
}

/// Unchecked wire form of a [`Grid`].
#[derive(Deserialize)]
struct GridSnapshot {
    columns: u32,
    rows: u32,
    cells: Vec<TerrainCode>,
    structure: Option<CellRect>,
}

impl TryFrom<GridSnapshot> for Grid {
    type Error = GridError;

    fn try_from(snapshot: GridSnapshot) -> Result<Self, Self::Error> {
        let grid = Grid::from_cells(snapshot.columns, snapshot.rows, snapshot.cells)?;
        match snapshot.structure {
            Some(region) => grid.with_structure(region),
            None => Ok(grid),
        }
    }
}

impl Grid {
    /// Assembles a grid from terrain stored in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] when either dimension is zero
    /// and [`GridError::CellCountMismatch`] when `cells` does not hold exactly
    /// `columns * rows` entries.
    pub fn from_cells(columns: u32, rows: u32, cells: Vec<TerrainCode>) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::InvalidDimensions {
                columns,
                rows,
                structure: CellRectSize::new(0, 0),
            });
        }

        let expected = cell_count(columns, rows);
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
            structure: None,
        })
    }

    /// Creates a grid where every cell holds the same terrain.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] when either dimension is zero.
    pub fn filled(columns: u32, rows: u32, terrain: TerrainCode) -> Result<Self, GridError> {
        Self::from_cells(columns, rows, vec![terrain; cell_count(columns, rows)])
    }

    /// Records the region occupied by the goal structure.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] when the region is empty or
    /// does not fit inside the grid.
    pub fn with_structure(mut self, region: CellRect) -> Result<Self, GridError> {
        let size = region.size();
        let fits_columns = region
            .origin()
            .column()
            .checked_add(size.width())
            .is_some_and(|end| end <= self.columns);
        let fits_rows = region
            .origin()
            .row()
            .checked_add(size.height())
            .is_some_and(|end| end <= self.rows);

        if size.is_empty() || !fits_columns || !fits_rows {
            return Err(GridError::InvalidDimensions {
                columns: self.columns,
                rows: self.rows,
                structure: size,
            });
        }

        self.structure = Some(region);
        Ok(self)
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Terrain stored at the provided cell, if it lies within the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<TerrainCode> {
        index(self.columns, self.rows, cell).and_then(|offset| self.cells.get(offset).copied())
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Validates that the cell lies within the grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for cells outside the grid.
    pub fn check_bounds(&self, cell: CellCoord) -> Result<(), GridError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                cell,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    /// Region covered by the goal structure, when one was placed.
    #[must_use]
    pub const fn structure(&self) -> Option<CellRect> {
        self.structure
    }

    /// Terrain of every cell in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[TerrainCode] {
        &self.cells
    }

    /// Iterates over every cell coordinate together with its terrain in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TerrainCode)> + '_ {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(offset, terrain)| {
            let offset = offset as u64;
            let columns = u64::from(columns);
            let cell = CellCoord::new((offset % columns) as u32, (offset / columns) as u32);
            (cell, *terrain)
        })
    }
}

/// Query functions that provide read-only views of a grid.
pub mod query {
    use endless_dungeon_core::{CellCoord, Direction, TerrainCode};

    use super::Grid;

    /// Reports whether an agent heading for `goal` may enter the cell.
    ///
    /// Rocks and the structure block movement. The goal cell is always
    /// enterable so a structure cell can serve as the destination.
    #[must_use]
    pub fn is_passable(grid: &Grid, cell: CellCoord, goal: CellCoord) -> bool {
        match grid.terrain(cell) {
            Some(_) if cell == goal => true,
            Some(terrain) => !terrain.is_blocking(),
            None => false,
        }
    }

    /// Enumerates the enterable neighbours of a cell in north, east, south, west order.
    pub fn passable_neighbors(
        grid: &Grid,
        cell: CellCoord,
        goal: CellCoord,
    ) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            cell.step(direction, grid.columns(), grid.rows())
                .filter(|neighbor| is_passable(grid, *neighbor, goal))
        })
    }

    /// Upper-left cell of the goal structure, when one was placed.
    #[must_use]
    pub fn structure_anchor(grid: &Grid) -> Option<CellCoord> {
        grid.structure().map(|region| region.origin())
    }

    /// Counts how many cells hold each terrain code.
    #[must_use]
    pub fn census(grid: &Grid) -> TerrainCensus {
        let mut counts = [0_usize; TerrainCode::ALL.len()];
        for terrain in grid.cells() {
            counts[usize::from(terrain.code())] += 1;
        }
        TerrainCensus { counts }
    }

    /// Number of cells holding each terrain code.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TerrainCensus {
        counts: [usize; TerrainCode::ALL.len()],
    }

    impl TerrainCensus {
        /// Number of cells holding the provided terrain.
        #[must_use]
        pub fn count(&self, terrain: TerrainCode) -> usize {
            self.counts[usize::from(terrain.code())]
        }

        /// Number of rock cells of any variant.
        #[must_use]
        pub fn obstacles(&self) -> usize {
            TerrainCode::OBSTACLES
                .into_iter()
                .map(|terrain| self.count(terrain))
                .sum()
        }

        /// Number of grass cells of either variant.
        #[must_use]
        pub fn decorative(&self) -> usize {
            TerrainCode::DECORATIVE
                .into_iter()
                .map(|terrain| self.count(terrain))
                .sum()
        }
    }
}

fn cell_count(columns: u32, rows: u32) -> usize {
    let count = u64::from(columns) * u64::from(rows);
    usize::try_from(count).unwrap_or(usize::MAX)
}

pub(crate) fn index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= columns || cell.row() >= rows {
        return None;
    }

    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let width = usize::try_from(columns).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
