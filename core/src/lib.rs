#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Endless Dungeon map engine.
//!
//! This crate defines the vocabulary that connects the authoritative grid,
//! the pure generation and pathfinding systems, and the adapters at the
//! edge. Systems produce and consume these values; none of them carry
//! behaviour beyond simple geometry so every crate can depend on them
//! without pulling in randomness, logging or I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of a single square tile in pixels used by the default map layout.
pub const DEFAULT_TILE_SIZE: u32 = 16;

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

    /// Cell reached by a single step in the provided direction.
    ///
    /// Returns `None` when the step would leave the `columns` x `rows` grid.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let candidate = match direction {
            Direction::North => CellCoord::new(self.column, self.row.checked_sub(1)?),
            Direction::East => CellCoord::new(self.column.checked_add(1)?, self.row),
            Direction::South => CellCoord::new(self.column, self.row.checked_add(1)?),
            Direction::West => CellCoord::new(self.column.checked_sub(1)?, self.row),
        };

        if candidate.column < columns && candidate.row < rows {
            Some(candidate)
        } else {
            None
        }
    }
}

/// Cardinal directions used when walking the 4-connected grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
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
    /// Every direction in the fixed order neighbours are discovered.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column_offset = cell.column().checked_sub(self.origin.column());
        let row_offset = cell.row().checked_sub(self.origin.row());

        match (column_offset, row_offset) {
            (Some(column), Some(row)) => column < self.size.width() && row < self.size.height(),
            _ => false,
        }
    }

    /// Iterates over every cell covered by the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |row| {
            (0..size.width())
                .map(move |column| CellCoord::new(origin.column() + column, origin.row() + row))
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the rectangle covers no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Terrain stored in a single grid cell.
///
/// The set is closed: two interchangeable grass variants, the stone path
/// that forms corridors, the goal structure, and three interchangeable rock
/// obstacles. Each variant maps to a stable numeric code so snapshots and
/// manifests can refer to terrain without depending on variant names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainCode {
    /// First decorative grass variant.
    GrassA,
    /// Second decorative grass variant.
    GrassB,
    /// Stone path carved as a corridor toward the structure.
    Path,
    /// Cell covered by the goal structure footprint.
    Structure,
    /// First rock obstacle variant.
    RockA,
    /// Second rock obstacle variant.
    RockB,
    /// Third rock obstacle variant.
    RockC,
}

impl TerrainCode {
    /// Every terrain code ordered by its numeric code.
    pub const ALL: [TerrainCode; 7] = [
        TerrainCode::GrassA,
        TerrainCode::GrassB,
        TerrainCode::Path,
        TerrainCode::Structure,
        TerrainCode::RockA,
        TerrainCode::RockB,
        TerrainCode::RockC,
    ];

    /// Decorative variants chosen between when filling empty cells.
    pub const DECORATIVE: [TerrainCode; 2] = [TerrainCode::GrassA, TerrainCode::GrassB];

    /// Obstacle variants chosen between when scattering rocks.
    pub const OBSTACLES: [TerrainCode; 3] =
        [TerrainCode::RockA, TerrainCode::RockB, TerrainCode::RockC];

    /// Stable numeric code of the terrain.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::GrassA => 0,
            Self::GrassB => 1,
            Self::Path => 2,
            Self::Structure => 3,
            Self::RockA => 4,
            Self::RockB => 5,
            Self::RockC => 6,
        }
    }

    /// Resolves a terrain from its numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::GrassA),
            1 => Some(Self::GrassB),
            2 => Some(Self::Path),
            3 => Some(Self::Structure),
            4 => Some(Self::RockA),
            5 => Some(Self::RockB),
            6 => Some(Self::RockC),
            _ => None,
        }
    }

    /// Reports whether the terrain is one of the rock obstacles.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::RockA | Self::RockB | Self::RockC)
    }

    /// Reports whether the terrain is one of the grass variants.
    #[must_use]
    pub const fn is_decorative(self) -> bool {
        matches!(self, Self::GrassA | Self::GrassB)
    }

    /// Reports whether agents may never walk through the terrain.
    ///
    /// The goal structure is blocking as well; pathfinding lifts that
    /// restriction only for the destination cell itself.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        self.is_obstacle() || matches!(self, Self::Structure)
    }
}

/// Grid dimensions derived from a map measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapLayout {
    columns: u32,
    rows: u32,
    tile_size: u32,
}

impl MapLayout {
    /// Derives the grid dimensions by dividing the pixel size by the tile size.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTileSize`] when `tile_size` is zero.
    pub const fn from_pixels(
        width_px: u32,
        height_px: u32,
        tile_size: u32,
    ) -> Result<Self, GridError> {
        if tile_size == 0 {
            return Err(GridError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            columns: width_px / tile_size,
            rows: height_px / tile_size,
            tile_size,
        })
    }

    /// Number of cell columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cell rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single cell in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            columns: 50,
            rows: 38,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

/// Ordered sequence of cells leading from a start cell to a goal cell.
///
/// An empty path means the goal could not be reached; it is a regular
/// outcome rather than an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Wraps cells that are already ordered from start to goal.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Path reported when the goal cannot be reached.
    #[must_use]
    pub fn unreachable() -> Self {
        Self { cells: Vec::new() }
    }

    /// Cells composing the path in walking order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of cells on the path, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path is empty, i.e. the goal was unreachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell of the path.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Last cell of the path.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    /// Reports whether the path visits the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Consumes the path, yielding the underlying cells.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellCoord> {
        self.cells
    }
}

/// Reasons grid construction, generation or queries reject their inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The grid has no area or cannot hold the structure footprint.
    #[error(
        "invalid grid dimensions {columns}x{rows} for a {}x{} structure",
        .structure.width(),
        .structure.height()
    )]
    InvalidDimensions {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
        /// Footprint the grid was expected to hold.
        structure: CellRectSize,
    },
    /// The tile size used to derive grid dimensions was zero.
    #[error("tile size must be positive (received {tile_size})")]
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: u32,
    },
    /// The number of provided cells does not match the grid dimensions.
    #[error("grid expects {expected} cells but received {actual}")]
    CellCountMismatch {
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
    /// A requested cell lies outside the grid.
    #[error(
        "cell ({}, {}) lies outside the {columns}x{rows} grid",
        .cell.column(),
        .cell.row()
    )]
    OutOfBounds {
        /// Cell that failed validation.
        cell: CellCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
}
