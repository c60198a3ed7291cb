#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic map generation system.
//!
//! Generation runs in a fixed order where later steps never overwrite
//! earlier ones: the goal structure is stamped at the centre, two corridors
//! are carved toward it, rocks are scattered over the remaining empty cells
//! and whatever is still empty becomes grass. Every random decision is drawn
//! from the caller's generator, so a seed fully determines the grid.

use endless_dungeon_core::{CellCoord, CellRect, CellRectSize, GridError, MapLayout, TerrainCode};
use endless_dungeon_world::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Footprint of the goal structure placed at the centre of the map.
pub const DEFAULT_STRUCTURE_SIZE: CellRectSize = CellRectSize::new(2, 2);

/// Number of rock placement attempts performed by default.
pub const DEFAULT_OBSTACLE_COUNT: u32 = 10;

/// Tuning knobs controlling the shape of generated maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Number of cell columns in the generated grid.
    pub columns: u32,
    /// Number of cell rows in the generated grid.
    pub rows: u32,
    /// Footprint of the goal structure.
    pub structure: CellRectSize,
    /// Number of rock placement attempts; attempts landing on occupied cells are dropped.
    pub obstacle_count: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_layout(MapLayout::default())
    }
}

impl GenerationSettings {
    /// Settings sized to the provided layout with default structure and obstacles.
    #[must_use]
    pub const fn from_layout(layout: MapLayout) -> Self {
        Self {
            columns: layout.columns(),
            rows: layout.rows(),
            structure: DEFAULT_STRUCTURE_SIZE,
            obstacle_count: DEFAULT_OBSTACLE_COUNT,
        }
    }

    /// Region the goal structure occupies for these settings.
    ///
    /// The anchor sits at `(columns / 2 - width / 2, rows / 2 - height / 2)`
    /// using floor division.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] when the grid has no area,
    /// the structure has no area, or the structure is larger than the grid.
    pub fn structure_region(&self) -> Result<CellRect, GridError> {
        let invalid = GridError::InvalidDimensions {
            columns: self.columns,
            rows: self.rows,
            structure: self.structure,
        };

        if self.columns == 0 || self.rows == 0 || self.structure.is_empty() {
            return Err(invalid);
        }
        if self.structure.width() > self.columns || self.structure.height() > self.rows {
            return Err(invalid);
        }

        let anchor = CellCoord::new(
            self.columns / 2 - self.structure.width() / 2,
            self.rows / 2 - self.structure.height() / 2,
        );
        Ok(CellRect::from_origin_and_size(anchor, self.structure))
    }
}

/// Generates a grid with the default structure size from a seed.
///
/// # Errors
///
/// Returns [`GridError::InvalidDimensions`] when the dimensions cannot hold
/// the default structure.
pub fn generate(columns: u32, rows: u32, obstacle_count: u32, seed: u64) -> Result<Grid, GridError> {
    Generator::new(GenerationSettings {
        columns,
        rows,
        structure: DEFAULT_STRUCTURE_SIZE,
        obstacle_count,
    })
    .generate(seed)
}

/// Cells the corridors occupy for a grid with `rows` rows and the provided
/// structure region.
///
/// The horizontal corridor runs along the anchor row from column 0 up to
/// the structure, the vertical corridor along the anchor column from the
/// last row up to the structure. Structure cells are never part of either
/// corridor.
pub fn corridor_cells(rows: u32, structure: CellRect) -> Vec<CellCoord> {
    let anchor = structure.origin();
    let horizontal = (0..=anchor.column()).map(move |column| CellCoord::new(column, anchor.row()));
    let vertical = (anchor.row()..rows)
        .rev()
        .map(move |row| CellCoord::new(anchor.column(), row));

    horizontal
        .chain(vertical)
        .filter(|cell| !structure.contains(*cell))
        .collect()
}

/// Pure system that turns settings and randomness into a finished grid.
#[derive(Debug, Default)]
pub struct Generator {
    settings: GenerationSettings,
}

impl Generator {
    /// Creates a generator driven by the provided settings.
    #[must_use]
    pub const fn new(settings: GenerationSettings) -> Self {
        Self { settings }
    }

    /// Settings the generator was created with.
    #[must_use]
    pub const fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Generates a grid using a ChaCha stream seeded from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] when the settings are invalid.
    pub fn generate(&self, seed: u64) -> Result<Grid, GridError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate_with(&mut rng)
    }

    /// Generates a grid drawing every random decision from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] when the settings are invalid.
    /// Validation happens before any cell is written.
    pub fn generate_with<R>(&self, rng: &mut R) -> Result<Grid, GridError>
    where
        R: Rng + ?Sized,
    {
        let structure = self.settings.structure_region()?;
        let mut canvas = Canvas::new(self.settings.columns, self.settings.rows);

        canvas.stamp(structure, TerrainCode::Structure);
        info!(
            column = structure.origin().column(),
            row = structure.origin().row(),
            width = structure.size().width(),
            height = structure.size().height(),
            "goal structure placed"
        );

        for cell in corridor_cells(self.settings.rows, structure) {
            let _ = canvas.mark_if_empty(cell, TerrainCode::Path);
        }

        let placed = canvas.scatter_obstacles(self.settings.obstacle_count, rng);
        info!(
            requested = self.settings.obstacle_count,
            placed, "obstacles scattered"
        );

        canvas.fill_decorations(rng);
        canvas.into_grid(structure)
    }
}

/// Working surface where `None` marks a cell no step has claimed yet.
struct Canvas {
    columns: u32,
    rows: u32,
    cells: Vec<Option<TerrainCode>>,
}

impl Canvas {
    fn new(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; count],
        }
    }

    fn slot(&mut self, cell: CellCoord) -> Option<&mut Option<TerrainCode>> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let offset = u64::from(cell.row()) * u64::from(self.columns) + u64::from(cell.column());
        self.cells.get_mut(usize::try_from(offset).ok()?)
    }

    /// Claims every cell of `region` for `terrain`.
    fn stamp(&mut self, region: CellRect, terrain: TerrainCode) {
        for cell in region.cells() {
            if let Some(slot) = self.slot(cell) {
                *slot = Some(terrain);
            }
        }
    }

    /// Claims the cell for `terrain` unless an earlier step already did.
    fn mark_if_empty(&mut self, cell: CellCoord, terrain: TerrainCode) -> bool {
        match self.slot(cell) {
            Some(slot) if slot.is_none() => {
                *slot = Some(terrain);
                true
            }
            _ => false,
        }
    }

    fn scatter_obstacles<R>(&mut self, attempts: u32, rng: &mut R) -> u32
    where
        R: Rng + ?Sized,
    {
        let mut placed = 0;
        for _ in 0..attempts {
            let cell = CellCoord::new(rng.gen_range(0..self.columns), rng.gen_range(0..self.rows));
            let rock = TerrainCode::OBSTACLES[rng.gen_range(0..TerrainCode::OBSTACLES.len())];

            if self.mark_if_empty(cell, rock) {
                placed += 1;
            } else {
                debug!(
                    column = cell.column(),
                    row = cell.row(),
                    "obstacle attempt hit an occupied cell"
                );
            }
        }
        placed
    }

    fn fill_decorations<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for slot in self.cells.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(if rng.gen_bool(0.5) {
                TerrainCode::GrassA
            } else {
                TerrainCode::GrassB
            });
        }
    }

    fn into_grid(self, structure: CellRect) -> Result<Grid, GridError> {
        let cells = self
            .cells
            .into_iter()
            .map(|slot| slot.unwrap_or(TerrainCode::GrassA))
            .collect();
        Grid::from_cells(self.columns, self.rows, cells)?.with_structure(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_describe_fifty_by_thirty_eight_map() {
        let settings = GenerationSettings::default();

        assert_eq!(settings.columns, 50);
        assert_eq!(settings.rows, 38);
        assert_eq!(settings.structure, CellRectSize::new(2, 2));
        assert_eq!(settings.obstacle_count, 10);
        assert_eq!(
            settings.structure_region().expect("default settings are valid"),
            CellRect::from_origin_and_size(CellCoord::new(24, 18), CellRectSize::new(2, 2))
        );
    }

    #[test]
    fn structure_region_rejects_oversized_structure() {
        let settings = GenerationSettings {
            columns: 3,
            rows: 3,
            structure: CellRectSize::new(4, 1),
            obstacle_count: 0,
        };

        assert_eq!(
            settings.structure_region(),
            Err(GridError::InvalidDimensions {
                columns: 3,
                rows: 3,
                structure: CellRectSize::new(4, 1),
            })
        );
    }

    #[test]
    fn structure_region_rejects_empty_structure() {
        let settings = GenerationSettings {
            structure: CellRectSize::new(0, 2),
            ..GenerationSettings::default()
        };

        assert!(settings.structure_region().is_err());
    }

    #[test]
    fn corridor_cells_stop_at_structure() {
        let structure = CellRect::from_origin_and_size(CellCoord::new(2, 2), CellRectSize::new(2, 2));
        let cells = corridor_cells(6, structure);

        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 2),
                CellCoord::new(1, 2),
                CellCoord::new(2, 5),
                CellCoord::new(2, 4),
            ]
        );
    }

    #[test]
    fn corridor_cells_are_empty_when_structure_touches_edges() {
        let structure = CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(1, 1));

        assert!(corridor_cells(1, structure).is_empty());
    }

    #[test]
    fn canvas_never_overwrites_claimed_cells() {
        let mut canvas = Canvas::new(2, 1);
        let cell = CellCoord::new(1, 0);

        assert!(canvas.mark_if_empty(cell, TerrainCode::Structure));
        assert!(!canvas.mark_if_empty(cell, TerrainCode::RockA));
        assert!(!canvas.mark_if_empty(CellCoord::new(2, 0), TerrainCode::Path));
        assert_eq!(canvas.cells, vec![None, Some(TerrainCode::Structure)]);
    }

    #[test]
    fn stamp_claims_the_whole_footprint() {
        let mut canvas = Canvas::new(3, 3);
        let region = CellRect::from_origin_and_size(CellCoord::new(1, 1), CellRectSize::new(2, 2));

        canvas.stamp(region, TerrainCode::Structure);

        let claimed: Vec<usize> = canvas
            .cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot == Some(TerrainCode::Structure))
            .map(|(index, _)| index)
            .collect();
        assert_eq!(claimed, vec![4, 5, 7, 8]);
        assert!(!canvas.mark_if_empty(CellCoord::new(2, 2), TerrainCode::Path));
    }

    #[test]
    fn stamp_ignores_cells_outside_the_canvas() {
        let mut canvas = Canvas::new(2, 2);
        let region = CellRect::from_origin_and_size(CellCoord::new(1, 1), CellRectSize::new(2, 2));

        canvas.stamp(region, TerrainCode::Structure);

        assert_eq!(canvas.cells, vec![None, None, None, Some(TerrainCode::Structure)]);
    }

    #[test]
    fn corridor_cells_skip_structure_on_the_last_row() {
        let structure = CellRect::from_origin_and_size(CellCoord::new(3, 3), CellRectSize::new(1, 1));

        assert_eq!(
            corridor_cells(4, structure),
            vec![CellCoord::new(0, 3), CellCoord::new(1, 3), CellCoord::new(2, 3)]
        );
    }

    #[test]
    fn scatter_skips_occupied_cells_without_retrying() {
        let mut canvas = Canvas::new(1, 1);
        canvas.stamp(
            CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(1, 1)),
            TerrainCode::Structure,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert_eq!(canvas.scatter_obstacles(25, &mut rng), 0);
        assert_eq!(canvas.cells, vec![Some(TerrainCode::Structure)]);
    }
}
