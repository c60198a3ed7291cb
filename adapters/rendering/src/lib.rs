#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Endless Dungeon adapters.
//!
//! The crate turns a finished grid into a backend-agnostic [`Scene`]: one
//! tile per terrain cell plus a single tile covering the goal structure,
//! which is always listed after every terrain tile so backends draw it on
//! top. Which resource each tile uses comes from a caller-owned
//! [`VisualTable`].

mod manifest;

use std::collections::HashMap;

use anyhow::Result as AnyResult;
use endless_dungeon_core::{CellCoord, CellRect, CellRectSize, Path, TerrainCode};
use endless_dungeon_world::Grid;
use glam::Vec2;
use thiserror::Error;
use tracing::warn;

pub use manifest::SUPPORTED_MANIFEST_VERSION;

/// Identifies what a visual resource depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisualKey {
    /// Visual drawn for cells of the given terrain.
    Terrain(TerrainCode),
    /// Visual drawn for the walking agent.
    Agent,
}

impl VisualKey {
    /// Every key in canonical order: terrain codes ascending, then the agent.
    pub const ALL: [VisualKey; 8] = [
        VisualKey::Terrain(TerrainCode::GrassA),
        VisualKey::Terrain(TerrainCode::GrassB),
        VisualKey::Terrain(TerrainCode::Path),
        VisualKey::Terrain(TerrainCode::Structure),
        VisualKey::Terrain(TerrainCode::RockA),
        VisualKey::Terrain(TerrainCode::RockB),
        VisualKey::Terrain(TerrainCode::RockC),
        VisualKey::Agent,
    ];

    /// Name used for the key in visual manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            VisualKey::Terrain(TerrainCode::GrassA) => "GrassA",
            VisualKey::Terrain(TerrainCode::GrassB) => "GrassB",
            VisualKey::Terrain(TerrainCode::Path) => "Path",
            VisualKey::Terrain(TerrainCode::Structure) => "Structure",
            VisualKey::Terrain(TerrainCode::RockA) => "RockA",
            VisualKey::Terrain(TerrainCode::RockB) => "RockB",
            VisualKey::Terrain(TerrainCode::RockC) => "RockC",
            VisualKey::Agent => "Agent",
        }
    }
}

/// Caller-owned mapping from visual keys to resource identifiers.
///
/// Resource identifiers are opaque to this crate; a graphical backend may
/// treat them as file paths while a terminal backend treats them as glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisualTable {
    resources: HashMap<VisualKey, String>,
}

impl VisualTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates a resource with a key, returning the table for chaining.
    #[must_use]
    pub fn with(mut self, key: VisualKey, resource: impl Into<String>) -> Self {
        let _ = self.insert(key, resource);
        self
    }

    /// Associates a resource with a key, returning the previous resource.
    pub fn insert(&mut self, key: VisualKey, resource: impl Into<String>) -> Option<String> {
        self.resources.insert(key, resource.into())
    }

    /// Resource registered for the key, if any.
    #[must_use]
    pub fn resource(&self, key: VisualKey) -> Option<&str> {
        self.resources.get(&key).map(String::as_str)
    }

    /// Reports whether the key has a registered resource.
    #[must_use]
    pub fn contains(&self, key: VisualKey) -> bool {
        self.resources.contains_key(&key)
    }

    /// Number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Reports whether no resources are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Axis-aligned rectangle expressed in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Single drawable tile of a scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneTile {
    /// Cells covered by the tile.
    pub region: CellRect,
    /// What the tile depicts.
    pub key: VisualKey,
    /// Resource registered for `key` when the scene was built.
    pub resource: String,
    /// Edge length of a cell in pixels.
    pub tile_size: u32,
}

impl SceneTile {
    /// Pixel rectangle covered by the tile.
    #[must_use]
    pub fn pixel_rect(&self) -> PixelRect {
        let origin = self.region.origin();
        let size = self.region.size();
        PixelRect {
            x: origin.column().saturating_mul(self.tile_size),
            y: origin.row().saturating_mul(self.tile_size),
            width: size.width().saturating_mul(self.tile_size),
            height: size.height().saturating_mul(self.tile_size),
        }
    }
}

/// Walking agent handed to a backend alongside the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentPresentation {
    /// Pixel position of the agent's top-left corner.
    pub position: Vec2,
    /// Facing direction in degrees, clockwise from east in screen space.
    pub heading_degrees: f32,
    /// Cell the agent currently stands on.
    pub cell: CellCoord,
    /// Resource registered for [`VisualKey::Agent`], if any.
    pub resource: Option<String>,
}

/// Backend-agnostic description of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Number of cell columns covered by the scene.
    pub columns: u32,
    /// Number of cell rows covered by the scene.
    pub rows: u32,
    /// Edge length of a cell in pixels.
    pub tile_size: u32,
    /// Tiles in draw order; the structure tile, when present, comes last.
    pub tiles: Vec<SceneTile>,
    /// Cells highlighted as the planned route.
    pub path: Vec<CellCoord>,
    /// Number of cells left out because their visual was missing.
    pub skipped_cells: usize,
}

impl Scene {
    /// Builds a scene for `grid` using resources from `table`.
    ///
    /// Cells whose visual is missing are skipped with a warning instead of
    /// failing the whole frame.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::InvalidTileSize`] when `tile_size` is zero.
    pub fn from_grid(grid: &Grid, table: &VisualTable, tile_size: u32) -> Result<Self, RenderingError> {
        if tile_size == 0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        let single = CellRectSize::new(1, 1);
        let mut tiles = Vec::with_capacity(grid.cells().len());
        let mut skipped_cells = 0;

        for (cell, terrain) in grid.iter() {
            if terrain == TerrainCode::Structure {
                continue;
            }
            let key = VisualKey::Terrain(terrain);
            match table.resource(key) {
                Some(resource) => tiles.push(SceneTile {
                    region: CellRect::from_origin_and_size(cell, single),
                    key,
                    resource: resource.to_owned(),
                    tile_size,
                }),
                None => {
                    warn!(
                        column = cell.column(),
                        row = cell.row(),
                        visual = key.name(),
                        "missing visual, cell skipped"
                    );
                    skipped_cells += 1;
                }
            }
        }

        if let Some(region) = grid.structure() {
            let key = VisualKey::Terrain(TerrainCode::Structure);
            match table.resource(key) {
                Some(resource) => tiles.push(SceneTile {
                    region,
                    key,
                    resource: resource.to_owned(),
                    tile_size,
                }),
                None => {
                    let anchor = region.origin();
                    warn!(
                        column = anchor.column(),
                        row = anchor.row(),
                        visual = key.name(),
                        "missing visual, structure skipped"
                    );
                    skipped_cells += region.cells().count();
                }
            }
        }

        Ok(Self {
            columns: grid.columns(),
            rows: grid.rows(),
            tile_size,
            tiles,
            path: Vec::new(),
            skipped_cells,
        })
    }

    /// Highlights the cells of `path` as the planned route.
    #[must_use]
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = path.cells().to_vec();
        self
    }

    /// Tile drawn for the goal structure, if one is present.
    #[must_use]
    pub fn structure_tile(&self) -> Option<&SceneTile> {
        self.tiles
            .last()
            .filter(|tile| tile.key == VisualKey::Terrain(TerrainCode::Structure))
    }

    /// Width of the scene in pixels.
    #[must_use]
    pub const fn pixel_width(&self) -> u32 {
        self.columns.saturating_mul(self.tile_size)
    }

    /// Height of the scene in pixels.
    #[must_use]
    pub const fn pixel_height(&self) -> u32 {
        self.rows.saturating_mul(self.tile_size)
    }
}

/// Rendering backend capable of presenting Endless Dungeon scenes.
pub trait RenderingBackend {
    /// Presents one frame built from the scene and the optional agent.
    fn present(&mut self, scene: &Scene, agent: Option<AgentPresentation>) -> AnyResult<()>;
}

/// Errors that can occur when building rendering descriptors.
#[derive(Debug, Error)]
pub enum RenderingError {
    /// Tiles must cover at least one pixel.
    #[error("tile size must be positive (received {tile_size})")]
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: u32,
    },
    /// The manifest is not valid TOML or does not have the expected shape.
    #[error("failed to parse visual manifest")]
    Manifest(#[from] toml::de::Error),
    /// The manifest declares a version this crate cannot read.
    #[error("unsupported visual manifest version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version declared by the manifest.
        found: u32,
        /// Version this crate understands.
        expected: u32,
    },
    /// The manifest names a visual this crate does not know.
    #[error("unknown visual key `{0}` in manifest")]
    UnknownKey(String),
    /// Two manifest entries resolve to the same visual.
    #[error("visual manifest contains duplicate entry for {}", .0.name())]
    DuplicateKey(VisualKey),
}
