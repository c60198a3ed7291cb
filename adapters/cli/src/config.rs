//! Run configuration assembled from an optional TOML file and command-line flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::Args;
use endless_dungeon_core::{CellCoord, CellRectSize, MapLayout};
use endless_dungeon_system_generation::GenerationSettings;
use endless_dungeon_system_movement::MovementSettings;
use serde::Deserialize;

/// Values read from a configuration file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) map: MapSection,
    pub(crate) structure: StructureSection,
    pub(crate) generation: GenerationSection,
    pub(crate) agent: AgentSection,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MapSection {
    pub(crate) width_px: Option<u32>,
    pub(crate) height_px: Option<u32>,
    pub(crate) tile_size: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StructureSection {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GenerationSection {
    pub(crate) obstacles: Option<u32>,
    pub(crate) seed: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AgentSection {
    pub(crate) speed: Option<f32>,
    pub(crate) arrival_threshold: Option<f32>,
}

impl FileConfig {
    /// Parses configuration from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }

    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }
}

/// Command-line flags that take precedence over the configuration file.
#[derive(Args, Clone, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    /// Map width in pixels
    #[arg(long, value_name = "PX")]
    pub(crate) width_px: Option<u32>,

    /// Map height in pixels
    #[arg(long, value_name = "PX")]
    pub(crate) height_px: Option<u32>,

    /// Edge length of a tile in pixels
    #[arg(long, value_name = "PX")]
    pub(crate) tile_size: Option<u32>,

    /// Width of the goal structure in cells
    #[arg(long, value_name = "CELLS")]
    pub(crate) structure_width: Option<u32>,

    /// Height of the goal structure in cells
    #[arg(long, value_name = "CELLS")]
    pub(crate) structure_height: Option<u32>,

    /// Number of rock placement attempts
    #[arg(short = 'o', long, value_name = "COUNT")]
    pub(crate) obstacles: Option<u32>,

    /// Seed for map generation; a random seed is drawn when omitted
    #[arg(short = 's', long)]
    pub(crate) seed: Option<u64>,

    /// Agent speed in pixels per step
    #[arg(long, value_name = "PX")]
    pub(crate) speed: Option<f32>,

    /// Distance in pixels at which the agent counts a waypoint as reached
    #[arg(long, value_name = "PX")]
    pub(crate) arrival_threshold: Option<f32>,
}

/// Fully resolved settings for a single run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RunConfig {
    pub(crate) layout: MapLayout,
    pub(crate) generation: GenerationSettings,
    pub(crate) movement: MovementSettings,
    pub(crate) seed: Option<u64>,
}

impl RunConfig {
    /// Merges file values and flags, falling back to defaults for anything unset.
    pub(crate) fn resolve(file: &FileConfig, overrides: &Overrides) -> Result<Self> {
        let default_layout = MapLayout::default();
        let tile_size = overrides
            .tile_size
            .or(file.map.tile_size)
            .unwrap_or(default_layout.tile_size());
        let width_px = overrides
            .width_px
            .or(file.map.width_px)
            .unwrap_or(default_layout.columns() * default_layout.tile_size());
        let height_px = overrides
            .height_px
            .or(file.map.height_px)
            .unwrap_or(default_layout.rows() * default_layout.tile_size());
        let layout = MapLayout::from_pixels(width_px, height_px, tile_size)?;

        let mut generation = GenerationSettings::from_layout(layout);
        generation.structure = CellRectSize::new(
            overrides
                .structure_width
                .or(file.structure.width)
                .unwrap_or(generation.structure.width()),
            overrides
                .structure_height
                .or(file.structure.height)
                .unwrap_or(generation.structure.height()),
        );
        generation.obstacle_count = overrides
            .obstacles
            .or(file.generation.obstacles)
            .unwrap_or(generation.obstacle_count);

        let defaults = MovementSettings::default();
        let movement = MovementSettings {
            tile_size: layout.tile_size(),
            speed: overrides.speed.or(file.agent.speed).unwrap_or(defaults.speed),
            arrival_threshold: overrides
                .arrival_threshold
                .or(file.agent.arrival_threshold)
                .unwrap_or(defaults.arrival_threshold),
        };
        movement.validate()?;

        Ok(Self {
            layout,
            generation,
            movement,
            seed: overrides.seed.or(file.generation.seed),
        })
    }
}

/// Parses a `COLUMN,ROW` pair into a cell coordinate.
pub(crate) fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW but got `{value}`"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;

    Ok(CellCoord::new(column, row))
}
