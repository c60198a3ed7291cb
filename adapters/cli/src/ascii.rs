//! Terminal backend that prints one glyph per cell.

use std::io::Write;

use anyhow::{Context, Result};
use endless_dungeon_core::TerrainCode;
use endless_dungeon_rendering::{AgentPresentation, RenderingBackend, Scene, VisualKey, VisualTable};

const PATH_GLYPH: char = '*';
const AGENT_GLYPH: char = '@';
const BLANK_GLYPH: char = ' ';

/// Glyph table used when no manifest is supplied.
pub(crate) fn default_table() -> VisualTable {
    VisualTable::new()
        .with(VisualKey::Terrain(TerrainCode::GrassA), ".")
        .with(VisualKey::Terrain(TerrainCode::GrassB), ",")
        .with(VisualKey::Terrain(TerrainCode::Path), "=")
        .with(VisualKey::Terrain(TerrainCode::Structure), "T")
        .with(VisualKey::Terrain(TerrainCode::RockA), "o")
        .with(VisualKey::Terrain(TerrainCode::RockB), "O")
        .with(VisualKey::Terrain(TerrainCode::RockC), "0")
        .with(VisualKey::Agent, AGENT_GLYPH.to_string())
}

/// Backend writing scenes as rows of characters.
///
/// A tile is drawn with the first character of its resource identifier.
/// The planned route is overlaid on every cell outside the structure and the
/// agent is drawn last.
#[derive(Debug)]
pub(crate) struct AsciiBackend<W> {
    out: W,
}

impl<W: Write> AsciiBackend<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn present(&mut self, scene: &Scene, agent: Option<AgentPresentation>) -> Result<()> {
        for row in render_rows(scene, agent.as_ref()) {
            writeln!(self.out, "{row}").context("failed to write map row")?;
        }
        self.out.flush().context("failed to flush map output")
    }
}

fn render_rows(scene: &Scene, agent: Option<&AgentPresentation>) -> Vec<String> {
    let columns = scene.columns as usize;
    let mut glyphs = vec![BLANK_GLYPH; columns * scene.rows as usize];
    let offset = |column: u32, row: u32| -> Option<usize> {
        (column < scene.columns && row < scene.rows)
            .then(|| row as usize * columns + column as usize)
    };

    for tile in &scene.tiles {
        let glyph = tile.resource.chars().next().unwrap_or(BLANK_GLYPH);
        for cell in tile.region.cells() {
            if let Some(index) = offset(cell.column(), cell.row()) {
                glyphs[index] = glyph;
            }
        }
    }

    let structure = scene.structure_tile().map(|tile| tile.region);
    for cell in &scene.path {
        if structure.is_some_and(|region| region.contains(*cell)) {
            continue;
        }
        if let Some(index) = offset(cell.column(), cell.row()) {
            glyphs[index] = PATH_GLYPH;
        }
    }

    if let Some(agent) = agent {
        let glyph = agent
            .resource
            .as_deref()
            .and_then(|resource| resource.chars().next())
            .unwrap_or(AGENT_GLYPH);
        if let Some(index) = offset(agent.cell.column(), agent.cell.row()) {
            glyphs[index] = glyph;
        }
    }

    glyphs
        .chunks(columns.max(1))
        .map(|row| row.iter().collect())
        .collect()
}
