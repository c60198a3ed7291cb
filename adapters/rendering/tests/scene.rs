use std::path::PathBuf;

use endless_dungeon_core::TerrainCode;
use endless_dungeon_rendering::{PixelRect, Scene, VisualKey, VisualTable};
use endless_dungeon_system_generation::generate;

fn asset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets")
        .join(name)
}

#[test]
fn bundled_manifests_cover_every_visual() {
    for name in ["manifest.toml", "ascii.toml"] {
        let table = VisualTable::from_manifest_path(asset(name)).expect("bundled manifest parses");

        for key in VisualKey::ALL {
            assert!(table.contains(key), "{name} is missing {key:?}");
        }
    }
}

#[test]
fn generated_map_scene_draws_structure_last() {
    let grid = generate(50, 38, 30, 4).expect("valid grid");
    let table = VisualTable::from_manifest_path(asset("manifest.toml")).expect("manifest parses");

    let scene = Scene::from_grid(&grid, &table, 16).expect("valid tile size");

    assert_eq!(scene.skipped_cells, 0);
    assert_eq!(scene.tiles.len(), 50 * 38 - 4 + 1);
    let structure = scene.tiles.last().expect("scene has tiles");
    assert_eq!(structure.key, VisualKey::Terrain(TerrainCode::Structure));
    assert_eq!(
        structure.pixel_rect(),
        PixelRect {
            x: 384,
            y: 288,
            width: 32,
            height: 32,
        }
    );
    assert_eq!(
        structure.resource,
        "Towers/Combat Towers/spr_tower_lightning_tower.png"
    );
}
