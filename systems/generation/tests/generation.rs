use std::{
    collections::{hash_map::DefaultHasher, HashSet},
    hash::{Hash, Hasher},
};

use endless_dungeon_core::{CellCoord, CellRect, CellRectSize, GridError, TerrainCode};
use endless_dungeon_system_generation::{
    corridor_cells, generate, GenerationSettings, Generator, DEFAULT_STRUCTURE_SIZE,
};
use endless_dungeon_world::{query, Grid};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn fingerprint(grid: &Grid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.hash(&mut hasher);
    hasher.finish()
}

fn expected_structure(columns: u32, rows: u32, size: CellRectSize) -> CellRect {
    CellRect::from_origin_and_size(
        CellCoord::new(
            columns / 2 - size.width() / 2,
            rows / 2 - size.height() / 2,
        ),
        size,
    )
}

#[test]
fn same_seed_produces_identical_grids() {
    let first = generate(50, 38, 10, 0xdead_beef).expect("default-sized grid is valid");
    let second = generate(50, 38, 10, 0xdead_beef).expect("default-sized grid is valid");

    assert_eq!(first, second, "generation diverged between runs");
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

#[test]
fn different_seeds_produce_different_decorations() {
    let first = generate(50, 38, 10, 1).expect("valid grid");
    let second = generate(50, 38, 10, 2).expect("valid grid");

    assert_ne!(
        fingerprint(&first),
        fingerprint(&second),
        "independent seeds should not produce the same map"
    );
}

#[test]
fn default_generator_places_structure_at_map_centre() {
    let grid = Generator::default().generate(7).expect("default settings are valid");

    assert_eq!(grid.columns(), 50);
    assert_eq!(grid.rows(), 38);
    assert_eq!(
        grid.structure(),
        Some(expected_structure(50, 38, DEFAULT_STRUCTURE_SIZE))
    );
    assert_eq!(query::structure_anchor(&grid), Some(CellCoord::new(24, 18)));
}

#[test]
fn zero_dimensions_are_rejected() {
    assert!(matches!(
        generate(0, 10, 3, 1),
        Err(GridError::InvalidDimensions { columns: 0, .. })
    ));
    assert!(matches!(
        generate(10, 0, 3, 1),
        Err(GridError::InvalidDimensions { rows: 0, .. })
    ));
}

#[test]
fn structure_larger_than_grid_is_rejected() {
    assert_eq!(
        generate(1, 8, 0, 1),
        Err(GridError::InvalidDimensions {
            columns: 1,
            rows: 8,
            structure: DEFAULT_STRUCTURE_SIZE,
        })
    );
}

#[test]
fn zero_obstacles_leave_only_structure_path_and_grass() {
    let grid = generate(20, 12, 0, 99).expect("valid grid");
    let census = query::census(&grid);

    assert_eq!(census.obstacles(), 0);
    assert_eq!(census.count(TerrainCode::Structure), 4);
    assert_eq!(
        census.count(TerrainCode::Structure) + census.count(TerrainCode::Path) + census.decorative(),
        grid.cells().len()
    );
}

#[test]
fn sparse_requests_are_mostly_honoured() {
    let requested_per_grid = 10;
    let seeds = 0..20_u64;
    let requested = requested_per_grid * seeds.clone().count();

    let placed: usize = seeds
        .map(|seed| {
            let grid = generate(100, 100, requested_per_grid as u32, seed).expect("valid grid");
            query::census(&grid).obstacles()
        })
        .sum();

    assert!(placed <= requested);
    assert!(
        placed + 10 >= requested,
        "only {placed} of {requested} obstacles landed on a mostly empty map"
    );
}

#[test]
fn every_attempt_lands_when_the_map_has_room() {
    let requested = 10;
    let grid = generate(1000, 1000, requested, 3).expect("valid grid");

    assert_eq!(query::census(&grid).obstacles(), requested as usize);
}

#[test]
fn realized_obstacles_match_attempts_on_free_cells() {
    let settings = GenerationSettings {
        columns: 8,
        rows: 6,
        structure: DEFAULT_STRUCTURE_SIZE,
        obstacle_count: 30,
    };
    let structure = settings.structure_region().expect("valid settings");
    let mut occupied: HashSet<CellCoord> = structure.cells().collect();
    occupied.extend(corridor_cells(settings.rows, structure));

    for seed in 0..16_u64 {
        let mut replay = ChaCha8Rng::seed_from_u64(seed);
        let mut claimed = occupied.clone();
        let mut expected = 0;
        for _ in 0..settings.obstacle_count {
            let cell = CellCoord::new(
                replay.gen_range(0..settings.columns),
                replay.gen_range(0..settings.rows),
            );
            let _ = replay.gen_range(0..TerrainCode::OBSTACLES.len());
            if claimed.insert(cell) {
                expected += 1;
            }
        }

        let grid = Generator::new(settings).generate(seed).expect("valid settings");
        assert_eq!(query::census(&grid).obstacles(), expected, "seed {seed}");
    }
}

#[test]
fn single_cell_structure_on_five_by_five_grid() {
    let grid = Generator::new(GenerationSettings {
        columns: 5,
        rows: 5,
        structure: CellRectSize::new(1, 1),
        obstacle_count: 0,
    })
    .generate(11)
    .expect("valid settings");

    assert_eq!(grid.terrain(CellCoord::new(2, 2)), Some(TerrainCode::Structure));
    for cell in [
        CellCoord::new(0, 2),
        CellCoord::new(1, 2),
        CellCoord::new(2, 4),
        CellCoord::new(2, 3),
    ] {
        assert_eq!(grid.terrain(cell), Some(TerrainCode::Path), "{cell:?} should be path");
    }
}

proptest! {
    #[test]
    fn generated_grids_keep_structure_and_corridors(
        columns in 2_u32..40,
        rows in 2_u32..40,
        obstacle_count in 0_u32..400,
        seed in any::<u64>(),
    ) {
        let grid = generate(columns, rows, obstacle_count, seed).expect("dimensions hold the structure");
        let structure = expected_structure(columns, rows, DEFAULT_STRUCTURE_SIZE);

        prop_assert_eq!(grid.structure(), Some(structure));
        prop_assert_eq!(grid.cells().len(), (columns * rows) as usize);

        for cell in structure.cells() {
            prop_assert_eq!(grid.terrain(cell), Some(TerrainCode::Structure));
        }

        let census = query::census(&grid);
        prop_assert_eq!(census.count(TerrainCode::Structure), 4);

        for cell in corridor_cells(rows, structure) {
            prop_assert_eq!(grid.terrain(cell), Some(TerrainCode::Path));
        }

        prop_assert!(census.obstacles() <= obstacle_count as usize);
    }

    #[test]
    fn generation_is_deterministic_per_seed(
        columns in 2_u32..30,
        rows in 2_u32..30,
        obstacle_count in 0_u32..50,
        seed in any::<u64>(),
    ) {
        let first = generate(columns, rows, obstacle_count, seed).expect("valid grid");
        let second = generate(columns, rows, obstacle_count, seed).expect("valid grid");

        prop_assert_eq!(first, second);
    }
}
