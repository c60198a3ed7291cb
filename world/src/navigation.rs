//! Reverse breadth-first reachability field built over a grid.

use std::collections::VecDeque;

use endless_dungeon_core::{CellCoord, Direction, GridError};

use crate::{index, query, Grid};

/// Dense step-count grid seeded from a single goal cell.
///
/// The field mirrors the grid's dimensions and stores how many orthogonal
/// steps separate each cell from the goal, using the same passability rule
/// as the pathfinder. Unreachable cells hold `u32::MAX` internally and are
/// reported as `None`.
///
/// The flood never enters blocking cells other than the goal, so a rock has
/// no distance and is not counted by [`reachable_count`](Self::reachable_count)
/// even though the pathfinder lets an agent already standing on it step off.
/// Use [`distance_from_start`](Self::distance_from_start) for that case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachabilityField {
    columns: u32,
    rows: u32,
    goal: CellCoord,
    distances: Vec<u32>,
}

impl ReachabilityField {
    /// Floods the grid outward from `goal`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the goal lies outside the grid.
    pub fn from_goal(grid: &Grid, goal: CellCoord) -> Result<Self, GridError> {
        grid.check_bounds(goal)?;

        let columns = grid.columns();
        let rows = grid.rows();
        let mut distances = vec![u32::MAX; grid.cells().len()];
        let mut queue = VecDeque::new();

        if let Some(offset) = index(columns, rows, goal) {
            distances[offset] = 0;
            queue.push_back(goal);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_offset) = index(columns, rows, cell) else {
                continue;
            };
            let next_distance = distances[current_offset].saturating_add(1);

            for neighbor in query::passable_neighbors(grid, cell, goal) {
                let Some(neighbor_offset) = index(columns, rows, neighbor) else {
                    continue;
                };

                if distances[neighbor_offset] <= next_distance {
                    continue;
                }

                distances[neighbor_offset] = next_distance;
                queue.push_back(neighbor);
            }
        }

        Ok(Self {
            columns,
            rows,
            goal,
            distances,
        })
    }

    /// Goal the field was seeded from.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Number of steps from the cell to the goal, if the goal can be reached.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        index(self.columns, self.rows, cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != u32::MAX)
    }

    /// Steps a walk beginning on `start` needs to reach the goal.
    ///
    /// The start cell's own terrain is ignored, as it is by the pathfinder:
    /// a blocking start is left through its closest reachable neighbour.
    #[must_use]
    pub fn distance_from_start(&self, start: CellCoord) -> Option<u32> {
        self.distance(start).or_else(|| {
            Direction::ALL
                .into_iter()
                .filter_map(|direction| start.step(direction, self.columns, self.rows))
                .filter_map(|neighbor| self.distance(neighbor))
                .min()
                .map(|distance| distance.saturating_add(1))
        })
    }

    /// Number of cells, goal included, from which the goal can be reached.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances
            .iter()
            .filter(|distance| **distance != u32::MAX)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use endless_dungeon_core::TerrainCode;

    use super::*;

    #[test]
    fn from_goal_sets_goal_cell_to_zero() {
        let grid = Grid::filled(3, 4, TerrainCode::GrassA).expect("valid grid");
        let field = ReachabilityField::from_goal(&grid, CellCoord::new(1, 2)).expect("goal inside");

        assert_eq!(field.distance(CellCoord::new(1, 2)), Some(0));
        assert_eq!(field.distance(CellCoord::new(1, 1)), Some(1));
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(2));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(3));
        assert_eq!(field.reachable_count(), 12);
    }

    #[test]
    fn from_goal_respects_rocks() {
        let mut cells = vec![TerrainCode::GrassB; 12];
        cells[4] = TerrainCode::RockA;
        let grid = Grid::from_cells(3, 4, cells).expect("valid grid");
        let wall = CellCoord::new(1, 1);

        let field = ReachabilityField::from_goal(&grid, CellCoord::new(1, 2)).expect("goal inside");

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(4));
        assert_eq!(field.distance(CellCoord::new(0, 1)), Some(2));
        assert_eq!(field.reachable_count(), 11);
    }

    #[test]
    fn blocking_start_is_measured_through_its_neighbours() {
        let mut cells = vec![TerrainCode::GrassB; 12];
        cells[4] = TerrainCode::RockA;
        let grid = Grid::from_cells(3, 4, cells).expect("valid grid");
        let rock = CellCoord::new(1, 1);

        let field = ReachabilityField::from_goal(&grid, CellCoord::new(1, 2)).expect("goal inside");

        assert_eq!(field.distance(rock), None);
        assert_eq!(field.distance_from_start(rock), Some(1));
        assert_eq!(field.distance_from_start(CellCoord::new(0, 0)), Some(3));
        assert_eq!(field.reachable_count(), 11);
    }

    #[test]
    fn enclosed_blocking_start_stays_unreachable() {
        use TerrainCode::{GrassA, RockA};

        let grid = Grid::from_cells(3, 1, vec![RockA, RockA, GrassA]).expect("valid grid");

        let field = ReachabilityField::from_goal(&grid, CellCoord::new(2, 0)).expect("goal inside");

        assert_eq!(field.distance_from_start(CellCoord::new(1, 0)), Some(1));
        assert_eq!(field.distance_from_start(CellCoord::new(0, 0)), None);
    }

    #[test]
    fn structure_goal_is_reachable_but_not_traversable() {
        use TerrainCode::{GrassA, Structure};

        let grid = Grid::from_cells(
            3,
            1,
            vec![GrassA, Structure, Structure],
        )
        .expect("valid grid");

        let field = ReachabilityField::from_goal(&grid, CellCoord::new(1, 0)).expect("goal inside");

        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(1));
        assert_eq!(field.distance(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn from_goal_rejects_cells_outside_grid() {
        let grid = Grid::filled(2, 2, TerrainCode::Path).expect("valid grid");

        assert!(matches!(
            ReachabilityField::from_goal(&grid, CellCoord::new(2, 0)),
            Err(GridError::OutOfBounds { .. })
        ));
    }
}
