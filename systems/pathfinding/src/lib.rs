#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-source, single-target A* pathfinding over a finished grid.
//!
//! The frontier is ordered by `cost so far + Manhattan distance to the
//! goal`, which is admissible and consistent on a 4-connected grid with unit
//! step costs, so the first time the goal is popped its path is shortest.
//!
//! Ties are broken deterministically. Among entries with the same total
//! estimate, the one with the smaller heuristic (the one deeper into the
//! search) is popped first; among those, the entry discovered earliest wins.
//! Neighbours are discovered in north, east, south, west order. Repeated
//! searches over the same grid therefore always return the same path.
//!
//! Search nodes live in an arena owned by a single run. Each node stores the
//! handle of its predecessor and the path is rebuilt by walking those
//! handles back from the goal.

use std::{cmp::Ordering, collections::BinaryHeap};

use endless_dungeon_core::{CellCoord, GridError, Path};
use endless_dungeon_world::{query, Grid};
use tracing::debug;

/// Finds the shortest 4-connected path from `start` to `goal`.
///
/// Rocks block movement, and so does the goal structure except for the goal
/// cell itself. The start cell is never checked; it is where the agent
/// already stands. An unreachable goal yields an empty [`Path`].
///
/// # Errors
///
/// Returns [`GridError::OutOfBounds`] when either endpoint lies outside the
/// grid. The check happens before any search state is allocated.
pub fn find_path(grid: &Grid, start: CellCoord, goal: CellCoord) -> Result<Path, GridError> {
    grid.check_bounds(start)?;
    grid.check_bounds(goal)?;

    let mut search = Search::new(grid, goal);
    let path = search.run(start);
    debug!(
        start = ?start,
        goal = ?goal,
        expanded = search.expanded,
        length = path.len(),
        "path search finished"
    );
    Ok(path)
}

/// Index of a node inside the search arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeHandle(usize);

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    cell: CellCoord,
    cost: u32,
    parent: Option<NodeHandle>,
}

/// Frontier entry ordered so the binary max-heap pops the best candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrontierEntry {
    total: u32,
    heuristic: u32,
    handle: NodeHandle,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total
            .cmp(&self.total)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.handle.0.cmp(&self.handle.0))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Search<'grid> {
    grid: &'grid Grid,
    goal: CellCoord,
    nodes: Vec<SearchNode>,
    frontier: BinaryHeap<FrontierEntry>,
    closed: Vec<bool>,
    expanded: usize,
}

impl<'grid> Search<'grid> {
    fn new(grid: &'grid Grid, goal: CellCoord) -> Self {
        Self {
            grid,
            goal,
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            closed: vec![false; grid.cells().len()],
            expanded: 0,
        }
    }

    fn run(&mut self, start: CellCoord) -> Path {
        self.open(start, 0, None);

        while let Some(entry) = self.frontier.pop() {
            let node = self.nodes[entry.handle.0];

            if node.cell == self.goal {
                return self.reconstruct(entry.handle);
            }

            let Some(offset) = self.offset(node.cell) else {
                continue;
            };
            if self.closed[offset] {
                continue;
            }
            self.closed[offset] = true;
            self.expanded += 1;

            let grid = self.grid;
            for neighbor in query::passable_neighbors(grid, node.cell, self.goal) {
                let already_closed = self
                    .offset(neighbor)
                    .map_or(true, |neighbor_offset| self.closed[neighbor_offset]);
                if already_closed {
                    continue;
                }

                self.open(neighbor, node.cost + 1, Some(entry.handle));
            }
        }

        Path::unreachable()
    }

    fn open(&mut self, cell: CellCoord, cost: u32, parent: Option<NodeHandle>) {
        let handle = NodeHandle(self.nodes.len());
        let heuristic = cell.manhattan_distance(self.goal);
        self.nodes.push(SearchNode { cell, cost, parent });
        self.frontier.push(FrontierEntry {
            total: cost + heuristic,
            heuristic,
            handle,
        });
    }

    fn reconstruct(&self, goal: NodeHandle) -> Path {
        let mut cells = Vec::new();
        let mut cursor = Some(goal);
        while let Some(handle) = cursor {
            let node = self.nodes[handle.0];
            cells.push(node.cell);
            cursor = node.parent;
        }
        cells.reverse();
        Path::new(cells)
    }

    fn offset(&self, cell: CellCoord) -> Option<usize> {
        if !self.grid.contains(cell) {
            return None;
        }
        let offset = u64::from(cell.row()) * u64::from(self.grid.columns()) + u64::from(cell.column());
        usize::try_from(offset).ok()
    }
}
